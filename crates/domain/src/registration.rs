// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::DomainError;
use crate::id::Id;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use time::OffsetDateTime;

/// Lifecycle status of a single registration.
///
/// The only exercised transition is `Registered` → `Approved`, performed by
/// [`crate::Race::approve_registration`]. `Submitted` is reserved vocabulary:
/// it round-trips through storage but no operation transitions into it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum RegistrationStatus {
    /// Initial status on registration.
    #[default]
    Registered,
    /// Reserved. No operation currently produces this status.
    Submitted,
    /// Terminal status. The rider's participation is confirmed.
    Approved,
}

impl RegistrationStatus {
    /// Converts this status to its storage representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Registered => "registered",
            Self::Submitted => "submitted",
            Self::Approved => "approved",
        }
    }
}

impl FromStr for RegistrationStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "registered" => Ok(Self::Registered),
            "submitted" => Ok(Self::Submitted),
            "approved" => Ok(Self::Approved),
            _ => Err(DomainError::InvalidStatus(s.to_string())),
        }
    }
}

impl std::fmt::Display for RegistrationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One rider's participation record within a race.
///
/// Registrations are created only through [`crate::Race::register`] and
/// mutated only through the aggregate's methods. They carry their own
/// certificate-approval sub-state, separate from the registration status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RaceRegistration {
    user_id: Id,
    registered_at: OffsetDateTime,
    status: RegistrationStatus,
    medical_certificate: Option<Id>,
    is_medical_certificate_approved: bool,
}

impl RaceRegistration {
    /// Creates a fresh registration in status `Registered`.
    pub(crate) const fn new(user_id: Id, registered_at: OffsetDateTime) -> Self {
        Self {
            user_id,
            registered_at,
            status: RegistrationStatus::Registered,
            medical_certificate: None,
            is_medical_certificate_approved: false,
        }
    }

    /// Rehydrates a registration from stored values.
    ///
    /// Used by the persistence layer when reconstructing a race aggregate.
    #[must_use]
    pub const fn from_stored(
        user_id: Id,
        registered_at: OffsetDateTime,
        status: RegistrationStatus,
        medical_certificate: Option<Id>,
        is_medical_certificate_approved: bool,
    ) -> Self {
        Self {
            user_id,
            registered_at,
            status,
            medical_certificate,
            is_medical_certificate_approved,
        }
    }

    /// Returns the identifier of the registered rider.
    #[must_use]
    pub const fn user_id(&self) -> Id {
        self.user_id
    }

    /// Returns the moment the registration was created.
    #[must_use]
    pub const fn registered_at(&self) -> OffsetDateTime {
        self.registered_at
    }

    /// Returns the registration status.
    #[must_use]
    pub const fn status(&self) -> RegistrationStatus {
        self.status
    }

    /// Returns the attached medical certificate handle, if any.
    #[must_use]
    pub const fn medical_certificate(&self) -> Option<Id> {
        self.medical_certificate
    }

    /// Returns whether an organizer has approved the current certificate.
    #[must_use]
    pub const fn is_medical_certificate_approved(&self) -> bool {
        self.is_medical_certificate_approved
    }

    /// Attaches a certificate, returning the displaced previous handle.
    ///
    /// A new certificate always requires re-approval, so the approval flag is
    /// reset unconditionally.
    pub(crate) const fn attach_certificate(&mut self, certificate: Id) -> Option<Id> {
        let previous: Option<Id> = self.medical_certificate;
        self.medical_certificate = Some(certificate);
        self.is_medical_certificate_approved = false;
        previous
    }

    pub(crate) const fn approve_certificate(&mut self) {
        self.is_medical_certificate_approved = true;
    }

    pub(crate) const fn approve(&mut self) {
        self.status = RegistrationStatus::Approved;
    }
}
