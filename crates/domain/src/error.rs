// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::id::Id;
use crate::registration::RegistrationStatus;

/// Errors that can occur during aggregate validation and state transitions.
///
/// `NameTooShort` and `InvalidCapacity` are caller-correctable validation
/// errors; the remaining variants are business-rule conflicts against the
/// current aggregate state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Race name must be at least three characters.
    NameTooShort {
        /// The rejected name.
        name: String,
    },
    /// Maximum participants must be at least one.
    InvalidCapacity,
    /// The requested capacity is below the number of existing registrations.
    CapacityBelowCurrentRegistrations {
        /// The requested capacity.
        capacity: u32,
        /// The current registration count.
        registered: usize,
    },
    /// The race is not open for registration.
    RegistrationsClosed,
    /// The user already has a registration for this race, in any status.
    AlreadyRegistered(Id),
    /// No registration exists for the user.
    NotRegistered(Id),
    /// The registration is not in the status required for this transition.
    WrongStatus {
        /// The status required for the transition.
        expected: RegistrationStatus,
        /// The registration's actual status.
        actual: RegistrationStatus,
    },
    /// No medical certificate is attached to the registration.
    CertificateMissing(Id),
    /// The medical certificate has not been approved by an organizer.
    CertificateNotApproved(Id),
    /// A registration status string from storage is not recognized.
    InvalidStatus(String),
    /// An identifier string could not be parsed.
    InvalidId {
        /// The rejected textual value.
        value: String,
        /// The parse error message.
        reason: String,
    },
}

impl std::fmt::Display for DomainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NameTooShort { name } => {
                write!(f, "Race name '{name}' must be at least 3 characters")
            }
            Self::InvalidCapacity => {
                write!(f, "Maximum participants must be at least 1")
            }
            Self::CapacityBelowCurrentRegistrations {
                capacity,
                registered,
            } => {
                write!(
                    f,
                    "Capacity {capacity} is below the current registration count {registered}"
                )
            }
            Self::RegistrationsClosed => write!(f, "Race is not open for registration"),
            Self::AlreadyRegistered(user_id) => {
                write!(f, "User {user_id} is already registered for this race")
            }
            Self::NotRegistered(user_id) => {
                write!(f, "User {user_id} is not registered for this race")
            }
            Self::WrongStatus { expected, actual } => {
                write!(
                    f,
                    "Registration status is '{actual}' but '{expected}' is required"
                )
            }
            Self::CertificateMissing(user_id) => {
                write!(f, "No medical certificate uploaded for user {user_id}")
            }
            Self::CertificateNotApproved(user_id) => {
                write!(
                    f,
                    "Medical certificate for user {user_id} has not been approved"
                )
            }
            Self::InvalidStatus(value) => {
                write!(f, "Invalid registration status: '{value}'")
            }
            Self::InvalidId { value, reason } => {
                write!(f, "Invalid identifier '{value}': {reason}")
            }
        }
    }
}

impl std::error::Error for DomainError {}
