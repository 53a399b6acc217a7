// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Capability projection for the query side.
//!
//! Read models carry explicit capability grants so clients render controls
//! without re-deriving authorization rules. The grants are computed from the
//! same predicates the command side enforces, so a capability shown to the
//! viewer is one the corresponding command will accept.

use serde::Serialize;
use velo_domain::{RegistrationStatus, permissions};

/// Whether the viewer may perform a given action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    /// The action is available to the viewer.
    Allowed,
    /// The action is not available to the viewer.
    Denied,
}

impl Capability {
    /// Converts a permission predicate result into a capability grant.
    #[must_use]
    pub const fn from_bool(allowed: bool) -> Self {
        if allowed { Self::Allowed } else { Self::Denied }
    }

    /// Returns `true` if the capability is granted.
    #[must_use]
    pub const fn is_allowed(self) -> bool {
        matches!(self, Self::Allowed)
    }
}

/// Race-level capabilities of the viewer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RaceCapabilities {
    /// May the viewer update the race description and cover image.
    pub can_update_description: Capability,
    /// May the viewer open the race for registration.
    pub can_open_for_registration: Capability,
    /// May the viewer review and act on the registration list.
    pub can_accept_registrations: Capability,
}

impl RaceCapabilities {
    /// Projects race-level capabilities from organizer membership.
    #[must_use]
    pub const fn for_viewer(is_organizer: bool) -> Self {
        Self {
            can_update_description: Capability::from_bool(permissions::can_update_description(
                is_organizer,
            )),
            can_open_for_registration: Capability::from_bool(
                permissions::can_open_for_registration(is_organizer),
            ),
            can_accept_registrations: Capability::from_bool(permissions::can_accept_registrations(
                is_organizer,
            )),
        }
    }
}

/// Per-registration capabilities of the viewer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RegistrationCapabilities {
    /// May the viewer upload a medical certificate for this registration.
    pub can_upload_certificate: Capability,
    /// May the viewer approve this registration's certificate.
    pub can_approve_certificate: Capability,
    /// May the viewer approve this registration.
    pub can_approve_registration: Capability,
}

impl RegistrationCapabilities {
    /// Projects per-registration capabilities for the viewer.
    ///
    /// # Arguments
    ///
    /// * `is_owner` - Whether the viewer holds this registration
    /// * `is_organizer` - Whether the viewer organizes the race
    /// * `status` - The registration's current status
    /// * `has_certificate` - Whether a certificate is attached
    /// * `certificate_approved` - Whether the certificate has been approved
    #[must_use]
    pub fn for_viewer(
        is_owner: bool,
        is_organizer: bool,
        status: RegistrationStatus,
        has_certificate: bool,
        certificate_approved: bool,
    ) -> Self {
        Self {
            can_upload_certificate: Capability::from_bool(permissions::can_upload_certificate(
                is_owner, status,
            )),
            can_approve_certificate: Capability::from_bool(permissions::can_approve_certificate(
                is_organizer,
                has_certificate,
            )),
            can_approve_registration: Capability::from_bool(permissions::can_approve_registration(
                is_organizer,
                status,
                certificate_approved,
            )),
        }
    }
}
