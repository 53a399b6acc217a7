// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Shared permission predicates.
//!
//! The command side (aggregate predicates on [`crate::Race`]) and the query
//! side (capability projection over denormalized rows) both evaluate these
//! functions. The duplication of the two call paths is deliberate; the
//! boolean logic itself lives here exactly once.

use crate::registration::RegistrationStatus;

/// Only organizers may update the race description and cover image.
#[must_use]
pub const fn can_update_description(is_organizer: bool) -> bool {
    is_organizer
}

/// Only organizers may open a race for registration.
#[must_use]
pub const fn can_open_for_registration(is_organizer: bool) -> bool {
    is_organizer
}

/// Only organizers may review the registration list.
#[must_use]
pub const fn can_accept_registrations(is_organizer: bool) -> bool {
    is_organizer
}

/// Registration is self-service: any authenticated user may register while
/// the window is open, unless they already hold a registration.
#[must_use]
pub const fn can_register(
    is_authenticated: bool,
    is_open_for_registration: bool,
    already_registered: bool,
) -> bool {
    is_authenticated && is_open_for_registration && !already_registered
}

/// Uploading a certificate is self-service and only valid while the
/// registration is still in status `Registered`.
#[must_use]
pub fn can_upload_certificate(is_owner: bool, status: RegistrationStatus) -> bool {
    is_owner && status == RegistrationStatus::Registered
}

/// Approving a certificate requires organizer membership and an attached
/// certificate.
#[must_use]
pub const fn can_approve_certificate(is_organizer: bool, has_certificate: bool) -> bool {
    is_organizer && has_certificate
}

/// Approving a registration requires organizer membership, status
/// `Registered`, and a previously approved certificate.
#[must_use]
pub fn can_approve_registration(
    is_organizer: bool,
    status: RegistrationStatus,
    certificate_approved: bool,
) -> bool {
    is_organizer && status == RegistrationStatus::Registered && certificate_approved
}
