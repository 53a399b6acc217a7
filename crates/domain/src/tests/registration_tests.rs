// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use super::create_test_now;
use crate::{DomainError, Id, RaceRegistration, RegistrationStatus};

#[test]
fn test_status_round_trips_through_storage_form() {
    for status in [
        RegistrationStatus::Registered,
        RegistrationStatus::Submitted,
        RegistrationStatus::Approved,
    ] {
        let parsed: RegistrationStatus = status.as_str().parse().expect("Known status");
        assert_eq!(parsed, status);
    }
}

#[test]
fn test_status_parse_rejects_unknown_value() {
    let result: Result<RegistrationStatus, DomainError> = "pending".parse();
    assert_eq!(result, Err(DomainError::InvalidStatus("pending".to_string())));
}

#[test]
fn test_from_stored_preserves_all_fields() {
    let bob: Id = Id::new();
    let certificate: Id = Id::new();
    let registration: RaceRegistration = RaceRegistration::from_stored(
        bob,
        create_test_now(),
        RegistrationStatus::Approved,
        Some(certificate),
        true,
    );
    assert_eq!(registration.user_id(), bob);
    assert_eq!(registration.registered_at(), create_test_now());
    assert_eq!(registration.status(), RegistrationStatus::Approved);
    assert_eq!(registration.medical_certificate(), Some(certificate));
    assert!(registration.is_medical_certificate_approved());
}

#[test]
fn test_id_display_parse_round_trip() {
    let id: Id = Id::new();
    let parsed: Id = id.to_string().parse().expect("Valid id text");
    assert_eq!(parsed, id);
}

#[test]
fn test_id_parse_rejects_garbage() {
    let result: Result<Id, DomainError> = "not-an-id".parse();
    assert!(matches!(result, Err(DomainError::InvalidId { .. })));
}
