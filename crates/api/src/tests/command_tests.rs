// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::auth::Identity;
use crate::commands::{
    CoverImageUpdate, OrganizeRaceRequest, UpdateRaceRequest, approve_medical_certificate,
    approve_race_registration, open_race_for_registration, organize_race, register_for_race,
    update_race, upload_medical_certificate,
};
use crate::error::ApiError;
use crate::tests::{
    MemoryFileStore, TEST_START_AT, create_test_identity, create_test_persistence,
    create_test_race,
};
use velo_domain::{Id, Race, RegistrationStatus};
use velo_persistence::Persistence;

#[test]
fn test_organize_race_makes_requester_an_organizer() {
    let mut persistence: Persistence = create_test_persistence();
    let alice: Identity = create_test_identity(&mut persistence, "alice");

    let race_id: Id = create_test_race(&mut persistence, &alice);

    let race: Race = persistence.load_race(race_id).expect("Race not saved");
    assert_eq!(race.name(), "Tour de Test");
    assert!(race.is_organizer(alice.user_id));
    assert!(!race.is_open_for_registration());
}

#[test]
fn test_organize_race_rejects_short_name() {
    let mut persistence: Persistence = create_test_persistence();
    let alice: Identity = create_test_identity(&mut persistence, "alice");
    let request: OrganizeRaceRequest = OrganizeRaceRequest {
        name: "Ab".to_string(),
        start_at: TEST_START_AT.to_string(),
    };

    let result: Result<Id, ApiError> = organize_race(&mut persistence, &alice, &request);

    assert!(matches!(
        result,
        Err(ApiError::InvalidInput { field, .. }) if field == "name"
    ));
}

#[test]
fn test_organize_race_rejects_malformed_start_time() {
    let mut persistence: Persistence = create_test_persistence();
    let alice: Identity = create_test_identity(&mut persistence, "alice");
    let request: OrganizeRaceRequest = OrganizeRaceRequest {
        name: "Tour de Test".to_string(),
        start_at: "next sunday".to_string(),
    };

    let result: Result<Id, ApiError> = organize_race(&mut persistence, &alice, &request);

    assert!(matches!(
        result,
        Err(ApiError::InvalidInput { field, .. }) if field == "start_at"
    ));
}

#[test]
fn test_open_for_registration_requires_organizer() {
    let mut persistence: Persistence = create_test_persistence();
    let alice: Identity = create_test_identity(&mut persistence, "alice");
    let bob: Identity = create_test_identity(&mut persistence, "bob");
    let race_id: Id = create_test_race(&mut persistence, &alice);

    let result: Result<(), ApiError> =
        open_race_for_registration(&mut persistence, &bob, race_id, 100);

    assert!(matches!(result, Err(ApiError::Unauthorized { .. })));
}

#[test]
fn test_open_for_registration_unknown_race() {
    let mut persistence: Persistence = create_test_persistence();
    let alice: Identity = create_test_identity(&mut persistence, "alice");

    let result: Result<(), ApiError> =
        open_race_for_registration(&mut persistence, &alice, Id::new(), 100);

    assert!(matches!(result, Err(ApiError::ResourceNotFound { .. })));
}

#[test]
fn test_open_for_registration_rejects_zero_capacity() {
    let mut persistence: Persistence = create_test_persistence();
    let alice: Identity = create_test_identity(&mut persistence, "alice");
    let race_id: Id = create_test_race(&mut persistence, &alice);

    let result: Result<(), ApiError> = open_race_for_registration(&mut persistence, &alice, race_id, 0);

    assert!(matches!(
        result,
        Err(ApiError::InvalidInput { field, .. }) if field == "maximum_participants"
    ));
}

#[test]
fn test_register_requires_open_registration() {
    let mut persistence: Persistence = create_test_persistence();
    let alice: Identity = create_test_identity(&mut persistence, "alice");
    let bob: Identity = create_test_identity(&mut persistence, "bob");
    let race_id: Id = create_test_race(&mut persistence, &alice);

    let result: Result<(), ApiError> = register_for_race(&mut persistence, &bob, race_id);

    assert!(matches!(result, Err(ApiError::RuleViolation { .. })));
}

#[test]
fn test_register_then_register_again_is_rejected() {
    let mut persistence: Persistence = create_test_persistence();
    let alice: Identity = create_test_identity(&mut persistence, "alice");
    let bob: Identity = create_test_identity(&mut persistence, "bob");
    let race_id: Id = create_test_race(&mut persistence, &alice);
    open_race_for_registration(&mut persistence, &alice, race_id, 100).expect("Open failed");

    register_for_race(&mut persistence, &bob, race_id).expect("Registration failed");
    let result: Result<(), ApiError> = register_for_race(&mut persistence, &bob, race_id);

    assert!(matches!(result, Err(ApiError::RuleViolation { .. })));
    let race: Race = persistence.load_race(race_id).expect("Race not saved");
    assert_eq!(race.registration_count(), 1);
}

#[test]
fn test_upload_certificate_stores_file_and_attaches_handle() {
    let mut persistence: Persistence = create_test_persistence();
    let files: MemoryFileStore = MemoryFileStore::new();
    let alice: Identity = create_test_identity(&mut persistence, "alice");
    let bob: Identity = create_test_identity(&mut persistence, "bob");
    let race_id: Id = create_test_race(&mut persistence, &alice);
    open_race_for_registration(&mut persistence, &alice, race_id, 100).expect("Open failed");
    register_for_race(&mut persistence, &bob, race_id).expect("Registration failed");

    upload_medical_certificate(&mut persistence, &files, &bob, race_id, b"certificate")
        .expect("Upload failed");

    assert_eq!(files.file_count(), 1);
    let race: Race = persistence.load_race(race_id).expect("Race not saved");
    let certificate: Id = race
        .registration(bob.user_id)
        .expect("Registration missing")
        .medical_certificate()
        .expect("Certificate not attached");
    assert!(files.contains(certificate));
}

#[test]
fn test_upload_replacement_certificate_releases_displaced_file() {
    let mut persistence: Persistence = create_test_persistence();
    let files: MemoryFileStore = MemoryFileStore::new();
    let alice: Identity = create_test_identity(&mut persistence, "alice");
    let bob: Identity = create_test_identity(&mut persistence, "bob");
    let race_id: Id = create_test_race(&mut persistence, &alice);
    open_race_for_registration(&mut persistence, &alice, race_id, 100).expect("Open failed");
    register_for_race(&mut persistence, &bob, race_id).expect("Registration failed");

    upload_medical_certificate(&mut persistence, &files, &bob, race_id, b"first")
        .expect("First upload failed");
    upload_medical_certificate(&mut persistence, &files, &bob, race_id, b"second")
        .expect("Second upload failed");

    assert_eq!(files.file_count(), 1);
}

#[test]
fn test_upload_without_registration_rolls_back_stored_file() {
    let mut persistence: Persistence = create_test_persistence();
    let files: MemoryFileStore = MemoryFileStore::new();
    let alice: Identity = create_test_identity(&mut persistence, "alice");
    let bob: Identity = create_test_identity(&mut persistence, "bob");
    let race_id: Id = create_test_race(&mut persistence, &alice);

    let result: Result<(), ApiError> =
        upload_medical_certificate(&mut persistence, &files, &bob, race_id, b"certificate");

    assert!(matches!(result, Err(ApiError::RuleViolation { .. })));
    assert_eq!(files.file_count(), 0);
}

#[test]
fn test_approve_certificate_requires_organizer() {
    let mut persistence: Persistence = create_test_persistence();
    let files: MemoryFileStore = MemoryFileStore::new();
    let alice: Identity = create_test_identity(&mut persistence, "alice");
    let bob: Identity = create_test_identity(&mut persistence, "bob");
    let race_id: Id = create_test_race(&mut persistence, &alice);
    open_race_for_registration(&mut persistence, &alice, race_id, 100).expect("Open failed");
    register_for_race(&mut persistence, &bob, race_id).expect("Registration failed");
    upload_medical_certificate(&mut persistence, &files, &bob, race_id, b"certificate")
        .expect("Upload failed");

    let result: Result<(), ApiError> =
        approve_medical_certificate(&mut persistence, &bob, race_id, bob.user_id);

    assert!(matches!(result, Err(ApiError::Unauthorized { .. })));
}

#[test]
fn test_approve_certificate_requires_attached_certificate() {
    let mut persistence: Persistence = create_test_persistence();
    let alice: Identity = create_test_identity(&mut persistence, "alice");
    let bob: Identity = create_test_identity(&mut persistence, "bob");
    let race_id: Id = create_test_race(&mut persistence, &alice);
    open_race_for_registration(&mut persistence, &alice, race_id, 100).expect("Open failed");
    register_for_race(&mut persistence, &bob, race_id).expect("Registration failed");

    let result: Result<(), ApiError> =
        approve_medical_certificate(&mut persistence, &alice, race_id, bob.user_id);

    assert!(matches!(result, Err(ApiError::RuleViolation { .. })));
}

#[test]
fn test_approve_registration_requires_approved_certificate() {
    let mut persistence: Persistence = create_test_persistence();
    let files: MemoryFileStore = MemoryFileStore::new();
    let alice: Identity = create_test_identity(&mut persistence, "alice");
    let bob: Identity = create_test_identity(&mut persistence, "bob");
    let race_id: Id = create_test_race(&mut persistence, &alice);
    open_race_for_registration(&mut persistence, &alice, race_id, 100).expect("Open failed");
    register_for_race(&mut persistence, &bob, race_id).expect("Registration failed");
    upload_medical_certificate(&mut persistence, &files, &bob, race_id, b"certificate")
        .expect("Upload failed");

    let result: Result<(), ApiError> =
        approve_race_registration(&mut persistence, &alice, race_id, bob.user_id);

    assert!(matches!(result, Err(ApiError::RuleViolation { .. })));
}

#[test]
fn test_full_registration_lifecycle() {
    let mut persistence: Persistence = create_test_persistence();
    let files: MemoryFileStore = MemoryFileStore::new();
    let alice: Identity = create_test_identity(&mut persistence, "alice");
    let bob: Identity = create_test_identity(&mut persistence, "bob");
    let race_id: Id = create_test_race(&mut persistence, &alice);

    open_race_for_registration(&mut persistence, &alice, race_id, 100).expect("Open failed");
    register_for_race(&mut persistence, &bob, race_id).expect("Registration failed");
    upload_medical_certificate(&mut persistence, &files, &bob, race_id, b"certificate")
        .expect("Upload failed");
    approve_medical_certificate(&mut persistence, &alice, race_id, bob.user_id)
        .expect("Certificate approval failed");
    approve_race_registration(&mut persistence, &alice, race_id, bob.user_id)
        .expect("Registration approval failed");

    let race: Race = persistence.load_race(race_id).expect("Race not saved");
    let status: RegistrationStatus = race
        .registration(bob.user_id)
        .expect("Registration missing")
        .status();
    assert_eq!(status, RegistrationStatus::Approved);
}

#[test]
fn test_update_race_requires_organizer() {
    let mut persistence: Persistence = create_test_persistence();
    let files: MemoryFileStore = MemoryFileStore::new();
    let alice: Identity = create_test_identity(&mut persistence, "alice");
    let bob: Identity = create_test_identity(&mut persistence, "bob");
    let race_id: Id = create_test_race(&mut persistence, &alice);
    let request: UpdateRaceRequest = UpdateRaceRequest {
        start_at: Some("2026-07-01T08:00:00Z".to_string()),
        cover_image: CoverImageUpdate::Keep,
    };

    let result: Result<(), ApiError> =
        update_race(&mut persistence, &files, &bob, race_id, &request);

    assert!(matches!(result, Err(ApiError::Unauthorized { .. })));
}

#[test]
fn test_update_race_replaces_and_clears_cover_image() {
    let mut persistence: Persistence = create_test_persistence();
    let files: MemoryFileStore = MemoryFileStore::new();
    let alice: Identity = create_test_identity(&mut persistence, "alice");
    let race_id: Id = create_test_race(&mut persistence, &alice);

    let replace: UpdateRaceRequest = UpdateRaceRequest {
        start_at: None,
        cover_image: CoverImageUpdate::Replace(b"first image".to_vec()),
    };
    update_race(&mut persistence, &files, &alice, race_id, &replace).expect("Replace failed");
    assert_eq!(files.file_count(), 1);

    let replace_again: UpdateRaceRequest = UpdateRaceRequest {
        start_at: None,
        cover_image: CoverImageUpdate::Replace(b"second image".to_vec()),
    };
    update_race(&mut persistence, &files, &alice, race_id, &replace_again)
        .expect("Second replace failed");
    assert_eq!(files.file_count(), 1);

    let clear: UpdateRaceRequest = UpdateRaceRequest {
        start_at: None,
        cover_image: CoverImageUpdate::Clear,
    };
    update_race(&mut persistence, &files, &alice, race_id, &clear).expect("Clear failed");
    assert_eq!(files.file_count(), 0);

    let race: Race = persistence.load_race(race_id).expect("Race not saved");
    assert!(race.cover_image().is_none());
}

#[test]
fn test_update_race_changes_start_time() {
    let mut persistence: Persistence = create_test_persistence();
    let files: MemoryFileStore = MemoryFileStore::new();
    let alice: Identity = create_test_identity(&mut persistence, "alice");
    let race_id: Id = create_test_race(&mut persistence, &alice);
    let request: UpdateRaceRequest = UpdateRaceRequest {
        start_at: Some("2026-07-01T08:00:00Z".to_string()),
        cover_image: CoverImageUpdate::Keep,
    };

    update_race(&mut persistence, &files, &alice, race_id, &request).expect("Update failed");

    let race: Race = persistence.load_race(race_id).expect("Race not saved");
    let expected: time::OffsetDateTime = time::macros::datetime!(2026-07-01 08:00 UTC);
    assert_eq!(race.start_at(), expected);
}
