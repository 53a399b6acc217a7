// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use super::{create_test_now, create_test_persistence, create_test_user};
use crate::{Persistence, PersistenceError, SessionRow, UserRow};
use time::{Duration, OffsetDateTime};
use velo_domain::Id;

#[test]
fn test_create_user_rejects_duplicate_username() {
    let mut persistence: Persistence = create_test_persistence();
    create_test_user(&mut persistence, "alice");

    let result: Result<(), PersistenceError> = persistence.create_user(Id::new(), "alice");
    assert!(matches!(result, Err(PersistenceError::DuplicateRecord(_))));
}

#[test]
fn test_get_user_by_username_round_trips() {
    let mut persistence: Persistence = create_test_persistence();
    let alice: Id = create_test_user(&mut persistence, "alice");

    let row: UserRow = persistence
        .get_user_by_username("alice")
        .expect("User exists");
    assert_eq!(row.user_id, alice.to_string());
    assert_eq!(row.username, "alice");

    let by_id: UserRow = persistence
        .get_user(&alice.to_string())
        .expect("User exists");
    assert_eq!(by_id, row);
}

#[test]
fn test_get_unknown_user_reports_not_found() {
    let mut persistence: Persistence = create_test_persistence();
    let result: Result<UserRow, PersistenceError> = persistence.get_user_by_username("nobody");
    assert_eq!(
        result,
        Err(PersistenceError::UserNotFound("nobody".to_string()))
    );
}

#[test]
fn test_valid_session_resolves_to_user() {
    let mut persistence: Persistence = create_test_persistence();
    let alice: Id = create_test_user(&mut persistence, "alice");
    let now: OffsetDateTime = create_test_now();

    persistence
        .create_session("token-1", alice, now, now + Duration::hours(24))
        .expect("Session created");

    let row: SessionRow = persistence
        .get_session("token-1", now + Duration::hours(1))
        .expect("Session valid");
    assert_eq!(row.user_id, alice.to_string());
}

#[test]
fn test_expired_session_is_rejected() {
    let mut persistence: Persistence = create_test_persistence();
    let alice: Id = create_test_user(&mut persistence, "alice");
    let now: OffsetDateTime = create_test_now();

    persistence
        .create_session("token-1", alice, now, now + Duration::hours(1))
        .expect("Session created");

    let result: Result<SessionRow, PersistenceError> =
        persistence.get_session("token-1", now + Duration::hours(2));
    assert_eq!(
        result,
        Err(PersistenceError::SessionExpired("token-1".to_string()))
    );
}

#[test]
fn test_unknown_session_is_rejected() {
    let mut persistence: Persistence = create_test_persistence();
    let result: Result<SessionRow, PersistenceError> =
        persistence.get_session("missing", create_test_now());
    assert_eq!(
        result,
        Err(PersistenceError::SessionNotFound("missing".to_string()))
    );
}

#[test]
fn test_deleted_session_no_longer_resolves() {
    let mut persistence: Persistence = create_test_persistence();
    let alice: Id = create_test_user(&mut persistence, "alice");
    let now: OffsetDateTime = create_test_now();

    persistence
        .create_session("token-1", alice, now, now + Duration::hours(24))
        .expect("Session created");
    persistence
        .delete_session("token-1")
        .expect("Delete succeeds");

    let result: Result<SessionRow, PersistenceError> = persistence.get_session("token-1", now);
    assert!(matches!(result, Err(PersistenceError::SessionNotFound(_))));
}

#[test]
fn test_delete_expired_sessions_removes_only_stale_rows() {
    let mut persistence: Persistence = create_test_persistence();
    let alice: Id = create_test_user(&mut persistence, "alice");
    let now: OffsetDateTime = create_test_now();

    persistence
        .create_session("stale", alice, now - Duration::hours(48), now - Duration::hours(24))
        .expect("Session created");
    persistence
        .create_session("fresh", alice, now, now + Duration::hours(24))
        .expect("Session created");

    let deleted: usize = persistence
        .delete_expired_sessions(now)
        .expect("Cleanup succeeds");
    assert_eq!(deleted, 1);
    assert!(persistence.get_session("fresh", now).is_ok());
    assert!(matches!(
        persistence.get_session("stale", now),
        Err(PersistenceError::SessionNotFound(_))
    ));
}
