// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use super::{create_test_now, create_test_persistence, create_test_race, create_test_user};
use crate::{Persistence, PersistenceError, RaceSummary, RegistrationListRow};
use time::Duration;
use velo_domain::{Id, Race, RegistrationStatus};

#[test]
fn test_race_summary_carries_denormalized_fields() {
    let mut persistence: Persistence = create_test_persistence();
    let alice: Id = create_test_user(&mut persistence, "alice");
    let bob: Id = create_test_user(&mut persistence, "bob");

    let mut race: Race = create_test_race();
    race.add_organizer(alice);
    race.open_for_registration(7).expect("Valid capacity");
    race.register(bob, create_test_now()).expect("Registered");
    persistence.save_race(&race).expect("Save succeeds");

    let summary: RaceSummary = persistence
        .get_race_summary(&race.id().to_string())
        .expect("Summary exists");
    assert_eq!(summary.name, "Tour de Test");
    assert_eq!(summary.organizers, "alice");
    assert_eq!(summary.registration_count, 1);
    assert_eq!(summary.maximum_participants, 7);
    assert!(summary.is_open_for_registration);
    assert_eq!(summary.registered_user_ids, vec![bob.to_string()]);
}

#[test]
fn test_race_summary_joins_multiple_organizer_usernames() {
    let mut persistence: Persistence = create_test_persistence();
    let alice: Id = create_test_user(&mut persistence, "alice");
    let carol: Id = create_test_user(&mut persistence, "carol");

    let mut race: Race = create_test_race();
    race.add_organizer(carol);
    race.add_organizer(alice);
    persistence.save_race(&race).expect("Save succeeds");

    let summary: RaceSummary = persistence
        .get_race_summary(&race.id().to_string())
        .expect("Summary exists");
    assert_eq!(summary.organizers, "alice, carol");
}

#[test]
fn test_get_race_summary_reports_not_found() {
    let mut persistence: Persistence = create_test_persistence();
    let missing: String = Id::new().to_string();

    let result: Result<RaceSummary, PersistenceError> = persistence.get_race_summary(&missing);
    assert_eq!(result, Err(PersistenceError::RaceNotFound(missing)));
}

#[test]
fn test_list_race_summaries_orders_by_start_time() {
    let mut persistence: Persistence = create_test_persistence();

    let later: Race = Race::new("Later Race", create_test_now() + Duration::days(30))
        .expect("Valid name");
    let earlier: Race =
        Race::new("Earlier Race", create_test_now() + Duration::days(2)).expect("Valid name");
    persistence.save_race(&later).expect("Save succeeds");
    persistence.save_race(&earlier).expect("Save succeeds");

    let summaries: Vec<RaceSummary> = persistence.list_race_summaries().expect("List succeeds");
    let names: Vec<&str> = summaries.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["Earlier Race", "Later Race"]);
}

#[test]
fn test_registration_rows_ordered_by_registration_time() {
    let mut persistence: Persistence = create_test_persistence();
    let bob: Id = create_test_user(&mut persistence, "bob");
    let carol: Id = create_test_user(&mut persistence, "carol");

    let mut race: Race = create_test_race();
    race.open_for_registration(5).expect("Valid capacity");
    race.register(carol, create_test_now()).expect("Registered");
    race.register(bob, create_test_now() + Duration::hours(1))
        .expect("Registered");
    race.upload_medical_certificate(carol, Id::new())
        .expect("Upload");
    persistence.save_race(&race).expect("Save succeeds");

    let rows: Vec<RegistrationListRow> = persistence
        .list_registration_rows(&race.id().to_string())
        .expect("List succeeds");
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].username, "carol");
    assert_eq!(rows[1].username, "bob");
    assert!(rows[0].has_medical_certificate);
    assert!(!rows[0].is_medical_certificate_approved);
    assert!(!rows[1].has_medical_certificate);
    assert_eq!(rows[0].status, RegistrationStatus::Registered.as_str());
    assert_eq!(rows[0].user_id, carol.to_string());
}

#[test]
fn test_organizer_ids_match_saved_membership() {
    let mut persistence: Persistence = create_test_persistence();
    let alice: Id = create_test_user(&mut persistence, "alice");

    let mut race: Race = create_test_race();
    race.add_organizer(alice);
    persistence.save_race(&race).expect("Save succeeds");

    let ids: Vec<String> = persistence
        .organizer_ids(&race.id().to_string())
        .expect("Query succeeds");
    assert_eq!(ids, vec![alice.to_string()]);
}
