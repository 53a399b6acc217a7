// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Test module for the persistence crate.

#![allow(clippy::expect_used, clippy::unwrap_used)]

mod read_model_tests;
mod session_tests;

use crate::Persistence;
use time::OffsetDateTime;
use time::macros::datetime;
use velo_domain::{Id, Race};

pub fn create_test_persistence() -> Persistence {
    Persistence::new_in_memory().expect("Failed to create in-memory persistence")
}

pub fn create_test_start_at() -> OffsetDateTime {
    datetime!(2026-06-14 09:00 UTC)
}

pub fn create_test_now() -> OffsetDateTime {
    datetime!(2026-05-01 12:00 UTC)
}

/// Creates a user row and returns its id. Organizer and registration rows
/// have foreign keys into `users`, so tests must create users first.
pub fn create_test_user(persistence: &mut Persistence, username: &str) -> Id {
    let user_id: Id = Id::new();
    persistence
        .create_user(user_id, username)
        .expect("Failed to create user");
    user_id
}

pub fn create_test_race() -> Race {
    Race::new("Tour de Test", create_test_start_at()).expect("Valid race name")
}
