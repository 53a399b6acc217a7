// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Test module for the domain crate.

#![allow(clippy::expect_used, clippy::unwrap_used)]

mod registration_tests;

use crate::{Id, Race};
use time::OffsetDateTime;
use time::macros::datetime;

/// A fixed start time for deterministic tests.
pub fn create_test_start_at() -> OffsetDateTime {
    datetime!(2026-06-14 09:00 UTC)
}

/// A fixed registration time for deterministic tests.
pub fn create_test_now() -> OffsetDateTime {
    datetime!(2026-05-01 12:00 UTC)
}

pub fn create_test_race() -> Race {
    Race::new("Tour de Test", create_test_start_at()).expect("Valid race name")
}

/// Creates a race that is open for registration with the given capacity.
pub fn create_open_race(organizer: Id, maximum_participants: u32) -> Race {
    let mut race: Race = create_test_race();
    race.add_organizer(organizer);
    race.open_for_registration(maximum_participants)
        .expect("Valid capacity");
    race
}
