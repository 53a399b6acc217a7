// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Read-side operations for the persistence layer.
//!
//! - `races` — aggregate reconstruction and denormalized read-model rows
//! - `users` — user and session lookups

pub mod races;
pub mod users;

pub use races::{
    get_race_summary, list_race_summaries, list_registration_rows, load_race, organizer_ids,
};
pub use users::{get_session, get_user, get_user_by_username};
