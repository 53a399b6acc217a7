// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! State-changing operations for the persistence layer.
//!
//! - `races` — transactional persistence of the race aggregate
//! - `users` — user and session row mutations

pub mod races;
pub mod users;

pub use races::save_race;
pub use users::{create_session, create_user, delete_expired_sessions, delete_session};
