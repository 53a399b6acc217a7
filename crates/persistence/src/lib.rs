// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Persistence layer for Velo.
//!
//! This crate provides SQLite persistence for races, organizer membership,
//! registrations, users, and sessions. It is built on Diesel with embedded
//! migrations.
//!
//! The relational store is the single source of truth. The command side
//! loads a race aggregate fresh per request through [`Persistence::load_race`]
//! and persists it atomically through [`Persistence::save_race`]; there is no
//! version column or compare-and-swap, so concurrent writers are last-write-
//! wins. The query side reads denormalized rows without constructing an
//! aggregate.
//!
//! ## Testing
//!
//! In-memory databases (`new_in_memory`) use an atomic counter for unique
//! shared-memory names, giving each test a deterministic isolated database
//! with no time-based collisions.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(clippy::multiple_crate_versions)]

use diesel::SqliteConnection;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use time::OffsetDateTime;
use velo_domain::{Id, Race};

mod data_models;
mod diesel_schema;
mod error;
mod mutations;
mod queries;
mod sqlite;

#[cfg(test)]
mod tests;

pub use data_models::{RaceSummary, RegistrationListRow, SessionRow, UserRow};
pub use error::PersistenceError;

/// Atomic counter for generating unique in-memory database names.
static DB_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Persistence adapter over a single SQLite connection.
pub struct Persistence {
    conn: SqliteConnection,
}

impl Persistence {
    /// Creates a new persistence adapter with an in-memory SQLite database.
    ///
    /// Each call receives a unique database instance via an atomic counter,
    /// ensuring deterministic test isolation.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be initialized.
    pub fn new_in_memory() -> Result<Self, PersistenceError> {
        let db_id: u64 = DB_COUNTER.fetch_add(1, Ordering::SeqCst);
        let shared_memory_url: String = format!("file:velo_memdb_{db_id}?mode=memory&cache=shared");

        let mut conn: SqliteConnection = sqlite::initialize_database(&shared_memory_url)?;
        sqlite::verify_foreign_key_enforcement(&mut conn)?;

        Ok(Self { conn })
    }

    /// Creates a new persistence adapter with a file-based SQLite database.
    ///
    /// # Arguments
    ///
    /// * `path` - The path to the SQLite database file
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or initialized.
    pub fn new_with_file<P: AsRef<Path>>(path: P) -> Result<Self, PersistenceError> {
        let path_str: &str = path.as_ref().to_str().ok_or_else(|| {
            PersistenceError::InitializationError("Invalid database path".to_string())
        })?;

        let mut conn: SqliteConnection = sqlite::initialize_database(path_str)?;
        sqlite::enable_wal_mode(&mut conn)?;
        sqlite::verify_foreign_key_enforcement(&mut conn)?;

        Ok(Self { conn })
    }

    // ========================================================================
    // Race aggregate (command side)
    // ========================================================================

    /// Loads a race aggregate by identifier.
    ///
    /// # Errors
    ///
    /// Returns `RaceNotFound` if the race does not exist, or an error if a
    /// stored row cannot be decoded.
    pub fn load_race(&mut self, race_id: Id) -> Result<Race, PersistenceError> {
        queries::load_race(&mut self.conn, race_id)
    }

    /// Persists a race aggregate atomically.
    ///
    /// Either the race row, the organizer rows, and the registration rows
    /// all commit, or none do.
    ///
    /// # Errors
    ///
    /// Returns an error if the transaction fails.
    pub fn save_race(&mut self, race: &Race) -> Result<(), PersistenceError> {
        mutations::save_race(&mut self.conn, race)
    }

    // ========================================================================
    // Read models (query side)
    // ========================================================================

    /// Lists denormalized summaries of every race, ordered by start time.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_race_summaries(&mut self) -> Result<Vec<RaceSummary>, PersistenceError> {
        queries::list_race_summaries(&mut self.conn)
    }

    /// Returns the denormalized summary of one race.
    ///
    /// # Errors
    ///
    /// Returns `RaceNotFound` if the race does not exist.
    pub fn get_race_summary(&mut self, race_id: &str) -> Result<RaceSummary, PersistenceError> {
        queries::get_race_summary(&mut self.conn, race_id)
    }

    /// Lists the registration rows of a race with rider usernames, ordered
    /// by registration time.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_registration_rows(
        &mut self,
        race_id: &str,
    ) -> Result<Vec<RegistrationListRow>, PersistenceError> {
        queries::list_registration_rows(&mut self.conn, race_id)
    }

    /// Returns the organizer user ids of a race, as stored text.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn organizer_ids(&mut self, race_id: &str) -> Result<Vec<String>, PersistenceError> {
        queries::organizer_ids(&mut self.conn, race_id)
    }

    // ========================================================================
    // Users & sessions
    // ========================================================================

    /// Inserts a new user row.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateRecord` if the username is already taken.
    pub fn create_user(&mut self, user_id: Id, username: &str) -> Result<(), PersistenceError> {
        mutations::create_user(&mut self.conn, user_id, username)
    }

    /// Fetches a user row by identifier.
    ///
    /// # Errors
    ///
    /// Returns `UserNotFound` if no such user exists.
    pub fn get_user(&mut self, user_id: &str) -> Result<UserRow, PersistenceError> {
        queries::get_user(&mut self.conn, user_id)
    }

    /// Fetches a user row by username.
    ///
    /// # Errors
    ///
    /// Returns `UserNotFound` if no such user exists.
    pub fn get_user_by_username(&mut self, username: &str) -> Result<UserRow, PersistenceError> {
        queries::get_user_by_username(&mut self.conn, username)
    }

    /// Inserts a new session row.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub fn create_session(
        &mut self,
        session_token: &str,
        user_id: Id,
        created_at: OffsetDateTime,
        expires_at: OffsetDateTime,
    ) -> Result<(), PersistenceError> {
        mutations::create_session(&mut self.conn, session_token, user_id, created_at, expires_at)
    }

    /// Fetches a session row by token, enforcing expiry.
    ///
    /// # Errors
    ///
    /// * `SessionNotFound` if no session exists for the token
    /// * `SessionExpired` if the session has expired
    pub fn get_session(
        &mut self,
        session_token: &str,
        now: OffsetDateTime,
    ) -> Result<SessionRow, PersistenceError> {
        queries::get_session(&mut self.conn, session_token, now)
    }

    /// Deletes a session row by token.
    ///
    /// # Errors
    ///
    /// Returns an error if the delete fails.
    pub fn delete_session(&mut self, session_token: &str) -> Result<(), PersistenceError> {
        mutations::delete_session(&mut self.conn, session_token)
    }

    /// Deletes all sessions that expired before `now`, returning the count.
    ///
    /// # Errors
    ///
    /// Returns an error if the delete fails.
    pub fn delete_expired_sessions(
        &mut self,
        now: OffsetDateTime,
    ) -> Result<usize, PersistenceError> {
        mutations::delete_expired_sessions(&mut self.conn, now)
    }
}
