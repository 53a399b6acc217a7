// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! User and session row mutations.

use crate::data_models::{SessionRow, UserRow, format_timestamp};
use crate::diesel_schema::{sessions, users};
use crate::error::PersistenceError;
use diesel::prelude::*;
use time::OffsetDateTime;
use tracing::debug;
use velo_domain::Id;

/// Inserts a new user row.
///
/// # Errors
///
/// Returns `DuplicateRecord` if the username is already taken.
pub fn create_user(
    conn: &mut SqliteConnection,
    user_id: Id,
    username: &str,
) -> Result<(), PersistenceError> {
    let row: UserRow = UserRow {
        user_id: user_id.to_string(),
        username: username.to_string(),
    };
    diesel::insert_into(users::table)
        .values(&row)
        .execute(conn)?;
    debug!(user_id = %user_id, username, "Created user");
    Ok(())
}

/// Inserts a new session row.
///
/// # Errors
///
/// Returns an error if the insert fails.
pub fn create_session(
    conn: &mut SqliteConnection,
    session_token: &str,
    user_id: Id,
    created_at: OffsetDateTime,
    expires_at: OffsetDateTime,
) -> Result<(), PersistenceError> {
    let row: SessionRow = SessionRow {
        session_token: session_token.to_string(),
        user_id: user_id.to_string(),
        created_at: format_timestamp(created_at)?,
        expires_at: format_timestamp(expires_at)?,
    };
    diesel::insert_into(sessions::table)
        .values(&row)
        .execute(conn)?;
    debug!(user_id = %user_id, "Created session");
    Ok(())
}

/// Deletes a session row by token. Deleting an unknown token is a no-op.
///
/// # Errors
///
/// Returns an error if the delete fails.
pub fn delete_session(
    conn: &mut SqliteConnection,
    session_token: &str,
) -> Result<(), PersistenceError> {
    diesel::delete(sessions::table.filter(sessions::session_token.eq(session_token)))
        .execute(conn)?;
    Ok(())
}

/// Deletes all sessions that expired before `now`.
///
/// Returns the number of deleted rows.
///
/// # Errors
///
/// Returns an error if the delete fails.
pub fn delete_expired_sessions(
    conn: &mut SqliteConnection,
    now: OffsetDateTime,
) -> Result<usize, PersistenceError> {
    // RFC 3339 UTC timestamps compare correctly as text.
    let cutoff: String = format_timestamp(now)?;
    let deleted: usize =
        diesel::delete(sessions::table.filter(sessions::expires_at.lt(&cutoff))).execute(conn)?;
    if deleted > 0 {
        debug!(deleted, "Deleted expired sessions");
    }
    Ok(deleted)
}
