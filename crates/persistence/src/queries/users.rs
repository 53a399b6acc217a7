// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! User and session lookups.

use crate::data_models::{SessionRow, UserRow, parse_timestamp};
use crate::diesel_schema::{sessions, users};
use crate::error::PersistenceError;
use diesel::prelude::*;
use time::OffsetDateTime;

/// Fetches a user row by identifier.
///
/// # Errors
///
/// Returns `UserNotFound` if no such user exists.
pub fn get_user(conn: &mut SqliteConnection, user_id: &str) -> Result<UserRow, PersistenceError> {
    users::table
        .find(user_id)
        .first::<UserRow>(conn)
        .optional()?
        .ok_or_else(|| PersistenceError::UserNotFound(user_id.to_string()))
}

/// Fetches a user row by username.
///
/// # Errors
///
/// Returns `UserNotFound` if no such user exists.
pub fn get_user_by_username(
    conn: &mut SqliteConnection,
    username: &str,
) -> Result<UserRow, PersistenceError> {
    users::table
        .filter(users::username.eq(username))
        .first::<UserRow>(conn)
        .optional()?
        .ok_or_else(|| PersistenceError::UserNotFound(username.to_string()))
}

/// Fetches a session row by token, enforcing expiry.
///
/// # Errors
///
/// * `SessionNotFound` if no session exists for the token
/// * `SessionExpired` if the session's expiry is in the past
pub fn get_session(
    conn: &mut SqliteConnection,
    session_token: &str,
    now: OffsetDateTime,
) -> Result<SessionRow, PersistenceError> {
    let row: SessionRow = sessions::table
        .find(session_token)
        .first::<SessionRow>(conn)
        .optional()?
        .ok_or_else(|| PersistenceError::SessionNotFound(session_token.to_string()))?;

    let expires_at: OffsetDateTime = parse_timestamp(&row.expires_at)?;
    if expires_at < now {
        return Err(PersistenceError::SessionExpired(session_token.to_string()));
    }
    Ok(row)
}
