// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Session-based authentication.
//!
//! Credential verification is deliberately out of scope: the service trusts
//! the username it is handed and issues an opaque session token for it. The
//! rest of the system only ever sees a resolved [`Identity`], passed
//! explicitly to every command and query — never ambient request state.

use crate::error::AuthError;
use std::str::FromStr;
use time::{Duration, OffsetDateTime};
use tracing::info;
use velo_domain::Id;
use velo_persistence::{Persistence, PersistenceError, SessionRow, UserRow};

/// How long an issued session remains valid.
pub const SESSION_LIFETIME: Duration = Duration::hours(24);

const MAX_USERNAME_LENGTH: usize = 32;

/// The resolved requester of a command or query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    /// The user's unique identifier.
    pub user_id: Id,
    /// The user's display name.
    pub username: String,
}

/// Session issuance and validation over the persistence layer.
pub struct AuthenticationService;

impl AuthenticationService {
    /// Creates a new user account.
    ///
    /// # Errors
    ///
    /// * `AuthError::InvalidUsername` for an empty or over-long username
    /// * `AuthError::UsernameTaken` if the username already exists
    pub fn sign_up(persistence: &mut Persistence, username: &str) -> Result<Identity, AuthError> {
        let username: &str = username.trim();
        if username.is_empty() {
            return Err(AuthError::InvalidUsername {
                reason: "username must not be empty".to_string(),
            });
        }
        if username.chars().count() > MAX_USERNAME_LENGTH {
            return Err(AuthError::InvalidUsername {
                reason: format!("username must be at most {MAX_USERNAME_LENGTH} characters"),
            });
        }

        let user_id: Id = Id::new();
        match persistence.create_user(user_id, username) {
            Ok(()) => {}
            Err(PersistenceError::DuplicateRecord(_)) => {
                return Err(AuthError::UsernameTaken {
                    username: username.to_string(),
                });
            }
            Err(err) => return Err(Self::map_persistence_error(err)),
        }

        info!(user_id = %user_id, username, "User signed up");
        Ok(Identity {
            user_id,
            username: username.to_string(),
        })
    }

    /// Logs a user in and issues a session token.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::AuthenticationFailed` if the username is unknown.
    pub fn log_in(
        persistence: &mut Persistence,
        username: &str,
    ) -> Result<(String, Identity), AuthError> {
        let user: UserRow = match persistence.get_user_by_username(username.trim()) {
            Ok(user) => user,
            Err(PersistenceError::UserNotFound(_)) => {
                return Err(AuthError::AuthenticationFailed {
                    reason: "Unknown username".to_string(),
                });
            }
            Err(err) => return Err(Self::map_persistence_error(err)),
        };

        let identity: Identity = Self::identity_from_row(&user)?;
        let session_token: String = Self::generate_session_token();
        let now: OffsetDateTime = OffsetDateTime::now_utc();
        persistence
            .create_session(&session_token, identity.user_id, now, now + SESSION_LIFETIME)
            .map_err(Self::map_persistence_error)?;

        info!(user_id = %identity.user_id, "Session issued");
        Ok((session_token, identity))
    }

    /// Validates a session token and resolves the requester's identity.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::AuthenticationFailed` for an unknown or expired
    /// token.
    pub fn validate_session(
        persistence: &mut Persistence,
        session_token: &str,
    ) -> Result<Identity, AuthError> {
        let session: SessionRow = persistence
            .get_session(session_token, OffsetDateTime::now_utc())
            .map_err(Self::map_persistence_error)?;
        let user: UserRow = persistence
            .get_user(&session.user_id)
            .map_err(Self::map_persistence_error)?;
        Self::identity_from_row(&user)
    }

    /// Ends a session. Unknown tokens are a no-op.
    ///
    /// # Errors
    ///
    /// Returns an error if the session row cannot be deleted.
    pub fn log_out(persistence: &mut Persistence, session_token: &str) -> Result<(), AuthError> {
        persistence
            .delete_session(session_token)
            .map_err(Self::map_persistence_error)
    }

    fn identity_from_row(user: &UserRow) -> Result<Identity, AuthError> {
        let user_id: Id = Id::from_str(&user.user_id).map_err(|err| AuthError::Internal {
            message: format!("stored user id: {err}"),
        })?;
        Ok(Identity {
            user_id,
            username: user.username.clone(),
        })
    }

    /// Generates an opaque session token.
    fn generate_session_token() -> String {
        let nanos: i128 = OffsetDateTime::now_utc().unix_timestamp_nanos();
        format!("session_{nanos}_{}", rand::random::<u64>())
    }

    /// Maps persistence errors to authentication errors.
    fn map_persistence_error(err: PersistenceError) -> AuthError {
        match err {
            PersistenceError::SessionExpired(_) | PersistenceError::SessionNotFound(_) => {
                AuthError::AuthenticationFailed {
                    reason: "Invalid or expired session token".to_string(),
                }
            }
            PersistenceError::UserNotFound(msg) => AuthError::AuthenticationFailed {
                reason: format!("Unknown user: {msg}"),
            },
            _ => AuthError::Internal {
                message: format!("Database error: {err}"),
            },
        }
    }
}
