// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Error types for the API layer.

use tracing::error;
use velo_domain::DomainError;
use velo_persistence::PersistenceError;

/// Authentication errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Authentication failed.
    AuthenticationFailed {
        /// The reason authentication failed.
        reason: String,
    },
    /// The supplied username is not acceptable.
    InvalidUsername {
        /// The reason the username was rejected.
        reason: String,
    },
    /// The username is already taken.
    UsernameTaken {
        /// The rejected username.
        username: String,
    },
    /// An internal error occurred.
    Internal {
        /// A description of the internal error.
        message: String,
    },
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AuthenticationFailed { reason } => {
                write!(f, "Authentication failed: {reason}")
            }
            Self::InvalidUsername { reason } => write!(f, "Invalid username: {reason}"),
            Self::UsernameTaken { username } => {
                write!(f, "Username '{username}' is already taken")
            }
            Self::Internal { message } => write!(f, "Internal error: {message}"),
        }
    }
}

impl std::error::Error for AuthError {}

/// API-level errors.
///
/// These are distinct from domain and persistence errors and represent the
/// API contract: validation failures, rule violations, authorization
/// failures, missing resources, and opaque internal errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// Authentication failed.
    AuthenticationFailed {
        /// The reason authentication failed.
        reason: String,
    },
    /// Authorization failed - the requester does not have permission.
    Unauthorized {
        /// The action that was attempted.
        action: String,
    },
    /// Invalid input was provided.
    InvalidInput {
        /// The field that was invalid.
        field: String,
        /// A human-readable description of the error.
        message: String,
    },
    /// A business rule was violated by the requested state transition.
    RuleViolation {
        /// A human-readable description of the violation.
        message: String,
    },
    /// A requested resource was not found.
    ResourceNotFound {
        /// The type of resource that was not found.
        resource_type: String,
        /// A human-readable description of what was not found.
        message: String,
    },
    /// An internal error occurred. No business detail is carried.
    Internal {
        /// A description of the internal error.
        message: String,
    },
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AuthenticationFailed { reason } => {
                write!(f, "Authentication failed: {reason}")
            }
            Self::Unauthorized { action } => {
                write!(f, "Unauthorized: '{action}' requires organizer access")
            }
            Self::InvalidInput { field, message } => {
                write!(f, "Invalid input for field '{field}': {message}")
            }
            Self::RuleViolation { message } => write!(f, "Rule violation: {message}"),
            Self::ResourceNotFound {
                resource_type,
                message,
            } => {
                write!(f, "{resource_type} not found: {message}")
            }
            Self::Internal { message } => write!(f, "Internal error: {message}"),
        }
    }
}

impl std::error::Error for ApiError {}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::AuthenticationFailed { reason } => Self::AuthenticationFailed { reason },
            AuthError::InvalidUsername { reason } => Self::InvalidInput {
                field: "username".to_string(),
                message: reason,
            },
            AuthError::UsernameTaken { username } => Self::RuleViolation {
                message: format!("Username '{username}' is already taken"),
            },
            AuthError::Internal { message } => Self::Internal { message },
        }
    }
}

/// Translates a domain error into its API error class.
///
/// Construction and capacity validation are caller-correctable input errors;
/// every other domain error is a business-rule conflict with the current
/// aggregate state.
pub(crate) fn translate_domain_error(err: DomainError) -> ApiError {
    match err {
        DomainError::NameTooShort { .. } => ApiError::InvalidInput {
            field: "name".to_string(),
            message: err.to_string(),
        },
        DomainError::InvalidCapacity => ApiError::InvalidInput {
            field: "maximum_participants".to_string(),
            message: err.to_string(),
        },
        _ => ApiError::RuleViolation {
            message: err.to_string(),
        },
    }
}

/// Translates a persistence error into its API error class.
///
/// A missing race surfaces as not-found; everything else is an
/// infrastructure failure, logged here and reported without business detail.
pub(crate) fn translate_persistence_error(err: &PersistenceError) -> ApiError {
    match err {
        PersistenceError::RaceNotFound(id) => ApiError::ResourceNotFound {
            resource_type: "Race".to_string(),
            message: id.clone(),
        },
        _ => {
            error!(error = %err, "Persistence error");
            ApiError::Internal {
                message: "storage failure".to_string(),
            }
        }
    }
}
