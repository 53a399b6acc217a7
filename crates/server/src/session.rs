// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Session extraction for the server.
//!
//! This module provides Axum extractors for resolving the requester from an
//! `Authorization: Bearer <token>` header before any handler logic runs.

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Response},
};
use tracing::{debug, warn};
use velo_api::{AuthenticationService, Identity};

use crate::AppState;

/// Extractor for authenticated requesters.
///
/// Validates the session token from the Authorization header and returns
/// the resolved [`Identity`]. Handlers taking this extractor reject
/// unauthenticated requests with HTTP 401 before any race is loaded.
pub struct SessionIdentity(pub Identity);

/// Extractor for optionally-authenticated viewers.
///
/// A missing Authorization header yields `None`; a present but invalid
/// token is still rejected with HTTP 401 rather than silently downgraded
/// to an anonymous viewer.
pub struct MaybeIdentity(pub Option<Identity>);

impl FromRequestParts<AppState> for SessionIdentity {
    type Rejection = SessionError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token: String = bearer_token(parts)?.ok_or_else(|| {
            debug!("Missing Authorization header");
            SessionError::MissingAuthorizationHeader
        })?;
        let identity: Identity = validate(state, &token).await?;
        Ok(Self(identity))
    }
}

impl FromRequestParts<AppState> for MaybeIdentity {
    type Rejection = SessionError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Some(token) = bearer_token(parts)? else {
            return Ok(Self(None));
        };
        let identity: Identity = validate(state, &token).await?;
        Ok(Self(Some(identity)))
    }
}

/// Parses the Bearer token out of the Authorization header, if present.
fn bearer_token(parts: &Parts) -> Result<Option<String>, SessionError> {
    let Some(header) = parts.headers.get("Authorization") else {
        return Ok(None);
    };
    let header: &str = header.to_str().map_err(|_| {
        warn!("Invalid Authorization header encoding");
        SessionError::InvalidAuthorizationHeader
    })?;
    let token: &str = header.strip_prefix("Bearer ").ok_or_else(|| {
        warn!("Authorization header does not start with 'Bearer '");
        SessionError::InvalidAuthorizationHeader
    })?;
    Ok(Some(token.to_string()))
}

async fn validate(state: &AppState, token: &str) -> Result<Identity, SessionError> {
    let mut persistence = state.persistence.lock().await;
    let identity: Identity = AuthenticationService::validate_session(&mut persistence, token)
        .map_err(|err| {
            warn!(error = %err, "Session validation failed");
            SessionError::InvalidSession(err.to_string())
        })?;
    drop(persistence);

    debug!(user_id = %identity.user_id, "Session validated");
    Ok(identity)
}

/// Session extraction errors, converted to HTTP 401 responses.
#[derive(Debug)]
pub enum SessionError {
    /// Authorization header is missing.
    MissingAuthorizationHeader,
    /// Authorization header format is invalid.
    InvalidAuthorizationHeader,
    /// Session validation failed.
    InvalidSession(String),
}

impl IntoResponse for SessionError {
    fn into_response(self) -> Response {
        let message: String = match self {
            Self::MissingAuthorizationHeader => String::from("Missing Authorization header"),
            Self::InvalidAuthorizationHeader => {
                String::from("Invalid Authorization header format. Expected: 'Bearer <token>'")
            }
            Self::InvalidSession(reason) => format!("Session validation failed: {reason}"),
        };
        (StatusCode::UNAUTHORIZED, message).into_response()
    }
}
