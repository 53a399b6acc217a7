// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Row structs bridging Diesel tables and domain types.
//!
//! Identifiers and timestamps are stored as text (hyphenated UUIDs and
//! RFC 3339 strings); conversion to domain types happens at the query
//! boundary and reports `InvalidStoredValue` on bad rows.

use crate::diesel_schema::{race_organizers, race_registrations, races, sessions, users};
use crate::error::PersistenceError;
use diesel::prelude::*;
use std::str::FromStr;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use velo_domain::{Id, RaceRegistration, RegistrationStatus};

/// Formats a timestamp for storage.
pub(crate) fn format_timestamp(value: OffsetDateTime) -> Result<String, PersistenceError> {
    value
        .format(&Rfc3339)
        .map_err(|err| PersistenceError::InvalidStoredValue(format!("timestamp: {err}")))
}

/// Parses a stored timestamp.
pub(crate) fn parse_timestamp(value: &str) -> Result<OffsetDateTime, PersistenceError> {
    OffsetDateTime::parse(value, &Rfc3339)
        .map_err(|err| PersistenceError::InvalidStoredValue(format!("timestamp '{value}': {err}")))
}

/// One row of the `races` table.
#[derive(Debug, Clone, Queryable, Insertable)]
#[diesel(table_name = races)]
pub struct RaceRow {
    pub race_id: String,
    pub name: String,
    pub start_at: String,
    pub is_open_for_registration: bool,
    pub maximum_participants: i64,
    pub cover_image_id: Option<String>,
}

/// One row of the `race_organizers` membership table.
#[derive(Debug, Clone, Queryable, Insertable)]
#[diesel(table_name = race_organizers)]
pub struct OrganizerRow {
    pub race_id: String,
    pub user_id: String,
}

/// One row of the `race_registrations` table.
#[derive(Debug, Clone, Queryable, Insertable)]
#[diesel(table_name = race_registrations)]
pub struct RegistrationRow {
    pub race_id: String,
    pub user_id: String,
    pub registered_at: String,
    pub status: String,
    pub medical_certificate: Option<String>,
    pub is_medical_certificate_approved: bool,
}

impl RegistrationRow {
    /// Builds a storage row from a domain registration.
    pub(crate) fn from_domain(
        race_id: Id,
        registration: &RaceRegistration,
    ) -> Result<Self, PersistenceError> {
        Ok(Self {
            race_id: race_id.to_string(),
            user_id: registration.user_id().to_string(),
            registered_at: format_timestamp(registration.registered_at())?,
            status: registration.status().as_str().to_string(),
            medical_certificate: registration.medical_certificate().map(|id| id.to_string()),
            is_medical_certificate_approved: registration.is_medical_certificate_approved(),
        })
    }

    /// Rehydrates a domain registration from this row.
    pub(crate) fn into_domain(self) -> Result<RaceRegistration, PersistenceError> {
        let user_id: Id = Id::from_str(&self.user_id)?;
        let registered_at: OffsetDateTime = parse_timestamp(&self.registered_at)?;
        let status: RegistrationStatus = RegistrationStatus::from_str(&self.status)?;
        let medical_certificate: Option<Id> = self
            .medical_certificate
            .as_deref()
            .map(Id::from_str)
            .transpose()?;
        Ok(RaceRegistration::from_stored(
            user_id,
            registered_at,
            status,
            medical_certificate,
            self.is_medical_certificate_approved,
        ))
    }
}

/// One row of the `users` table.
#[derive(Debug, Clone, PartialEq, Eq, Queryable, Insertable)]
#[diesel(table_name = users)]
pub struct UserRow {
    pub user_id: String,
    pub username: String,
}

/// One row of the `sessions` table.
#[derive(Debug, Clone, PartialEq, Eq, Queryable, Insertable)]
#[diesel(table_name = sessions)]
pub struct SessionRow {
    pub session_token: String,
    pub user_id: String,
    pub created_at: String,
    pub expires_at: String,
}

/// Denormalized per-race summary for the read side.
///
/// Carried over to the query layer as-is; permission flags are computed on
/// top of these fields by the API crate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RaceSummary {
    pub race_id: String,
    pub name: String,
    pub start_at: String,
    pub is_open_for_registration: bool,
    pub maximum_participants: i64,
    pub cover_image_id: Option<String>,
    /// Comma-joined organizer usernames, in username order.
    pub organizers: String,
    pub registration_count: i64,
    /// Identifiers of every registered rider, used to project per-viewer
    /// flags without loading the aggregate.
    pub registered_user_ids: Vec<String>,
}

/// Denormalized per-registration row for the read side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationListRow {
    pub user_id: String,
    pub username: String,
    pub registered_at: String,
    pub status: String,
    pub has_medical_certificate: bool,
    pub is_medical_certificate_approved: bool,
}
