// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Race aggregate reconstruction and denormalized read-model rows.
//!
//! `load_race` rebuilds the full aggregate for the command side. The other
//! functions feed the query side with plain rows; they never construct an
//! aggregate, and permission flags are computed on top of them by the API
//! layer.

use crate::data_models::{RaceRow, RaceSummary, RegistrationListRow, RegistrationRow};
use crate::diesel_schema::{race_organizers, race_registrations, races, users};
use crate::error::PersistenceError;
use diesel::prelude::*;
use std::collections::HashMap;
use std::str::FromStr;
use velo_domain::{Id, Race, RaceRegistration};

/// Loads a race aggregate by identifier.
///
/// The race row, the organizer membership rows, and the registration rows
/// are read with separate statements on the same connection and rehydrated
/// through `Race::from_stored`.
///
/// # Errors
///
/// * `RaceNotFound` if no race row exists for the identifier
/// * `InvalidStoredValue` if a stored id, timestamp, or status is malformed
pub fn load_race(conn: &mut SqliteConnection, race_id: Id) -> Result<Race, PersistenceError> {
    let key: String = race_id.to_string();

    let race_row: RaceRow = races::table
        .find(&key)
        .first::<RaceRow>(conn)
        .optional()?
        .ok_or_else(|| PersistenceError::RaceNotFound(key.clone()))?;

    // Deterministic organizer order; the hyphenated text encoding sorts the
    // same way as the underlying 128-bit value.
    let organizer_ids: Vec<String> = race_organizers::table
        .filter(race_organizers::race_id.eq(&key))
        .select(race_organizers::user_id)
        .order(race_organizers::user_id.asc())
        .load::<String>(conn)?;

    let registration_rows: Vec<RegistrationRow> = race_registrations::table
        .filter(race_registrations::race_id.eq(&key))
        .load::<RegistrationRow>(conn)?;

    let organizers: Vec<Id> = organizer_ids
        .iter()
        .map(|value| Ok(Id::from_str(value)?))
        .collect::<Result<Vec<Id>, PersistenceError>>()?;

    let registrations: Vec<RaceRegistration> = registration_rows
        .into_iter()
        .map(RegistrationRow::into_domain)
        .collect::<Result<Vec<RaceRegistration>, PersistenceError>>()?;

    let cover_image: Option<Id> = race_row
        .cover_image_id
        .as_deref()
        .map(Id::from_str)
        .transpose()?;

    let maximum_participants: u32 =
        u32::try_from(race_row.maximum_participants).map_err(|_| {
            PersistenceError::InvalidStoredValue(format!(
                "maximum_participants {}",
                race_row.maximum_participants
            ))
        })?;

    Ok(Race::from_stored(
        Id::from_str(&race_row.race_id)?,
        race_row.name,
        crate::data_models::parse_timestamp(&race_row.start_at)?,
        organizers,
        cover_image,
        race_row.is_open_for_registration,
        maximum_participants,
        registrations,
    ))
}

/// Returns the organizer user ids of a race, as stored text.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn organizer_ids(
    conn: &mut SqliteConnection,
    race_id: &str,
) -> Result<Vec<String>, PersistenceError> {
    Ok(race_organizers::table
        .filter(race_organizers::race_id.eq(race_id))
        .select(race_organizers::user_id)
        .load::<String>(conn)?)
}

/// Lists denormalized summaries for every race, ordered by start time.
///
/// # Errors
///
/// Returns an error if a query fails.
pub fn list_race_summaries(
    conn: &mut SqliteConnection,
) -> Result<Vec<RaceSummary>, PersistenceError> {
    let race_rows: Vec<RaceRow> = races::table
        .order(races::start_at.asc())
        .load::<RaceRow>(conn)?;

    // Organizer usernames and registered rider ids for all races in two
    // statements, grouped in memory.
    let organizer_rows: Vec<(String, String)> = race_organizers::table
        .inner_join(users::table)
        .select((race_organizers::race_id, users::username))
        .order(users::username.asc())
        .load::<(String, String)>(conn)?;

    let registration_rows: Vec<(String, String)> = race_registrations::table
        .select((race_registrations::race_id, race_registrations::user_id))
        .load::<(String, String)>(conn)?;

    let mut organizers_by_race: HashMap<String, Vec<String>> = HashMap::new();
    for (race_id, username) in organizer_rows {
        organizers_by_race.entry(race_id).or_default().push(username);
    }

    let mut riders_by_race: HashMap<String, Vec<String>> = HashMap::new();
    for (race_id, user_id) in registration_rows {
        riders_by_race.entry(race_id).or_default().push(user_id);
    }

    Ok(race_rows
        .into_iter()
        .map(|row| {
            let registered_user_ids: Vec<String> =
                riders_by_race.remove(&row.race_id).unwrap_or_default();
            RaceSummary {
                organizers: organizers_by_race
                    .remove(&row.race_id)
                    .unwrap_or_default()
                    .join(", "),
                registration_count: i64::try_from(registered_user_ids.len()).unwrap_or(i64::MAX),
                registered_user_ids,
                race_id: row.race_id,
                name: row.name,
                start_at: row.start_at,
                is_open_for_registration: row.is_open_for_registration,
                maximum_participants: row.maximum_participants,
                cover_image_id: row.cover_image_id,
            }
        })
        .collect())
}

/// Returns the denormalized summary of a single race.
///
/// # Errors
///
/// * `RaceNotFound` if no race row exists for the identifier
pub fn get_race_summary(
    conn: &mut SqliteConnection,
    race_id: &str,
) -> Result<RaceSummary, PersistenceError> {
    let row: RaceRow = races::table
        .find(race_id)
        .first::<RaceRow>(conn)
        .optional()?
        .ok_or_else(|| PersistenceError::RaceNotFound(race_id.to_string()))?;

    let organizers: Vec<String> = race_organizers::table
        .inner_join(users::table)
        .filter(race_organizers::race_id.eq(race_id))
        .select(users::username)
        .order(users::username.asc())
        .load::<String>(conn)?;

    let registered_user_ids: Vec<String> = race_registrations::table
        .filter(race_registrations::race_id.eq(race_id))
        .select(race_registrations::user_id)
        .load::<String>(conn)?;

    Ok(RaceSummary {
        organizers: organizers.join(", "),
        registration_count: i64::try_from(registered_user_ids.len()).unwrap_or(i64::MAX),
        registered_user_ids,
        race_id: row.race_id,
        name: row.name,
        start_at: row.start_at,
        is_open_for_registration: row.is_open_for_registration,
        maximum_participants: row.maximum_participants,
        cover_image_id: row.cover_image_id,
    })
}

/// Lists the registrations of a race with rider usernames, ordered by
/// registration time.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn list_registration_rows(
    conn: &mut SqliteConnection,
    race_id: &str,
) -> Result<Vec<RegistrationListRow>, PersistenceError> {
    let rows: Vec<(String, String, String, String, Option<String>, bool)> =
        race_registrations::table
            .inner_join(users::table)
            .filter(race_registrations::race_id.eq(race_id))
            .select((
                race_registrations::user_id,
                users::username,
                race_registrations::registered_at,
                race_registrations::status,
                race_registrations::medical_certificate,
                race_registrations::is_medical_certificate_approved,
            ))
            .order(race_registrations::registered_at.asc())
            .load(conn)?;

    Ok(rows
        .into_iter()
        .map(
            |(user_id, username, registered_at, status, certificate, approved)| {
                RegistrationListRow {
                    user_id,
                    username,
                    registered_at,
                    status,
                    has_medical_certificate: certificate.is_some(),
                    is_medical_certificate_approved: approved,
                }
            },
        )
        .collect())
}
