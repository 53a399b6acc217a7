// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Transactional persistence of the race aggregate.
//!
//! A save writes three row sets — the race row, organizer membership rows,
//! and registration rows — inside one transaction. Either all of them commit
//! or none do; a partial write is never observable.

use crate::data_models::{OrganizerRow, RaceRow, RegistrationRow, format_timestamp};
use crate::diesel_schema::{race_organizers, race_registrations, races};
use crate::error::PersistenceError;
use diesel::prelude::*;
use tracing::debug;
use velo_domain::Race;

/// Persists a race aggregate atomically.
///
/// Upsert semantics throughout: re-saving an existing race updates it in
/// place. Organizer rows use `DO NOTHING` on conflict, so duplicate organizer
/// entries in the aggregate collapse onto the unique `(race_id, user_id)`
/// pair. Registration rows are updated on conflict because their status,
/// certificate, and approval flag all change over the registration lifecycle.
///
/// # Errors
///
/// Returns an error if any statement in the transaction fails; the whole
/// save is rolled back.
pub fn save_race(conn: &mut SqliteConnection, race: &Race) -> Result<(), PersistenceError> {
    let race_row: RaceRow = RaceRow {
        race_id: race.id().to_string(),
        name: race.name().to_string(),
        start_at: format_timestamp(race.start_at())?,
        is_open_for_registration: race.is_open_for_registration(),
        maximum_participants: i64::from(race.maximum_participants()),
        cover_image_id: race.cover_image().map(|id| id.to_string()),
    };

    let organizer_rows: Vec<OrganizerRow> = race
        .organizers()
        .iter()
        .map(|user_id| OrganizerRow {
            race_id: race_row.race_id.clone(),
            user_id: user_id.to_string(),
        })
        .collect();

    let registration_rows: Vec<RegistrationRow> = race
        .registrations()
        .map(|registration| RegistrationRow::from_domain(race.id(), registration))
        .collect::<Result<Vec<RegistrationRow>, PersistenceError>>()?;

    conn.transaction::<(), PersistenceError, _>(|conn| {
        diesel::insert_into(races::table)
            .values(&race_row)
            .on_conflict(races::race_id)
            .do_update()
            .set((
                races::name.eq(&race_row.name),
                races::start_at.eq(&race_row.start_at),
                races::is_open_for_registration.eq(race_row.is_open_for_registration),
                races::maximum_participants.eq(race_row.maximum_participants),
                races::cover_image_id.eq(&race_row.cover_image_id),
            ))
            .execute(conn)?;

        for organizer_row in &organizer_rows {
            diesel::insert_into(race_organizers::table)
                .values(organizer_row)
                .on_conflict((race_organizers::race_id, race_organizers::user_id))
                .do_nothing()
                .execute(conn)?;
        }

        for registration_row in &registration_rows {
            diesel::insert_into(race_registrations::table)
                .values(registration_row)
                .on_conflict((race_registrations::race_id, race_registrations::user_id))
                .do_update()
                .set((
                    race_registrations::status.eq(&registration_row.status),
                    race_registrations::medical_certificate
                        .eq(&registration_row.medical_certificate),
                    race_registrations::is_medical_certificate_approved
                        .eq(registration_row.is_medical_certificate_approved),
                ))
                .execute(conn)?;
        }

        Ok(())
    })?;

    debug!(
        race_id = %race.id(),
        organizers = organizer_rows.len(),
        registrations = registration_rows.len(),
        "Saved race"
    );
    Ok(())
}
