// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Command side of the API.
//!
//! Each command loads the race aggregate fresh, checks that the requester is
//! allowed to act, applies the state change through the aggregate, and saves
//! it back atomically. Checks run in a fixed order: existence first, then
//! authorization, then business rules, so an unauthorized requester learns
//! that a race exists but nothing about its state.
//!
//! Commands that touch stored files (certificates, cover images) write the
//! new file before mutating the aggregate and release the displaced file only
//! after the aggregate has been saved. A failed save rolls the new file back;
//! a failed release of a displaced file is logged and tolerated, leaving an
//! orphaned file rather than a dangling reference.

use crate::auth::Identity;
use crate::error::{ApiError, translate_domain_error, translate_persistence_error};
use crate::file_store::FileStore;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use tracing::{info, warn};
use velo_domain::{Id, Race};
use velo_persistence::Persistence;

/// Request payload for creating a race.
#[derive(Debug, Clone)]
pub struct OrganizeRaceRequest {
    /// The race name.
    pub name: String,
    /// When the race starts, as an RFC 3339 timestamp.
    pub start_at: String,
}

/// Request payload for updating a race's description.
#[derive(Debug, Clone)]
pub struct UpdateRaceRequest {
    /// A new start time, as an RFC 3339 timestamp, or `None` to keep the
    /// current one.
    pub start_at: Option<String>,
    /// What to do with the cover image.
    pub cover_image: CoverImageUpdate,
}

/// Cover image directive within an update request.
#[derive(Debug, Clone)]
pub enum CoverImageUpdate {
    /// Leave the current cover image untouched.
    Keep,
    /// Remove the current cover image.
    Clear,
    /// Replace the cover image with the given file content.
    Replace(Vec<u8>),
}

/// Creates a new race with the requester as its first organizer.
///
/// # Errors
///
/// * `ApiError::InvalidInput` for a too-short name or a malformed start time
/// * `ApiError::Internal` if the race cannot be saved
pub fn organize_race(
    persistence: &mut Persistence,
    requester: &Identity,
    request: &OrganizeRaceRequest,
) -> Result<Id, ApiError> {
    let start_at: OffsetDateTime = parse_start_at(&request.start_at)?;
    let mut race: Race = Race::new(&request.name, start_at).map_err(translate_domain_error)?;
    race.add_organizer(requester.user_id);
    persistence
        .save_race(&race)
        .map_err(|err| translate_persistence_error(&err))?;

    info!(race_id = %race.id(), organizer = %requester.user_id, "Race organized");
    Ok(race.id())
}

/// Updates a race's start time and cover image.
///
/// # Errors
///
/// * `ApiError::ResourceNotFound` if the race does not exist
/// * `ApiError::Unauthorized` if the requester is not an organizer
/// * `ApiError::InvalidInput` for a malformed start time
/// * `ApiError::Internal` on storage or file store failure
pub fn update_race(
    persistence: &mut Persistence,
    files: &dyn FileStore,
    requester: &Identity,
    race_id: Id,
    request: &UpdateRaceRequest,
) -> Result<(), ApiError> {
    let mut race: Race = load_race(persistence, race_id)?;
    if !race.can_update_description(requester.user_id) {
        return Err(ApiError::Unauthorized {
            action: "update race".to_string(),
        });
    }

    if let Some(start_at) = request.start_at.as_deref() {
        race.set_start_at(parse_start_at(start_at)?);
    }

    match &request.cover_image {
        CoverImageUpdate::Keep => {
            persistence
                .save_race(&race)
                .map_err(|err| translate_persistence_error(&err))?;
        }
        CoverImageUpdate::Clear => {
            let displaced: Option<Id> = race.clear_cover_image();
            persistence
                .save_race(&race)
                .map_err(|err| translate_persistence_error(&err))?;
            release_file(files, displaced);
        }
        CoverImageUpdate::Replace(content) => {
            let image_id: Id = files.save(content).map_err(|err| ApiError::Internal {
                message: format!("File store error: {err}"),
            })?;
            let displaced: Option<Id> = race.set_cover_image(image_id);
            if let Err(err) = persistence.save_race(&race) {
                release_file(files, Some(image_id));
                return Err(translate_persistence_error(&err));
            }
            release_file(files, displaced);
        }
    }

    info!(race_id = %race_id, "Race updated");
    Ok(())
}

/// Opens a race for registration with the given capacity.
///
/// # Errors
///
/// * `ApiError::ResourceNotFound` if the race does not exist
/// * `ApiError::Unauthorized` if the requester is not an organizer
/// * `ApiError::InvalidInput` if the capacity is zero
/// * `ApiError::RuleViolation` if the capacity is below the current
///   registration count
pub fn open_race_for_registration(
    persistence: &mut Persistence,
    requester: &Identity,
    race_id: Id,
    maximum_participants: u32,
) -> Result<(), ApiError> {
    let mut race: Race = load_race(persistence, race_id)?;
    if !race.can_open_for_registration(requester.user_id) {
        return Err(ApiError::Unauthorized {
            action: "open race for registration".to_string(),
        });
    }

    race.open_for_registration(maximum_participants)
        .map_err(translate_domain_error)?;
    persistence
        .save_race(&race)
        .map_err(|err| translate_persistence_error(&err))?;

    info!(race_id = %race_id, maximum_participants, "Race opened for registration");
    Ok(())
}

/// Registers the requester for a race.
///
/// Registration is self-service; any authenticated user may register while
/// the window is open.
///
/// # Errors
///
/// * `ApiError::ResourceNotFound` if the race does not exist
/// * `ApiError::RuleViolation` if registration is closed or the requester is
///   already registered
pub fn register_for_race(
    persistence: &mut Persistence,
    requester: &Identity,
    race_id: Id,
) -> Result<(), ApiError> {
    let mut race: Race = load_race(persistence, race_id)?;
    race.register(requester.user_id, OffsetDateTime::now_utc())
        .map_err(translate_domain_error)?;
    persistence
        .save_race(&race)
        .map_err(|err| translate_persistence_error(&err))?;

    info!(race_id = %race_id, user_id = %requester.user_id, "Rider registered");
    Ok(())
}

/// Attaches a medical certificate to the requester's own registration.
///
/// The file is stored before the aggregate is mutated. If saving the
/// aggregate fails, the newly stored file is rolled back; on success the
/// displaced previous certificate, if any, is released.
///
/// # Errors
///
/// * `ApiError::ResourceNotFound` if the race does not exist
/// * `ApiError::RuleViolation` if the requester is not registered or the
///   registration has already been approved
/// * `ApiError::Internal` on storage or file store failure
pub fn upload_medical_certificate(
    persistence: &mut Persistence,
    files: &dyn FileStore,
    requester: &Identity,
    race_id: Id,
    content: &[u8],
) -> Result<(), ApiError> {
    let mut race: Race = load_race(persistence, race_id)?;

    let certificate_id: Id = files.save(content).map_err(|err| ApiError::Internal {
        message: format!("File store error: {err}"),
    })?;
    let displaced: Option<Id> =
        match race.upload_medical_certificate(requester.user_id, certificate_id) {
            Ok(displaced) => displaced,
            Err(err) => {
                release_file(files, Some(certificate_id));
                return Err(translate_domain_error(err));
            }
        };
    if let Err(err) = persistence.save_race(&race) {
        release_file(files, Some(certificate_id));
        return Err(translate_persistence_error(&err));
    }
    release_file(files, displaced);

    info!(race_id = %race_id, user_id = %requester.user_id, "Medical certificate uploaded");
    Ok(())
}

/// Approves a rider's current medical certificate.
///
/// # Errors
///
/// * `ApiError::ResourceNotFound` if the race does not exist
/// * `ApiError::Unauthorized` if the requester is not an organizer
/// * `ApiError::RuleViolation` if the rider is not registered or has no
///   certificate attached
pub fn approve_medical_certificate(
    persistence: &mut Persistence,
    requester: &Identity,
    race_id: Id,
    rider: Id,
) -> Result<(), ApiError> {
    let mut race: Race = load_race(persistence, race_id)?;
    if !race.is_organizer(requester.user_id) {
        return Err(ApiError::Unauthorized {
            action: "approve medical certificate".to_string(),
        });
    }

    race.approve_medical_certificate(rider)
        .map_err(translate_domain_error)?;
    persistence
        .save_race(&race)
        .map_err(|err| translate_persistence_error(&err))?;

    info!(race_id = %race_id, rider = %rider, "Medical certificate approved");
    Ok(())
}

/// Approves a rider's registration, confirming their participation.
///
/// # Errors
///
/// * `ApiError::ResourceNotFound` if the race does not exist
/// * `ApiError::Unauthorized` if the requester is not an organizer
/// * `ApiError::RuleViolation` if the rider is not registered, is already
///   approved, or their certificate has not been approved
pub fn approve_race_registration(
    persistence: &mut Persistence,
    requester: &Identity,
    race_id: Id,
    rider: Id,
) -> Result<(), ApiError> {
    let mut race: Race = load_race(persistence, race_id)?;
    if !race.is_organizer(requester.user_id) {
        return Err(ApiError::Unauthorized {
            action: "approve race registration".to_string(),
        });
    }

    race.approve_registration(rider)
        .map_err(translate_domain_error)?;
    persistence
        .save_race(&race)
        .map_err(|err| translate_persistence_error(&err))?;

    info!(race_id = %race_id, rider = %rider, "Race registration approved");
    Ok(())
}

fn load_race(persistence: &mut Persistence, race_id: Id) -> Result<Race, ApiError> {
    persistence
        .load_race(race_id)
        .map_err(|err| translate_persistence_error(&err))
}

fn parse_start_at(value: &str) -> Result<OffsetDateTime, ApiError> {
    OffsetDateTime::parse(value, &Rfc3339).map_err(|err| ApiError::InvalidInput {
        field: "start_at".to_string(),
        message: format!("must be an RFC 3339 timestamp: {err}"),
    })
}

/// Releases a displaced stored file after its owning aggregate was saved.
///
/// A failure here leaves an orphaned file, which is preferable to a stored
/// reference with no file behind it, so the error is logged and swallowed.
fn release_file(files: &dyn FileStore, file_id: Option<Id>) {
    if let Some(file_id) = file_id
        && let Err(err) = files.delete(file_id)
    {
        warn!(file_id = %file_id, error = %err, "Failed to release displaced file");
    }
}
