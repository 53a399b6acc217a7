// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Query side of the API.
//!
//! Queries never construct the race aggregate. They read denormalized rows
//! from persistence and project viewer-specific capability grants on top, so
//! a client can render its controls from a single response. An anonymous
//! viewer receives the same data with every capability denied.

use crate::auth::Identity;
use crate::capabilities::{Capability, RaceCapabilities, RegistrationCapabilities};
use crate::error::{ApiError, translate_persistence_error};
use serde::Serialize;
use std::str::FromStr;
use velo_domain::{RegistrationStatus, permissions};
use velo_persistence::{Persistence, RaceSummary, RegistrationListRow};

/// One race in the public race list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RaceListModel {
    /// The race identifier.
    pub race_id: String,
    /// The race name.
    pub name: String,
    /// When the race starts, as an RFC 3339 timestamp.
    pub start_at: String,
    /// Whether the race is open for registration.
    pub is_open_for_registration: bool,
    /// The registration cap, zero until registration has been opened.
    pub maximum_participants: i64,
    /// The cover image handle, if any.
    pub cover_image_id: Option<String>,
    /// Comma-joined organizer usernames.
    pub organizers: String,
    /// The number of registrations, in any status.
    pub registration_count: i64,
    /// Whether the viewer may register for this race.
    pub can_register: Capability,
}

/// The detail view of one race.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RaceDetailModel {
    /// The race identifier.
    pub race_id: String,
    /// The race name.
    pub name: String,
    /// When the race starts, as an RFC 3339 timestamp.
    pub start_at: String,
    /// Whether the race is open for registration.
    pub is_open_for_registration: bool,
    /// The registration cap, zero until registration has been opened.
    pub maximum_participants: i64,
    /// The cover image handle, if any.
    pub cover_image_id: Option<String>,
    /// Comma-joined organizer usernames.
    pub organizers: String,
    /// The number of registrations, in any status.
    pub registration_count: i64,
    /// Whether the viewer may register for this race.
    pub can_register: Capability,
    /// The viewer's race-level capabilities.
    pub capabilities: RaceCapabilities,
}

/// One row in a race's registration list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RaceRegistrationModel {
    /// The rider's identifier.
    pub user_id: String,
    /// The rider's username.
    pub username: String,
    /// When the rider registered, as an RFC 3339 timestamp.
    pub registered_at: String,
    /// The registration status.
    pub status: String,
    /// Whether a medical certificate is attached.
    pub has_medical_certificate: bool,
    /// Whether the attached certificate has been approved.
    pub is_medical_certificate_approved: bool,
    /// The viewer's capabilities over this registration.
    pub capabilities: RegistrationCapabilities,
}

/// Lists all races with a per-viewer registration flag, ordered by start
/// time.
///
/// # Errors
///
/// Returns `ApiError::Internal` if the read fails.
pub fn race_list(
    persistence: &mut Persistence,
    viewer: Option<&Identity>,
) -> Result<Vec<RaceListModel>, ApiError> {
    let summaries: Vec<RaceSummary> = persistence
        .list_race_summaries()
        .map_err(|err| translate_persistence_error(&err))?;

    Ok(summaries
        .into_iter()
        .map(|summary| {
            let can_register: Capability = project_can_register(&summary, viewer);
            RaceListModel {
                race_id: summary.race_id,
                name: summary.name,
                start_at: summary.start_at,
                is_open_for_registration: summary.is_open_for_registration,
                maximum_participants: summary.maximum_participants,
                cover_image_id: summary.cover_image_id,
                organizers: summary.organizers,
                registration_count: summary.registration_count,
                can_register,
            }
        })
        .collect())
}

/// Returns the detail view of one race with the viewer's capabilities.
///
/// # Errors
///
/// * `ApiError::ResourceNotFound` if the race does not exist
/// * `ApiError::Internal` if the read fails
pub fn race_detail(
    persistence: &mut Persistence,
    viewer: Option<&Identity>,
    race_id: &str,
) -> Result<RaceDetailModel, ApiError> {
    let summary: RaceSummary = persistence
        .get_race_summary(race_id)
        .map_err(|err| translate_persistence_error(&err))?;
    let is_organizer: bool = viewer_is_organizer(persistence, viewer, race_id)?;
    let can_register: Capability = project_can_register(&summary, viewer);

    Ok(RaceDetailModel {
        race_id: summary.race_id,
        name: summary.name,
        start_at: summary.start_at,
        is_open_for_registration: summary.is_open_for_registration,
        maximum_participants: summary.maximum_participants,
        cover_image_id: summary.cover_image_id,
        organizers: summary.organizers,
        registration_count: summary.registration_count,
        can_register,
        capabilities: RaceCapabilities::for_viewer(is_organizer),
    })
}

/// Lists a race's registrations with the viewer's per-row capabilities.
///
/// Only organizers may review the registration list.
///
/// # Errors
///
/// * `ApiError::ResourceNotFound` if the race does not exist
/// * `ApiError::Unauthorized` if the viewer is not an organizer
/// * `ApiError::Internal` if the read fails or a stored row is malformed
pub fn race_registrations(
    persistence: &mut Persistence,
    viewer: &Identity,
    race_id: &str,
) -> Result<Vec<RaceRegistrationModel>, ApiError> {
    // Existence first; a non-organizer learns the race exists, nothing more.
    persistence
        .get_race_summary(race_id)
        .map_err(|err| translate_persistence_error(&err))?;
    let is_organizer: bool = viewer_is_organizer(persistence, Some(viewer), race_id)?;
    if !permissions::can_accept_registrations(is_organizer) {
        return Err(ApiError::Unauthorized {
            action: "review registrations".to_string(),
        });
    }

    let rows: Vec<RegistrationListRow> = persistence
        .list_registration_rows(race_id)
        .map_err(|err| translate_persistence_error(&err))?;

    rows.into_iter()
        .map(|row| {
            let status: RegistrationStatus =
                RegistrationStatus::from_str(&row.status).map_err(|err| ApiError::Internal {
                    message: format!("Stored registration status: {err}"),
                })?;
            let is_owner: bool = row.user_id == viewer.user_id.to_string();
            let capabilities: RegistrationCapabilities = RegistrationCapabilities::for_viewer(
                is_owner,
                is_organizer,
                status,
                row.has_medical_certificate,
                row.is_medical_certificate_approved,
            );
            Ok(RaceRegistrationModel {
                user_id: row.user_id,
                username: row.username,
                registered_at: row.registered_at,
                status: row.status,
                has_medical_certificate: row.has_medical_certificate,
                is_medical_certificate_approved: row.is_medical_certificate_approved,
                capabilities,
            })
        })
        .collect()
}

fn project_can_register(summary: &RaceSummary, viewer: Option<&Identity>) -> Capability {
    let already_registered: bool = viewer.is_some_and(|identity| {
        summary
            .registered_user_ids
            .contains(&identity.user_id.to_string())
    });
    Capability::from_bool(permissions::can_register(
        viewer.is_some(),
        summary.is_open_for_registration,
        already_registered,
    ))
}

fn viewer_is_organizer(
    persistence: &mut Persistence,
    viewer: Option<&Identity>,
    race_id: &str,
) -> Result<bool, ApiError> {
    let Some(identity) = viewer else {
        return Ok(false);
    };
    let organizer_ids: Vec<String> = persistence
        .organizer_ids(race_id)
        .map_err(|err| translate_persistence_error(&err))?;
    Ok(organizer_ids.contains(&identity.user_id.to_string()))
}
