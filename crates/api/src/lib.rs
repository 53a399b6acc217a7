// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! API boundary layer for Velo.
//!
//! Commands load the race aggregate, enforce authorization, apply the state
//! transition, and persist atomically. Queries bypass the aggregate and read
//! denormalized rows, recomputing permission flags through the same pure
//! predicates the aggregate uses. The two paths are deliberately separate
//! (command/query split); the shared boolean logic lives in
//! `velo_domain::permissions` so they cannot drift.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(clippy::multiple_crate_versions)]

mod auth;
mod capabilities;
mod commands;
mod error;
mod file_store;
mod queries;

#[cfg(test)]
mod tests;

pub use auth::{AuthenticationService, Identity, SESSION_LIFETIME};
pub use capabilities::{Capability, RaceCapabilities, RegistrationCapabilities};
pub use commands::{
    CoverImageUpdate, OrganizeRaceRequest, UpdateRaceRequest, approve_medical_certificate,
    approve_race_registration, open_race_for_registration, organize_race, register_for_race,
    update_race, upload_medical_certificate,
};
pub use error::{ApiError, AuthError};
pub use file_store::{FileStore, FileStoreError};
pub use queries::{
    RaceDetailModel, RaceListModel, RaceRegistrationModel, race_detail, race_list,
    race_registrations,
};
