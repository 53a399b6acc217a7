// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

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

mod error;
mod id;
pub mod permissions;
mod race;
mod registration;

#[cfg(test)]
mod tests;

pub use error::DomainError;
pub use id::Id;
pub use permissions::{
    can_accept_registrations, can_approve_certificate, can_approve_registration,
    can_open_for_registration, can_register, can_update_description, can_upload_certificate,
};
pub use race::Race;
pub use registration::{RaceRegistration, RegistrationStatus};
