// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::DomainError;
use crate::id::Id;
use crate::permissions;
use crate::registration::{RaceRegistration, RegistrationStatus};
use std::collections::BTreeMap;
use time::OffsetDateTime;

/// The race aggregate root.
///
/// A `Race` owns its organizer set and its registration map and is the single
/// consistency boundary for both: registrations are created and mutated only
/// through the methods below, and no mutable reference to an individual
/// registration ever escapes the aggregate.
///
/// The aggregate performs no I/O. The one operation with an external side
/// effect — replacing a medical certificate — returns the displaced file
/// handle so the caller can release it after the aggregate has been saved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Race {
    id: Id,
    name: String,
    start_at: OffsetDateTime,
    organizers: Vec<Id>,
    cover_image: Option<Id>,
    is_open_for_registration: bool,
    maximum_participants: u32,
    registrations: BTreeMap<Id, RaceRegistration>,
}

impl Race {
    /// Creates a new race with a fresh identifier.
    ///
    /// The race starts with an empty organizer set, registration closed, and
    /// no registrations.
    ///
    /// # Arguments
    ///
    /// * `name` - The race name (at least three characters)
    /// * `start_at` - When the race starts
    ///
    /// # Errors
    ///
    /// Returns `DomainError::NameTooShort` if the trimmed name is shorter
    /// than three characters.
    pub fn new(name: &str, start_at: OffsetDateTime) -> Result<Self, DomainError> {
        let name: &str = name.trim();
        if name.chars().count() < 3 {
            return Err(DomainError::NameTooShort {
                name: name.to_string(),
            });
        }
        Ok(Self {
            id: Id::new(),
            name: name.to_string(),
            start_at,
            organizers: Vec::new(),
            cover_image: None,
            is_open_for_registration: false,
            maximum_participants: 0,
            registrations: BTreeMap::new(),
        })
    }

    /// Rehydrates a race from stored values.
    ///
    /// Used by the persistence layer when reconstructing the aggregate. The
    /// registration map is keyed by rider identifier; a duplicate rider in
    /// `registrations` would collapse onto one entry, which storage prevents
    /// via its composite primary key.
    #[must_use]
    pub fn from_stored(
        id: Id,
        name: String,
        start_at: OffsetDateTime,
        organizers: Vec<Id>,
        cover_image: Option<Id>,
        is_open_for_registration: bool,
        maximum_participants: u32,
        registrations: Vec<RaceRegistration>,
    ) -> Self {
        let registrations: BTreeMap<Id, RaceRegistration> = registrations
            .into_iter()
            .map(|registration| (registration.user_id(), registration))
            .collect();
        Self {
            id,
            name,
            start_at,
            organizers,
            cover_image,
            is_open_for_registration,
            maximum_participants,
            registrations,
        }
    }

    /// Returns the race identifier.
    #[must_use]
    pub const fn id(&self) -> Id {
        self.id
    }

    /// Returns the race name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns when the race starts.
    #[must_use]
    pub const fn start_at(&self) -> OffsetDateTime {
        self.start_at
    }

    /// Returns the organizer identifiers in insertion order.
    #[must_use]
    pub fn organizers(&self) -> &[Id] {
        &self.organizers
    }

    /// Returns the cover image handle, if any.
    #[must_use]
    pub const fn cover_image(&self) -> Option<Id> {
        self.cover_image
    }

    /// Returns whether the race is open for registration.
    #[must_use]
    pub const fn is_open_for_registration(&self) -> bool {
        self.is_open_for_registration
    }

    /// Returns the maximum participant count.
    ///
    /// Only meaningful once registration has been opened.
    #[must_use]
    pub const fn maximum_participants(&self) -> u32 {
        self.maximum_participants
    }

    /// Returns the registration for a rider, if one exists.
    #[must_use]
    pub fn registration(&self, user_id: Id) -> Option<&RaceRegistration> {
        self.registrations.get(&user_id)
    }

    /// Iterates over all registrations.
    pub fn registrations(&self) -> impl Iterator<Item = &RaceRegistration> {
        self.registrations.values()
    }

    /// Returns the number of registrations, in any status.
    #[must_use]
    pub fn registration_count(&self) -> usize {
        self.registrations.len()
    }

    /// Appends a user to the organizer set.
    ///
    /// The append is unconditional: adding the same organizer twice leaves a
    /// duplicate entry in the aggregate, which storage collapses onto the
    /// unique `(race, user)` pair. Organizers are never removed.
    pub fn add_organizer(&mut self, user_id: Id) {
        self.organizers.push(user_id);
    }

    /// Returns whether the user is an organizer of this race.
    #[must_use]
    pub fn is_organizer(&self, user_id: Id) -> bool {
        self.organizers.contains(&user_id)
    }

    /// Updates the race start time.
    pub const fn set_start_at(&mut self, start_at: OffsetDateTime) {
        self.start_at = start_at;
    }

    /// Replaces the cover image, returning the displaced previous handle.
    ///
    /// The caller owns releasing the displaced stored file.
    pub const fn set_cover_image(&mut self, image: Id) -> Option<Id> {
        let previous: Option<Id> = self.cover_image;
        self.cover_image = Some(image);
        previous
    }

    /// Removes the cover image, returning the displaced handle.
    pub const fn clear_cover_image(&mut self) -> Option<Id> {
        let previous: Option<Id> = self.cover_image;
        self.cover_image = None;
        previous
    }

    /// Opens the race for registration with the given capacity.
    ///
    /// Re-invocation with a valid capacity is allowed and overwrites the cap
    /// without touching existing registrations.
    ///
    /// Capacity is validated here and only here: it is not re-checked as new
    /// registrations arrive, so concurrent registrations can overrun the cap.
    /// This mirrors the behavior the system has always had and is documented
    /// as a known limitation.
    ///
    /// # Errors
    ///
    /// * `DomainError::InvalidCapacity` if `maximum_participants` is zero
    /// * `DomainError::CapacityBelowCurrentRegistrations` if the requested
    ///   capacity is below the current registration count
    pub fn open_for_registration(&mut self, maximum_participants: u32) -> Result<(), DomainError> {
        if maximum_participants == 0 {
            return Err(DomainError::InvalidCapacity);
        }
        let capacity: usize = usize::try_from(maximum_participants).unwrap_or(usize::MAX);
        if capacity < self.registrations.len() {
            return Err(DomainError::CapacityBelowCurrentRegistrations {
                capacity: maximum_participants,
                registered: self.registrations.len(),
            });
        }
        self.maximum_participants = maximum_participants;
        self.is_open_for_registration = true;
        Ok(())
    }

    /// Registers a rider for this race.
    ///
    /// # Errors
    ///
    /// * `DomainError::AlreadyRegistered` if the rider already has an entry,
    ///   in any status
    /// * `DomainError::RegistrationsClosed` if registration is not open
    pub fn register(&mut self, user_id: Id, now: OffsetDateTime) -> Result<(), DomainError> {
        if self.registrations.contains_key(&user_id) {
            return Err(DomainError::AlreadyRegistered(user_id));
        }
        if !self.is_open_for_registration {
            return Err(DomainError::RegistrationsClosed);
        }
        self.registrations
            .insert(user_id, RaceRegistration::new(user_id, now));
        Ok(())
    }

    /// Attaches a medical certificate to a rider's registration.
    ///
    /// Returns the displaced previous certificate handle, if one existed; the
    /// caller must release the underlying stored file once the aggregate has
    /// been saved. The approval flag is reset: a new certificate always
    /// requires re-approval.
    ///
    /// # Errors
    ///
    /// * `DomainError::NotRegistered` if the rider has no registration
    /// * `DomainError::WrongStatus` if the registration is not in status
    ///   `Registered`
    pub fn upload_medical_certificate(
        &mut self,
        user_id: Id,
        certificate: Id,
    ) -> Result<Option<Id>, DomainError> {
        let registration: &mut RaceRegistration = self
            .registrations
            .get_mut(&user_id)
            .ok_or(DomainError::NotRegistered(user_id))?;
        if registration.status() != RegistrationStatus::Registered {
            return Err(DomainError::WrongStatus {
                expected: RegistrationStatus::Registered,
                actual: registration.status(),
            });
        }
        Ok(registration.attach_certificate(certificate))
    }

    /// Marks a rider's current medical certificate as approved.
    ///
    /// The registration status is unchanged; certificate approval is a
    /// separate sub-state that gates [`Self::approve_registration`].
    ///
    /// # Errors
    ///
    /// * `DomainError::NotRegistered` if the rider has no registration
    /// * `DomainError::CertificateMissing` if no certificate is attached
    pub fn approve_medical_certificate(&mut self, user_id: Id) -> Result<(), DomainError> {
        let registration: &mut RaceRegistration = self
            .registrations
            .get_mut(&user_id)
            .ok_or(DomainError::NotRegistered(user_id))?;
        if registration.medical_certificate().is_none() {
            return Err(DomainError::CertificateMissing(user_id));
        }
        registration.approve_certificate();
        Ok(())
    }

    /// Approves a rider's registration, moving it to the terminal `Approved`
    /// status.
    ///
    /// # Errors
    ///
    /// * `DomainError::NotRegistered` if the rider has no registration
    /// * `DomainError::WrongStatus` if the registration is not in status
    ///   `Registered`
    /// * `DomainError::CertificateNotApproved` if the rider's current
    ///   certificate has not been approved
    pub fn approve_registration(&mut self, user_id: Id) -> Result<(), DomainError> {
        let registration: &mut RaceRegistration = self
            .registrations
            .get_mut(&user_id)
            .ok_or(DomainError::NotRegistered(user_id))?;
        if registration.status() != RegistrationStatus::Registered {
            return Err(DomainError::WrongStatus {
                expected: RegistrationStatus::Registered,
                actual: registration.status(),
            });
        }
        if !registration.is_medical_certificate_approved() {
            return Err(DomainError::CertificateNotApproved(user_id));
        }
        registration.approve();
        Ok(())
    }

    // ------------------------------------------------------------------
    // Authorization predicates (command side)
    //
    // These share their boolean logic with the query-side capability
    // projection through the `permissions` module, so the two paths cannot
    // drift apart.
    // ------------------------------------------------------------------

    /// Returns whether the viewer may update the race description.
    #[must_use]
    pub fn can_update_description(&self, viewer: Id) -> bool {
        permissions::can_update_description(self.is_organizer(viewer))
    }

    /// Returns whether the viewer may open the race for registration.
    #[must_use]
    pub fn can_open_for_registration(&self, viewer: Id) -> bool {
        permissions::can_open_for_registration(self.is_organizer(viewer))
    }

    /// Returns whether the viewer may register for this race.
    #[must_use]
    pub fn can_register(&self, viewer: Id) -> bool {
        permissions::can_register(
            true,
            self.is_open_for_registration,
            self.registrations.contains_key(&viewer),
        )
    }

    /// Returns whether the viewer may upload a certificate for a rider.
    #[must_use]
    pub fn can_upload_certificate(&self, viewer: Id, rider: Id) -> bool {
        self.registrations.get(&rider).is_some_and(|registration| {
            permissions::can_upload_certificate(viewer == rider, registration.status())
        })
    }

    /// Returns whether the viewer may approve a rider's certificate.
    #[must_use]
    pub fn can_approve_certificate(&self, viewer: Id, rider: Id) -> bool {
        self.registrations.get(&rider).is_some_and(|registration| {
            permissions::can_approve_certificate(
                self.is_organizer(viewer),
                registration.medical_certificate().is_some(),
            )
        })
    }

    /// Returns whether the viewer may approve a rider's registration.
    #[must_use]
    pub fn can_approve_registration(&self, viewer: Id, rider: Id) -> bool {
        self.registrations.get(&rider).is_some_and(|registration| {
            permissions::can_approve_registration(
                self.is_organizer(viewer),
                registration.status(),
                registration.is_medical_certificate_approved(),
            )
        })
    }
}
