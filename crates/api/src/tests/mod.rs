// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Test module for the API crate.

#![allow(clippy::expect_used, clippy::unwrap_used)]

mod command_tests;

use crate::auth::{AuthenticationService, Identity};
use crate::commands::{OrganizeRaceRequest, organize_race};
use crate::file_store::{FileStore, FileStoreError};
use std::collections::HashMap;
use std::sync::Mutex;
use velo_domain::Id;
use velo_persistence::Persistence;

/// A fixed RFC 3339 start time for deterministic tests.
pub const TEST_START_AT: &str = "2026-06-14T09:00:00Z";

pub fn create_test_persistence() -> Persistence {
    Persistence::new_in_memory().expect("Failed to create in-memory persistence")
}

/// Signs up a user and returns the resolved identity.
pub fn create_test_identity(persistence: &mut Persistence, username: &str) -> Identity {
    AuthenticationService::sign_up(persistence, username).expect("Failed to sign up user")
}

/// Organizes a race with the given identity and returns its id.
pub fn create_test_race(persistence: &mut Persistence, organizer: &Identity) -> Id {
    let request: OrganizeRaceRequest = OrganizeRaceRequest {
        name: "Tour de Test".to_string(),
        start_at: TEST_START_AT.to_string(),
    };
    organize_race(persistence, organizer, &request).expect("Failed to organize race")
}

/// An in-memory file store that records every save and delete.
pub struct MemoryFileStore {
    files: Mutex<HashMap<Id, Vec<u8>>>,
}

impl MemoryFileStore {
    pub fn new() -> Self {
        Self {
            files: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the number of files currently held.
    pub fn file_count(&self) -> usize {
        self.files.lock().expect("File store lock poisoned").len()
    }

    /// Returns whether a handle currently has bytes behind it.
    pub fn contains(&self, file_id: Id) -> bool {
        self.files
            .lock()
            .expect("File store lock poisoned")
            .contains_key(&file_id)
    }
}

impl FileStore for MemoryFileStore {
    fn save(&self, bytes: &[u8]) -> Result<Id, FileStoreError> {
        let file_id: Id = Id::new();
        self.files
            .lock()
            .expect("File store lock poisoned")
            .insert(file_id, bytes.to_vec());
        Ok(file_id)
    }

    fn delete(&self, file_id: Id) -> Result<(), FileStoreError> {
        self.files
            .lock()
            .expect("File store lock poisoned")
            .remove(&file_id)
            .map(|_| ())
            .ok_or_else(|| FileStoreError::DeleteFailed {
                file_id,
                reason: "no such file".to_string(),
            })
    }
}
