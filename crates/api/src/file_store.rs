// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! The narrow interface to external binary storage.
//!
//! The core tracks only opaque file handles; the bytes live elsewhere.
//! Every replace operation that drops a handle must also release the
//! underlying stored file through [`FileStore::delete`].

use thiserror::Error;
use velo_domain::Id;

/// Errors reported by a file store implementation.
#[derive(Debug, Error)]
pub enum FileStoreError {
    /// The store could not persist the bytes.
    #[error("failed to store file: {0}")]
    SaveFailed(String),
    /// The store could not delete the handle's bytes.
    #[error("failed to delete file {file_id}: {reason}")]
    DeleteFailed {
        /// The handle whose bytes could not be deleted.
        file_id: Id,
        /// The underlying failure.
        reason: String,
    },
}

/// External storage for certificate and cover-image bytes.
///
/// Handle identity is by opaque [`Id`]; implementations decide the layout.
pub trait FileStore {
    /// Stores raw bytes and returns a fresh handle.
    ///
    /// # Errors
    ///
    /// Returns an error if the bytes cannot be persisted.
    fn save(&self, bytes: &[u8]) -> Result<Id, FileStoreError>;

    /// Releases the bytes behind a handle.
    ///
    /// # Errors
    ///
    /// Returns an error if the stored file cannot be deleted.
    fn delete(&self, file_id: Id) -> Result<(), FileStoreError>;
}
