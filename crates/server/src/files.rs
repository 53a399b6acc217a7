// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Disk-backed file storage for certificates and cover images.

use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;
use velo_api::{FileStore, FileStoreError};
use velo_domain::Id;

/// A file store that writes each handle to `<root>/<id>`.
pub struct DiskFileStore {
    root: PathBuf,
}

impl DiskFileStore {
    /// Creates a file store rooted at the given directory, creating it if
    /// necessary.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn new<P: AsRef<Path>>(root: P) -> Result<Self, FileStoreError> {
        let root: PathBuf = root.as_ref().to_path_buf();
        fs::create_dir_all(&root)
            .map_err(|err| FileStoreError::SaveFailed(format!("media directory: {err}")))?;
        Ok(Self { root })
    }

    fn path_for(&self, file_id: Id) -> PathBuf {
        self.root.join(file_id.to_string())
    }
}

impl FileStore for DiskFileStore {
    fn save(&self, bytes: &[u8]) -> Result<Id, FileStoreError> {
        let file_id: Id = Id::new();
        let path: PathBuf = self.path_for(file_id);
        fs::write(&path, bytes).map_err(|err| FileStoreError::SaveFailed(err.to_string()))?;
        debug!(file_id = %file_id, "Stored file");
        Ok(file_id)
    }

    fn delete(&self, file_id: Id) -> Result<(), FileStoreError> {
        let path: PathBuf = self.path_for(file_id);
        fs::remove_file(&path).map_err(|err| FileStoreError::DeleteFailed {
            file_id,
            reason: err.to_string(),
        })?;
        debug!(file_id = %file_id, "Deleted file");
        Ok(())
    }
}
