// Copyright 2026 BadCompany
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

// Local result store - one JSON array of records under a fixed storage key

use crate::engine_core::constants::storage::STORAGE_KEY;
use crate::engine_core::errors::ClassifierError;
use crate::engine_core::models::ToolClassificationRecord;
use fs2::FileExt;
use std::fs::{self, File, OpenOptions};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Ordered list of batch records persisted as `<dir>/classifier_batch_results.json`.
///
/// Writes go to a temp file that is renamed over the target while an
/// exclusive lock on `<key>.lock` is held, so readers never see a torn file.
#[derive(Debug, Clone)]
pub struct ResultStore {
    dir: PathBuf,
}

impl ResultStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path(&self) -> PathBuf {
        self.dir.join(format!("{}.json", STORAGE_KEY))
    }

    fn lock_path(&self) -> PathBuf {
        self.dir.join(format!("{}.lock", STORAGE_KEY))
    }

    fn storage_error(action: &str, path: &Path, e: impl std::fmt::Display) -> ClassifierError {
        ClassifierError::StorageError(format!("{} {}: {}", action, path.display(), e))
    }

    fn lock(&self) -> Result<File, ClassifierError> {
        fs::create_dir_all(&self.dir)
            .map_err(|e| Self::storage_error("cannot create", &self.dir, e))?;
        let lock_path = self.lock_path();
        let lock_file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&lock_path)
            .map_err(|e| Self::storage_error("cannot open", &lock_path, e))?;
        // Released when the handle drops
        lock_file
            .lock_exclusive()
            .map_err(|e| Self::storage_error("cannot lock", &lock_path, e))?;
        Ok(lock_file)
    }

    /// Stored records; a missing file is an empty list.
    pub fn load(&self) -> Result<Vec<ToolClassificationRecord>, ClassifierError> {
        let path = self.path();
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(Self::storage_error("cannot read", &path, e)),
        };
        serde_json::from_str(&content).map_err(|e| Self::storage_error("corrupt", &path, e))
    }

    /// Replace the stored list with `records`.
    pub fn save(&self, records: &[ToolClassificationRecord]) -> Result<(), ClassifierError> {
        let _guard = self.lock()?;
        let path = self.path();
        let tmp = self.dir.join(format!("{}.json.tmp", STORAGE_KEY));

        let content = serde_json::to_string_pretty(records)?;
        fs::write(&tmp, content).map_err(|e| Self::storage_error("cannot write", &tmp, e))?;
        fs::rename(&tmp, &path).map_err(|e| Self::storage_error("cannot replace", &path, e))?;

        debug!(path = %path.display(), records = records.len(), "Results persisted");
        Ok(())
    }

    /// Remove the stored list. Clearing an empty store is not an error.
    pub fn clear(&self) -> Result<(), ClassifierError> {
        let path = self.path();
        if !path.exists() {
            return Ok(());
        }
        let _guard = self.lock()?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Self::storage_error("cannot remove", &path, e)),
        }
    }
}
