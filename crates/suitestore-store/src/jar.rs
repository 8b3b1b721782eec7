use crate::layout::StoreLayout;
use crate::storage::Storage;
use crate::StoreError;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use suitestore_schema::SuiteRecord;
use tracing::debug;

/// Moves downloaded jars to their permanent per-suite location.
pub struct JarStore {
    layout: StoreLayout,
    storage: Arc<dyn Storage>,
}

impl JarStore {
    pub fn new(layout: StoreLayout, storage: Arc<dyn Storage>) -> Self {
        Self { layout, storage }
    }

    /// Where the jar of `record` lives once installed.
    pub fn final_path(&self, record: &SuiteRecord) -> PathBuf {
        if record.is_component() {
            self.layout
                .component_jar(record.suite_id, record.component_id, record.storage_id)
        } else {
            self.layout.suite_jar(record.suite_id, record.storage_id)
        }
    }

    /// Rename `temp` to the permanent location of `record` and return that
    /// location. A jar already in place is left alone.
    ///
    /// Any rename failure is reported as [`StoreError::NotFound`]: in practice
    /// it means the caller handed over a stale temporary path.
    pub fn relocate(&self, temp: &Path, record: &SuiteRecord) -> Result<PathBuf, StoreError> {
        let dest = self.final_path(record);
        if temp == dest {
            return Ok(dest);
        }
        self.storage.rename(temp, &dest).map_err(|e| {
            StoreError::NotFound(format!("cannot move {}: {e}", temp.display()))
        })?;
        debug!("relocated {} -> {}", temp.display(), dest.display());
        Ok(dest)
    }

    /// Where an installed jar waits while a reinstall replaces it.
    pub fn backup_path(jar: &Path) -> PathBuf {
        let mut name = jar.as_os_str().to_owned();
        name.push(".bak");
        PathBuf::from(name)
    }

    /// Move an installed jar to its backup name. `None` when there is no
    /// jar at `jar`.
    pub fn set_aside(&self, jar: &Path) -> Result<Option<PathBuf>, StoreError> {
        if !self.storage.exists(jar) {
            return Ok(None);
        }
        let backup = Self::backup_path(jar);
        self.storage.rename(jar, &backup)?;
        debug!("set aside {} -> {}", jar.display(), backup.display());
        Ok(Some(backup))
    }

    /// Put a jar moved by [`JarStore::set_aside`] back in place.
    pub fn restore(&self, backup: &Path, jar: &Path) -> Result<(), StoreError> {
        self.storage.rename(backup, jar)?;
        debug!("restored {} from {}", jar.display(), backup.display());
        Ok(())
    }

    pub fn size_of(&self, jar: &Path) -> Result<u64, StoreError> {
        Ok(self.storage.size_of(jar)?)
    }

    /// blake3 digest of the jar contents.
    pub fn hash(&self, jar: &Path) -> Result<Vec<u8>, StoreError> {
        let data = self.storage.read(jar)?;
        Ok(blake3::hash(&data).as_bytes().to_vec())
    }
}
