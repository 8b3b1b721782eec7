use crate::StoreError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use suitestore_schema::{ComponentId, StorageId, SuiteId, CONFIG_FILE, INTERNAL_STORAGE_ID};
use tempfile::NamedTempFile;

/// Current store format version. Incremented whenever any of the positional
/// binary file layouts changes.
pub const STORE_FORMAT_VERSION: u32 = 1;
const VERSION_FILE: &str = "version";

/// Name of the suite registry file inside the application database directory.
pub const REGISTRY_FILE: &str = "_suites.dat";

/// Directory layout of a suite store.
///
/// The registry and every per-suite metadata file live in `appdb/`, which is
/// also the internal storage volume. Jars installed on another volume go to
/// `storage<N>/`. Subdirectories are created lazily on
/// [`initialize`](Self::initialize).
#[derive(Debug, Clone)]
pub struct StoreLayout {
    root: PathBuf,
}

#[derive(Debug, Serialize, Deserialize)]
struct StoreVersion {
    format_version: u32,
}

impl StoreLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[inline]
    pub fn root(&self) -> &Path {
        &self.root
    }

    #[inline]
    pub fn appdb_dir(&self) -> PathBuf {
        self.root.join("appdb")
    }

    /// Directory backing a storage volume.
    pub fn volume_dir(&self, storage_id: StorageId) -> PathBuf {
        if storage_id == INTERNAL_STORAGE_ID {
            self.appdb_dir()
        } else {
            self.root.join(format!("storage{}", storage_id.get()))
        }
    }

    #[inline]
    pub fn registry_file(&self) -> PathBuf {
        self.appdb_dir().join(REGISTRY_FILE)
    }

    fn suite_file(&self, suite_id: SuiteId, suffix: &str) -> PathBuf {
        self.appdb_dir()
            .join(format!("{:08x}{suffix}", suite_id.get()))
    }

    #[inline]
    pub fn install_info_file(&self, suite_id: SuiteId) -> PathBuf {
        self.suite_file(suite_id, "_install.dat")
    }

    #[inline]
    pub fn properties_file(&self, suite_id: SuiteId) -> PathBuf {
        self.suite_file(suite_id, "_props.dat")
    }

    #[inline]
    pub fn settings_file(&self, suite_id: SuiteId) -> PathBuf {
        self.suite_file(suite_id, "_settings.dat")
    }

    #[inline]
    pub fn icon_file(&self, suite_id: SuiteId) -> PathBuf {
        self.suite_file(suite_id, "_icon.dat")
    }

    #[inline]
    pub fn verify_hash_file(&self, suite_id: SuiteId) -> PathBuf {
        self.suite_file(suite_id, "_verify.hsh")
    }

    /// Directory handed to the image cache for a suite.
    #[inline]
    pub fn image_cache_dir(&self, suite_id: SuiteId) -> PathBuf {
        self.suite_file(suite_id, "_images")
    }

    /// Permanent location of a suite's jar.
    pub fn suite_jar(&self, suite_id: SuiteId, storage_id: StorageId) -> PathBuf {
        self.volume_dir(storage_id)
            .join(format!("{:08x}.jar", suite_id.get()))
    }

    /// Permanent location of a dynamic component's jar.
    pub fn component_jar(
        &self,
        suite_id: SuiteId,
        component_id: ComponentId,
        storage_id: StorageId,
    ) -> PathBuf {
        self.volume_dir(storage_id).join(format!(
            "{:08x}_c{:08x}.jar",
            suite_id.get(),
            component_id.get()
        ))
    }

    #[inline]
    pub fn wal_dir(&self) -> PathBuf {
        self.root.join("wal")
    }

    #[inline]
    pub fn lock_file(&self) -> PathBuf {
        self.root.join(".lock")
    }

    #[inline]
    pub fn config_file(&self) -> PathBuf {
        self.root.join(CONFIG_FILE)
    }

    /// Every per-suite metadata file, in the order they are written at install.
    pub fn suite_metadata_files(&self, suite_id: SuiteId) -> [PathBuf; 5] {
        [
            self.install_info_file(suite_id),
            self.verify_hash_file(suite_id),
            self.properties_file(suite_id),
            self.settings_file(suite_id),
            self.icon_file(suite_id),
        ]
    }

    pub fn initialize(&self) -> Result<(), StoreError> {
        fs::create_dir_all(self.appdb_dir())?;
        fs::create_dir_all(self.wal_dir())?;

        let version_path = self.root.join(VERSION_FILE);
        if version_path.exists() {
            self.verify_version()?;
        } else {
            let ver = StoreVersion {
                format_version: STORE_FORMAT_VERSION,
            };
            let content = serde_json::to_string_pretty(&ver)?;
            let mut tmp = NamedTempFile::new_in(&self.root)?;
            tmp.write_all(content.as_bytes())?;
            tmp.as_file().sync_all()?;
            tmp.persist(&version_path)
                .map_err(|e| StoreError::Io(e.error))?;
            crate::fsync_dir(&self.root)?;
        }

        Ok(())
    }

    pub fn verify_version(&self) -> Result<(), StoreError> {
        let version_path = self.root.join(VERSION_FILE);
        let content = fs::read_to_string(&version_path)?;
        let ver: StoreVersion = serde_json::from_str(&content)?;

        if ver.format_version != STORE_FORMAT_VERSION {
            return Err(StoreError::VersionMismatch {
                expected: STORE_FORMAT_VERSION,
                found: ver.format_version,
            });
        }
        Ok(())
    }
}
