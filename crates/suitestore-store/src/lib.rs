//! Persistent storage for installed MIDlet suites.
//!
//! This crate provides the storage layer: the `Storage` I/O primitive with an
//! atomic filesystem implementation, the positional binary codec used by every
//! store file, `StoreLayout` for path building, `SuiteRegistry` for the
//! `_suites.dat` index, the per-suite install-info, properties, settings and
//! icon stores, `JarStore` for relocating downloaded jars, and the
//! `WriteAheadLog` that brackets installs for crash recovery.

pub mod codec;
pub mod icons;
pub mod install_info;
pub mod integrity;
pub mod jar;
pub mod layout;
pub mod properties;
pub mod registry;
pub mod settings;
pub mod storage;
pub mod wal;

pub use codec::{RecordReader, RecordWriter};
pub use icons::IconStore;
pub use install_info::InstallInfoStore;
pub use integrity::{verify_store_integrity, IntegrityFailure, IntegrityReport};
pub use jar::JarStore;
pub use layout::{StoreLayout, REGISTRY_FILE, STORE_FORMAT_VERSION};
pub use properties::PropertiesStore;
pub use registry::{SuiteRegistry, Upsert};
pub use settings::SettingsStore;
pub use storage::{FaultInjectingStorage, FsStorage, Storage};
pub use wal::{RollbackStep, WalEntry, WalOpKind, WriteAheadLog};

use std::path::Path;
use suitestore_schema::Status;
use thiserror::Error;

/// Fsync a directory to ensure that a preceding `rename()` is durable.
///
/// POSIX does not guarantee that a rename survives a crash until the parent
/// directory has been synced.
pub(crate) fn fsync_dir(dir: &Path) -> Result<(), std::io::Error> {
    let f = std::fs::File::open(dir)?;
    f.sync_all()
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("corrupted store data in {file}: {reason}")]
    Corrupted { file: String, reason: String },
    #[error("not found: {0}")]
    NotFound(String),
    #[error("invalid parameters: {0}")]
    BadParams(String),
    #[error("out of memory: {0}")]
    OutOfMemory(String),
    #[error("store format version mismatch: expected {expected}, found {found}")]
    VersionMismatch { expected: u32, found: u32 },
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl StoreError {
    pub(crate) fn corrupted(file: &Path, reason: impl Into<String>) -> Self {
        StoreError::Corrupted {
            file: file.display().to_string(),
            reason: reason.into(),
        }
    }

    /// Status code reported for this error.
    pub fn status(&self) -> Status {
        match self {
            StoreError::Io(_) | StoreError::Serialization(_) => Status::IoError,
            StoreError::Corrupted { .. } | StoreError::VersionMismatch { .. } => {
                Status::SuiteCorrupted
            }
            StoreError::NotFound(_) => Status::NotFound,
            StoreError::BadParams(_) => Status::BadParams,
            StoreError::OutOfMemory(_) => Status::OutOfMemory,
        }
    }

    /// True when the error means the file simply does not exist.
    pub fn is_missing_file(&self) -> bool {
        matches!(self, StoreError::Io(e) if e.kind() == std::io::ErrorKind::NotFound)
    }
}
