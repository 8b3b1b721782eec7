//! Installer orchestration for the MIDlet suite store.
//!
//! This crate ties the schema and store layers together into the `Installer`,
//! the context object through which suites and dynamic components are
//! stored, removed, enabled and inspected. It also provides id allocation,
//! the in-process suite lock registry, listener notification, install phase
//! validation, the image-cache collaborator seam and the process-level store
//! lock.

pub mod allocator;
pub mod cache;
pub mod concurrency;
pub mod installer;
pub mod lifecycle;
pub mod listeners;
pub mod locks;

pub use allocator::{allocate_id, allocate_in, next_free_id};
pub use cache::{ImageCache, NoImageCache, ResourceDirCache};
pub use concurrency::StoreLock;
pub use installer::Installer;
pub use lifecycle::{validate_transition, InstallPhase};
pub use listeners::{ListenerType, Listeners, Phase, SuiteEvent, SuiteListener};
pub use locks::{SuiteLock, SuiteLockRegistry};

use suitestore_schema::{SchemaError, Status, SuiteId};
use suitestore_store::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("store error: {0}")]
    Store(#[from] StoreError),
    #[error("schema error: {0}")]
    Schema(#[from] SchemaError),
    #[error("invalid parameters: {0}")]
    BadParams(String),
    #[error("suite {0} is locked")]
    SuiteLocked(SuiteId),
    #[error("out of storage: {0}")]
    OutOfStorage(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("invalid install transition: {from} -> {to}")]
    InvalidTransition { from: String, to: String },
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl CoreError {
    /// Status code reported to listeners and callers.
    pub fn status(&self) -> Status {
        match self {
            CoreError::Store(e) => e.status(),
            CoreError::Schema(SchemaError::Io(_)) | CoreError::Io(_) => Status::IoError,
            CoreError::Schema(_) | CoreError::BadParams(_) | CoreError::InvalidTransition { .. } => {
                Status::BadParams
            }
            CoreError::SuiteLocked(_) => Status::SuiteLocked,
            CoreError::OutOfStorage(_) => Status::OutOfStorage,
            CoreError::NotFound(_) => Status::NotFound,
        }
    }
}
