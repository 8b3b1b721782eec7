//! Data model for the MIDlet suite store.
//!
//! This crate defines the schema layer: integer identifier newtypes with their
//! reserved sentinels (`SuiteId`, `ComponentId`, `StorageId`), the registry
//! record (`SuiteRecord`), provenance metadata (`InstallInfo`), ordered
//! JAD/manifest properties (`PropertySet`), per-suite settings
//! (`SuiteSettings`), the coarse `Status` taxonomy reported to listeners, and
//! the installer configuration (`StoreConfig`).

pub mod config;
pub mod install;
pub mod properties;
pub mod settings;
pub mod status;
pub mod suite;
pub mod types;

pub use config::{StoreConfig, CONFIG_FILE, DEFAULT_PERMISSION_SLOTS};
pub use install::InstallInfo;
pub use properties::{ControlArgs, PropertySet, CONTROL_ARGS_KEY};
pub use settings::{Permission, SuiteSettings};
pub use status::Status;
pub use suite::{ComponentType, SuiteRecord};
pub use types::{
    ComponentId, IdSpace, StorageId, SuiteId, INTERNAL_STORAGE_ID, INTERNAL_SUITE_ID,
    MAX_COMPONENT_ID, MAX_SUITE_ID, UNUSED_COMPONENT_ID, UNUSED_SUITE_ID,
};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid config: {0}")]
    Config(#[from] toml::de::Error),
    #[error("failed to serialize config: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),
    #[error("malformed property line {line}: '{text}'")]
    MalformedProperty { line: usize, text: String },
}
