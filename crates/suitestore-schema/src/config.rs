use crate::SchemaError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Name of the configuration file at the store root.
pub const CONFIG_FILE: &str = "suitestore.toml";

pub const DEFAULT_PERMISSION_SLOTS: usize = 32;

/// Installer configuration, read from `<store>/suitestore.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Accept dynamic components in addition to regular suites.
    pub dynamic_components: bool,
    /// Honour `MIDP_ARGS` directives found in the JAD.
    pub control_args_from_jad: bool,
    pub image_cache: bool,
    pub icon_cache: bool,
    /// Permission slots granted by `allow_all_permissions`.
    pub permission_slots: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            dynamic_components: true,
            control_args_from_jad: false,
            image_cache: false,
            icon_cache: false,
            permission_slots: DEFAULT_PERMISSION_SLOTS,
        }
    }
}

impl StoreConfig {
    /// Load the config at `path`, or the defaults if the file does not exist.
    pub fn load(path: &Path) -> Result<Self, SchemaError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    pub fn load_from_store(store_root: &Path) -> Result<Self, SchemaError> {
        Self::load(&store_root.join(CONFIG_FILE))
    }

    pub fn save(&self, path: &Path) -> Result<(), SchemaError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, toml::to_string_pretty(self)?)?;
        Ok(())
    }
}
