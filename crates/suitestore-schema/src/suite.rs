use crate::types::{
    ComponentId, IdSpace, StorageId, SuiteId, INTERNAL_STORAGE_ID, UNUSED_COMPONENT_ID,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// What a registry record describes. Suites and dynamic components use
/// independent id namespaces.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ComponentType {
    #[default]
    RegularSuite,
    DynamicComponent,
}

impl ComponentType {
    pub const fn as_i32(self) -> i32 {
        match self {
            ComponentType::RegularSuite => 1,
            ComponentType::DynamicComponent => 2,
        }
    }

    pub const fn from_i32(value: i32) -> Option<Self> {
        match value {
            1 => Some(ComponentType::RegularSuite),
            2 => Some(ComponentType::DynamicComponent),
            _ => None,
        }
    }

    pub const fn id_space(self) -> IdSpace {
        match self {
            ComponentType::RegularSuite => IdSpace::SUITES,
            ComponentType::DynamicComponent => IdSpace::COMPONENTS,
        }
    }
}

impl fmt::Display for ComponentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComponentType::RegularSuite => write!(f, "suite"),
            ComponentType::DynamicComponent => write!(f, "component"),
        }
    }
}

/// One entry of the suite registry.
///
/// The same structure is handed to the installer as the description of the
/// suite being stored; at that point `jar_path` names the temporary download
/// and `jar_size`/`suite_size` are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuiteRecord {
    pub suite_id: SuiteId,
    pub component_id: ComponentId,
    pub storage_id: StorageId,
    pub kind: ComponentType,
    pub enabled: bool,
    pub trusted: bool,
    pub preinstalled: bool,
    pub number_of_midlets: i32,
    /// Seconds since the Unix epoch.
    pub install_time: i64,
    pub jad_size: u64,
    pub jar_size: u64,
    /// Jar plus every per-suite file written at install time. Best effort.
    pub suite_size: u64,
    /// blake3 digest of the stored jar; empty when unknown.
    #[serde(default)]
    pub jar_hash: Vec<u8>,
    pub jar_path: String,
    pub display_name: String,
    pub icon_name: Option<String>,
    pub midlet_to_run_class_name: Option<String>,
    pub suite_name: String,
    pub suite_vendor: String,
    pub suite_version: String,
}

impl Default for SuiteRecord {
    fn default() -> Self {
        Self {
            suite_id: SuiteId::default(),
            component_id: UNUSED_COMPONENT_ID,
            storage_id: INTERNAL_STORAGE_ID,
            kind: ComponentType::RegularSuite,
            enabled: true,
            trusted: false,
            preinstalled: false,
            number_of_midlets: 0,
            install_time: 0,
            jad_size: 0,
            jar_size: 0,
            suite_size: 0,
            jar_hash: Vec::new(),
            jar_path: String::new(),
            display_name: String::new(),
            icon_name: None,
            midlet_to_run_class_name: None,
            suite_name: String::new(),
            suite_vendor: String::new(),
            suite_version: String::new(),
        }
    }
}

impl SuiteRecord {
    /// A regular suite whose jar currently lives at `jar_path`.
    pub fn regular(suite_id: SuiteId, jar_path: impl Into<String>) -> Self {
        Self {
            suite_id,
            jar_path: jar_path.into(),
            ..Self::default()
        }
    }

    /// A dynamic component of `suite_id` whose jar currently lives at `jar_path`.
    pub fn component(
        suite_id: SuiteId,
        component_id: ComponentId,
        jar_path: impl Into<String>,
    ) -> Self {
        Self {
            suite_id,
            component_id,
            kind: ComponentType::DynamicComponent,
            jar_path: jar_path.into(),
            ..Self::default()
        }
    }

    /// The id that is unique within this record's namespace.
    pub fn namespace_id(&self) -> i32 {
        match self.kind {
            ComponentType::RegularSuite => self.suite_id.get(),
            ComponentType::DynamicComponent => self.component_id.get(),
        }
    }

    pub fn is_component(&self) -> bool {
        self.kind == ComponentType::DynamicComponent
    }
}
