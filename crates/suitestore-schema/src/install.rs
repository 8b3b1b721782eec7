use crate::properties::PropertySet;
use serde::{Deserialize, Serialize};

/// Provenance and trust metadata of an installed suite.
///
/// `jad_props`, `jar_props` and `verify_hash` travel with the install request
/// but are persisted by other stores; reading the install-info file back
/// leaves them empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstallInfo {
    /// Absent when the suite was installed from a bare JAR.
    pub jad_url: Option<String>,
    pub jar_url: String,
    /// Protection domain the suite was bound to.
    pub domain: String,
    pub trusted: bool,
    /// Certificate authorities, most trusted first. Empty for unsigned suites.
    pub auth_path: Vec<String>,
    #[serde(default)]
    pub jad_props: PropertySet,
    #[serde(default)]
    pub jar_props: PropertySet,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verify_hash: Option<Vec<u8>>,
}

impl InstallInfo {
    pub fn new(jar_url: impl Into<String>, domain: impl Into<String>) -> Self {
        Self {
            jar_url: jar_url.into(),
            domain: domain.into(),
            ..Self::default()
        }
    }

    pub fn is_signed(&self) -> bool {
        !self.auth_path.is_empty()
    }

    /// Copy of the persisted fields only.
    #[must_use]
    pub fn provenance(&self) -> InstallInfo {
        InstallInfo {
            jad_url: self.jad_url.clone(),
            jar_url: self.jar_url.clone(),
            domain: self.domain.clone(),
            trusted: self.trusted,
            auth_path: self.auth_path.clone(),
            ..InstallInfo::default()
        }
    }
}
