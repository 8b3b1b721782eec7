use serde::{Deserialize, Serialize};
use std::fmt;

/// Value stored in one permission slot of the settings file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Permission {
    Denied,
    Allowed,
    Ask,
}

impl Permission {
    pub const fn as_u8(self) -> u8 {
        match self {
            Permission::Denied => 0,
            Permission::Allowed => 1,
            Permission::Ask => 2,
        }
    }

    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Permission::Denied),
            1 => Some(Permission::Allowed),
            2 => Some(Permission::Ask),
            _ => None,
        }
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Permission::Denied => write!(f, "denied"),
            Permission::Allowed => write!(f, "allowed"),
            Permission::Ask => write!(f, "ask"),
        }
    }
}

/// User-adjustable settings of an installed suite.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuiteSettings {
    pub permissions: Vec<Permission>,
    /// Whether this suite may interrupt others on push; uses the
    /// [`Permission`] byte values.
    pub push_interrupt_setting: i32,
    pub push_options: i32,
    pub enabled: bool,
}

impl Default for SuiteSettings {
    fn default() -> Self {
        Self {
            permissions: Vec::new(),
            push_interrupt_setting: i32::from(Permission::Ask.as_u8()),
            push_options: 0,
            enabled: true,
        }
    }
}

impl SuiteSettings {
    /// Settings granting every one of `slots` permissions, used when the JAD
    /// asks for `allow_all_permissions`.
    pub fn allow_all(slots: usize) -> Self {
        Self {
            permissions: vec![Permission::Allowed; slots],
            push_interrupt_setting: i32::from(Permission::Allowed.as_u8()),
            push_options: 0,
            enabled: true,
        }
    }
}
