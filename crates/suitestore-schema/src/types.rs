//! Newtype wrappers for the integer identifiers used by the suite store.
//!
//! All newtypes serialize/deserialize as plain integers.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! int_newtype {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub i32);

        impl $name {
            pub const fn new(id: i32) -> Self {
                Self(id)
            }

            pub const fn get(self) -> i32 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i32> for $name {
            fn from(id: i32) -> Self {
                Self(id)
            }
        }

        impl From<$name> for i32 {
            fn from(id: $name) -> i32 {
                id.0
            }
        }
    };
}

int_newtype!(
    /// Identifier of an installed suite.
    SuiteId
);

int_newtype!(
    /// Identifier of a dynamic component attached to a suite.
    ComponentId
);

int_newtype!(
    /// Identifier of the storage volume holding a suite's jar.
    StorageId
);

/// Marks "no suite". Never assigned.
pub const UNUSED_SUITE_ID: SuiteId = SuiteId(0);
/// Reserved for the built-in suite. Never assigned to installed suites.
pub const INTERNAL_SUITE_ID: SuiteId = SuiteId(1);
/// Upper sentinel of the suite id space. Never assigned.
pub const MAX_SUITE_ID: SuiteId = SuiteId(i32::MAX);

/// Marks "no component". Regular suites carry this component id.
pub const UNUSED_COMPONENT_ID: ComponentId = ComponentId(0);
/// Upper sentinel of the component id space. Never assigned.
pub const MAX_COMPONENT_ID: ComponentId = ComponentId(i32::MAX);

impl Default for SuiteId {
    fn default() -> Self {
        UNUSED_SUITE_ID
    }
}

impl Default for ComponentId {
    fn default() -> Self {
        UNUSED_COMPONENT_ID
    }
}

/// The volume holding the registry and all per-suite metadata files.
pub const INTERNAL_STORAGE_ID: StorageId = StorageId(0);

/// Bounds of one identifier namespace: the overflow sentinel and the ids
/// that must never be handed out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdSpace {
    pub max: i32,
    pub reserved: &'static [i32],
}

impl IdSpace {
    pub const SUITES: IdSpace = IdSpace {
        max: MAX_SUITE_ID.0,
        reserved: &[UNUSED_SUITE_ID.0, INTERNAL_SUITE_ID.0],
    };

    pub const COMPONENTS: IdSpace = IdSpace {
        max: MAX_COMPONENT_ID.0,
        reserved: &[UNUSED_COMPONENT_ID.0],
    };

    pub fn is_reserved(&self, id: i32) -> bool {
        id == self.max || self.reserved.contains(&id)
    }
}
