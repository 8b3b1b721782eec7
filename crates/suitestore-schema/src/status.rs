use serde::{Deserialize, Serialize};
use std::fmt;

/// Coarse outcome code of a store operation, as reported to listeners.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Status {
    AllOk,
    /// Caller contract violation. Nothing was changed.
    BadParams,
    OutOfMemory,
    IoError,
    /// Id space or disk space exhausted.
    OutOfStorage,
    SuiteLocked,
    SuiteCorrupted,
    NotFound,
}

impl Status {
    pub fn is_ok(self) -> bool {
        self == Status::AllOk
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Status::AllOk => "ALL_OK",
            Status::BadParams => "BAD_PARAMS",
            Status::OutOfMemory => "OUT_OF_MEMORY",
            Status::IoError => "IO_ERROR",
            Status::OutOfStorage => "OUT_OF_STORAGE",
            Status::SuiteLocked => "SUITE_LOCKED",
            Status::SuiteCorrupted => "SUITE_CORRUPTED_ERROR",
            Status::NotFound => "NOT_FOUND",
        };
        f.write_str(s)
    }
}
