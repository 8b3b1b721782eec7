use crate::CoreError;
use std::fmt;

/// Progress of a single `store_suite` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallPhase {
    Idle,
    TransactionOpen,
    JarStored,
    Registered,
    InfoWritten,
    PropsWritten,
    SettingsWritten,
    IconCached,
    Committed,
}

impl fmt::Display for InstallPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            InstallPhase::Idle => "idle",
            InstallPhase::TransactionOpen => "transaction-open",
            InstallPhase::JarStored => "jar-stored",
            InstallPhase::Registered => "registered",
            InstallPhase::InfoWritten => "info-written",
            InstallPhase::PropsWritten => "props-written",
            InstallPhase::SettingsWritten => "settings-written",
            InstallPhase::IconCached => "icon-cached",
            InstallPhase::Committed => "committed",
        };
        f.write_str(name)
    }
}

/// Dynamic components skip the metadata writes, so `Registered` may go
/// straight to `Committed`. Any non-idle phase may fall back to `Idle`.
pub fn validate_transition(from: InstallPhase, to: InstallPhase) -> Result<(), CoreError> {
    use InstallPhase::{
        Committed, IconCached, Idle, InfoWritten, JarStored, PropsWritten, Registered,
        SettingsWritten, TransactionOpen,
    };

    let valid = matches!(
        (from, to),
        (Idle, TransactionOpen)
            | (TransactionOpen, JarStored)
            | (JarStored, Registered)
            | (Registered, InfoWritten | Committed)
            | (InfoWritten, PropsWritten)
            | (PropsWritten, SettingsWritten)
            | (SettingsWritten, IconCached | Committed)
            | (IconCached, Committed)
    ) || (from != Idle && to == Idle);

    if valid {
        Ok(())
    } else {
        Err(CoreError::InvalidTransition {
            from: from.to_string(),
            to: to.to_string(),
        })
    }
}
