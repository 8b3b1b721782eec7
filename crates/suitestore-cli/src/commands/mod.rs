pub mod completions;
pub mod create_id;
pub mod enable;
pub mod info;
pub mod install;
pub mod list;
pub mod recover;
pub mod remove;
pub mod verify_store;

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;
use suitestore_core::{Installer, StoreLock};
use suitestore_schema::SuiteRecord;

pub const EXIT_SUCCESS: u8 = 0;
pub const EXIT_FAILURE: u8 = 1;
pub const EXIT_BAD_INPUT: u8 = 2;
pub const EXIT_STORE_ERROR: u8 = 3;

pub fn json_pretty(value: &impl serde::Serialize) -> Result<String, String> {
    serde_json::to_string_pretty(value).map_err(|e| format!("JSON serialization failed: {e}"))
}

fn plain_style() -> ProgressStyle {
    ProgressStyle::with_template("{msg}").unwrap_or_else(|_| ProgressStyle::default_spinner())
}

pub fn spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    let style = ProgressStyle::with_template("{spinner:.cyan} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]);
    pb.set_style(style);
    pb.set_message(msg.to_owned());
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

pub fn spin_ok(pb: &ProgressBar, msg: &str) {
    pb.set_style(plain_style());
    pb.finish_with_message(format!("✓ {msg}"));
}

pub fn spin_fail(pb: &ProgressBar, msg: &str) {
    pb.set_style(plain_style());
    pb.finish_with_message(format!("✗ {msg}"));
}

pub fn colorize_enabled(enabled: bool) -> String {
    use console::Style;
    if enabled {
        Style::new().green().apply_to("enabled").to_string()
    } else {
        Style::new().dim().apply_to("disabled").to_string()
    }
}

/// Take the process-level store lock for a mutating command.
pub fn lock_store(installer: &Installer) -> Result<StoreLock, String> {
    StoreLock::acquire(&installer.layout().lock_file()).map_err(|e| format!("store lock: {e}"))
}

/// `suite 5` or `component 3 of suite 5`.
pub fn describe(record: &SuiteRecord) -> String {
    if record.is_component() {
        format!("component {} of suite {}", record.component_id, record.suite_id)
    } else {
        format!("suite {}", record.suite_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use suitestore_schema::{ComponentId, SuiteId};

    #[test]
    fn json_pretty_serializes_record() {
        let record = SuiteRecord::regular(SuiteId(4), "/s/00000004.jar");
        let result = json_pretty(&record).unwrap();
        assert!(result.contains("\"jar_path\""));
        assert!(result.contains("00000004.jar"));
    }

    #[test]
    fn colorize_keeps_text() {
        assert!(colorize_enabled(true).contains("enabled"));
        assert!(colorize_enabled(false).contains("disabled"));
    }

    #[test]
    fn describe_names_owner_of_component() {
        assert_eq!(describe(&SuiteRecord::regular(SuiteId(4), "")), "suite 4");
        assert_eq!(
            describe(&SuiteRecord::component(SuiteId(4), ComponentId(9), "")),
            "component 9 of suite 4"
        );
    }

    #[test]
    fn exit_codes_are_distinct() {
        assert_ne!(EXIT_SUCCESS, EXIT_FAILURE);
        assert_ne!(EXIT_FAILURE, EXIT_BAD_INPUT);
        assert_ne!(EXIT_BAD_INPUT, EXIT_STORE_ERROR);
    }

    #[test]
    fn spinner_finishes() {
        let pb = spinner("testing...");
        spin_ok(&pb, "done");
        let pb = spinner("testing...");
        spin_fail(&pb, "failed");
    }

    #[test]
    fn lock_store_creates_lock_file() {
        let dir = tempfile::tempdir().unwrap();
        let installer = Installer::open(dir.path()).unwrap();
        let _lock = lock_store(&installer).unwrap();
        assert!(installer.layout().lock_file().exists());
    }
}
