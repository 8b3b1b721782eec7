use super::{colorize_enabled, json_pretty, lock_store, EXIT_SUCCESS};
use suitestore_core::Installer;
use suitestore_schema::SuiteId;

pub fn run(installer: &mut Installer, suite_id: i32, enabled: bool, json: bool) -> Result<u8, String> {
    let _lock = lock_store(installer)?;
    let record = installer
        .set_suite_enabled(SuiteId(suite_id), enabled)
        .map_err(|e| e.to_string())?;

    if json {
        let payload = serde_json::json!({
            "suite_id": record.suite_id,
            "enabled": record.enabled,
        });
        println!("{}", json_pretty(&payload)?);
    } else {
        println!("suite {}: {}", record.suite_id, colorize_enabled(record.enabled));
    }
    Ok(EXIT_SUCCESS)
}
