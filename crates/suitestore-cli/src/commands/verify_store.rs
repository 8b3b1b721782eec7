use super::{json_pretty, EXIT_STORE_ERROR, EXIT_SUCCESS};
use suitestore_core::Installer;

pub fn run(installer: &Installer, json: bool) -> Result<u8, String> {
    let report = installer.verify().map_err(|e| e.to_string())?;

    if json {
        let payload = serde_json::json!({
            "checked": report.checked,
            "passed": report.passed,
            "failed": report.failed.len(),
            "failures": report.failed,
        });
        println!("{}", json_pretty(&payload)?);
    } else {
        println!(
            "store integrity: {}/{} entries passed",
            report.passed, report.checked
        );
        for f in &report.failed {
            println!("  FAIL {}: {}", f.entry, f.reason);
        }
    }

    if report.failed.is_empty() {
        Ok(EXIT_SUCCESS)
    } else {
        Ok(EXIT_STORE_ERROR)
    }
}
