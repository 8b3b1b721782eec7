use super::{colorize_enabled, json_pretty, EXIT_SUCCESS};
use indicatif::HumanBytes;
use suitestore_core::Installer;

pub fn run(installer: &mut Installer, json: bool) -> Result<u8, String> {
    let records = installer.list().map_err(|e| e.to_string())?;
    if json {
        println!("{}", json_pretty(&records)?);
    } else if records.is_empty() {
        println!("no suites installed");
    } else {
        println!(
            "{:<8} {:<10} {:<20} {:<10} {:<10} {:>10}",
            "ID", "KIND", "NAME", "VERSION", "STATE", "SIZE"
        );
        for record in &records {
            let id = if record.is_component() {
                format!("{}/{}", record.suite_id, record.component_id)
            } else {
                record.suite_id.to_string()
            };
            println!(
                "{:<8} {:<10} {:<20} {:<10} {:<10} {:>10}",
                id,
                record.kind,
                record.display_name,
                record.suite_version,
                colorize_enabled(record.enabled),
                HumanBytes(record.suite_size).to_string()
            );
        }
    }
    Ok(EXIT_SUCCESS)
}
