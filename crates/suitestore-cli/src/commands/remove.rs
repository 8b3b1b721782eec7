use super::{json_pretty, lock_store, EXIT_SUCCESS};
use suitestore_core::Installer;
use suitestore_schema::{ComponentId, SuiteId};

pub fn run(installer: &mut Installer, id: i32, component: bool, json: bool) -> Result<u8, String> {
    let _lock = lock_store(installer)?;
    let target = if component {
        installer
            .remove_component(ComponentId(id))
            .map_err(|e| e.to_string())?;
        format!("component {id}")
    } else {
        installer
            .remove_suite(SuiteId(id))
            .map_err(|e| e.to_string())?;
        format!("suite {id}")
    };

    if json {
        let payload = serde_json::json!({
            "removed": target,
            "status": "removed",
        });
        println!("{}", json_pretty(&payload)?);
    } else {
        println!("removed {target}");
    }
    Ok(EXIT_SUCCESS)
}
