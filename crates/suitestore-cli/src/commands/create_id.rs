use super::{json_pretty, lock_store, EXIT_SUCCESS};
use suitestore_core::Installer;

pub fn run(installer: &mut Installer, component: bool, json: bool) -> Result<u8, String> {
    let _lock = lock_store(installer)?;
    let (kind, id) = if component {
        let id = installer
            .create_component_id()
            .map_err(|e| e.to_string())?;
        ("component", id.get())
    } else {
        let id = installer.create_suite_id().map_err(|e| e.to_string())?;
        ("suite", id.get())
    };

    if json {
        let payload = serde_json::json!({ "kind": kind, "id": id });
        println!("{}", json_pretty(&payload)?);
    } else {
        println!("{id}");
    }
    Ok(EXIT_SUCCESS)
}
