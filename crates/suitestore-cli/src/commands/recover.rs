use super::{json_pretty, lock_store, EXIT_SUCCESS};
use suitestore_core::Installer;

pub fn run(installer: &mut Installer, json: bool) -> Result<u8, String> {
    let _lock = lock_store(installer)?;
    let count = installer.recover().map_err(|e| e.to_string())?;
    if json {
        let payload = serde_json::json!({ "rolled_back": count });
        println!("{}", json_pretty(&payload)?);
    } else if count == 0 {
        println!("nothing to recover");
    } else {
        println!("rolled back {count} interrupted operation(s)");
    }
    Ok(EXIT_SUCCESS)
}
