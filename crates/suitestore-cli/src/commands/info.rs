use super::{colorize_enabled, json_pretty, EXIT_SUCCESS};
use indicatif::HumanBytes;
use suitestore_core::Installer;
use suitestore_schema::SuiteId;

pub fn run(installer: &mut Installer, suite_id: i32, json: bool) -> Result<u8, String> {
    let suite_id = SuiteId(suite_id);
    let record = installer
        .find_suite(suite_id)
        .map_err(|e| e.to_string())?
        .ok_or_else(|| format!("not found: suite {suite_id}"))?;
    let info = installer
        .get_suite_install_info(suite_id)
        .map_err(|e| e.to_string())?;
    let settings = installer.read_settings(suite_id).map_err(|e| e.to_string())?;
    let properties = installer
        .read_properties(suite_id)
        .map_err(|e| e.to_string())?;
    let components = installer
        .components_of(suite_id)
        .map_err(|e| e.to_string())?;

    if json {
        let payload = serde_json::json!({
            "suite": record,
            "install_info": info,
            "settings": settings,
            "properties": properties,
            "components": components,
        });
        println!("{}", json_pretty(&payload)?);
        return Ok(EXIT_SUCCESS);
    }

    println!("suite_id:    {}", record.suite_id);
    println!("name:        {}", record.display_name);
    println!("vendor:      {}", record.suite_vendor);
    println!("version:     {}", record.suite_version);
    println!("state:       {}", colorize_enabled(record.enabled));
    println!("midlets:     {}", record.number_of_midlets);
    println!("jar:         {}", record.jar_path);
    println!("jar_size:    {}", HumanBytes(record.jar_size));
    println!("footprint:   {}", HumanBytes(record.suite_size));
    println!("jad_url:     {}", info.jad_url.as_deref().unwrap_or("(none)"));
    println!("jar_url:     {}", info.jar_url);
    println!("domain:      {}", info.domain);
    println!("trusted:     {}", info.trusted);
    if info.is_signed() {
        println!("signed by:   {}", info.auth_path.join(" > "));
    }
    println!("properties:  {}", properties.len());
    println!("permissions: {}", settings.permissions.len());
    for component in &components {
        println!(
            "component:   {} ({})",
            component.component_id, component.display_name
        );
    }
    Ok(EXIT_SUCCESS)
}
