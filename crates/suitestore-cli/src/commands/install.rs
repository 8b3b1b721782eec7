use super::{describe, json_pretty, lock_store, spin_fail, spin_ok, spinner, EXIT_SUCCESS};
use indicatif::HumanBytes;
use std::fs;
use std::path::{Path, PathBuf};
use suitestore_core::{Installer, ResourceDirCache};
use suitestore_schema::{InstallInfo, PropertySet, StorageId, SuiteId, SuiteRecord, SuiteSettings};

#[derive(Debug)]
pub struct InstallArgs {
    pub jar: PathBuf,
    pub jad: Option<PathBuf>,
    pub manifest: Option<PathBuf>,
    pub jad_url: Option<String>,
    pub jar_url: Option<String>,
    pub domain: String,
    pub trusted: bool,
    pub auth_path: Vec<String>,
    pub storage: i32,
    pub suite_id: Option<i32>,
    pub component_of: Option<i32>,
    pub name: Option<String>,
    pub resources: Option<PathBuf>,
}

pub fn run(installer: &mut Installer, args: &InstallArgs, json: bool) -> Result<u8, String> {
    if !args.jar.is_file() {
        return Err(format!("invalid input: {} is not a file", args.jar.display()));
    }
    let jad = read_properties(args.jad.as_deref())?;
    let manifest = read_properties(args.manifest.as_deref())?;
    let jad_size = match &args.jad {
        Some(path) => fs::metadata(path)
            .map(|m| m.len())
            .map_err(|e| format!("invalid input: {}: {e}", path.display()))?,
        None => 0,
    };

    if let Some(dir) = &args.resources {
        installer.set_image_cache(ResourceDirCache::new(dir));
    }

    let _lock = lock_store(installer)?;
    let mut suite = describe_suite(installer, args, &jad, &manifest)?;
    suite.jad_size = jad_size;

    let info = InstallInfo {
        jad_url: args.jad_url.clone(),
        jar_url: args
            .jar_url
            .clone()
            .or_else(|| jad.get("MIDlet-Jar-URL").map(str::to_owned))
            .unwrap_or_else(|| args.jar.display().to_string()),
        domain: args.domain.clone(),
        trusted: args.trusted,
        auth_path: args.auth_path.clone(),
        jad_props: jad,
        jar_props: manifest,
        verify_hash: None,
    };

    let download = stage_download(installer, &args.jar)?;
    suite.jar_path = download.display().to_string();

    let pb = if json {
        None
    } else {
        Some(spinner(&format!("installing {}...", describe(&suite))))
    };
    let record = match installer.store_suite(&info, &SuiteSettings::default(), &suite) {
        Ok(record) => {
            if let Some(ref pb) = pb {
                spin_ok(pb, &format!("installed {}", describe(&record)));
            }
            record
        }
        Err(e) => {
            if let Some(ref pb) = pb {
                spin_fail(pb, "install failed");
            }
            let _ = fs::remove_file(&download);
            return Err(e.to_string());
        }
    };

    if json {
        let payload = serde_json::json!({
            "suite_id": record.suite_id,
            "component_id": record.component_id,
            "kind": record.kind.to_string(),
            "jar_path": record.jar_path,
            "jar_size": record.jar_size,
            "suite_size": record.suite_size,
            "status": "installed",
        });
        println!("{}", json_pretty(&payload)?);
    } else {
        println!("jar:       {}", record.jar_path);
        println!("footprint: {}", HumanBytes(record.suite_size));
    }
    Ok(EXIT_SUCCESS)
}

fn read_properties(path: Option<&Path>) -> Result<PropertySet, String> {
    let Some(path) = path else {
        return Ok(PropertySet::new());
    };
    let text = fs::read_to_string(path)
        .map_err(|e| format!("invalid input: cannot read {}: {e}", path.display()))?;
    PropertySet::parse_jad(&text).map_err(|e| format!("invalid input: {}: {e}", path.display()))
}

/// Registry record for the suite being installed, ids allocated as needed.
fn describe_suite(
    installer: &mut Installer,
    args: &InstallArgs,
    jad: &PropertySet,
    manifest: &PropertySet,
) -> Result<SuiteRecord, String> {
    let mut record = if let Some(owner) = args.component_of {
        let owner = SuiteId(owner);
        if installer
            .find_suite(owner)
            .map_err(|e| e.to_string())?
            .is_none()
        {
            return Err(format!("invalid input: suite {owner} is not installed"));
        }
        let component_id = installer
            .create_component_id()
            .map_err(|e| e.to_string())?;
        SuiteRecord::component(owner, component_id, "")
    } else {
        let suite_id = match args.suite_id {
            Some(id) => SuiteId(id),
            None => installer.create_suite_id().map_err(|e| e.to_string())?,
        };
        SuiteRecord::regular(suite_id, "")
    };

    let props = jad.chain(manifest);
    record.storage_id = StorageId(args.storage);
    record.trusted = args.trusted;
    record.suite_name = props.get("MIDlet-Name").unwrap_or_default().to_owned();
    record.suite_vendor = props.get("MIDlet-Vendor").unwrap_or_default().to_owned();
    record.suite_version = props.get("MIDlet-Version").unwrap_or_default().to_owned();
    record.display_name = args
        .name
        .clone()
        .unwrap_or_else(|| record.suite_name.clone());
    record.icon_name = props.get("MIDlet-Icon").map(str::to_owned);
    record.number_of_midlets = count_midlets(&props);
    if record.number_of_midlets == 1 {
        record.midlet_to_run_class_name = props.get("MIDlet-1").and_then(midlet_class);
    }
    Ok(record)
}

/// Number of consecutive `MIDlet-<n>` attributes starting at 1.
fn count_midlets(props: &PropertySet) -> i32 {
    let mut n = 0;
    while props.get(&format!("MIDlet-{}", n + 1)).is_some() {
        n += 1;
    }
    n
}

/// Class name from a `MIDlet-<n>: name, icon, class` attribute.
fn midlet_class(value: &str) -> Option<String> {
    value
        .split(',')
        .nth(2)
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_owned)
}

/// Copy the jar into the store's staging area; the installer moves it from
/// there to its final place.
fn stage_download(installer: &Installer, jar: &Path) -> Result<PathBuf, String> {
    let staging = installer.layout().root().join("staging");
    fs::create_dir_all(&staging).map_err(|e| format!("store error: {e}"))?;
    let (_, path) = tempfile::Builder::new()
        .prefix("download-")
        .suffix(".jar")
        .tempfile_in(&staging)
        .and_then(|f| f.keep().map_err(|e| e.error))
        .map_err(|e| format!("store error: {e}"))?;
    fs::copy(jar, &path).map_err(|e| format!("invalid input: cannot copy {}: {e}", jar.display()))?;
    Ok(path)
}
