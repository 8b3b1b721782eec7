use crate::install_info::InstallInfoStore;
use crate::jar::JarStore;
use crate::layout::StoreLayout;
use crate::properties::PropertiesStore;
use crate::registry::SuiteRegistry;
use crate::settings::SettingsStore;
use crate::storage::Storage;
use crate::StoreError;
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;
use suitestore_schema::SuiteRecord;

#[derive(Debug, Default, Serialize)]
pub struct IntegrityReport {
    pub checked: usize,
    pub passed: usize,
    pub failed: Vec<IntegrityFailure>,
}

#[derive(Debug, Serialize)]
pub struct IntegrityFailure {
    /// `suite 5` or `component 3`.
    pub entry: String,
    pub reason: String,
}

/// Check the footprint of every registry entry.
///
/// Each entry needs its jar, with a matching hash when one was recorded.
/// Regular suites additionally need install-info, properties and settings
/// files that decode cleanly. Only an unreadable registry is an error.
pub fn verify_store_integrity(
    layout: &StoreLayout,
    storage: Arc<dyn Storage>,
) -> Result<IntegrityReport, StoreError> {
    let mut registry = SuiteRegistry::new(layout.clone(), storage.clone());
    registry.load()?;

    let jars = JarStore::new(layout.clone(), storage.clone());
    let infos = InstallInfoStore::new(layout.clone(), storage.clone());
    let props = PropertiesStore::new(layout.clone(), storage.clone());
    let settings = SettingsStore::new(layout.clone(), storage);

    let mut report = IntegrityReport {
        checked: registry.len(),
        ..Default::default()
    };

    for record in registry.iter() {
        let entry = format!("{} {}", record.kind, record.namespace_id());
        let outcome = check_jar(&jars, record).and_then(|()| {
            if record.is_component() {
                return Ok(());
            }
            infos
                .read(record.suite_id)
                .map_err(|e| format!("install info: {e}"))?;
            props
                .read(record.suite_id)
                .map_err(|e| format!("properties: {e}"))?;
            settings
                .read(record.suite_id)
                .map_err(|e| format!("settings: {e}"))?;
            Ok(())
        });
        match outcome {
            Ok(()) => report.passed += 1,
            Err(reason) => report.failed.push(IntegrityFailure { entry, reason }),
        }
    }

    Ok(report)
}

fn check_jar(jars: &JarStore, record: &SuiteRecord) -> Result<(), String> {
    let jar = Path::new(&record.jar_path);
    let size = jars
        .size_of(jar)
        .map_err(|e| format!("jar {}: {e}", jar.display()))?;
    if size != record.jar_size {
        return Err(format!(
            "jar size mismatch: recorded {}, found {size}",
            record.jar_size
        ));
    }
    if !record.jar_hash.is_empty() {
        let actual = jars.hash(jar).map_err(|e| format!("jar hash: {e}"))?;
        if actual != record.jar_hash {
            return Err("jar hash mismatch".to_owned());
        }
    }
    Ok(())
}
