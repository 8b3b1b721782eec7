use crate::codec::{RecordReader, RecordWriter};
use crate::layout::StoreLayout;
use crate::storage::Storage;
use crate::StoreError;
use std::sync::Arc;
use suitestore_schema::{Permission, SuiteId, SuiteSettings};

/// Per-suite settings: permission bytes, push interrupt setting, push
/// options and the enabled flag.
pub struct SettingsStore {
    layout: StoreLayout,
    storage: Arc<dyn Storage>,
}

impl SettingsStore {
    pub fn new(layout: StoreLayout, storage: Arc<dyn Storage>) -> Self {
        Self { layout, storage }
    }

    pub fn write(&self, suite_id: SuiteId, settings: &SuiteSettings) -> Result<u64, StoreError> {
        let bytes: Vec<u8> = settings.permissions.iter().map(|p| p.as_u8()).collect();
        let mut w = RecordWriter::new();
        w.write_bytes(&bytes)?;
        w.write_i32(settings.push_interrupt_setting);
        w.write_i32(settings.push_options);
        w.write_bool(settings.enabled);
        let size = self
            .storage
            .write(&self.layout.settings_file(suite_id), &w.into_bytes())?;
        Ok(size)
    }

    pub fn read(&self, suite_id: SuiteId) -> Result<SuiteSettings, StoreError> {
        let path = self.layout.settings_file(suite_id);
        let data = self.storage.read(&path)?;
        let mut r = RecordReader::new(&data, &path);

        let raw = r.read_bytes()?;
        let permissions = raw
            .iter()
            .map(|&b| {
                Permission::from_u8(b)
                    .ok_or_else(|| r.corrupted(format!("permission value {b}")))
            })
            .collect::<Result<Vec<_>, _>>()?;
        let settings = SuiteSettings {
            permissions,
            push_interrupt_setting: r.read_i32()?,
            push_options: r.read_i32()?,
            enabled: r.read_bool()?,
        };
        r.finish()?;
        Ok(settings)
    }
}
