use crate::codec::{RecordReader, RecordWriter};
use crate::layout::StoreLayout;
use crate::storage::Storage;
use crate::StoreError;
use std::sync::Arc;
use suitestore_schema::{PropertySet, SuiteId};

/// Per-suite merged property file.
///
/// A leading count of strings (two per pair) is followed by the JAD pairs
/// and then the manifest pairs, each as key then value. There is no marker
/// between the two groups.
pub struct PropertiesStore {
    layout: StoreLayout,
    storage: Arc<dyn Storage>,
}

impl PropertiesStore {
    pub fn new(layout: StoreLayout, storage: Arc<dyn Storage>) -> Self {
        Self { layout, storage }
    }

    pub fn write(
        &self,
        suite_id: SuiteId,
        jad_props: &PropertySet,
        jar_props: &PropertySet,
    ) -> Result<u64, StoreError> {
        let strings = jad_props.string_count() + jar_props.string_count();
        let count = i32::try_from(strings)
            .map_err(|_| StoreError::BadParams(format!("{strings} property strings")))?;

        let mut w = RecordWriter::new();
        w.write_i32(count);
        for (key, value) in jad_props.iter().chain(jar_props.iter()) {
            w.write_string(key)?;
            w.write_string(value)?;
        }
        let size = self
            .storage
            .write(&self.layout.properties_file(suite_id), &w.into_bytes())?;
        Ok(size)
    }

    /// The stored pairs in file order, JAD values first.
    pub fn read(&self, suite_id: SuiteId) -> Result<PropertySet, StoreError> {
        let path = self.layout.properties_file(suite_id);
        let data = self.storage.read(&path)?;
        let mut r = RecordReader::new(&data, &path);

        let strings = r.read_count("property", 4)?;
        if strings % 2 != 0 {
            return Err(r.corrupted(format!("odd property string count {strings}")));
        }
        let mut pairs: Vec<(String, String)> = r.reserve(strings / 2, "property list")?;
        for _ in 0..strings / 2 {
            let key = r.read_string()?;
            let value = r.read_string()?;
            pairs.push((key, value));
        }
        r.finish()?;
        Ok(PropertySet::from_pairs(pairs))
    }
}
