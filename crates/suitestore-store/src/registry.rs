use crate::codec::{RecordReader, RecordWriter};
use crate::layout::StoreLayout;
use crate::storage::Storage;
use crate::StoreError;
use std::collections::HashMap;
use std::sync::Arc;
use suitestore_schema::{
    ComponentId, ComponentType, StorageId, SuiteId, SuiteRecord, INTERNAL_SUITE_ID,
};
use tracing::{debug, warn};

type RecordKey = (ComponentType, i32);

fn key_of(record: &SuiteRecord) -> RecordKey {
    (record.kind, record.namespace_id())
}

/// Outcome of [`SuiteRegistry::upsert`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Upsert {
    /// A new entry was placed at the head of the list.
    Added,
    /// An entry with the same id was replaced in place.
    Replaced { previous: SuiteRecord },
    /// As `Replaced`, but the previous entry's metadata files were missing.
    /// The new entry is stored anyway so a reinstall repairs the suite.
    ReplacedCorrupted { previous: SuiteRecord },
}

/// In-memory view of `_suites.dat`, the index of everything installed.
///
/// Entries are kept in an arena ordered oldest first, with an id index on the
/// side; iteration yields the newest entry first, which is also the on-disk
/// order. Every mutation rewrites the whole file and is undone in memory when
/// that write fails, so the list only ever reflects what is durable.
pub struct SuiteRegistry {
    layout: StoreLayout,
    storage: Arc<dyn Storage>,
    records: Vec<SuiteRecord>,
    index: HashMap<RecordKey, usize>,
    loaded: bool,
}

impl SuiteRegistry {
    pub fn new(layout: StoreLayout, storage: Arc<dyn Storage>) -> Self {
        Self {
            layout,
            storage,
            records: Vec::new(),
            index: HashMap::new(),
            loaded: false,
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Read the registry file unless it has already been read.
    pub fn load(&mut self) -> Result<(), StoreError> {
        if self.loaded {
            return Ok(());
        }
        self.reload()
    }

    /// Discard the in-memory list and read the registry file again.
    /// A missing file is an empty registry.
    pub fn reload(&mut self) -> Result<(), StoreError> {
        let path = self.layout.registry_file();
        let data = match self.storage.read(&path) {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => return Err(e.into()),
        };

        let mut reader = RecordReader::new(&data, &path);
        let mut on_disk = Vec::new();
        while !reader.is_at_end() {
            on_disk.push(decode_record(&mut reader)?);
        }
        on_disk.reverse();

        let mut index = HashMap::with_capacity(on_disk.len());
        for (i, record) in on_disk.iter().enumerate() {
            if index.insert(key_of(record), i).is_some() {
                return Err(StoreError::corrupted(
                    &path,
                    format!("duplicate {} id {}", record.kind, record.namespace_id()),
                ));
            }
        }

        debug!("loaded {} registry entries from {}", on_disk.len(), path.display());
        self.records = on_disk;
        self.index = index;
        self.loaded = true;
        Ok(())
    }

    /// Number of live entries, suites and components alike.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Entries newest first.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &SuiteRecord> {
        self.records.iter().rev()
    }

    pub fn find_suite(&self, suite_id: SuiteId) -> Option<&SuiteRecord> {
        self.find(ComponentType::RegularSuite, suite_id.get())
    }

    pub fn find_component(&self, component_id: ComponentId) -> Option<&SuiteRecord> {
        self.find(ComponentType::DynamicComponent, component_id.get())
    }

    pub fn find(&self, kind: ComponentType, id: i32) -> Option<&SuiteRecord> {
        self.index.get(&(kind, id)).map(|&i| &self.records[i])
    }

    /// Dynamic components attached to `suite_id`, newest first.
    pub fn components_of(&self, suite_id: SuiteId) -> impl Iterator<Item = &SuiteRecord> {
        self.iter()
            .filter(move |r| r.is_component() && r.suite_id == suite_id)
    }

    /// Insert `record`, or replace the entry with the same id in its current
    /// list position, then persist the whole list.
    pub fn upsert(&mut self, record: SuiteRecord) -> Result<Upsert, StoreError> {
        self.load()?;
        if record.namespace_id() == 0 {
            return Err(StoreError::BadParams(format!(
                "{} record without an id",
                record.kind
            )));
        }
        if record.kind == ComponentType::RegularSuite && record.suite_id == INTERNAL_SUITE_ID {
            return Err(StoreError::BadParams(
                "the internal suite id cannot be registered".to_owned(),
            ));
        }

        let key = key_of(&record);
        match self.index.get(&key).copied() {
            Some(pos) => {
                let corrupted = self.is_footprint_broken(&self.records[pos]);
                let previous = std::mem::replace(&mut self.records[pos], record);
                if let Err(e) = self.persist() {
                    self.records[pos] = previous;
                    return Err(e);
                }
                debug!("registry: replaced {} {}", key.0, key.1);
                if corrupted {
                    warn!(
                        "registry: previous entry for {} {} had missing metadata files",
                        key.0, key.1
                    );
                    Ok(Upsert::ReplacedCorrupted { previous })
                } else {
                    Ok(Upsert::Replaced { previous })
                }
            }
            None => {
                self.records.push(record);
                self.index.insert(key, self.records.len() - 1);
                if let Err(e) = self.persist() {
                    self.records.pop();
                    self.index.remove(&key);
                    return Err(e);
                }
                debug!("registry: added {} {}", key.0, key.1);
                Ok(Upsert::Added)
            }
        }
    }

    fn is_footprint_broken(&self, record: &SuiteRecord) -> bool {
        if record.is_component() {
            return false;
        }
        !self
            .storage
            .exists(&self.layout.install_info_file(record.suite_id))
            || !self
                .storage
                .exists(&self.layout.settings_file(record.suite_id))
    }

    /// Remove every entry matching `pred` and persist. Returns the removed
    /// entries, newest first. Nothing is written when nothing matches.
    pub fn remove_where(
        &mut self,
        mut pred: impl FnMut(&SuiteRecord) -> bool,
    ) -> Result<Vec<SuiteRecord>, StoreError> {
        self.load()?;
        if !self.records.iter().any(&mut pred) {
            return Ok(Vec::new());
        }

        let snapshot = self.records.clone();
        let mut removed = Vec::new();
        self.records.retain(|r| {
            if pred(r) {
                removed.push(r.clone());
                false
            } else {
                true
            }
        });
        self.rebuild_index();

        if let Err(e) = self.persist() {
            self.records = snapshot;
            self.rebuild_index();
            return Err(e);
        }
        removed.reverse();
        Ok(removed)
    }

    /// Apply `f` to one entry in place and persist. Returns the updated entry.
    pub fn update(
        &mut self,
        kind: ComponentType,
        id: i32,
        f: impl FnOnce(&mut SuiteRecord),
    ) -> Result<SuiteRecord, StoreError> {
        self.load()?;
        let pos = *self
            .index
            .get(&(kind, id))
            .ok_or_else(|| StoreError::NotFound(format!("{kind} {id}")))?;

        let previous = self.records[pos].clone();
        f(&mut self.records[pos]);
        if key_of(&self.records[pos]) != (kind, id) {
            self.records[pos] = previous;
            return Err(StoreError::BadParams(format!(
                "update of {kind} {id} changed its identity"
            )));
        }
        if let Err(e) = self.persist() {
            self.records[pos] = previous;
            return Err(e);
        }
        Ok(self.records[pos].clone())
    }

    /// Rewrite the registry file from the in-memory list. Returns its size.
    pub fn persist(&self) -> Result<u64, StoreError> {
        let mut w = RecordWriter::new();
        for record in self.iter() {
            encode_record(&mut w, record)?;
        }
        let size = self
            .storage
            .write(&self.layout.registry_file(), &w.into_bytes())?;
        Ok(size)
    }

    fn rebuild_index(&mut self) {
        self.index = self
            .records
            .iter()
            .enumerate()
            .map(|(i, r)| (key_of(r), i))
            .collect();
    }
}

fn encode_record(w: &mut RecordWriter, r: &SuiteRecord) -> Result<(), StoreError> {
    w.write_i32(r.suite_id.get());
    w.write_i32(r.component_id.get());
    w.write_i32(r.storage_id.get());
    w.write_i32(r.kind.as_i32());
    w.write_bool(r.enabled);
    w.write_bool(r.trusted);
    w.write_bool(r.preinstalled);
    w.write_i32(r.number_of_midlets);
    w.write_i64(r.install_time);
    w.write_u64(r.jad_size);
    w.write_u64(r.jar_size);
    w.write_u64(r.suite_size);
    w.write_bytes(&r.jar_hash)?;
    w.write_string(&r.jar_path)?;
    w.write_string(&r.display_name)?;
    w.write_opt_string(r.icon_name.as_deref())?;
    w.write_opt_string(r.midlet_to_run_class_name.as_deref())?;
    w.write_string(&r.suite_name)?;
    w.write_string(&r.suite_vendor)?;
    w.write_string(&r.suite_version)?;
    Ok(())
}

fn decode_record(r: &mut RecordReader<'_>) -> Result<SuiteRecord, StoreError> {
    let suite_id = SuiteId(r.read_i32()?);
    let component_id = ComponentId(r.read_i32()?);
    let storage_id = StorageId(r.read_i32()?);
    let raw_kind = r.read_i32()?;
    let kind = ComponentType::from_i32(raw_kind)
        .ok_or_else(|| r.corrupted(format!("unknown record type {raw_kind}")))?;
    Ok(SuiteRecord {
        suite_id,
        component_id,
        storage_id,
        kind,
        enabled: r.read_bool()?,
        trusted: r.read_bool()?,
        preinstalled: r.read_bool()?,
        number_of_midlets: r.read_i32()?,
        install_time: r.read_i64()?,
        jad_size: r.read_u64()?,
        jar_size: r.read_u64()?,
        suite_size: r.read_u64()?,
        jar_hash: r.read_bytes()?,
        jar_path: r.read_string()?,
        display_name: r.read_string()?,
        icon_name: r.read_opt_string()?,
        midlet_to_run_class_name: r.read_opt_string()?,
        suite_name: r.read_string()?,
        suite_vendor: r.read_string()?,
        suite_version: r.read_string()?,
    })
}
