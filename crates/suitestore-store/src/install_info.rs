use crate::codec::{RecordReader, RecordWriter};
use crate::layout::StoreLayout;
use crate::storage::Storage;
use crate::StoreError;
use std::sync::Arc;
use suitestore_schema::{InstallInfo, SuiteId};
use tracing::debug;

/// Per-suite provenance file, plus the optional verify-hash side file.
///
/// Layout: jad url (nullable string), jar url, domain, trusted flag,
/// auth-path count, then that many strings.
pub struct InstallInfoStore {
    layout: StoreLayout,
    storage: Arc<dyn Storage>,
}

impl InstallInfoStore {
    pub fn new(layout: StoreLayout, storage: Arc<dyn Storage>) -> Self {
        Self { layout, storage }
    }

    /// Replace the install-info file of `suite_id`. Returns its size.
    pub fn write(&self, suite_id: SuiteId, info: &InstallInfo) -> Result<u64, StoreError> {
        let mut w = RecordWriter::new();
        w.write_opt_string(info.jad_url.as_deref())?;
        w.write_string(&info.jar_url)?;
        w.write_string(&info.domain)?;
        w.write_bool(info.trusted);
        let count = i32::try_from(info.auth_path.len()).map_err(|_| {
            StoreError::BadParams(format!("{} auth path entries", info.auth_path.len()))
        })?;
        w.write_i32(count);
        for ca in &info.auth_path {
            w.write_string(ca)?;
        }

        let path = self.layout.install_info_file(suite_id);
        let size = self.storage.write(&path, &w.into_bytes())?;
        debug!("wrote install info for suite {suite_id} ({size} bytes)");
        Ok(size)
    }

    /// Read back the persisted fields. Properties and the verify hash are
    /// left empty. A record that cannot be read completely is discarded.
    pub fn read(&self, suite_id: SuiteId) -> Result<InstallInfo, StoreError> {
        let path = self.layout.install_info_file(suite_id);
        let data = self.storage.read(&path)?;
        let mut r = RecordReader::new(&data, &path);

        let jad_url = r.read_opt_string()?;
        let jar_url = r.read_string()?;
        let domain = r.read_string()?;
        let trusted = r.read_bool()?;
        let count = r.read_count("auth path", 4)?;
        let mut auth_path = r.reserve(count, "auth path")?;
        for _ in 0..count {
            auth_path.push(r.read_string()?);
        }
        r.finish()?;

        Ok(InstallInfo {
            jad_url,
            jar_url,
            domain,
            trusted,
            auth_path,
            ..InstallInfo::default()
        })
    }

    pub fn write_verify_hash(&self, suite_id: SuiteId, hash: &[u8]) -> Result<u64, StoreError> {
        let mut w = RecordWriter::new();
        w.write_bytes(hash)?;
        let size = self
            .storage
            .write(&self.layout.verify_hash_file(suite_id), &w.into_bytes())?;
        Ok(size)
    }

    /// `None` when the suite was installed without a verify hash.
    pub fn read_verify_hash(&self, suite_id: SuiteId) -> Result<Option<Vec<u8>>, StoreError> {
        let path = self.layout.verify_hash_file(suite_id);
        let data = match self.storage.read(&path) {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let mut r = RecordReader::new(&data, &path);
        let hash = r.read_bytes()?;
        r.finish()?;
        Ok(Some(hash))
    }
}
