use crate::codec::{RecordReader, RecordWriter};
use crate::layout::StoreLayout;
use crate::storage::Storage;
use crate::StoreError;
use std::sync::Arc;
use suitestore_schema::SuiteId;

/// Cached suite icon: the icon's name inside the jar and its image bytes.
pub struct IconStore {
    layout: StoreLayout,
    storage: Arc<dyn Storage>,
}

impl IconStore {
    pub fn new(layout: StoreLayout, storage: Arc<dyn Storage>) -> Self {
        Self { layout, storage }
    }

    pub fn write(&self, suite_id: SuiteId, name: &str, image: &[u8]) -> Result<u64, StoreError> {
        if image.is_empty() {
            return Err(StoreError::BadParams(format!("empty icon image {name}")));
        }
        let mut w = RecordWriter::new();
        w.write_string(name)?;
        w.write_bytes(image)?;
        let size = self
            .storage
            .write(&self.layout.icon_file(suite_id), &w.into_bytes())?;
        Ok(size)
    }

    pub fn read(&self, suite_id: SuiteId) -> Result<(String, Vec<u8>), StoreError> {
        let path = self.layout.icon_file(suite_id);
        let data = self.storage.read(&path)?;
        let mut r = RecordReader::new(&data, &path);
        let name = r.read_string()?;
        let image = r.read_bytes()?;
        r.finish()?;
        Ok((name, image))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::FsStorage;

    #[test]
    fn icon_is_cached_with_its_name() {
        let dir = tempfile::tempdir().unwrap();
        let layout = StoreLayout::new(dir.path());
        layout.initialize().unwrap();
        let store = IconStore::new(layout, Arc::new(FsStorage));
        store.write(SuiteId(3), "/icons/app.png", &[0x89, b'P', b'N', b'G']).unwrap();
        let (name, image) = store.read(SuiteId(3)).unwrap();
        assert_eq!(name, "/icons/app.png");
        assert_eq!(image, vec![0x89, b'P', b'N', b'G']);
    }

    #[test]
    fn empty_image_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let layout = StoreLayout::new(dir.path());
        let store = IconStore::new(layout.clone(), Arc::new(FsStorage));
        assert!(matches!(
            store.write(SuiteId(3), "/i.png", &[]),
            Err(StoreError::BadParams(_))
        ));
        assert!(!layout.icon_file(SuiteId(3)).exists());
    }
}
