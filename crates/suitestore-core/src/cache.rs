use crate::CoreError;
use std::fs;
use std::path::{Path, PathBuf};
use suitestore_schema::SuiteId;
use tracing::debug;

/// Source of cached images for an installed suite.
pub trait ImageCache: Send + Sync {
    /// Populate `dest` with the suite's pre-decoded images. Returns the
    /// number of bytes written.
    fn create(&self, suite_id: SuiteId, jar: &Path, dest: &Path) -> Result<u64, CoreError>;

    /// Bytes of the image called `name`, if the suite has one.
    fn load_image(
        &self,
        suite_id: SuiteId,
        jar: &Path,
        name: &str,
    ) -> Result<Option<Vec<u8>>, CoreError>;

    fn remove(&self, dest: &Path) -> Result<(), CoreError> {
        if dest.is_dir() {
            fs::remove_dir_all(dest)?;
        }
        Ok(())
    }
}

/// Cache that never produces anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoImageCache;

impl ImageCache for NoImageCache {
    fn create(&self, _suite_id: SuiteId, _jar: &Path, _dest: &Path) -> Result<u64, CoreError> {
        Ok(0)
    }

    fn load_image(
        &self,
        _suite_id: SuiteId,
        _jar: &Path,
        _name: &str,
    ) -> Result<Option<Vec<u8>>, CoreError> {
        Ok(None)
    }
}

/// Images taken from a directory holding the suite's unpacked resources.
///
/// `create` copies every `.png` at the top of the directory; `load_image`
/// resolves jar-style names such as `/icons/app.png` relative to it.
#[derive(Debug, Clone)]
pub struct ResourceDirCache {
    root: PathBuf,
}

impl ResourceDirCache {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn resolve(&self, name: &str) -> Option<PathBuf> {
        let relative = Path::new(name.trim_start_matches('/'));
        // Reject names that would escape the resource directory.
        if relative
            .components()
            .any(|c| !matches!(c, std::path::Component::Normal(_)))
        {
            return None;
        }
        Some(self.root.join(relative))
    }
}

impl ImageCache for ResourceDirCache {
    fn create(&self, suite_id: SuiteId, _jar: &Path, dest: &Path) -> Result<u64, CoreError> {
        if !self.root.is_dir() {
            return Ok(0);
        }
        let mut total = 0;
        for entry in fs::read_dir(&self.root)? {
            let path = entry?.path();
            if path.is_file() && path.extension().is_some_and(|e| e == "png") {
                if let Some(name) = path.file_name() {
                    fs::create_dir_all(dest)?;
                    total += fs::copy(&path, dest.join(name))?;
                }
            }
        }
        debug!("image cache for suite {suite_id}: {total} bytes");
        Ok(total)
    }

    fn load_image(
        &self,
        _suite_id: SuiteId,
        _jar: &Path,
        name: &str,
    ) -> Result<Option<Vec<u8>>, CoreError> {
        match self.resolve(name) {
            Some(path) if path.is_file() => Ok(Some(fs::read(path)?)),
            _ => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_cache_is_empty() {
        let cache = NoImageCache;
        assert_eq!(cache.create(SuiteId(2), Path::new("a.jar"), Path::new("d")).unwrap(), 0);
        assert!(cache
            .load_image(SuiteId(2), Path::new("a.jar"), "/i.png")
            .unwrap()
            .is_none());
    }

    #[test]
    fn resource_dir_copies_png_files() {
        let res = tempfile::tempdir().unwrap();
        fs::write(res.path().join("a.png"), [1u8; 10]).unwrap();
        fs::write(res.path().join("b.png"), [2u8; 5]).unwrap();
        fs::write(res.path().join("notes.txt"), "skip").unwrap();
        let out = tempfile::tempdir().unwrap();
        let dest = out.path().join("00000002_images");

        let cache = ResourceDirCache::new(res.path());
        assert_eq!(cache.create(SuiteId(2), Path::new("x.jar"), &dest).unwrap(), 15);
        assert!(dest.join("a.png").exists());
        assert!(!dest.join("notes.txt").exists());

        cache.remove(&dest).unwrap();
        assert!(!dest.exists());
    }

    #[test]
    fn resource_dir_loads_icon_by_jar_name() {
        let res = tempfile::tempdir().unwrap();
        fs::create_dir_all(res.path().join("icons")).unwrap();
        fs::write(res.path().join("icons").join("app.png"), b"png").unwrap();
        let cache = ResourceDirCache::new(res.path());
        assert_eq!(
            cache
                .load_image(SuiteId(2), Path::new("x.jar"), "/icons/app.png")
                .unwrap(),
            Some(b"png".to_vec())
        );
        assert!(cache
            .load_image(SuiteId(2), Path::new("x.jar"), "/missing.png")
            .unwrap()
            .is_none());
        assert!(cache
            .load_image(SuiteId(2), Path::new("x.jar"), "../etc/passwd")
            .unwrap()
            .is_none());
    }
}
