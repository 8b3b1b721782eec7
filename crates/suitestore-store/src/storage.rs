use crate::fsync_dir;
use std::fs;
use std::io::{self, Write};
use std::path::Path;
use std::sync::{Arc, Mutex};
use tempfile::NamedTempFile;
use tracing::debug;

/// Byte-level persistent storage used by every store in this crate.
///
/// `write` replaces the whole file: there is no append mode, so a reader only
/// ever sees the previous contents or the new ones.
pub trait Storage: Send + Sync {
    fn read(&self, path: &Path) -> io::Result<Vec<u8>>;

    /// Replace the contents of `path`, creating parent directories as needed.
    /// Returns the number of bytes now in the file.
    fn write(&self, path: &Path, data: &[u8]) -> io::Result<u64>;

    /// Move `from` to `to`, replacing any existing file at `to`.
    fn rename(&self, from: &Path, to: &Path) -> io::Result<()>;

    fn remove(&self, path: &Path) -> io::Result<()>;

    fn size_of(&self, path: &Path) -> io::Result<u64>;

    fn exists(&self, path: &Path) -> bool;
}

/// Local filesystem storage with atomic replace-on-write.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsStorage;

impl FsStorage {
    pub fn new() -> Self {
        Self
    }

    fn persist_into(
        dir: &Path,
        dest: &Path,
        write: impl FnOnce(&mut NamedTempFile) -> io::Result<()>,
    ) -> io::Result<()> {
        let mut tmp = NamedTempFile::new_in(dir)?;
        write(&mut tmp)?;
        tmp.as_file().sync_all()?;
        tmp.persist(dest).map_err(|e| e.error)?;
        fsync_dir(dir)
    }
}

fn parent_of(path: &Path) -> &Path {
    match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    }
}

impl Storage for FsStorage {
    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        fs::read(path)
    }

    fn write(&self, path: &Path, data: &[u8]) -> io::Result<u64> {
        let dir = parent_of(path);
        fs::create_dir_all(dir)?;
        Self::persist_into(dir, path, |tmp| tmp.write_all(data))?;
        Ok(data.len() as u64)
    }

    fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        if from == to {
            return Ok(());
        }
        let dir = parent_of(to);
        fs::create_dir_all(dir)?;
        match fs::rename(from, to) {
            Ok(()) => fsync_dir(dir),
            // Source on another volume: copy through a temp file, then drop the source.
            Err(e) if from.is_file() => {
                debug!("rename {} failed ({e}), copying instead", from.display());
                let mut src = fs::File::open(from)?;
                Self::persist_into(dir, to, |tmp| io::copy(&mut src, tmp).map(|_| ()))?;
                fs::remove_file(from)
            }
            Err(e) => Err(e),
        }
    }

    fn remove(&self, path: &Path) -> io::Result<()> {
        fs::remove_file(path)
    }

    fn size_of(&self, path: &Path) -> io::Result<u64> {
        Ok(fs::metadata(path)?.len())
    }

    fn exists(&self, path: &Path) -> bool {
        path.is_file()
    }
}

/// Storage wrapper that fails writes and renames touching chosen files.
///
/// A fault matches when the target file name contains one of the registered
/// fragments. Reads, sizes and removals pass through untouched.
pub struct FaultInjectingStorage {
    inner: Arc<dyn Storage>,
    faults: Mutex<Vec<String>>,
}

impl FaultInjectingStorage {
    pub fn new(inner: Arc<dyn Storage>) -> Self {
        Self {
            inner,
            faults: Mutex::new(Vec::new()),
        }
    }

    pub fn over_fs() -> Self {
        Self::new(Arc::new(FsStorage))
    }

    /// Fail every subsequent write or rename whose file name contains `fragment`.
    pub fn fail_on(&self, fragment: &str) {
        if let Ok(mut faults) = self.faults.lock() {
            faults.push(fragment.to_owned());
        }
    }

    pub fn clear(&self) {
        if let Ok(mut faults) = self.faults.lock() {
            faults.clear();
        }
    }

    fn check(&self, path: &Path) -> io::Result<()> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let faults = self
            .faults
            .lock()
            .map_err(|_| io::Error::other("fault list poisoned"))?;
        if faults.iter().any(|f| name.contains(f.as_str())) {
            return Err(io::Error::other(format!(
                "injected fault writing {}",
                path.display()
            )));
        }
        Ok(())
    }
}

impl Storage for FaultInjectingStorage {
    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        self.inner.read(path)
    }

    fn write(&self, path: &Path, data: &[u8]) -> io::Result<u64> {
        self.check(path)?;
        self.inner.write(path, data)
    }

    fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        self.check(to)?;
        self.inner.rename(from, to)
    }

    fn remove(&self, path: &Path) -> io::Result<()> {
        self.inner.remove(path)
    }

    fn size_of(&self, path: &Path) -> io::Result<u64> {
        self.inner.size_of(path)
    }

    fn exists(&self, path: &Path) -> bool {
        self.inner.exists(path)
    }
}
