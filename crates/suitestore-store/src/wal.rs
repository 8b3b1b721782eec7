use crate::layout::StoreLayout;
use crate::StoreError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use suitestore_schema::{ComponentId, SuiteId};
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

static OP_SEQ: AtomicU64 = AtomicU64::new(0);

/// A single rollback step that can undo part of an operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RollbackStep {
    /// Remove a single file (e.g. a relocated jar).
    RemoveFile(PathBuf),
    /// Erase the whole footprint of a suite, registry entry included.
    RemoveSuite(SuiteId),
    /// Erase the footprint of one dynamic component.
    RemoveComponent(ComponentId),
}

/// The type of mutating operation being tracked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WalOpKind {
    Install,
    Remove,
    Update,
}

impl std::fmt::Display for WalOpKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WalOpKind::Install => write!(f, "install"),
            WalOpKind::Remove => write!(f, "remove"),
            WalOpKind::Update => write!(f, "update"),
        }
    }
}

/// A WAL entry representing an in-flight operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalEntry {
    pub op_id: String,
    pub kind: WalOpKind,
    pub suite_id: SuiteId,
    /// Temporary jar the transaction was opened for, if any.
    #[serde(default)]
    pub temp_jar: Option<PathBuf>,
    pub timestamp: String,
    pub rollback_steps: Vec<RollbackStep>,
}

/// Install/remove transaction journal.
///
/// The installer opens an entry before touching anything, appends rollback
/// steps as durable side effects happen, and removes the entry when the
/// operation is over. Entries still present at startup belong to an
/// operation that never finished and are rolled back.
#[derive(Debug, Clone)]
pub struct WriteAheadLog {
    wal_dir: PathBuf,
}

impl WriteAheadLog {
    pub fn new(layout: &StoreLayout) -> Self {
        Self {
            wal_dir: layout.wal_dir(),
        }
    }

    /// Ensure the WAL directory exists.
    pub fn initialize(&self) -> Result<(), StoreError> {
        fs::create_dir_all(&self.wal_dir)?;
        Ok(())
    }

    /// Begin a new WAL entry for an operation. Returns the op_id.
    pub fn begin(
        &self,
        kind: WalOpKind,
        suite_id: SuiteId,
        temp_jar: Option<&Path>,
    ) -> Result<String, StoreError> {
        let seq = OP_SEQ.fetch_add(1, Ordering::Relaxed);
        let seed = format!("{kind}:{suite_id}:{}", std::process::id());
        let op_id = format!(
            "{}-{}-{seq:06}",
            chrono::Utc::now().format("%Y%m%d%H%M%S%3f"),
            &blake3::hash(seed.as_bytes()).to_hex()[..8]
        );
        let entry = WalEntry {
            op_id: op_id.clone(),
            kind,
            suite_id,
            temp_jar: temp_jar.map(Path::to_path_buf),
            timestamp: chrono::Utc::now().to_rfc3339(),
            rollback_steps: Vec::new(),
        };
        self.write_entry(&entry)?;
        debug!("WAL begin: {kind} for suite {suite_id} (op_id={op_id})");
        Ok(op_id)
    }

    /// Append a rollback step to an existing WAL entry.
    pub fn add_rollback_step(&self, op_id: &str, step: RollbackStep) -> Result<(), StoreError> {
        let mut entry = self.read_entry(op_id)?;
        entry.rollback_steps.push(step);
        self.write_entry(&entry)?;
        Ok(())
    }

    /// Commit (remove) a WAL entry once the operation is over.
    pub fn commit(&self, op_id: &str) -> Result<(), StoreError> {
        let path = self.entry_path(op_id);
        if path.exists() {
            fs::remove_file(&path)?;
            debug!("WAL commit: {op_id}");
        }
        Ok(())
    }

    /// List all incomplete WAL entries, oldest first.
    pub fn list_incomplete(&self) -> Result<Vec<WalEntry>, StoreError> {
        if !self.wal_dir.exists() {
            return Ok(Vec::new());
        }
        let mut entries = Vec::new();
        for dir_entry in fs::read_dir(&self.wal_dir)? {
            let path = dir_entry?.path();
            if path.extension().is_some_and(|e| e == "json") {
                match fs::read_to_string(&path) {
                    Ok(content) => match serde_json::from_str::<WalEntry>(&content) {
                        Ok(entry) => entries.push(entry),
                        Err(e) => {
                            warn!("corrupt WAL entry {}: {e}", path.display());
                            let _ = fs::remove_file(&path);
                        }
                    },
                    Err(e) => {
                        warn!("unreadable WAL entry {}: {e}", path.display());
                        let _ = fs::remove_file(&path);
                    }
                }
            }
        }
        entries.sort_by(|a, b| a.op_id.cmp(&b.op_id));
        Ok(entries)
    }

    /// Roll back all incomplete WAL entries. Returns how many were rolled back.
    ///
    /// File removals are carried out here. Suite and component removals need
    /// the registry and are delegated to `remove`; a failing step is logged
    /// and the remaining steps still run.
    pub fn recover(
        &self,
        mut remove: impl FnMut(&RollbackStep) -> Result<(), StoreError>,
    ) -> Result<usize, StoreError> {
        let entries = self.list_incomplete()?;
        let count = entries.len();
        for entry in &entries {
            info!(
                "WAL recovery: rolling back {} of suite {} (op_id={})",
                entry.kind, entry.suite_id, entry.op_id
            );
            for step in entry.rollback_steps.iter().rev() {
                match step {
                    RollbackStep::RemoveFile(path) => {
                        if path.exists() {
                            if let Err(e) = fs::remove_file(path) {
                                warn!(
                                    "WAL rollback: failed to remove file {}: {e}",
                                    path.display()
                                );
                            } else {
                                debug!("WAL rollback: removed file {}", path.display());
                            }
                        }
                    }
                    other => {
                        if let Err(e) = remove(other) {
                            warn!("WAL rollback: {other:?} failed: {e}");
                        }
                    }
                }
            }
            let _ = fs::remove_file(self.entry_path(&entry.op_id));
        }
        if count > 0 {
            info!("WAL recovery complete: {count} entries rolled back");
        }
        Ok(count)
    }

    fn entry_path(&self, op_id: &str) -> PathBuf {
        self.wal_dir.join(format!("{op_id}.json"))
    }

    fn write_entry(&self, entry: &WalEntry) -> Result<(), StoreError> {
        fs::create_dir_all(&self.wal_dir)?;
        let content = serde_json::to_string_pretty(entry)?;
        let mut tmp = NamedTempFile::new_in(&self.wal_dir)?;
        tmp.write_all(content.as_bytes())?;
        tmp.as_file().sync_all()?;
        let dest = self.entry_path(&entry.op_id);
        tmp.persist(&dest).map_err(|e| StoreError::Io(e.error))?;
        crate::fsync_dir(&self.wal_dir)?;
        Ok(())
    }

    fn read_entry(&self, op_id: &str) -> Result<WalEntry, StoreError> {
        let content = fs::read_to_string(self.entry_path(op_id))?;
        Ok(serde_json::from_str(&content)?)
    }
}
