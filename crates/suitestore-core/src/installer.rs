use crate::allocator::next_free_id;
use crate::cache::{ImageCache, NoImageCache};
use crate::concurrency::StoreLock;
use crate::lifecycle::{validate_transition, InstallPhase};
use crate::listeners::{ListenerType, Listeners, Phase, SuiteListener};
use crate::locks::{SuiteLock, SuiteLockRegistry};
use crate::CoreError;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use suitestore_schema::{
    ComponentId, ComponentType, ControlArgs, InstallInfo, PropertySet, Status, StoreConfig,
    SuiteId, SuiteRecord, SuiteSettings, INTERNAL_SUITE_ID,
};
use suitestore_store::{
    verify_store_integrity, FsStorage, IconStore, InstallInfoStore, IntegrityReport, JarStore,
    PropertiesStore, RollbackStep, SettingsStore, Storage, StoreError, StoreLayout,
    SuiteRegistry, Upsert, WalOpKind, WriteAheadLog,
};
use tracing::{debug, info, warn};

/// Context object through which suites are installed, removed and inspected.
///
/// Owns the loaded registry and every per-suite store of one store root.
/// All mutations are bracketed by a journal entry; entries left behind by a
/// process that died mid-operation are rolled back when the installer is
/// opened.
pub struct Installer {
    layout: StoreLayout,
    config: StoreConfig,
    storage: Arc<dyn Storage>,
    registry: SuiteRegistry,
    install_info: InstallInfoStore,
    properties: PropertiesStore,
    settings: SettingsStore,
    icons: IconStore,
    jars: JarStore,
    wal: WriteAheadLog,
    locks: Arc<SuiteLockRegistry>,
    listeners: Listeners,
    image_cache: Box<dyn ImageCache>,
    /// Ids handed out by `create_*_id` that are not registered yet. Entries
    /// are dropped once the id shows up in the registry.
    issued: HashSet<(ComponentType, i32)>,
}

/// How far a failed install got.
enum Failure {
    /// The registry does not reference the suite.
    Unregistered(CoreError),
    /// The registry references the suite; its footprint has to be erased.
    Registered(CoreError),
}

fn unregistered(e: impl Into<CoreError>) -> Failure {
    Failure::Unregistered(e.into())
}

fn registered(e: impl Into<CoreError>) -> Failure {
    Failure::Registered(e.into())
}

/// Phase tracking for one `store_suite` call.
struct InstallProgress {
    phase: InstallPhase,
    target: String,
}

impl InstallProgress {
    fn new(suite: &SuiteRecord) -> Self {
        Self {
            phase: InstallPhase::Idle,
            target: format!("{} {}", suite.kind, suite.namespace_id()),
        }
    }

    fn advance(&mut self, to: InstallPhase) -> Result<(), CoreError> {
        validate_transition(self.phase, to)?;
        debug!("install of {}: {} -> {to}", self.target, self.phase);
        self.phase = to;
        Ok(())
    }

    fn abort(&mut self) {
        if self.phase != InstallPhase::Idle {
            debug!("install of {} aborted in phase {}", self.target, self.phase);
            self.phase = InstallPhase::Idle;
        }
    }
}

impl Installer {
    /// Open the store at `store_root` on the local filesystem, creating it if
    /// needed. Configuration is read from the store's `suitestore.toml`.
    pub fn open(store_root: impl Into<PathBuf>) -> Result<Self, CoreError> {
        let root: PathBuf = store_root.into();
        let config = StoreConfig::load_from_store(&root)?;
        Self::with_storage(root, config, Arc::new(FsStorage::new()))
    }

    /// Open a store through an explicit storage backend.
    ///
    /// Incomplete journal entries are rolled back here, but only if the
    /// process-level store lock is free; otherwise another process owns the
    /// store and may still be working on them.
    pub fn with_storage(
        store_root: impl Into<PathBuf>,
        config: StoreConfig,
        storage: Arc<dyn Storage>,
    ) -> Result<Self, CoreError> {
        let layout = StoreLayout::new(store_root);
        layout.initialize()?;

        let mut installer = Self {
            registry: SuiteRegistry::new(layout.clone(), storage.clone()),
            install_info: InstallInfoStore::new(layout.clone(), storage.clone()),
            properties: PropertiesStore::new(layout.clone(), storage.clone()),
            settings: SettingsStore::new(layout.clone(), storage.clone()),
            icons: IconStore::new(layout.clone(), storage.clone()),
            jars: JarStore::new(layout.clone(), storage.clone()),
            wal: WriteAheadLog::new(&layout),
            locks: Arc::new(SuiteLockRegistry::new()),
            listeners: Listeners::new(),
            image_cache: Box::new(NoImageCache),
            issued: HashSet::new(),
            layout,
            config,
            storage,
        };

        match StoreLock::try_acquire(&installer.layout.lock_file()) {
            Ok(Some(_lock)) => {
                if let Err(e) = installer.recover() {
                    warn!("journal recovery failed: {e}");
                }
            }
            Ok(None) => {
                debug!("store lock held; skipping journal recovery");
            }
            Err(e) => {
                warn!("store lock check failed; skipping journal recovery: {e}");
            }
        }

        Ok(installer)
    }

    pub fn set_image_cache(&mut self, cache: impl ImageCache + 'static) {
        self.image_cache = Box::new(cache);
    }

    pub fn add_listener(&mut self, listener: impl SuiteListener + 'static) {
        self.listeners.add(listener);
    }

    /// Shared lock registry; callers lock suites they are running or updating.
    pub fn locks(&self) -> Arc<SuiteLockRegistry> {
        Arc::clone(&self.locks)
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn layout(&self) -> &StoreLayout {
        &self.layout
    }

    /// Roll back every journal entry left by an unfinished operation.
    /// Returns how many entries were rolled back.
    pub fn recover(&mut self) -> Result<usize, CoreError> {
        let wal = self.wal.clone();
        let count = wal.recover(|step| match step {
            RollbackStep::RemoveSuite(id) => self.remove_suite_footprint(*id),
            RollbackStep::RemoveComponent(id) => self.remove_component_footprint(*id),
            RollbackStep::RemoveFile(_) => Ok(()),
        })?;
        if count > 0 {
            self.registry.reload()?;
        }
        Ok(count)
    }

    // --- install ---

    /// Install `suite` (or reinstall over an existing suite with the same id).
    ///
    /// `suite.jar_path` names the downloaded jar, which is moved to its
    /// permanent location. On success the registered record is returned,
    /// with the final jar path and footprint size filled in. Once the suite
    /// has been registered, any failure erases its whole footprint before
    /// the error is returned.
    pub fn store_suite(
        &mut self,
        info: &InstallInfo,
        settings: &SuiteSettings,
        suite: &SuiteRecord,
    ) -> Result<SuiteRecord, CoreError> {
        self.check_install_params(suite)?;
        if !suite.is_component() {
            self.check_unlocked(suite.suite_id, true)?;
        }
        self.registry.load()?;

        info!("installing {} {}", suite.kind, suite.namespace_id());
        self.listeners
            .notify(ListenerType::Install, Phase::Start, Status::AllOk, suite);

        let mut progress = InstallProgress::new(suite);
        let op_id = match self.open_transaction(WalOpKind::Install, suite) {
            Ok(op_id) => op_id,
            Err(e) => {
                self.listeners
                    .notify(ListenerType::Install, Phase::End, e.status(), suite);
                return Err(e);
            }
        };

        let outcome = progress
            .advance(InstallPhase::TransactionOpen)
            .map_err(unregistered)
            .and_then(|()| self.install_steps(info, settings, suite, &mut progress));

        let outcome = match outcome {
            Ok(record) => self
                .wal
                .commit(&op_id)
                .map(|()| record)
                .map_err(registered),
            Err(failure) => {
                let _ = self.wal.commit(&op_id);
                Err(failure)
            }
        };

        match outcome {
            Ok(record) => {
                self.issued.remove(&(record.kind, record.namespace_id()));
                info!(
                    "installed {} {} ({} bytes)",
                    record.kind,
                    record.namespace_id(),
                    record.suite_size
                );
                self.listeners
                    .notify(ListenerType::Install, Phase::End, Status::AllOk, &record);
                Ok(record)
            }
            Err(Failure::Unregistered(e)) => {
                progress.abort();
                warn!(
                    "install of {} {} failed: {e}",
                    suite.kind,
                    suite.namespace_id()
                );
                self.listeners
                    .notify(ListenerType::Install, Phase::End, e.status(), suite);
                Err(e)
            }
            Err(Failure::Registered(e)) => {
                progress.abort();
                warn!(
                    "install of {} {} failed, removing it: {e}",
                    suite.kind,
                    suite.namespace_id()
                );
                let cleanup = if suite.is_component() {
                    self.remove_component_footprint(suite.component_id)
                } else {
                    self.remove_suite_footprint(suite.suite_id)
                };
                if let Err(ce) = cleanup {
                    warn!("cleanup after failed install did not finish: {ce}");
                }
                self.listeners
                    .notify(ListenerType::Install, Phase::End, e.status(), suite);
                Err(e)
            }
        }
    }

    fn check_install_params(&self, suite: &SuiteRecord) -> Result<(), CoreError> {
        if suite.jar_path.is_empty() {
            return Err(CoreError::BadParams("no jar to install".to_owned()));
        }
        if suite.suite_id.get() <= 0 {
            return Err(CoreError::BadParams(format!(
                "invalid suite id {}",
                suite.suite_id
            )));
        }
        match suite.kind {
            ComponentType::RegularSuite if suite.suite_id == INTERNAL_SUITE_ID => Err(
                CoreError::BadParams("the internal suite cannot be installed".to_owned()),
            ),
            ComponentType::DynamicComponent if !self.config.dynamic_components => Err(
                CoreError::BadParams("dynamic components are disabled".to_owned()),
            ),
            ComponentType::DynamicComponent if suite.component_id.get() <= 0 => {
                Err(CoreError::BadParams(format!(
                    "invalid component id {}",
                    suite.component_id
                )))
            }
            _ => Ok(()),
        }
    }

    /// `SuiteLocked` if someone holds `suite_id`. An update lock is tolerated
    /// when `allow_update` is set.
    fn check_unlocked(&self, suite_id: SuiteId, allow_update: bool) -> Result<(), CoreError> {
        match self.locks.find_lock(suite_id) {
            None => Ok(()),
            Some(SuiteLock::Update) if allow_update => Ok(()),
            Some(_) => Err(CoreError::SuiteLocked(suite_id)),
        }
    }

    /// Begin a journal entry for installing `suite`. The rollback steps cover
    /// the jar destination and the suite footprint, so an interrupted install
    /// is erased on the next open.
    fn open_transaction(&self, kind: WalOpKind, suite: &SuiteRecord) -> Result<String, CoreError> {
        self.wal.initialize()?;
        let op_id = self
            .wal
            .begin(kind, suite.suite_id, Some(Path::new(&suite.jar_path)))?;
        let jar = self.jars.final_path(suite);
        let steps = [
            RollbackStep::RemoveFile(JarStore::backup_path(&jar)),
            RollbackStep::RemoveFile(jar),
            footprint_step(suite),
        ];
        for step in steps {
            if let Err(e) = self.wal.add_rollback_step(&op_id, step) {
                let _ = self.wal.commit(&op_id);
                return Err(e.into());
            }
        }
        Ok(op_id)
    }

    fn install_steps(
        &mut self,
        info: &InstallInfo,
        settings: &SuiteSettings,
        suite: &SuiteRecord,
        progress: &mut InstallProgress,
    ) -> Result<SuiteRecord, Failure> {
        let temp = PathBuf::from(&suite.jar_path);
        let dest = self.jars.final_path(suite);
        let backup = if dest == temp {
            None
        } else {
            self.jars.set_aside(&dest).map_err(unregistered)?
        };
        let jar = match self.jars.relocate(&temp, suite) {
            Ok(jar) => jar,
            Err(e) => {
                self.restore_backup(backup.as_deref(), &dest);
                return Err(unregistered(e));
            }
        };
        progress
            .advance(InstallPhase::JarStored)
            .map_err(unregistered)?;

        let mut record = suite.clone();
        record.jar_path = jar.display().to_string();
        record.enabled = true;
        record.jar_size = self.jars.size_of(&jar).unwrap_or_else(|e| {
            warn!("cannot size {}: {e}", jar.display());
            0
        });
        record.suite_size = record.jar_size;
        record.jar_hash = self.jars.hash(&jar).unwrap_or_else(|e| {
            warn!("cannot hash {}: {e}", jar.display());
            Vec::new()
        });
        if record.install_time == 0 {
            record.install_time = chrono::Utc::now().timestamp();
        }

        let mut settings = settings.clone();
        if !record.is_component()
            && self.config.control_args_from_jad
            && ControlArgs::from_jad(&info.jad_props).allow_all_permissions()
        {
            debug!("JAD requests all permissions for suite {}", record.suite_id);
            settings = SuiteSettings::allow_all(self.config.permission_slots);
        }

        let previous = match self.registry.upsert(record.clone()) {
            Ok(Upsert::Added) => None,
            Ok(Upsert::Replaced { previous }) => Some(previous),
            Ok(Upsert::ReplacedCorrupted { previous }) => {
                warn!(
                    "replaced damaged registry entry of {} {}",
                    record.kind,
                    record.namespace_id()
                );
                Some(previous)
            }
            Err(e) => {
                if jar != temp {
                    // Give the download back to the caller.
                    if let Err(re) = self.storage.rename(&jar, &temp) {
                        warn!("cannot move {} back: {re}", jar.display());
                    }
                }
                self.restore_backup(backup.as_deref(), &dest);
                return Err(unregistered(e));
            }
        };
        if let Some(backup) = &backup {
            self.delete_file(backup);
        }
        if let Some(previous) = previous.filter(|p| p.jar_path != record.jar_path) {
            debug!("dropping old jar {}", previous.jar_path);
            self.delete_file(Path::new(&previous.jar_path));
        }
        progress
            .advance(InstallPhase::Registered)
            .map_err(registered)?;

        if record.is_component() {
            progress
                .advance(InstallPhase::Committed)
                .map_err(registered)?;
            return Ok(record);
        }

        record.suite_size += self
            .write_metadata(record.suite_id, info, &settings, progress)
            .map_err(registered)?;

        let (cache_size, icon_cached) = self.populate_caches(&record, &jar);
        record.suite_size += cache_size;
        if icon_cached {
            progress
                .advance(InstallPhase::IconCached)
                .map_err(registered)?;
        }

        let suite_size = record.suite_size;
        let stored = self
            .registry
            .update(ComponentType::RegularSuite, record.suite_id.get(), |r| {
                r.suite_size = suite_size;
            })
            .map_err(registered)?;
        progress
            .advance(InstallPhase::Committed)
            .map_err(registered)?;
        Ok(stored)
    }

    /// Write install-info, properties and settings in that order, stopping at
    /// the first failure. Returns the bytes written.
    fn write_metadata(
        &self,
        suite_id: SuiteId,
        info: &InstallInfo,
        settings: &SuiteSettings,
        progress: &mut InstallProgress,
    ) -> Result<u64, CoreError> {
        let mut size = self.install_info.write(suite_id, info)?;
        if let Some(hash) = &info.verify_hash {
            size += self.install_info.write_verify_hash(suite_id, hash)?;
        }
        progress.advance(InstallPhase::InfoWritten)?;

        size += self
            .properties
            .write(suite_id, &info.jad_props, &info.jar_props)?;
        progress.advance(InstallPhase::PropsWritten)?;

        let settings = SuiteSettings {
            enabled: true,
            ..settings.clone()
        };
        size += self.settings.write(suite_id, &settings)?;
        progress.advance(InstallPhase::SettingsWritten)?;
        Ok(size)
    }

    /// Fill the image and icon caches when enabled. Failures are logged and
    /// otherwise ignored. Returns the bytes cached and whether an icon was
    /// stored.
    fn populate_caches(&self, record: &SuiteRecord, jar: &Path) -> (u64, bool) {
        let suite_id = record.suite_id;
        let mut size = 0;

        if self.config.image_cache {
            let dir = self.layout.image_cache_dir(suite_id);
            match self.image_cache.create(suite_id, jar, &dir) {
                Ok(n) => size += n,
                Err(e) => warn!("image cache for suite {suite_id} failed: {e}"),
            }
        }

        let mut icon_cached = false;
        if self.config.icon_cache {
            if let Some(name) = record.icon_name.as_deref() {
                match self.image_cache.load_image(suite_id, jar, name) {
                    Ok(Some(image)) if !image.is_empty() => {
                        match self.icons.write(suite_id, name, &image) {
                            Ok(n) => {
                                size += n;
                                icon_cached = true;
                            }
                            Err(e) => warn!("cannot cache icon of suite {suite_id}: {e}"),
                        }
                    }
                    Ok(_) => debug!("suite {suite_id} has no icon image '{name}'"),
                    Err(e) => warn!("cannot load icon of suite {suite_id}: {e}"),
                }
            }
        }

        (size, icon_cached)
    }

    // --- removal ---

    /// Uninstall a suite together with its dynamic components.
    pub fn remove_suite(&mut self, suite_id: SuiteId) -> Result<(), CoreError> {
        self.registry.load()?;
        let record = self
            .registry
            .find_suite(suite_id)
            .cloned()
            .ok_or_else(|| CoreError::NotFound(format!("suite {suite_id}")))?;
        self.check_unlocked(suite_id, false)?;

        info!("removing suite {suite_id}");
        self.listeners
            .notify(ListenerType::Remove, Phase::Start, Status::AllOk, &record);
        let result = self.journaled(
            WalOpKind::Remove,
            suite_id,
            Some(RollbackStep::RemoveSuite(suite_id)),
            |this| Ok(this.remove_suite_footprint(suite_id)?),
        );
        self.notify_end(ListenerType::Remove, &result, &record);
        result
    }

    /// Uninstall one dynamic component.
    pub fn remove_component(&mut self, component_id: ComponentId) -> Result<(), CoreError> {
        self.registry.load()?;
        let record = self
            .registry
            .find_component(component_id)
            .cloned()
            .ok_or_else(|| CoreError::NotFound(format!("component {component_id}")))?;

        info!("removing component {component_id} of suite {}", record.suite_id);
        self.listeners
            .notify(ListenerType::Remove, Phase::Start, Status::AllOk, &record);
        let result = self.journaled(
            WalOpKind::Remove,
            record.suite_id,
            Some(RollbackStep::RemoveComponent(component_id)),
            |this| Ok(this.remove_component_footprint(component_id)?),
        );
        self.notify_end(ListenerType::Remove, &result, &record);
        result
    }

    /// Erase everything stored for `suite_id`: registry entries (the suite's
    /// and its components'), jars, per-suite files and caches. Files that do
    /// not exist are skipped, so this also cleans up after a suite that never
    /// made it into the registry.
    pub fn remove_suite_footprint(&mut self, suite_id: SuiteId) -> Result<(), StoreError> {
        let removed = self.registry.remove_where(|r| r.suite_id == suite_id)?;
        for record in &removed {
            self.delete_file(Path::new(&record.jar_path));
        }
        for file in self.layout.suite_metadata_files(suite_id) {
            self.delete_file(&file);
        }
        if let Err(e) = self
            .image_cache
            .remove(&self.layout.image_cache_dir(suite_id))
        {
            warn!("cannot remove image cache of suite {suite_id}: {e}");
        }
        debug!(
            "removed footprint of suite {suite_id} ({} registry entries)",
            removed.len()
        );
        Ok(())
    }

    pub fn remove_component_footprint(
        &mut self,
        component_id: ComponentId,
    ) -> Result<(), StoreError> {
        let removed = self
            .registry
            .remove_where(|r| r.is_component() && r.component_id == component_id)?;
        for record in &removed {
            self.delete_file(Path::new(&record.jar_path));
        }
        debug!("removed footprint of component {component_id}");
        Ok(())
    }

    /// Put back a jar set aside for a reinstall that did not get registered.
    fn restore_backup(&self, backup: Option<&Path>, dest: &Path) {
        if let Some(backup) = backup {
            if let Err(e) = self.jars.restore(backup, dest) {
                warn!("cannot restore {} from {}: {e}", dest.display(), backup.display());
            }
        }
    }

    fn delete_file(&self, path: &Path) {
        if path.as_os_str().is_empty() || !self.storage.exists(path) {
            return;
        }
        if let Err(e) = self.storage.remove(path) {
            warn!("cannot remove {}: {e}", path.display());
        }
    }

    // --- settings ---

    /// Enable or disable a suite. Both the settings file and the registry
    /// entry are updated.
    pub fn set_suite_enabled(
        &mut self,
        suite_id: SuiteId,
        enabled: bool,
    ) -> Result<SuiteRecord, CoreError> {
        self.registry.load()?;
        let record = self
            .registry
            .find_suite(suite_id)
            .cloned()
            .ok_or_else(|| CoreError::NotFound(format!("suite {suite_id}")))?;
        self.check_unlocked(suite_id, true)?;

        self.listeners
            .notify(ListenerType::Update, Phase::Start, Status::AllOk, &record);
        let result = self.journaled(WalOpKind::Update, suite_id, None, |this| {
            let mut settings = match this.settings.read(suite_id) {
                Ok(s) => s,
                Err(e) if e.is_missing_file() => SuiteSettings::default(),
                Err(e) => return Err(e.into()),
            };
            settings.enabled = enabled;
            this.settings.write(suite_id, &settings)?;
            Ok(this
                .registry
                .update(ComponentType::RegularSuite, suite_id.get(), |r| {
                    r.enabled = enabled;
                })?)
        });
        match &result {
            Ok(updated) => {
                info!(
                    "suite {suite_id} {}",
                    if enabled { "enabled" } else { "disabled" }
                );
                self.listeners
                    .notify(ListenerType::Update, Phase::End, Status::AllOk, updated);
            }
            Err(e) => {
                self.listeners
                    .notify(ListenerType::Update, Phase::End, e.status(), &record);
            }
        }
        result
    }

    /// Run `f` inside a journal entry. The entry is closed whatever `f`
    /// returns.
    fn journaled<T>(
        &mut self,
        kind: WalOpKind,
        suite_id: SuiteId,
        step: Option<RollbackStep>,
        f: impl FnOnce(&mut Self) -> Result<T, CoreError>,
    ) -> Result<T, CoreError> {
        self.wal.initialize()?;
        let op_id = self.wal.begin(kind, suite_id, None)?;
        if let Some(step) = step {
            if let Err(e) = self.wal.add_rollback_step(&op_id, step) {
                let _ = self.wal.commit(&op_id);
                return Err(e.into());
            }
        }

        match f(self) {
            Ok(value) => {
                self.wal.commit(&op_id)?;
                Ok(value)
            }
            Err(e) => {
                let _ = self.wal.commit(&op_id);
                Err(e)
            }
        }
    }

    fn notify_end(&self, kind: ListenerType, result: &Result<(), CoreError>, record: &SuiteRecord) {
        let status = match result {
            Ok(()) => Status::AllOk,
            Err(e) => e.status(),
        };
        self.listeners.notify(kind, Phase::End, status, record);
    }

    // --- ids ---

    /// A suite id not used by any installed suite nor handed out before by
    /// this installer.
    pub fn create_suite_id(&mut self) -> Result<SuiteId, CoreError> {
        self.create_id(ComponentType::RegularSuite).map(SuiteId::new)
    }

    pub fn create_component_id(&mut self) -> Result<ComponentId, CoreError> {
        self.create_id(ComponentType::DynamicComponent)
            .map(ComponentId::new)
    }

    fn create_id(&mut self, kind: ComponentType) -> Result<i32, CoreError> {
        self.registry.load()?;
        let registry = &self.registry;
        self.issued.retain(|(k, id)| registry.find(*k, *id).is_none());
        let used = self
            .registry
            .iter()
            .filter(|r| r.kind == kind)
            .map(SuiteRecord::namespace_id)
            .chain(
                self.issued
                    .iter()
                    .filter(|(k, _)| *k == kind)
                    .map(|(_, id)| *id),
            );
        let id = next_free_id(used, kind.id_space())
            .ok_or_else(|| CoreError::OutOfStorage(format!("no free {kind} id")))?;
        self.issued.insert((kind, id));
        debug!("allocated {kind} id {id}");
        Ok(id)
    }

    // --- queries ---

    /// Provenance of an installed suite as written at install time.
    pub fn read_install_info(&self, suite_id: SuiteId) -> Result<InstallInfo, CoreError> {
        Ok(self.install_info.read(suite_id)?)
    }

    /// [`Installer::read_install_info`] plus the stored verify hash, if any.
    pub fn get_suite_install_info(&self, suite_id: SuiteId) -> Result<InstallInfo, CoreError> {
        let mut info = self.install_info.read(suite_id)?;
        info.verify_hash = self.install_info.read_verify_hash(suite_id)?;
        Ok(info)
    }

    /// JAD properties followed by manifest properties.
    pub fn read_properties(&self, suite_id: SuiteId) -> Result<PropertySet, CoreError> {
        Ok(self.properties.read(suite_id)?)
    }

    pub fn read_settings(&self, suite_id: SuiteId) -> Result<SuiteSettings, CoreError> {
        Ok(self.settings.read(suite_id)?)
    }

    /// Cached icon name and image bytes.
    pub fn read_icon(&self, suite_id: SuiteId) -> Result<(String, Vec<u8>), CoreError> {
        Ok(self.icons.read(suite_id)?)
    }

    /// Every registered suite and component, newest first.
    pub fn list(&mut self) -> Result<Vec<SuiteRecord>, CoreError> {
        self.registry.load()?;
        Ok(self.registry.iter().cloned().collect())
    }

    pub fn find_suite(&mut self, suite_id: SuiteId) -> Result<Option<SuiteRecord>, CoreError> {
        self.registry.load()?;
        Ok(self.registry.find_suite(suite_id).cloned())
    }

    pub fn find_component(
        &mut self,
        component_id: ComponentId,
    ) -> Result<Option<SuiteRecord>, CoreError> {
        self.registry.load()?;
        Ok(self.registry.find_component(component_id).cloned())
    }

    /// Check the stored footprint of every registered entry.
    pub fn verify(&self) -> Result<IntegrityReport, CoreError> {
        Ok(verify_store_integrity(&self.layout, Arc::clone(&self.storage))?)
    }

    pub fn components_of(&mut self, suite_id: SuiteId) -> Result<Vec<SuiteRecord>, CoreError> {
        self.registry.load()?;
        Ok(self.registry.components_of(suite_id).cloned().collect())
    }
}

fn footprint_step(suite: &SuiteRecord) -> RollbackStep {
    if suite.is_component() {
        RollbackStep::RemoveComponent(suite.component_id)
    } else {
        RollbackStep::RemoveSuite(suite.suite_id)
    }
}
