//! End-to-end install and removal through the `Installer` on a real store.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use suitestore_core::{
    CoreError, Installer, ListenerType, Phase, ResourceDirCache, SuiteEvent, SuiteLock,
};
use suitestore_schema::{
    ComponentId, InstallInfo, Permission, PropertySet, Status, StorageId, StoreConfig, SuiteId,
    SuiteRecord, SuiteSettings,
};
use suitestore_store::{FsStorage, RecordReader};

fn download(dir: &Path, name: &str, bytes: usize) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, vec![0xca; bytes]).unwrap();
    path
}

fn open(dir: &Path) -> Installer {
    Installer::open(dir.join("store")).unwrap()
}

fn install(inst: &mut Installer, dir: &Path, id: i32) -> SuiteRecord {
    let jar = download(dir, &format!("dl-{id}.jar"), 100);
    let mut suite = SuiteRecord::regular(SuiteId(id), jar.display().to_string());
    suite.suite_name = format!("Suite {id}");
    inst.store_suite(
        &InstallInfo::new(format!("http://h/{id}.jar"), "untrusted"),
        &SuiteSettings::default(),
        &suite,
    )
    .unwrap()
}

#[test]
fn suite_size_sums_every_file() {
    let dir = tempfile::tempdir().unwrap();
    let mut inst = open(dir.path());
    let jar = download(dir.path(), "dl.jar", 1000);

    let mut info = InstallInfo::new("http://host/app.jar", "untrusted");
    // 4 strings of 50 UTF-16 units in total: 4 + 4 * 4 + 2 * 50 = 120 bytes.
    info.jad_props = PropertySet::from_pairs([("MIDlet-Name", "Game")]);
    info.jar_props = PropertySet::from_pairs([("MIDlet-Vendor", "Example Vendor Co. Ltd")]);
    // 7 permission bytes: 4 + 7 + 4 + 4 + 1 = 20 bytes.
    let settings = SuiteSettings {
        permissions: vec![Permission::Ask; 7],
        ..SuiteSettings::default()
    };

    let record = inst
        .store_suite(
            &info,
            &settings,
            &SuiteRecord::regular(SuiteId(5), jar.display().to_string()),
        )
        .unwrap();

    let layout = inst.layout();
    let info_size = fs::metadata(layout.install_info_file(SuiteId(5)))
        .unwrap()
        .len();
    assert_eq!(
        fs::metadata(layout.properties_file(SuiteId(5))).unwrap().len(),
        120
    );
    assert_eq!(
        fs::metadata(layout.settings_file(SuiteId(5))).unwrap().len(),
        20
    );
    assert_eq!(record.jar_size, 1000);
    assert_eq!(record.suite_size, 1000 + info_size + 120 + 20);
    assert_eq!(
        inst.find_suite(SuiteId(5)).unwrap().unwrap().suite_size,
        record.suite_size
    );
}

#[test]
fn properties_file_lists_jad_then_jar_strings() {
    let dir = tempfile::tempdir().unwrap();
    let mut inst = open(dir.path());
    let jar = download(dir.path(), "dl.jar", 10);
    let mut info = InstallInfo::new("http://h/a.jar", "untrusted");
    info.jad_props = PropertySet::from_pairs([("k1", "v1")]);
    info.jar_props = PropertySet::from_pairs([("k2", "v2")]);

    inst.store_suite(
        &info,
        &SuiteSettings::default(),
        &SuiteRecord::regular(SuiteId(2), jar.display().to_string()),
    )
    .unwrap();

    let path = inst.layout().properties_file(SuiteId(2));
    let data = fs::read(&path).unwrap();
    let mut r = RecordReader::new(&data, &path);
    assert_eq!(r.read_i32().unwrap(), 4);
    let strings: Vec<String> = (0..4).map(|_| r.read_string().unwrap()).collect();
    assert_eq!(strings, ["k1", "v1", "k2", "v2"]);
    assert!(r.is_at_end());

    let props = inst.read_properties(SuiteId(2)).unwrap();
    assert_eq!(props.get("k1"), Some("v1"));
    assert_eq!(props.get("k2"), Some("v2"));
}

#[test]
fn install_info_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let mut inst = open(dir.path());
    let jar = download(dir.path(), "dl.jar", 10);
    let info = InstallInfo {
        jad_url: Some("http://h/a.jad".to_owned()),
        jar_url: "http://h/a.jar".to_owned(),
        domain: "identified_third_party".to_owned(),
        trusted: true,
        auth_path: vec!["Root CA".to_owned(), "Intermediate CA".to_owned()],
        ..InstallInfo::default()
    };

    inst.store_suite(
        &info,
        &SuiteSettings::default(),
        &SuiteRecord::regular(SuiteId(2), jar.display().to_string()),
    )
    .unwrap();
    assert_eq!(inst.read_install_info(SuiteId(2)).unwrap(), info);
}

#[test]
fn removing_first_of_two_suites() {
    let dir = tempfile::tempdir().unwrap();
    let mut inst = open(dir.path());
    let first = install(&mut inst, dir.path(), 2);
    let second = install(&mut inst, dir.path(), 3);

    inst.remove_suite(SuiteId(2)).unwrap();

    assert_eq!(inst.list().unwrap(), vec![second]);
    let err = inst.read_install_info(SuiteId(2)).unwrap_err();
    assert_eq!(err.status(), Status::IoError);
    assert!(!Path::new(&first.jar_path).exists());
    for file in inst.layout().suite_metadata_files(SuiteId(2)) {
        assert!(!file.exists(), "{} left behind", file.display());
    }

    // A fresh installer sees the same registry.
    let mut reopened = open(dir.path());
    let ids: Vec<SuiteId> = reopened
        .list()
        .unwrap()
        .iter()
        .map(|r| r.suite_id)
        .collect();
    assert_eq!(ids, [SuiteId(3)]);
}

#[test]
fn removing_unknown_suite_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let mut inst = open(dir.path());
    let err = inst.remove_suite(SuiteId(42)).unwrap_err();
    assert!(matches!(err, CoreError::NotFound(_)));
}

#[test]
fn reinstall_keeps_count_and_sibling_order() {
    let dir = tempfile::tempdir().unwrap();
    let mut inst = open(dir.path());
    for id in [2, 3, 4] {
        install(&mut inst, dir.path(), id);
    }
    let before: Vec<SuiteId> = inst.list().unwrap().iter().map(|r| r.suite_id).collect();

    let jar = download(dir.path(), "update.jar", 300);
    let mut update = SuiteRecord::regular(SuiteId(3), jar.display().to_string());
    update.suite_version = "2.0".to_owned();
    inst.store_suite(
        &InstallInfo::new("http://h/3-v2.jar", "untrusted"),
        &SuiteSettings::default(),
        &update,
    )
    .unwrap();

    let after = inst.list().unwrap();
    assert_eq!(after.len(), 3);
    assert_eq!(
        after.iter().map(|r| r.suite_id).collect::<Vec<_>>(),
        before
    );
    let replaced = inst.find_suite(SuiteId(3)).unwrap().unwrap();
    assert_eq!(replaced.suite_version, "2.0");
    assert_eq!(replaced.jar_size, 300);
    assert_eq!(
        inst.read_install_info(SuiteId(3)).unwrap().jar_url,
        "http://h/3-v2.jar"
    );
}

#[test]
fn created_ids_exceed_registered_ones() {
    let dir = tempfile::tempdir().unwrap();
    let mut inst = open(dir.path());
    install(&mut inst, dir.path(), 7);

    let mut seen = Vec::new();
    for _ in 0..10 {
        let id = inst.create_suite_id().unwrap();
        assert!(id.get() > 7);
        assert!(!seen.contains(&id));
        seen.push(id);
    }
}

#[test]
fn listeners_see_start_then_end() {
    let dir = tempfile::tempdir().unwrap();
    let mut inst = open(dir.path());
    let events: Arc<Mutex<Vec<SuiteEvent>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = events.clone();
    inst.add_listener(move |e: &SuiteEvent| sink.lock().unwrap().push(e.clone()));

    let record = install(&mut inst, dir.path(), 2);
    inst.remove_suite(SuiteId(2)).unwrap();

    let events = events.lock().unwrap();
    let summary: Vec<(ListenerType, Phase, Status)> =
        events.iter().map(|e| (e.kind, e.phase, e.status)).collect();
    assert_eq!(
        summary,
        [
            (ListenerType::Install, Phase::Start, Status::AllOk),
            (ListenerType::Install, Phase::End, Status::AllOk),
            (ListenerType::Remove, Phase::Start, Status::AllOk),
            (ListenerType::Remove, Phase::End, Status::AllOk),
        ]
    );
    // The start event previews the download; the end event has the stored jar.
    assert_ne!(events[0].suite.jar_path, record.jar_path);
    assert_eq!(events[1].suite, record);
}

#[test]
fn failed_install_reports_status_to_listeners() {
    let dir = tempfile::tempdir().unwrap();
    let mut inst = open(dir.path());
    let statuses = Arc::new(Mutex::new(Vec::new()));
    let sink = statuses.clone();
    inst.add_listener(move |e: &SuiteEvent| sink.lock().unwrap().push((e.phase, e.status)));

    let missing = dir.path().join("missing.jar");
    let err = inst
        .store_suite(
            &InstallInfo::default(),
            &SuiteSettings::default(),
            &SuiteRecord::regular(SuiteId(2), missing.display().to_string()),
        )
        .unwrap_err();
    assert_eq!(err.status(), Status::NotFound);
    assert_eq!(
        *statuses.lock().unwrap(),
        [(Phase::Start, Status::AllOk), (Phase::End, Status::NotFound)]
    );
}

#[test]
fn locked_suite_cannot_be_replaced_or_removed() {
    let dir = tempfile::tempdir().unwrap();
    let mut inst = open(dir.path());
    install(&mut inst, dir.path(), 2);
    inst.locks().lock(SuiteId(2), SuiteLock::Read).unwrap();

    let jar = download(dir.path(), "again.jar", 10);
    let err = inst
        .store_suite(
            &InstallInfo::default(),
            &SuiteSettings::default(),
            &SuiteRecord::regular(SuiteId(2), jar.display().to_string()),
        )
        .unwrap_err();
    assert_eq!(err.status(), Status::SuiteLocked);
    assert!(jar.exists());
    assert_eq!(
        inst.remove_suite(SuiteId(2)).unwrap_err().status(),
        Status::SuiteLocked
    );

    inst.locks().unlock(SuiteId(2));
    inst.remove_suite(SuiteId(2)).unwrap();
}

#[test]
fn update_lock_allows_reinstall() {
    let dir = tempfile::tempdir().unwrap();
    let mut inst = open(dir.path());
    install(&mut inst, dir.path(), 2);
    inst.locks().lock(SuiteId(2), SuiteLock::Update).unwrap();

    let jar = download(dir.path(), "again.jar", 10);
    let record = inst
        .store_suite(
            &InstallInfo::default(),
            &SuiteSettings::default(),
            &SuiteRecord::regular(SuiteId(2), jar.display().to_string()),
        )
        .unwrap();
    assert_eq!(record.jar_size, 10);
}

#[test]
fn dynamic_components_live_and_die_with_their_suite() {
    let dir = tempfile::tempdir().unwrap();
    let mut inst = open(dir.path());
    install(&mut inst, dir.path(), 2);

    let cid = inst.create_component_id().unwrap();
    let jar = download(dir.path(), "comp.jar", 40);
    let component = inst
        .store_suite(
            &InstallInfo::default(),
            &SuiteSettings::default(),
            &SuiteRecord::component(SuiteId(2), cid, jar.display().to_string()),
        )
        .unwrap();
    assert!(component.jar_path.ends_with(&format!("_c{:08x}.jar", cid.get())));
    assert_eq!(component.suite_size, 40);
    assert_eq!(inst.components_of(SuiteId(2)).unwrap(), vec![component.clone()]);

    inst.remove_suite(SuiteId(2)).unwrap();
    assert!(inst.list().unwrap().is_empty());
    assert!(!Path::new(&component.jar_path).exists());
}

#[test]
fn component_removal_leaves_suite_alone() {
    let dir = tempfile::tempdir().unwrap();
    let mut inst = open(dir.path());
    let suite = install(&mut inst, dir.path(), 2);
    let jar = download(dir.path(), "comp.jar", 40);
    let component = inst
        .store_suite(
            &InstallInfo::default(),
            &SuiteSettings::default(),
            &SuiteRecord::component(SuiteId(2), ComponentId(3), jar.display().to_string()),
        )
        .unwrap();

    inst.remove_component(ComponentId(3)).unwrap();
    assert_eq!(inst.list().unwrap(), vec![suite]);
    assert!(!Path::new(&component.jar_path).exists());
    assert_eq!(
        inst.remove_component(ComponentId(3)).unwrap_err().status(),
        Status::NotFound
    );
}

#[test]
fn components_rejected_when_disabled() {
    let dir = tempfile::tempdir().unwrap();
    let config = StoreConfig {
        dynamic_components: false,
        ..StoreConfig::default()
    };
    let mut inst =
        Installer::with_storage(dir.path().join("store"), config, Arc::new(FsStorage)).unwrap();
    let jar = download(dir.path(), "comp.jar", 40);
    let err = inst
        .store_suite(
            &InstallInfo::default(),
            &SuiteSettings::default(),
            &SuiteRecord::component(SuiteId(2), ComponentId(3), jar.display().to_string()),
        )
        .unwrap_err();
    assert_eq!(err.status(), Status::BadParams);
}

#[test]
fn icon_cache_counts_toward_footprint() {
    let dir = tempfile::tempdir().unwrap();
    let resources = dir.path().join("res");
    fs::create_dir_all(resources.join("icons")).unwrap();
    fs::write(resources.join("icons").join("app.png"), [7u8; 30]).unwrap();
    fs::write(resources.join("splash.png"), [1u8; 50]).unwrap();

    let config = StoreConfig {
        image_cache: true,
        icon_cache: true,
        ..StoreConfig::default()
    };
    let mut inst =
        Installer::with_storage(dir.path().join("store"), config, Arc::new(FsStorage)).unwrap();
    inst.set_image_cache(ResourceDirCache::new(&resources));

    let jar = download(dir.path(), "dl.jar", 100);
    let mut suite = SuiteRecord::regular(SuiteId(2), jar.display().to_string());
    suite.icon_name = Some("/icons/app.png".to_owned());
    let record = inst
        .store_suite(&InstallInfo::default(), &SuiteSettings::default(), &suite)
        .unwrap();

    let layout = inst.layout();
    let icon_size = fs::metadata(layout.icon_file(SuiteId(2))).unwrap().len();
    let metadata: u64 = [
        layout.install_info_file(SuiteId(2)),
        layout.properties_file(SuiteId(2)),
        layout.settings_file(SuiteId(2)),
    ]
    .iter()
    .map(|p| fs::metadata(p).unwrap().len())
    .sum();
    assert_eq!(record.suite_size, 100 + metadata + 50 + icon_size);
    assert_eq!(
        inst.read_icon(SuiteId(2)).unwrap(),
        ("/icons/app.png".to_owned(), vec![7u8; 30])
    );
    assert!(layout.image_cache_dir(SuiteId(2)).join("splash.png").exists());

    inst.remove_suite(SuiteId(2)).unwrap();
    assert!(!inst.layout().image_cache_dir(SuiteId(2)).exists());
    assert!(!inst.layout().icon_file(SuiteId(2)).exists());
}

#[test]
fn reinstall_on_another_volume_drops_old_jar() {
    let dir = tempfile::tempdir().unwrap();
    let mut inst = open(dir.path());
    let v1 = install(&mut inst, dir.path(), 2);
    let old_jar = PathBuf::from(&v1.jar_path);
    assert!(old_jar.exists());

    let jar = download(dir.path(), "moved.jar", 150);
    let moved = SuiteRecord {
        storage_id: StorageId(1),
        ..SuiteRecord::regular(SuiteId(2), jar.display().to_string())
    };
    let v2 = inst
        .store_suite(
            &InstallInfo::new("http://h/2.jar", "untrusted"),
            &SuiteSettings::default(),
            &moved,
        )
        .unwrap();
    let new_jar = PathBuf::from(&v2.jar_path);
    assert_ne!(new_jar, old_jar);
    assert!(new_jar.exists());
    assert!(!old_jar.exists());

    inst.remove_suite(SuiteId(2)).unwrap();
    assert!(!old_jar.exists());
    assert!(!new_jar.exists());
}

#[test]
fn reinstall_leaves_no_backup_jar() {
    let dir = tempfile::tempdir().unwrap();
    let mut inst = open(dir.path());
    let v1 = install(&mut inst, dir.path(), 2);

    let jar = download(dir.path(), "v2.jar", 300);
    inst.store_suite(
        &InstallInfo::new("http://h/2.jar", "untrusted"),
        &SuiteSettings::default(),
        &SuiteRecord::regular(SuiteId(2), jar.display().to_string()),
    )
    .unwrap();

    let installed = Path::new(&v1.jar_path);
    assert_eq!(fs::read(installed).unwrap(), vec![0xca; 300]);
    let backup = suitestore_store::JarStore::backup_path(installed);
    assert!(!backup.exists());
    assert!(inst.verify().unwrap().failed.is_empty());
}
