use super::*;
use std::fs;
use uuid::Uuid;

fn create_temp_dir(prefix: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("gpu-selector-{prefix}-{}", Uuid::new_v4()));
    fs::create_dir_all(&path).expect("create temp dir");
    path
}

fn setup_temp_db(prefix: &str) -> (DbPool, PathBuf) {
    let path = std::env::temp_dir().join(format!(
        "gpu-selector-{prefix}-{}-{}.db",
        std::process::id(),
        Uuid::new_v4()
    ));
    db::init_db(&path).expect("init db");
    let pool = db::new_db_pool(&path).expect("new db pool");
    (pool, path)
}

fn test_paths(system_roots: Vec<PathBuf>, override_root: PathBuf, db_path: PathBuf) -> AppPaths {
    let log_dir = db_path.with_extension("logs");
    AppPaths {
        system_roots,
        override_root,
        db_path,
        log_dir,
    }
}

fn write_entry(dir: &Path, basename: &str, name: &str) {
    fs::write(
        dir.join(basename),
        format!("[Desktop Entry]\nName={name}\nExec=run %u\n"),
    )
    .expect("write desktop file");
}

fn cleanup(roots: &[&Path], db_path: &Path) {
    for root in roots {
        let _ = fs::remove_dir_all(root);
    }
    let _ = fs::remove_file(db_path);
}

#[test]
fn scan_should_register_entries_from_every_root() {
    let system_root = create_temp_dir("scan-system");
    let override_root = create_temp_dir("scan-user");
    let (pool, db_path) = setup_temp_db("scan-roots");
    write_entry(&system_root, "blender.desktop", "Blender");
    write_entry(&override_root, "gimp.desktop", "GIMP");
    let paths = test_paths(
        vec![system_root.clone()],
        override_root.clone(),
        db_path.clone(),
    );

    let count = scan_apps(&pool, &paths).expect("scan");
    assert_eq!(count, 2);

    let names: Vec<String> = db::list_apps(&pool)
        .expect("list apps")
        .into_iter()
        .map(|app| app.app_name)
        .collect();
    assert_eq!(names, vec!["Blender".to_string(), "GIMP".to_string()]);

    cleanup(&[&system_root, &override_root], &db_path);
}

#[test]
fn scan_should_prefer_the_override_root_on_basename_collisions() {
    let system_root = create_temp_dir("scan-collision-system");
    let override_root = create_temp_dir("scan-collision-user");
    let (pool, db_path) = setup_temp_db("scan-collision");
    write_entry(&system_root, "firefox.desktop", "Firefox (system)");
    write_entry(&override_root, "firefox.desktop", "Firefox (user)");
    let paths = test_paths(
        vec![system_root.clone()],
        override_root.clone(),
        db_path.clone(),
    );

    let count = scan_apps(&pool, &paths).expect("scan");
    assert_eq!(count, 1);

    let apps = db::list_apps(&pool).expect("list apps");
    assert_eq!(apps.len(), 1);
    assert_eq!(apps[0].app_name, "Firefox (user)");
    assert_eq!(
        apps[0].full_path,
        override_root.join("firefox.desktop").display().to_string()
    );
    assert!(apps[0].is_customized);

    cleanup(&[&system_root, &override_root], &db_path);
}

#[test]
fn scan_count_should_include_files_the_parser_skipped() {
    let system_root = create_temp_dir("scan-skips-system");
    let override_root = create_temp_dir("scan-skips-user");
    let (pool, db_path) = setup_temp_db("scan-skips");
    write_entry(&system_root, "blender.desktop", "Blender");
    fs::write(
        system_root.join("hidden.desktop"),
        "[Desktop Entry]\nName=Hidden Helper\nNoDisplay=true\n",
    )
    .expect("write hidden entry");
    fs::write(system_root.join("broken.desktop"), "Name=No Section\n")
        .expect("write broken entry");
    let paths = test_paths(
        vec![system_root.clone()],
        override_root.clone(),
        db_path.clone(),
    );

    let count = scan_apps(&pool, &paths).expect("scan");
    assert_eq!(count, 3);

    let apps = db::list_apps(&pool).expect("list apps");
    assert_eq!(apps.len(), 1);
    assert_eq!(apps[0].app_name, "Blender");

    cleanup(&[&system_root, &override_root], &db_path);
}

#[test]
fn scan_should_ignore_missing_roots() {
    let override_root = create_temp_dir("scan-missing-user");
    let (pool, db_path) = setup_temp_db("scan-missing");
    write_entry(&override_root, "gimp.desktop", "GIMP");
    let missing = std::env::temp_dir().join(format!("gpu-selector-missing-{}", Uuid::new_v4()));
    let paths = test_paths(vec![missing], override_root.clone(), db_path.clone());

    let count = scan_apps(&pool, &paths).expect("scan");
    assert_eq!(count, 1);

    cleanup(&[&override_root], &db_path);
}

#[test]
fn scan_should_recurse_into_nested_directories() {
    let system_root = create_temp_dir("scan-nested-system");
    let override_root = create_temp_dir("scan-nested-user");
    let (pool, db_path) = setup_temp_db("scan-nested");
    let nested = system_root.join("kde/apps");
    fs::create_dir_all(&nested).expect("create nested dirs");
    write_entry(&nested, "kate.desktop", "Kate");
    let paths = test_paths(
        vec![system_root.clone()],
        override_root.clone(),
        db_path.clone(),
    );

    let count = scan_apps(&pool, &paths).expect("scan");
    assert_eq!(count, 1);
    assert_eq!(db::list_apps(&pool).expect("list apps")[0].app_name, "Kate");

    cleanup(&[&system_root, &override_root], &db_path);
}

#[test]
fn scan_should_ignore_files_without_the_desktop_suffix() {
    let system_root = create_temp_dir("scan-suffix-system");
    let override_root = create_temp_dir("scan-suffix-user");
    let (pool, db_path) = setup_temp_db("scan-suffix");
    write_entry(&system_root, "blender.desktop", "Blender");
    fs::write(system_root.join("README.txt"), "not a launcher").expect("write readme");
    let paths = test_paths(
        vec![system_root.clone()],
        override_root.clone(),
        db_path.clone(),
    );

    let count = scan_apps(&pool, &paths).expect("scan");
    assert_eq!(count, 1);

    cleanup(&[&system_root, &override_root], &db_path);
}

#[test]
fn rescan_should_pick_up_changed_entries() {
    let system_root = create_temp_dir("scan-rescan-system");
    let override_root = create_temp_dir("scan-rescan-user");
    let (pool, db_path) = setup_temp_db("scan-rescan");
    write_entry(&system_root, "editor.desktop", "Editor");
    let paths = test_paths(
        vec![system_root.clone()],
        override_root.clone(),
        db_path.clone(),
    );

    scan_apps(&pool, &paths).expect("first scan");
    write_entry(&system_root, "editor.desktop", "Editor Pro");
    let count = scan_apps(&pool, &paths).expect("second scan");

    assert_eq!(count, 1);
    let apps = db::list_apps(&pool).expect("list apps");
    assert_eq!(apps.len(), 1);
    assert_eq!(apps[0].app_name, "Editor Pro");

    cleanup(&[&system_root, &override_root], &db_path);
}
