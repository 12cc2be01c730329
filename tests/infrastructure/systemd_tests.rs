use super::*;
use uuid::Uuid;

#[test]
fn render_service_unit_should_embed_the_executable() {
    let unit = render_service_unit(Path::new("/usr/local/bin/gpu-selector"));
    assert_eq!(
        unit,
        "[Unit]\nDescription=Scan for applications for GPU Selector\n\n[Service]\nType=oneshot\nExecStart=/usr/local/bin/gpu-selector scan\n"
    );
}

#[test]
fn render_path_unit_should_watch_each_root() {
    let unit = render_path_unit(&[
        PathBuf::from("/home/user/.local/share/applications"),
        PathBuf::from("/usr/share/applications"),
    ]);
    assert_eq!(
        unit,
        "[Unit]\nDescription=Monitor application directories for changes to trigger GPU Selector scan\n\n[Path]\nPathChanged=/home/user/.local/share/applications\nPathChanged=/usr/share/applications\n\n[Install]\nWantedBy=default.target\n"
    );
}

#[test]
fn watched_roots_should_keep_only_existing_directories() {
    let existing = std::env::temp_dir().join(format!("gpu-selector-watch-{}", Uuid::new_v4()));
    std::fs::create_dir_all(&existing).expect("create temp dir");
    let missing = std::env::temp_dir().join(format!("gpu-selector-gone-{}", Uuid::new_v4()));

    let paths = AppPaths {
        system_roots: vec![missing.clone()],
        override_root: existing.clone(),
        db_path: existing.join("db.sqlite"),
        log_dir: existing.join("logs"),
    };
    let roots = watched_roots(&paths);
    assert_eq!(roots, vec![existing.clone()]);

    let _ = std::fs::remove_dir_all(existing);
}
