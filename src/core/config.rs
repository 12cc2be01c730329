use std::path::PathBuf;

use crate::core::{AppError, AppResult};

const SYSTEM_APP_ROOTS: [&str; 4] = [
    "/usr/share/applications",
    "/usr/local/share/applications",
    "/var/lib/snapd/desktop/applications",
    "/var/lib/flatpak/exports/share/applications",
];
const USER_APP_DIR: &str = ".local/share/applications";
const DATA_DIR: &str = ".config/gpu-selector";
const DB_FILE_NAME: &str = "gpu_selector.db";
const LOG_DIR_NAME: &str = "logs";

#[derive(Debug, Clone)]
pub struct AppPaths {
    pub system_roots: Vec<PathBuf>,
    pub override_root: PathBuf,
    pub db_path: PathBuf,
    pub log_dir: PathBuf,
}

impl AppPaths {
    // Later roots win on a basename collision, so the user override root
    // comes last.
    pub fn scan_roots(&self) -> Vec<PathBuf> {
        let mut roots = self.system_roots.clone();
        roots.push(self.override_root.clone());
        roots
    }
}

pub fn default_paths() -> AppResult<AppPaths> {
    let home = home_dir().ok_or_else(|| {
        AppError::new(
            "home_dir_unresolved",
            "unable to resolve the user home directory",
        )
    })?;
    let data_dir = home.join(DATA_DIR);
    Ok(AppPaths {
        system_roots: SYSTEM_APP_ROOTS.iter().map(PathBuf::from).collect(),
        override_root: home.join(USER_APP_DIR),
        db_path: data_dir.join(DB_FILE_NAME),
        log_dir: data_dir.join(LOG_DIR_NAME),
    })
}

pub(crate) fn home_dir() -> Option<PathBuf> {
    std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .map(PathBuf::from)
}

#[cfg(test)]
#[path = "../../tests/core/config_tests.rs"]
mod tests;
