use crate::app::desktop_entry::{DESKTOP_ENTRY_SECTION, PREFERS_NON_DEFAULT_GPU_KEY, DesktopFile};
use crate::app::scan_service;
use crate::core::config::AppPaths;
use crate::core::errors::{AppError, AppResult};
use crate::core::models::DesktopAppDto;
use crate::infrastructure::db::{self, DbPool};
use crate::infrastructure::desktop_cache;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Identifier {
    Position(usize),
    Name(String),
}

// A string of ASCII digits is always a zero-based position, so an app whose
// display name is all digits cannot be addressed by name. Digit strings too
// large for usize stay positional and resolve out of range.
pub fn classify_identifier(raw: &str) -> Identifier {
    if !raw.is_empty() && raw.bytes().all(|byte| byte.is_ascii_digit()) {
        return Identifier::Position(raw.parse().unwrap_or(usize::MAX));
    }
    Identifier::Name(raw.to_string())
}

pub fn resolve_identifier(
    pool: &DbPool,
    identifier: &Identifier,
) -> AppResult<Option<DesktopAppDto>> {
    match identifier {
        Identifier::Position(position) => {
            Ok(db::list_apps(pool)?.into_iter().nth(*position))
        }
        Identifier::Name(query) => db::find_app_fuzzy(pool, query),
    }
}

fn app_not_found(requested: &str) -> AppError {
    AppError::new(
        "app_not_found",
        format!("Application '{requested}' not found."),
    )
}

// Overwrites any previous override for the same basename, so repeated calls
// converge on the same state.
pub fn set_gpu_override(
    pool: &DbPool,
    paths: &AppPaths,
    identifier: &Identifier,
    requested: &str,
) -> AppResult<String> {
    let Some(app) = resolve_identifier(pool, identifier)? else {
        return Err(app_not_found(requested));
    };

    fs::create_dir_all(&paths.override_root).map_err(|error| {
        AppError::new(
            "override_dir_create_failed",
            "failed to create the override directory",
        )
        .with_detail(error.to_string())
    })?;

    let source_path = Path::new(&app.full_path);
    let content = fs::read_to_string(source_path).map_err(|error| {
        AppError::new(
            "invalid_desktop_entry",
            format!("Invalid .desktop file: cannot read {}", app.full_path),
        )
        .with_detail(error.to_string())
    })?;
    let mut file = DesktopFile::parse(&content).map_err(|_| {
        AppError::new(
            "invalid_desktop_entry",
            format!("Invalid .desktop file: malformed content in {}", app.full_path),
        )
    })?;
    if !file.has_section(DESKTOP_ENTRY_SECTION) {
        return Err(AppError::new(
            "invalid_desktop_entry",
            format!("Invalid .desktop file: no [Desktop Entry] in {}", app.full_path),
        ));
    }

    file.set(DESKTOP_ENTRY_SECTION, PREFERS_NON_DEFAULT_GPU_KEY, "true");
    let override_path = paths.override_root.join(&app.basename);
    fs::write(&override_path, file.serialize()).map_err(|error| {
        AppError::new("override_write_failed", "failed to write the override file")
            .with_detail(error.to_string())
    })?;

    db::set_override_status(pool, &app.basename, true)?;
    desktop_cache::refresh_desktop_database(&paths.override_root);
    scan_service::scan_apps(pool, paths)?;

    tracing::info!(
        event = "gpu_override_set",
        basename = %app.basename,
        app_name = %app.app_name,
        override_path = %override_path.display()
    );
    Ok(app.app_name)
}

pub fn unset_gpu_override(
    pool: &DbPool,
    paths: &AppPaths,
    identifier: &Identifier,
    requested: &str,
) -> AppResult<String> {
    let Some(app) = resolve_identifier(pool, identifier)? else {
        return Err(app_not_found(requested));
    };

    let override_path = paths.override_root.join(&app.basename);
    if !override_path.exists() {
        return Err(AppError::new(
            "app_not_customized",
            format!("Application '{}' was not customized.", app.app_name),
        ));
    }

    match fs::remove_file(&override_path) {
        Ok(()) => {}
        Err(error) if error.kind() == std::io::ErrorKind::NotFound => {}
        Err(error) => {
            return Err(AppError::new(
                "override_remove_failed",
                "failed to remove the override file",
            )
            .with_detail(error.to_string()));
        }
    }

    db::set_override_status(pool, &app.basename, false)?;
    desktop_cache::refresh_desktop_database(&paths.override_root);
    scan_service::scan_apps(pool, paths)?;

    tracing::info!(
        event = "gpu_override_unset",
        basename = %app.basename,
        app_name = %app.app_name
    );
    Ok(app.app_name)
}

#[cfg(test)]
#[path = "../../tests/app/override_service_tests.rs"]
mod tests;
