use crate::core::config::{AppPaths, home_dir};
use crate::core::{AppError, AppResult};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::Command;

pub const SERVICE_NAME: &str = "gpu-selector-scan";
const SYSTEMD_USER_DIR: &str = ".config/systemd/user";

pub fn render_service_unit(executable: &Path) -> String {
    format!(
        r#"[Unit]
Description=Scan for applications for GPU Selector

[Service]
Type=oneshot
ExecStart={} scan
"#,
        executable.display()
    )
}

pub fn render_path_unit(watched_roots: &[PathBuf]) -> String {
    let mut unit = String::from(
        r#"[Unit]
Description=Monitor application directories for changes to trigger GPU Selector scan

[Path]
"#,
    );
    for root in watched_roots {
        unit.push_str(&format!("PathChanged={}\n", root.display()));
    }
    unit.push_str("\n[Install]\nWantedBy=default.target\n");
    unit
}

// Roots that do not exist are left out so systemd does not refuse to start
// the path unit.
fn watched_roots(paths: &AppPaths) -> Vec<PathBuf> {
    let mut roots = vec![paths.override_root.clone()];
    roots.extend(paths.system_roots.iter().cloned());
    roots.into_iter().filter(|root| root.exists()).collect()
}

fn systemd_user_dir() -> AppResult<PathBuf> {
    let home = home_dir().ok_or_else(|| {
        AppError::new(
            "home_dir_unresolved",
            "unable to resolve the user home directory",
        )
    })?;
    Ok(home.join(SYSTEMD_USER_DIR))
}

pub fn install_service(paths: &AppPaths) -> AppResult<()> {
    let executable = std::env::current_exe().map_err(|error| {
        AppError::new(
            "service_install_failed",
            "failed to resolve the current executable path",
        )
        .with_detail(error.to_string())
    })?;

    let unit_dir = systemd_user_dir()?;
    fs::create_dir_all(&unit_dir).map_err(|error| {
        AppError::new(
            "service_install_failed",
            "failed to create the systemd user directory",
        )
        .with_detail(format!("{}: {error}", unit_dir.display()))
    })?;

    let service_path = unit_dir.join(format!("{SERVICE_NAME}.service"));
    let path_unit_path = unit_dir.join(format!("{SERVICE_NAME}.path"));

    fs::write(&service_path, render_service_unit(&executable)).map_err(|error| {
        AppError::new("service_install_failed", "failed to write the service unit")
            .with_detail(format!("{}: {error}", service_path.display()))
    })?;
    fs::write(&path_unit_path, render_path_unit(&watched_roots(paths))).map_err(|error| {
        AppError::new("service_install_failed", "failed to write the path unit")
            .with_detail(format!("{}: {error}", path_unit_path.display()))
    })?;

    tracing::info!(
        event = "service_units_installed",
        service_unit = service_path.display().to_string(),
        path_unit = path_unit_path.display().to_string()
    );

    Ok(())
}

pub fn service_units_present() -> AppResult<bool> {
    let unit_dir = systemd_user_dir()?;
    Ok(unit_dir.join(format!("{SERVICE_NAME}.service")).exists()
        || unit_dir.join(format!("{SERVICE_NAME}.path")).exists())
}

pub fn uninstall_service() -> AppResult<()> {
    let unit_dir = systemd_user_dir()?;
    let service_path = unit_dir.join(format!("{SERVICE_NAME}.service"));
    let path_unit_path = unit_dir.join(format!("{SERVICE_NAME}.path"));

    disable_path_unit();
    remove_unit_file(&service_path)?;
    remove_unit_file(&path_unit_path)?;

    tracing::info!(
        event = "service_units_removed",
        service_unit = service_path.display().to_string(),
        path_unit = path_unit_path.display().to_string()
    );

    Ok(())
}

fn disable_path_unit() {
    match Command::new("systemctl")
        .args(["--user", "disable", "--now"])
        .arg(format!("{SERVICE_NAME}.path"))
        .output()
    {
        Ok(output) if output.status.success() => {}
        Ok(output) => {
            tracing::debug!(
                event = "service_disable_failed",
                status = output.status.to_string(),
                stderr = String::from_utf8_lossy(&output.stderr).to_string()
            );
        }
        Err(error) => {
            tracing::debug!(
                event = "service_disable_unavailable",
                error = error.to_string()
            );
        }
    }
}

fn remove_unit_file(path: &Path) -> AppResult<()> {
    match fs::remove_file(path) {
        Ok(_) => Ok(()),
        Err(error) if error.kind() == ErrorKind::NotFound => Ok(()),
        Err(error) => Err(AppError::new(
            "service_uninstall_failed",
            "failed to remove a service unit",
        )
        .with_detail(format!("{}: {error}", path.display()))),
    }
}

#[cfg(test)]
#[path = "../../tests/infrastructure/systemd_tests.rs"]
mod tests;
