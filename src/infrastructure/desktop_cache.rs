use std::path::Path;
use std::process::Command;

// Best effort; the registry never depends on the outcome.
pub fn refresh_desktop_database(override_root: &Path) {
    match Command::new("update-desktop-database")
        .arg(override_root)
        .output()
    {
        Ok(output) if output.status.success() => {
            tracing::debug!(
                event = "desktop_cache_refreshed",
                root = override_root.display().to_string()
            );
        }
        Ok(output) => {
            tracing::debug!(
                event = "desktop_cache_refresh_failed",
                root = override_root.display().to_string(),
                status = output.status.to_string(),
                stderr = String::from_utf8_lossy(&output.stderr).to_string()
            );
        }
        Err(error) => {
            tracing::debug!(
                event = "desktop_cache_refresh_unavailable",
                root = override_root.display().to_string(),
                error = error.to_string()
            );
        }
    }
}
