use crate::app::override_service::{self, Identifier};
use crate::app::scan_service;
use crate::core::config::AppPaths;
use crate::core::errors::{AppError, AppResult};
use crate::infrastructure::db::{self, DbPool};
use crate::infrastructure::systemd;
use crate::tui;
use std::time::Instant;

fn command_start(command: &str) -> Instant {
    tracing::info!(event = "command_start", command = command);
    Instant::now()
}

fn command_end_ok(command: &str, started_at: Instant) {
    tracing::info!(
        event = "command_end",
        command = command,
        ok = true,
        duration_ms = started_at.elapsed().as_millis() as u64
    );
}

fn command_end_error(command: &str, started_at: Instant, error: &AppError) {
    tracing::error!(
        event = "command_end",
        command = command,
        ok = false,
        duration_ms = started_at.elapsed().as_millis() as u64,
        error_code = error.code.as_str(),
        error_message = error.message.as_str(),
        error_detail = error.detail.as_deref().unwrap_or_default()
    );
}

fn run_command<T, F>(command: &str, op: F) -> AppResult<T>
where
    F: FnOnce() -> AppResult<T>,
{
    let started_at = command_start(command);
    let result = op();
    match &result {
        Ok(_) => command_end_ok(command, started_at),
        Err(error) => command_end_error(command, started_at, error),
    }
    result
}

// The listing prints 1-based ids while positions are zero-based internally,
// so a typed `0` resolves out of range instead of wrapping to the first row.
pub(crate) fn user_identifier(raw: &str) -> Identifier {
    match override_service::classify_identifier(raw) {
        Identifier::Position(position) => {
            Identifier::Position(position.checked_sub(1).unwrap_or(usize::MAX))
        }
        name => name,
    }
}

pub fn run_scan(pool: &DbPool, paths: &AppPaths) -> AppResult<()> {
    run_command("scan", || {
        println!("Scanning and updating application database...");
        let count = scan_service::scan_apps(pool, paths)?;
        println!("Scan complete. Found {count} unique applications.");
        Ok(())
    })
}

pub fn run_list(pool: &DbPool, json: bool) -> AppResult<()> {
    run_command("list", || {
        let apps = db::list_apps(pool)?;
        if json {
            let encoded = serde_json::to_string_pretty(&apps).map_err(|error| {
                AppError::new("serialize_error", "failed to encode the listing as JSON")
                    .with_detail(error.to_string())
            })?;
            println!("{encoded}");
            return Ok(());
        }

        if apps.is_empty() {
            println!("No applications found. Run 'scan' first.");
            return Ok(());
        }

        println!("{:<4} {:<8} {:<40} {}", "ID", "GPU", "APP NAME", "COMMENT");
        println!("{}", "-".repeat(80));
        for (index, app) in apps.iter().enumerate() {
            let status = if app.is_customized { "[*]" } else { "[ ]" };
            println!(
                "{:<4} {:<8} {:<40} {}",
                index + 1,
                status,
                app.app_name,
                app.app_comment.as_deref().unwrap_or_default()
            );
        }
        Ok(())
    })
}

pub fn run_set(pool: &DbPool, paths: &AppPaths, identifier: &str) -> AppResult<()> {
    run_command("set", || {
        println!("Setting '{identifier}' to prefer the dedicated GPU...");
        let resolved = user_identifier(identifier);
        let name = override_service::set_gpu_override(pool, paths, &resolved, identifier)?;
        println!("Successfully set '{name}' to prefer the dedicated GPU.");
        Ok(())
    })
}

pub fn run_unset(pool: &DbPool, paths: &AppPaths, identifier: &str) -> AppResult<()> {
    run_command("unset", || {
        println!("Resetting '{identifier}' to default GPU preference...");
        let resolved = user_identifier(identifier);
        let name = override_service::unset_gpu_override(pool, paths, &resolved, identifier)?;
        println!("Successfully reset '{name}'.");
        Ok(())
    })
}

pub fn run_tui(pool: &DbPool, paths: &AppPaths) -> AppResult<()> {
    run_command("tui", || tui::run(pool, paths))
}

pub fn run_install_service(paths: &AppPaths) -> AppResult<()> {
    run_command("install-service", || {
        systemd::install_service(paths)?;
        println!("✅ Systemd service files created successfully!");
        println!("To enable and start the automatic scanning, run the following commands:");
        println!("\n  systemctl --user daemon-reload");
        println!("  systemctl --user enable --now {}.path", systemd::SERVICE_NAME);
        Ok(())
    })
}

pub fn run_uninstall_service() -> AppResult<()> {
    run_command("uninstall-service", || {
        if !systemd::service_units_present()? {
            println!("Service files not found. Nothing to do.");
            return Ok(());
        }

        println!("Disabling and removing service files...");
        systemd::uninstall_service()?;
        println!("✅ Service files removed.");
        println!("Please run the following command to apply the changes:");
        println!("\n  systemctl --user daemon-reload");
        Ok(())
    })
}

#[cfg(test)]
#[path = "../../tests/commands/identifier_mapping_tests.rs"]
mod tests;
