use crate::core::models::DesktopAppDto;
use crate::core::{AppError, AppResult};
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{Connection, Error as SqliteError, OptionalExtension, Row, params};
use std::path::Path;

pub type DbPool = Pool<SqliteConnectionManager>;

fn map_desktop_app_row(row: &Row<'_>) -> Result<DesktopAppDto, SqliteError> {
    Ok(DesktopAppDto {
        basename: row.get(0)?,
        full_path: row.get(1)?,
        app_name: row.get(2)?,
        app_comment: row.get(3)?,
        app_exec: row.get(4)?,
        is_customized: row.get::<_, i64>(5)? == 1,
    })
}

pub fn new_db_pool(db_path: &Path) -> AppResult<DbPool> {
    let manager = SqliteConnectionManager::file(db_path);
    Ok(Pool::builder().max_size(8).build(manager)?)
}

pub fn init_db(db_path: &Path) -> AppResult<()> {
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent).map_err(|error| {
            AppError::new("db_error", "failed to create the database directory")
                .with_detail(error.to_string())
        })?;
    }

    let conn = Connection::open(db_path)?;
    conn.execute_batch(
        r#"
        PRAGMA journal_mode = WAL;
        PRAGMA synchronous = NORMAL;
        PRAGMA temp_store = MEMORY;
        PRAGMA busy_timeout = 3000;
        "#,
    )?;
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS apps (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            basename TEXT NOT NULL UNIQUE,
            full_path TEXT NOT NULL,
            app_name TEXT NOT NULL,
            app_comment TEXT,
            app_exec TEXT,
            is_customized INTEGER NOT NULL DEFAULT 0
        );

        CREATE INDEX IF NOT EXISTS idx_apps_name ON apps(app_name COLLATE NOCASE);
        CREATE INDEX IF NOT EXISTS idx_apps_customized ON apps(is_customized);
        "#,
    )?;

    Ok(())
}

pub fn upsert_app(pool: &DbPool, app: &DesktopAppDto) -> AppResult<()> {
    let conn = pool.get()?;
    conn.execute(
        "INSERT INTO apps (basename, full_path, app_name, app_comment, app_exec, is_customized)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)
         ON CONFLICT(basename) DO UPDATE SET
             full_path = excluded.full_path,
             app_name = excluded.app_name,
             app_comment = excluded.app_comment,
             app_exec = excluded.app_exec,
             is_customized = excluded.is_customized",
        params![
            app.basename,
            app.full_path,
            app.app_name,
            app.app_comment,
            app.app_exec,
            if app.is_customized { 1 } else { 0 },
        ],
    )?;
    Ok(())
}

// The ordering is the contract positional identifiers in the CLI and TUI
// are built on.
pub fn list_apps(pool: &DbPool) -> AppResult<Vec<DesktopAppDto>> {
    let conn = pool.get()?;
    let mut statement = conn.prepare(
        "SELECT basename, full_path, app_name, app_comment, app_exec, is_customized
         FROM apps
         ORDER BY app_name COLLATE NOCASE ASC, basename ASC",
    )?;
    let rows = statement.query_map([], map_desktop_app_row)?;

    let mut apps = Vec::new();
    for row in rows {
        apps.push(row?);
    }

    Ok(apps)
}

pub fn find_app_fuzzy(pool: &DbPool, query: &str) -> AppResult<Option<DesktopAppDto>> {
    let conn = pool.get()?;
    let normalized = normalize_query(query);
    if normalized.is_empty() {
        return Ok(None);
    }
    let pattern = format!("%{}%", escape_like_pattern(&normalized));

    let app = conn
        .query_row(
            "SELECT basename, full_path, app_name, app_comment, app_exec, is_customized
             FROM apps
             WHERE app_name LIKE ?1 ESCAPE '\\'
             ORDER BY app_name COLLATE NOCASE ASC, basename ASC
             LIMIT 1",
            params![pattern],
            map_desktop_app_row,
        )
        .optional()?;

    Ok(app)
}

pub fn set_override_status(pool: &DbPool, basename: &str, is_customized: bool) -> AppResult<()> {
    let conn = pool.get()?;
    conn.execute(
        "UPDATE apps SET is_customized = ?1 WHERE basename = ?2",
        params![if is_customized { 1 } else { 0 }, basename],
    )?;
    Ok(())
}

fn normalize_query(query: &str) -> String {
    query.trim().to_lowercase()
}

fn escape_like_pattern(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '%' | '_' | '\\' => {
                escaped.push('\\');
                escaped.push(ch);
            }
            _ => escaped.push(ch),
        }
    }
    escaped
}

#[cfg(test)]
#[path = "../../tests/infrastructure/db_tests.rs"]
mod tests;
