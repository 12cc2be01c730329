use crate::app::desktop_entry::{self, ParseSkip};
use crate::core::config::AppPaths;
use crate::core::errors::AppResult;
use crate::infrastructure::db::{self, DbPool};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

const DESKTOP_FILE_SUFFIX: &str = ".desktop";
const SCAN_SKIP_SAMPLE_LIMIT: usize = 5;

#[derive(Debug, Clone, Copy)]
enum ScanSkipKind {
    WalkFailed,
    Unreadable,
    Malformed,
    MissingEntrySection,
    MissingName,
    NoDisplay,
}

impl From<ParseSkip> for ScanSkipKind {
    fn from(reason: ParseSkip) -> Self {
        match reason {
            ParseSkip::Unreadable => ScanSkipKind::Unreadable,
            ParseSkip::Malformed => ScanSkipKind::Malformed,
            ParseSkip::MissingEntrySection => ScanSkipKind::MissingEntrySection,
            ParseSkip::MissingName => ScanSkipKind::MissingName,
            ParseSkip::NoDisplay => ScanSkipKind::NoDisplay,
        }
    }
}

// One summary event per scan instead of a log line per skipped file.
#[derive(Debug, Default)]
struct ScanSkipAggregator {
    walk_failed: u64,
    unreadable: u64,
    malformed: u64,
    missing_entry_section: u64,
    missing_name: u64,
    no_display: u64,
    walk_failed_samples: Vec<String>,
    unreadable_samples: Vec<String>,
    malformed_samples: Vec<String>,
    missing_entry_section_samples: Vec<String>,
    missing_name_samples: Vec<String>,
    no_display_samples: Vec<String>,
}

impl ScanSkipAggregator {
    fn record(&mut self, kind: ScanSkipKind, path: &Path) {
        let (count, samples) = match kind {
            ScanSkipKind::WalkFailed => (&mut self.walk_failed, &mut self.walk_failed_samples),
            ScanSkipKind::Unreadable => (&mut self.unreadable, &mut self.unreadable_samples),
            ScanSkipKind::Malformed => (&mut self.malformed, &mut self.malformed_samples),
            ScanSkipKind::MissingEntrySection => (
                &mut self.missing_entry_section,
                &mut self.missing_entry_section_samples,
            ),
            ScanSkipKind::MissingName => {
                (&mut self.missing_name, &mut self.missing_name_samples)
            }
            ScanSkipKind::NoDisplay => (&mut self.no_display, &mut self.no_display_samples),
        };
        *count += 1;
        if samples.len() < SCAN_SKIP_SAMPLE_LIMIT {
            samples.push(path.display().to_string());
        }
    }

    fn total_skipped(&self) -> u64 {
        self.walk_failed
            .saturating_add(self.unreadable)
            .saturating_add(self.malformed)
            .saturating_add(self.missing_entry_section)
            .saturating_add(self.missing_name)
            .saturating_add(self.no_display)
    }

    fn log_summary(&self) {
        if self.total_skipped() == 0 {
            return;
        }
        tracing::info!(
            event = "scan_skip_summary",
            walk_failed = self.walk_failed,
            unreadable = self.unreadable,
            malformed = self.malformed,
            missing_entry_section = self.missing_entry_section,
            missing_name = self.missing_name,
            no_display = self.no_display,
            walk_failed_samples = %self.walk_failed_samples.join(" | "),
            unreadable_samples = %self.unreadable_samples.join(" | "),
            malformed_samples = %self.malformed_samples.join(" | "),
            missing_entry_section_samples = %self.missing_entry_section_samples.join(" | "),
            missing_name_samples = %self.missing_name_samples.join(" | "),
            no_display_samples = %self.no_display_samples.join(" | ")
        );
    }
}

// A basename seen in a later root replaces the earlier occurrence, so the
// user override root wins every collision. The returned count is distinct
// basenames discovered, including files the parser then skipped.
pub fn scan_apps(pool: &DbPool, paths: &AppPaths) -> AppResult<usize> {
    let mut discovered: HashMap<String, PathBuf> = HashMap::new();
    let mut skips = ScanSkipAggregator::default();

    for root in paths.scan_roots() {
        collect_desktop_files(&root, &mut discovered, &mut skips);
    }
    let discovered_count = discovered.len();

    for (basename, path) in &discovered {
        match desktop_entry::parse_desktop_app(path, basename, &paths.override_root) {
            Ok(app) => db::upsert_app(pool, &app)?,
            Err(reason) => skips.record(reason.into(), path),
        }
    }

    skips.log_summary();
    tracing::info!(
        event = "scan_completed",
        discovered = discovered_count,
        skipped = skips.total_skipped()
    );
    Ok(discovered_count)
}

fn collect_desktop_files(
    root: &Path,
    discovered: &mut HashMap<String, PathBuf>,
    skips: &mut ScanSkipAggregator,
) {
    if !root.exists() {
        return;
    }

    for entry in WalkDir::new(root).follow_links(true) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(error) => {
                let failed_path = error
                    .path()
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|| root.to_path_buf());
                skips.record(ScanSkipKind::WalkFailed, &failed_path);
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let Some(file_name) = entry.file_name().to_str() else {
            continue;
        };
        if !file_name.ends_with(DESKTOP_FILE_SUFFIX) {
            continue;
        }
        discovered.insert(file_name.to_string(), entry.path().to_path_buf());
    }
}

#[cfg(test)]
#[path = "../../tests/app/scan_service_tests.rs"]
mod tests;
