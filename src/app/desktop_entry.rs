use crate::core::models::DesktopAppDto;
use std::path::Path;

pub const DESKTOP_ENTRY_SECTION: &str = "Desktop Entry";
pub const PREFERS_NON_DEFAULT_GPU_KEY: &str = "PrefersNonDefaultGPU";
const NAME_KEY: &str = "Name";
const COMMENT_KEY: &str = "Comment";
const EXEC_KEY: &str = "Exec";
const NO_DISPLAY_KEY: &str = "NoDisplay";

// Skips are counted and logged, never propagated as scan errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseSkip {
    Unreadable,
    Malformed,
    MissingEntrySection,
    MissingName,
    NoDisplay,
}

impl ParseSkip {
    pub fn as_str(self) -> &'static str {
        match self {
            ParseSkip::Unreadable => "unreadable",
            ParseSkip::Malformed => "malformed",
            ParseSkip::MissingEntrySection => "missing_entry_section",
            ParseSkip::MissingName => "missing_name",
            ParseSkip::NoDisplay => "no_display",
        }
    }
}

#[derive(Debug, Clone)]
struct DesktopSection {
    name: String,
    entries: Vec<(String, String)>,
}

// Sections and keys keep their file order so a rewrite changes exactly one
// value; comments and blank lines are not retained.
#[derive(Debug, Clone)]
pub struct DesktopFile {
    sections: Vec<DesktopSection>,
}

impl DesktopFile {
    pub fn parse(content: &str) -> Result<DesktopFile, ParseSkip> {
        let mut sections: Vec<DesktopSection> = Vec::new();

        for raw_line in content.lines() {
            let line = raw_line.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
                continue;
            }

            if let Some(header) = line.strip_prefix('[') {
                let Some(name) = header.strip_suffix(']') else {
                    return Err(ParseSkip::Malformed);
                };
                if name.is_empty() || sections.iter().any(|section| section.name == name) {
                    return Err(ParseSkip::Malformed);
                }
                sections.push(DesktopSection {
                    name: name.to_string(),
                    entries: Vec::new(),
                });
                continue;
            }

            let Some(section) = sections.last_mut() else {
                return Err(ParseSkip::Malformed);
            };
            let Some((key, value)) = line.split_once('=') else {
                return Err(ParseSkip::Malformed);
            };
            let key = key.trim_end();
            let value = value.trim_start();
            if key.is_empty() || section.entries.iter().any(|(existing, _)| existing == key) {
                return Err(ParseSkip::Malformed);
            }
            section.entries.push((key.to_string(), value.to_string()));
        }

        Ok(DesktopFile { sections })
    }

    pub fn has_section(&self, name: &str) -> bool {
        self.sections.iter().any(|section| section.name == name)
    }

    pub fn get(&self, section: &str, key: &str) -> Option<&str> {
        self.sections
            .iter()
            .find(|candidate| candidate.name == section)?
            .entries
            .iter()
            .find(|(existing, _)| existing == key)
            .map(|(_, value)| value.as_str())
    }

    pub fn set(&mut self, section: &str, key: &str, value: &str) {
        let position = match self
            .sections
            .iter()
            .position(|candidate| candidate.name == section)
        {
            Some(position) => position,
            None => {
                self.sections.push(DesktopSection {
                    name: section.to_string(),
                    entries: Vec::new(),
                });
                self.sections.len() - 1
            }
        };
        let target = &mut self.sections[position];

        if let Some(entry) = target
            .entries
            .iter_mut()
            .find(|(existing, _)| existing == key)
        {
            entry.1 = value.to_string();
            return;
        }
        target.entries.push((key.to_string(), value.to_string()));
    }

    pub fn serialize(&self) -> String {
        let mut out = String::new();
        for section in &self.sections {
            out.push('[');
            out.push_str(&section.name);
            out.push_str("]\n");
            for (key, value) in &section.entries {
                out.push_str(key);
                out.push('=');
                out.push_str(value);
                out.push('\n');
            }
            out.push('\n');
        }
        out
    }
}

fn parse_bool(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "yes" | "true" | "on"
    )
}

pub fn parse_desktop_app(
    path: &Path,
    basename: &str,
    override_root: &Path,
) -> Result<DesktopAppDto, ParseSkip> {
    let content = std::fs::read_to_string(path).map_err(|_| ParseSkip::Unreadable)?;
    let file = DesktopFile::parse(&content)?;
    desktop_app_from_file(&file, basename, path, override_root)
}

pub fn desktop_app_from_file(
    file: &DesktopFile,
    basename: &str,
    path: &Path,
    override_root: &Path,
) -> Result<DesktopAppDto, ParseSkip> {
    if !file.has_section(DESKTOP_ENTRY_SECTION) {
        return Err(ParseSkip::MissingEntrySection);
    }

    let name = file
        .get(DESKTOP_ENTRY_SECTION, NAME_KEY)
        .filter(|value| !value.is_empty())
        .ok_or(ParseSkip::MissingName)?;
    if file
        .get(DESKTOP_ENTRY_SECTION, NO_DISPLAY_KEY)
        .is_some_and(parse_bool)
    {
        return Err(ParseSkip::NoDisplay);
    }

    let in_override_root = path.parent().is_some_and(|parent| parent == override_root);
    let declares_override = file
        .get(DESKTOP_ENTRY_SECTION, PREFERS_NON_DEFAULT_GPU_KEY)
        .is_some_and(parse_bool);

    Ok(DesktopAppDto {
        basename: basename.to_string(),
        full_path: path.display().to_string(),
        app_name: name.to_string(),
        app_comment: file
            .get(DESKTOP_ENTRY_SECTION, COMMENT_KEY)
            .map(ToString::to_string),
        app_exec: file
            .get(DESKTOP_ENTRY_SECTION, EXEC_KEY)
            .map(ToString::to_string),
        is_customized: in_override_root || declares_override,
    })
}

#[cfg(test)]
#[path = "../../tests/app/desktop_entry_tests.rs"]
mod tests;
