use crate::core::models::DesktopAppDto;
use regex::{Regex, RegexBuilder};

// `visible` holds canonical indices into `apps` and `selected` is a row in
// `visible`. Acting on the selected row always goes through the canonical
// index, so a filtered view can never toggle the wrong application.
#[derive(Debug, Clone)]
pub struct ViewIndex {
    apps: Vec<DesktopAppDto>,
    visible: Vec<usize>,
    selected: Option<usize>,
    filter: String,
}

impl ViewIndex {
    pub fn new(apps: Vec<DesktopAppDto>) -> Self {
        let mut index = Self {
            apps,
            visible: Vec::new(),
            selected: None,
            filter: String::new(),
        };
        index.apply_filter(None);
        index
    }

    pub fn filter(&self) -> &str {
        &self.filter
    }

    pub fn set_filter(&mut self, filter: impl Into<String>) {
        self.filter = filter.into();
        self.reapply();
    }

    pub fn push_filter_char(&mut self, ch: char) {
        self.filter.push(ch);
        self.reapply();
    }

    pub fn pop_filter_char(&mut self) {
        if self.filter.pop().is_some() {
            self.reapply();
        }
    }

    pub fn refresh(&mut self, apps: Vec<DesktopAppDto>) {
        let keep = self.selected_basename();
        self.apps = apps;
        self.apply_filter(keep.as_deref());
    }

    pub fn visible_apps(&self) -> impl Iterator<Item = &DesktopAppDto> + '_ {
        self.visible.iter().map(|&canonical| &self.apps[canonical])
    }

    pub fn visible_len(&self) -> usize {
        self.visible.len()
    }

    pub fn selected_row(&self) -> Option<usize> {
        self.selected
    }

    pub fn selected_app(&self) -> Option<&DesktopAppDto> {
        self.selected_canonical().map(|canonical| &self.apps[canonical])
    }

    // Position in the canonical listing, the value to hand to the override
    // service.
    pub fn selected_canonical(&self) -> Option<usize> {
        self.selected.map(|row| self.visible[row])
    }

    pub fn select_next(&mut self) {
        if self.visible.is_empty() {
            self.selected = None;
            return;
        }
        self.selected = Some(match self.selected {
            Some(row) => (row + 1).min(self.visible.len() - 1),
            None => 0,
        });
    }

    pub fn select_previous(&mut self) {
        if self.visible.is_empty() {
            self.selected = None;
            return;
        }
        self.selected = Some(match self.selected {
            Some(row) => row.saturating_sub(1),
            None => 0,
        });
    }

    fn selected_basename(&self) -> Option<String> {
        self.selected_app().map(|app| app.basename.clone())
    }

    fn reapply(&mut self) {
        let keep = self.selected_basename();
        self.apply_filter(keep.as_deref());
    }

    // Restores the selection after rebuilding `visible`: the previously
    // selected entry when it still passes the filter, else the first visible
    // row, else none.
    fn apply_filter(&mut self, keep_basename: Option<&str>) {
        let matcher = compile_filter(&self.filter);
        self.visible = self
            .apps
            .iter()
            .enumerate()
            .filter(|(_, app)| {
                matcher
                    .as_ref()
                    .is_none_or(|regex| regex.is_match(&app.app_name))
            })
            .map(|(index, _)| index)
            .collect();

        self.selected = keep_basename
            .and_then(|basename| {
                self.visible
                    .iter()
                    .position(|&canonical| self.apps[canonical].basename == basename)
            })
            .or_else(|| if self.visible.is_empty() { None } else { Some(0) });
    }
}

// A pattern that does not compile as a regex degrades to a literal match;
// None matches everything.
fn compile_filter(pattern: &str) -> Option<Regex> {
    if pattern.is_empty() {
        return None;
    }
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .or_else(|_| {
            RegexBuilder::new(&regex::escape(pattern))
                .case_insensitive(true)
                .build()
        })
        .ok()
}

#[cfg(test)]
#[path = "../../tests/app/view_index_tests.rs"]
mod tests;
