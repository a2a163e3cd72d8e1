use std::path::Path;

use serde::Deserialize;

use crate::error::ConfigError;
use crate::selector::Selector;

/// Labels for: inactive ascending, inactive descending, active ascending, active descending
pub const DEFAULT_HINTS: [&str; 4] = ["+", "-", "x", "x"];

/// Control labels, indexed by `2 * on + descending`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "Vec<String>")]
pub struct Hints([String; 4]);

impl Hints {
    pub fn label(&self, on: bool, ascending: bool) -> &str {
        let index = 2 * usize::from(on) + usize::from(!ascending);
        &self.0[index]
    }
}

impl Default for Hints {
    fn default() -> Self {
        Self(DEFAULT_HINTS.map(|s| s.to_string()))
    }
}

/// A partial list overrides the defaults from the front
impl From<Vec<String>> for Hints {
    fn from(given: Vec<String>) -> Self {
        let mut hints = Self::default();
        for (slot, label) in hints.0.iter_mut().zip(given) {
            *slot = label;
        }
        hints
    }
}

/// Options recognized when binding a table
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct SortOptions {
    /// Head row holding the controls when no `widgets_row` is given
    pub header_row_index: usize,
    /// Head row receiving the controls, for multi-row headers
    pub widgets_row: Option<Selector>,
    /// Overrides the "row has a cell spanning several columns" heuristic
    pub fake_row: Option<Selector>,
    /// Header cells never given controls
    pub excluded_column: Selector,
    pub widget_container_class: String,
    pub hints: Hints,
    /// Bind controls even with fewer than two body rows
    pub force_widgets: bool,
}

impl Default for SortOptions {
    fn default() -> Self {
        Self {
            header_row_index: 0,
            widgets_row: None,
            fake_row: None,
            excluded_column: Selector::class("nosort"),
            widget_container_class: "sort".to_string(),
            hints: Hints::default(),
            force_widgets: false,
        }
    }
}

/// Settings of the terminal front end, read from a TOML file
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct AppConfig {
    /// Leading CSV records forming the table head
    pub header_rows: usize,
    pub sort: SortOptions,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self { header_rows: 1, sort: SortOptions::default() }
    }
}

impl AppConfig {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|source| ConfigError::Read { path: path.to_path_buf(), source })?;
        toml::from_str(&content)
            .map_err(|source| ConfigError::Parse { path: path.to_path_buf(), source })
    }
}
