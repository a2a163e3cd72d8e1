//! Sort keys extracted from the displayed content of a row

use std::sync::OnceLock;

use regex::Regex;

/// Leading signed decimal; an integer part is mandatory so ".5" is not numeric
fn numeric_digest() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[+-]?[0-9]+(?:\.[0-9]+)?").expect("valid numeric pattern"))
}

/// Comparable digest of one cell
#[derive(Debug, Clone, PartialEq)]
pub struct Key {
    /// Lowercased display text, untrimmed
    pub text: String,
    /// Leading number of the text, if it starts with one
    pub num: Option<f64>,
}

/// Key used for cells missing from short rows
static EMPTY_KEY: Key = Key { text: String::new(), num: None };

impl Key {
    pub fn parse(content: &str) -> Self {
        let text = content.to_lowercase();
        let num = numeric_digest()
            .find(&text)
            .and_then(|m| m.as_str().parse::<f64>().ok());
        Self { text, num }
    }

    /// Distinct key standing in for every column of a fake row
    pub fn fallback(rank: usize) -> Self {
        Self {
            text: format!("#{}", rank),
            num: Some(rank as f64),
        }
    }
}

/// A row as the sorter sees it
#[derive(Debug, Clone, PartialEq)]
pub enum SortRow {
    /// Row without per-column content (separator, caption...), ordered by rank only
    Fake { rank: usize, key: Key },
    Normal { rank: usize, keys: Vec<Key> },
}

impl SortRow {
    /// Build the sort record for one row.
    /// `fake` rows get a single rank-derived key instead of per-cell keys.
    pub fn extract<S: AsRef<str>>(cells: &[S], rank: usize, fake: bool) -> Self {
        if fake {
            SortRow::Fake { rank, key: Key::fallback(rank) }
        } else {
            SortRow::Normal {
                rank,
                keys: cells.iter().map(|c| Key::parse(c.as_ref())).collect(),
            }
        }
    }

    pub fn rank(&self) -> usize {
        match self {
            SortRow::Fake { rank, .. } | SortRow::Normal { rank, .. } => *rank,
        }
    }

    pub fn is_fake(&self) -> bool {
        matches!(self, SortRow::Fake { .. })
    }

    /// Key compared for `column`
    pub fn key(&self, column: usize) -> &Key {
        match self {
            SortRow::Fake { key, .. } => key,
            SortRow::Normal { keys, .. } => keys.get(column).unwrap_or(&EMPTY_KEY),
        }
    }
}
