//! Per-table sort state machine over in-memory row records

use rayon::prelude::*;
use tracing::debug;

use super::columns::ColumnMap;
use super::key::SortRow;
use super::sort::{comparator, SortDirection};
use crate::error::SortError;

/// Threshold for using parallel processing
const PARALLEL_THRESHOLD: usize = 10_000;

/// Displayed content of one body row, as handed over by the display layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowSource {
    pub cells: Vec<String>,
    /// Row cannot supply per-column keys
    pub fake: bool,
}

impl RowSource {
    pub fn new(cells: Vec<String>) -> Self {
        Self { cells, fake: false }
    }

    pub fn fake(cells: Vec<String>) -> Self {
        Self { cells, fake: true }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortState {
    /// Original order
    #[default]
    Unsorted,
    Ascending(usize),
    Descending(usize),
}

impl SortState {
    pub fn new(column: Option<usize>, direction: SortDirection) -> Self {
        match (column, direction) {
            (None, _) => SortState::Unsorted,
            (Some(c), SortDirection::Ascending) => SortState::Ascending(c),
            (Some(c), SortDirection::Descending) => SortState::Descending(c),
        }
    }

    pub fn column(&self) -> Option<usize> {
        match self {
            SortState::Unsorted => None,
            SortState::Ascending(c) | SortState::Descending(c) => Some(*c),
        }
    }

    pub fn direction(&self) -> Option<SortDirection> {
        match self {
            SortState::Unsorted => None,
            SortState::Ascending(_) => Some(SortDirection::Ascending),
            SortState::Descending(_) => Some(SortDirection::Descending),
        }
    }

    pub fn is_sorted(&self) -> bool {
        !matches!(self, SortState::Unsorted)
    }

    /// State reached when the `direction` control of `column` is pressed:
    /// pressing the active control again restores the original order.
    pub fn activate(self, column: usize, direction: SortDirection) -> SortState {
        let target = SortState::new(Some(column), direction);
        if self == target {
            SortState::Unsorted
        } else {
            target
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlacementMode {
    /// Append to the end of the sorted region (first body section)
    Sorted,
    /// Append to the end of the row's own section
    Original,
    /// Take out of the display
    Detach,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub rank: usize,
    pub mode: PlacementMode,
}

/// Outcome of one sort call, for the display layer to apply in order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub previous: SortState,
    pub current: SortState,
    pub placements: Vec<Placement>,
}

/// Owns the row records and the current sort state of one table
#[derive(Debug, Clone)]
pub struct SortEngine {
    rows: Vec<SortRow>,
    columns: ColumnMap,
    state: SortState,
}

impl SortEngine {
    /// Rank is the position of the row in `rows`.
    /// Uses parallel processing for large tables
    pub fn new<I>(rows: I, columns: ColumnMap) -> Self
    where
        I: IntoIterator<Item = RowSource>,
    {
        let sources: Vec<RowSource> = rows.into_iter().collect();

        let rows: Vec<SortRow> = if sources.len() >= PARALLEL_THRESHOLD {
            sources
                .par_iter()
                .enumerate()
                .map(|(rank, src)| SortRow::extract(&src.cells, rank, src.fake))
                .collect()
        } else {
            sources
                .iter()
                .enumerate()
                .map(|(rank, src)| SortRow::extract(&src.cells, rank, src.fake))
                .collect()
        };

        debug!(rows = rows.len(), columns = columns.len(), "built sort engine");

        Self { rows, columns, state: SortState::Unsorted }
    }

    pub fn state(&self) -> SortState {
        self.state
    }

    pub fn columns(&self) -> &ColumnMap {
        &self.columns
    }

    pub fn rows(&self) -> &[SortRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Ranks in current order
    pub fn order(&self) -> Vec<usize> {
        self.rows.iter().map(|r| r.rank()).collect()
    }

    /// Sort on `column`, or restore the original order when `column` is `None`
    /// (`ascending` is then ignored).
    ///
    /// `column` must be below the logical column count.
    pub fn sort(&mut self, column: Option<usize>, ascending: bool) -> Result<Transition, SortError> {
        if let Some(c) = column {
            if c >= self.columns.len() {
                return Err(SortError::ColumnOutOfRange { column: c, count: self.columns.len() });
            }
        }

        let direction = SortDirection::from_ascending(ascending);
        let previous = self.state;
        let current = SortState::new(column, direction);

        self.rows.sort_by(comparator(column, direction));
        self.state = current;

        let sorted = current.is_sorted();
        let placements = self
            .rows
            .iter()
            .map(|row| Placement {
                rank: row.rank(),
                mode: match (sorted, row.is_fake()) {
                    (true, true) => PlacementMode::Detach,
                    (true, false) => PlacementMode::Sorted,
                    (false, _) => PlacementMode::Original,
                },
            })
            .collect();

        debug!(?previous, ?current, rows = self.rows.len(), "sorted table");

        Ok(Transition { previous, current, placements })
    }

    /// Press the `ascending`/descending control of `column`
    pub fn activate(&mut self, column: usize, ascending: bool) -> Result<Transition, SortError> {
        let next = self.state.activate(column, SortDirection::from_ascending(ascending));
        self.sort(next.column(), next.direction().map_or(true, |d| d.is_ascending()))
    }
}
