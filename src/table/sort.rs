//! Row ordering for a column and direction

use std::cmp::Ordering;

use super::key::{Key, SortRow};

/// Sorting direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn from_ascending(ascending: bool) -> Self {
        if ascending {
            SortDirection::Ascending
        } else {
            SortDirection::Descending
        }
    }

    pub fn is_ascending(&self) -> bool {
        matches!(self, SortDirection::Ascending)
    }
}

/// Compare two keys by class first (text < num), then numerically, then as text.
/// `Equal` means the keys carry the same content.
pub fn compare_keys(k1: &Key, k2: &Key) -> Ordering {
    match (k1.num, k2.num) {
        (Some(a), Some(b)) if a != b => {
            if a < b {
                Ordering::Less
            } else {
                Ordering::Greater
            }
        }
        (Some(_), None) => Ordering::Greater,
        (None, Some(_)) => Ordering::Less,
        _ => k1.text.cmp(&k2.text),
    }
}

/// Total order over rows for one sort request.
///
/// With no column this restores the initial order. Rows with the same content
/// always fall back to ascending rank, whatever the direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowComparator {
    column: Option<usize>,
    direction: SortDirection,
}

impl RowComparator {
    pub fn new(column: Option<usize>, direction: SortDirection) -> Self {
        Self { column, direction }
    }

    pub fn compare(&self, r1: &SortRow, r2: &SortRow) -> Ordering {
        let Some(column) = self.column else {
            return r1.rank().cmp(&r2.rank());
        };

        match compare_keys(r1.key(column), r2.key(column)) {
            Ordering::Equal => r1.rank().cmp(&r2.rank()),
            res => match self.direction {
                SortDirection::Ascending => res,
                SortDirection::Descending => res.reverse(),
            },
        }
    }
}

/// Comparator closure for `column` (`None` restores the initial rank order)
pub fn comparator(
    column: Option<usize>,
    direction: SortDirection,
) -> impl Fn(&SortRow, &SortRow) -> Ordering {
    let cmp = RowComparator::new(column, direction);
    move |r1, r2| cmp.compare(r1, r2)
}
