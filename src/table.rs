//! Sort core: row keys, row ordering, logical columns and the per-table engine

pub mod columns;
pub mod engine;
pub mod key;
pub mod sort;

pub use columns::ColumnMap;
pub use engine::{Placement, PlacementMode, RowSource, SortEngine, SortState, Transition};
pub use key::{Key, SortRow};
pub use sort::{comparator, RowComparator, SortDirection};

#[cfg(test)]
mod test;
