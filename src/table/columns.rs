//! Logical columns of a header made of row- and column-spanning cells

use crate::dom::{CellId, CellKind, HeadRow};
use crate::error::SortError;

/// Where a header cell landed in the column grid
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Placed {
    cell: CellId,
    col: usize,
    colspan: usize,
    /// First head row no longer covered by the cell
    row_end: usize,
}

/// Representative header cell of each logical column.
///
/// A column's representative is the lowest header cell spanning exactly that
/// column; columns covered only by multi-column cells have none and are
/// never sortable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMap {
    headers: Vec<Option<CellId>>,
    placed: Vec<Placed>,
}

impl ColumnMap {
    /// Walk the header rows once, tracking for each column slot the row until
    /// which it is filled by a cell from above.
    pub fn resolve(head: &[HeadRow]) -> Result<Self, SortError> {
        if head.is_empty() {
            return Err(SortError::EmptyHeader);
        }

        // no row can reach further than all spans laid end to end
        let bound: usize = head
            .iter()
            .flat_map(|r| r.cells.iter())
            .map(|c| c.colspan.max(1))
            .sum();

        let mut filled_until = vec![0usize; bound];
        let mut headers: Vec<Option<CellId>> = vec![None; bound];
        let mut placed = Vec::new();
        let mut width = 0;

        for (r, row) in head.iter().enumerate() {
            let mut col = 0;

            for (i, cell) in row.cells.iter().enumerate() {
                while col < bound && filled_until[col] > r {
                    col += 1;
                }

                let colspan = cell.colspan.max(1).min(bound - col);
                let rowspan = if cell.rowspan == 0 { head.len() - r } else { cell.rowspan };
                let id = CellId { row: r, cell: i };

                if colspan == 1 && cell.kind == CellKind::Header {
                    headers[col] = Some(id);
                }

                for slot in &mut filled_until[col..col + colspan] {
                    *slot = r + rowspan;
                }

                placed.push(Placed { cell: id, col, colspan, row_end: r + rowspan });
                col += colspan;
                width = width.max(col);
            }
        }

        headers.truncate(width);
        Ok(Self { headers, placed })
    }

    /// Number of logical columns
    pub fn len(&self) -> usize {
        self.headers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }

    pub fn header(&self, column: usize) -> Option<CellId> {
        self.headers.get(column).copied().flatten()
    }

    pub fn is_sortable(&self, column: usize) -> bool {
        self.header(column).is_some()
    }

    pub fn headers(&self) -> &[Option<CellId>] {
        &self.headers
    }

    /// Header cell covering `column` in head row `row`, including cells
    /// reaching down from earlier rows.
    pub fn occupant(&self, row: usize, column: usize) -> Option<(CellId, usize)> {
        self.placed
            .iter()
            .find(|p| {
                p.cell.row <= row && row < p.row_end && p.col <= column && column < p.col + p.colspan
            })
            .map(|p| (p.cell, p.colspan))
    }

    /// Logical column a header cell starts at
    pub fn column_of(&self, cell: CellId) -> Option<usize> {
        self.placed.iter().find(|p| p.cell == cell).map(|p| p.col)
    }
}
