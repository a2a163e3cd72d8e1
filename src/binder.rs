//! Sort controls in the table head and their reflection of the engine state

use tracing::{debug, warn};

use crate::config::{Hints, SortOptions};
use crate::dom::{Button, CellId, SortMark, SortWidget, TableElement};
use crate::error::SortError;
use crate::table::columns::ColumnMap;
use crate::table::engine::SortState;

/// Link from a control pair back to the column it sorts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WidgetBinding {
    pub column: usize,
    /// Header cell holding the controls
    pub host: CellId,
    /// Representative header of the column, carrying the direction mark
    pub header: CellId,
}

/// Places one ascending/descending control pair per sortable column and
/// keeps their labels and header marks in line with the engine state.
/// Never holds sort state itself.
#[derive(Debug, Clone)]
pub struct WidgetBinder {
    hints: Hints,
    bindings: Vec<WidgetBinding>,
}

impl WidgetBinder {
    /// Validate the head against `options` and, when `enabled`, insert the
    /// controls into it.
    pub fn bind(
        table: &mut TableElement,
        columns: &ColumnMap,
        options: &SortOptions,
        enabled: bool,
    ) -> Result<Self, SortError> {
        let head_rows = table.head.len();
        if options.header_row_index >= head_rows {
            return Err(SortError::HeaderRowOutOfRange {
                index: options.header_row_index,
                count: head_rows,
            });
        }

        let mut binder = Self { hints: options.hints.clone(), bindings: Vec::new() };
        if !enabled {
            return Ok(binder);
        }

        let widgets_row = Self::widgets_row(table, options);

        for column in 0..columns.len() {
            let Some(header) = columns.header(column) else {
                continue;
            };

            let host = match columns.occupant(widgets_row, column) {
                Some((cell, 1)) => cell,
                _ => header,
            };

            let excluded = [host, header].iter().any(|&id| {
                table
                    .head_cell(id)
                    .is_some_and(|c| options.excluded_column.matches(c.kind.tag(), &c.classes))
            });
            if excluded {
                continue;
            }

            if let Some(cell) = table.head_cell_mut(host) {
                cell.widget = Some(SortWidget {
                    class: options.widget_container_class.clone(),
                    ascending: binder.button(true, false),
                    descending: binder.button(false, false),
                });
                binder.bindings.push(WidgetBinding { column, host, header });
            }
        }

        debug!(widgets = binder.bindings.len(), row = widgets_row, "bound sort widgets");
        Ok(binder)
    }

    fn widgets_row(table: &TableElement, options: &SortOptions) -> usize {
        let Some(selector) = &options.widgets_row else {
            return options.header_row_index;
        };

        match table.head.iter().position(|row| selector.matches("tr", &row.classes)) {
            Some(row) => row,
            None => {
                warn!(selector = %selector, "no header row matches widgets selector, using header row index");
                options.header_row_index
            }
        }
    }

    fn button(&self, ascending: bool, on: bool) -> Button {
        Button {
            ascending,
            on,
            label: self.hints.label(on, ascending).to_string(),
        }
    }

    pub fn bindings(&self) -> &[WidgetBinding] {
        &self.bindings
    }

    pub fn binding(&self, column: usize) -> Option<&WidgetBinding> {
        self.bindings.iter().find(|b| b.column == column)
    }

    /// Translate a press on a host cell's control into `(column, ascending)`
    pub fn activation(&self, host: CellId, ascending: bool) -> Option<(usize, bool)> {
        self.bindings
            .iter()
            .find(|b| b.host == host)
            .map(|b| (b.column, ascending))
    }

    /// Push `state` onto every control, and the direction mark onto each
    /// column's own header (which may sit below the controls row)
    pub fn reflect(&self, table: &mut TableElement, state: SortState) {
        for binding in &self.bindings {
            let asc_on = state == SortState::Ascending(binding.column);
            let desc_on = state == SortState::Descending(binding.column);

            if let Some(widget) = table.widget_mut(binding.host) {
                widget.ascending = self.button(true, asc_on);
                widget.descending = self.button(false, desc_on);
            }

            let mark = if asc_on {
                SortMark::Ascending
            } else if desc_on {
                SortMark::Descending
            } else {
                SortMark::None
            };
            table.set_mark(binding.header, mark);
        }
    }
}
