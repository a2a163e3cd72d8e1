//! Binding entry point: one sorter per table element, created on first bind

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use tracing::info;

use crate::binder::WidgetBinder;
use crate::config::SortOptions;
use crate::dom::{CellId, ElementId, RowId, TableElement};
use crate::error::SortError;
use crate::table::columns::ColumnMap;
use crate::table::engine::{RowSource, SortEngine, SortState, Transition};

/// What a bind call asks for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BindRequest {
    /// Bind with these options; a no-op on an already bound table
    Options(SortOptions),
    Sort { column: usize, ascending: bool },
    /// Back to the original order
    Restore,
}

impl From<SortOptions> for BindRequest {
    fn from(options: SortOptions) -> Self {
        BindRequest::Options(options)
    }
}

/// Engine, controls and row handles of one bound table
#[derive(Debug)]
pub struct Sorter {
    engine: SortEngine,
    binder: WidgetBinder,
    /// Row handle for each rank
    handles: Vec<RowId>,
}

impl Sorter {
    fn build(table: &mut TableElement, options: &SortOptions) -> Result<Self, SortError> {
        let columns = ColumnMap::resolve(&table.head)?;
        let handles = table.body_rows();

        let sources: Vec<RowSource> = handles
            .iter()
            .map(|&id| {
                let row = table.row(id);
                let fake = match &options.fake_row {
                    Some(selector) => selector.matches("tr", &row.classes),
                    None => row.spans_columns(),
                };
                RowSource { cells: table.cell_texts(id), fake }
            })
            .collect();

        let engine = SortEngine::new(sources, columns);
        let enabled = handles.len() > 1 || options.force_widgets;
        let binder = WidgetBinder::bind(table, engine.columns(), options, enabled)?;

        info!(
            rows = handles.len(),
            columns = engine.columns().len(),
            widgets = binder.bindings().len(),
            "bound table"
        );

        Ok(Self { engine, binder, handles })
    }

    pub fn engine(&self) -> &SortEngine {
        &self.engine
    }

    pub fn binder(&self) -> &WidgetBinder {
        &self.binder
    }

    pub fn state(&self) -> SortState {
        self.engine.state()
    }

    /// Sort the engine and lay the table out accordingly
    pub fn sort(
        &mut self,
        table: &mut TableElement,
        column: Option<usize>,
        ascending: bool,
    ) -> Result<Transition, SortError> {
        let transition = self.engine.sort(column, ascending)?;
        self.apply(table, &transition);
        Ok(transition)
    }

    /// Press the control for `column` and `ascending`, cycling through the three states
    pub fn activate(
        &mut self,
        table: &mut TableElement,
        column: usize,
        ascending: bool,
    ) -> Result<Transition, SortError> {
        let transition = self.engine.activate(column, ascending)?;
        self.apply(table, &transition);
        Ok(transition)
    }

    fn apply(&self, table: &mut TableElement, transition: &Transition) {
        table.place_rows(
            transition
                .placements
                .iter()
                .map(|p| (self.handles[p.rank], p.mode)),
        );
        self.binder.reflect(table, transition.current);
    }
}

/// Sorters keyed by table identity.
///
/// An entry is inserted on the first bind of a table and lives until
/// `release` is called when the table goes away.
#[derive(Debug, Default)]
pub struct Registry {
    sorters: HashMap<ElementId, Sorter>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `table` if needed, then run the sort the request asks for.
    /// Options only apply on the first bind.
    pub fn bind(
        &mut self,
        table: &mut TableElement,
        request: BindRequest,
    ) -> Result<&mut Sorter, SortError> {
        let sorter = match self.sorters.entry(table.id()) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => {
                let default_options;
                let options = match &request {
                    BindRequest::Options(options) => options,
                    _ => {
                        default_options = SortOptions::default();
                        &default_options
                    }
                };
                entry.insert(Sorter::build(table, options)?)
            }
        };

        match request {
            BindRequest::Options(_) => {}
            BindRequest::Sort { column, ascending } => {
                sorter.sort(table, Some(column), ascending)?;
            }
            BindRequest::Restore => {
                sorter.sort(table, None, true)?;
            }
        }

        Ok(sorter)
    }

    pub fn get(&self, id: ElementId) -> Option<&Sorter> {
        self.sorters.get(&id)
    }

    /// Route a press on the control hosted in `host`.
    /// Returns `None` when the table is unbound or the cell holds no control.
    pub fn press(
        &mut self,
        table: &mut TableElement,
        host: CellId,
        ascending: bool,
    ) -> Result<Option<Transition>, SortError> {
        let Some(sorter) = self.sorters.get_mut(&table.id()) else {
            return Ok(None);
        };
        let Some((column, ascending)) = sorter.binder.activation(host, ascending) else {
            return Ok(None);
        };
        sorter.activate(table, column, ascending).map(Some)
    }

    /// Drop the sorter of a table being torn down
    pub fn release(&mut self, id: ElementId) -> Option<Sorter> {
        self.sorters.remove(&id)
    }

    pub fn len(&self) -> usize {
        self.sorters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sorters.is_empty()
    }
}
