//! In-memory display tree for a table: header rows with spanning cells,
//! body sections holding rows, and the sort widgets hosted in header cells.
//!
//! Rows live in an arena (`RowId` indexes it) and sections only hold the
//! current display order, so moving a row never invalidates its handle.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::table::engine::PlacementMode;

static NEXT_ELEMENT_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of a table element for the lifetime of the process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ElementId(u64);

impl ElementId {
    fn next() -> Self {
        Self(NEXT_ELEMENT_ID.fetch_add(1, Ordering::Relaxed))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellKind {
    Header,
    Data,
}

impl CellKind {
    pub fn tag(&self) -> &'static str {
        match self {
            CellKind::Header => "th",
            CellKind::Data => "td",
        }
    }
}

/// Sort state shown on a header cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortMark {
    #[default]
    None,
    Ascending,
    Descending,
}

/// An activation control inside a sort widget
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Button {
    pub ascending: bool,
    pub on: bool,
    pub label: String,
}

/// Pair of ascending/descending controls appended to a header cell
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortWidget {
    pub class: String,
    pub ascending: Button,
    pub descending: Button,
}

impl SortWidget {
    pub fn button(&self, ascending: bool) -> &Button {
        if ascending { &self.ascending } else { &self.descending }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HeadCell {
    pub kind: CellKind,
    pub text: String,
    pub colspan: usize,
    /// 0 means "through the last header row"
    pub rowspan: usize,
    pub classes: Vec<String>,
    pub mark: SortMark,
    pub widget: Option<SortWidget>,
}

impl HeadCell {
    fn new(kind: CellKind, text: &str) -> Self {
        Self {
            kind,
            text: text.to_string(),
            colspan: 1,
            rowspan: 1,
            classes: Vec::new(),
            mark: SortMark::None,
            widget: None,
        }
    }

    pub fn header(text: &str) -> Self {
        Self::new(CellKind::Header, text)
    }

    pub fn data(text: &str) -> Self {
        Self::new(CellKind::Data, text)
    }

    pub fn with_colspan(mut self, colspan: usize) -> Self {
        self.colspan = colspan.max(1);
        self
    }

    pub fn with_rowspan(mut self, rowspan: usize) -> Self {
        self.rowspan = rowspan;
        self
    }

    pub fn with_class(mut self, class: &str) -> Self {
        self.classes.push(class.to_string());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct HeadRow {
    pub classes: Vec<String>,
    pub cells: Vec<HeadCell>,
}

impl HeadRow {
    pub fn new(cells: Vec<HeadCell>) -> Self {
        Self { classes: Vec::new(), cells }
    }

    pub fn with_class(mut self, class: &str) -> Self {
        self.classes.push(class.to_string());
        self
    }
}

/// Position of a header cell: head row index and cell index within that row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellId {
    pub row: usize,
    pub cell: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BodyCell {
    pub text: String,
    pub colspan: usize,
}

impl BodyCell {
    pub fn new(text: &str) -> Self {
        Self { text: text.to_string(), colspan: 1 }
    }

    pub fn with_colspan(mut self, colspan: usize) -> Self {
        self.colspan = colspan.max(1);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BodyRow {
    pub cells: Vec<BodyCell>,
    pub classes: Vec<String>,
    home: usize,
    attached: bool,
}

impl BodyRow {
    pub fn new(cells: Vec<BodyCell>) -> Self {
        Self { cells, classes: Vec::new(), home: 0, attached: true }
    }

    pub fn from_texts(texts: &[&str]) -> Self {
        Self::new(texts.iter().map(|t| BodyCell::new(t)).collect())
    }

    pub fn with_class(mut self, class: &str) -> Self {
        self.classes.push(class.to_string());
        self
    }

    /// Section the row was loaded into
    pub fn home(&self) -> usize {
        self.home
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }

    pub fn spans_columns(&self) -> bool {
        self.cells.iter().any(|c| c.colspan > 1)
    }
}

/// Handle to a body row, stable across moves
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RowId(usize);

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Section {
    order: Vec<RowId>,
}

impl Section {
    pub fn rows(&self) -> &[RowId] {
        &self.order
    }
}

#[derive(Debug, Clone)]
pub struct TableElement {
    id: ElementId,
    pub head: Vec<HeadRow>,
    sections: Vec<Section>,
    rows: Vec<BodyRow>,
}

impl TableElement {
    pub fn new(head: Vec<HeadRow>) -> Self {
        Self {
            id: ElementId::next(),
            head,
            sections: Vec::new(),
            rows: Vec::new(),
        }
    }

    pub fn id(&self) -> ElementId {
        self.id
    }

    /// Open a new body section and return its index
    pub fn add_section(&mut self) -> usize {
        self.sections.push(Section::default());
        self.sections.len() - 1
    }

    /// Append a row to a section, opening sections as needed
    pub fn push_row(&mut self, section: usize, mut row: BodyRow) -> RowId {
        while self.sections.len() <= section {
            self.add_section();
        }
        let id = RowId(self.rows.len());
        row.home = section;
        row.attached = true;
        self.rows.push(row);
        self.sections[section].order.push(id);
        id
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn row(&self, id: RowId) -> &BodyRow {
        &self.rows[id.0]
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// All rows in encounter order: sections first to last, then detached rows
    pub fn body_rows(&self) -> Vec<RowId> {
        let mut out: Vec<RowId> = self.visible_rows().collect();
        out.extend((0..self.rows.len()).map(RowId).filter(|id| !self.rows[id.0].attached));
        out
    }

    /// Rows currently attached, in display order
    pub fn visible_rows(&self) -> impl Iterator<Item = RowId> + '_ {
        self.sections.iter().flat_map(|s| s.order.iter().copied())
    }

    pub fn cell_texts(&self, id: RowId) -> Vec<String> {
        self.rows[id.0].cells.iter().map(|c| c.text.clone()).collect()
    }

    /// Re-lay the body in the given order.
    ///
    /// Each row is moved to the end of its target region (the first section in
    /// sorted mode, its home section in original mode) or detached. Every row of
    /// the table must appear exactly once.
    pub fn place_rows<I>(&mut self, placements: I)
    where
        I: IntoIterator<Item = (RowId, PlacementMode)>,
    {
        for section in &mut self.sections {
            section.order.clear();
        }

        for (id, mode) in placements {
            let row = &mut self.rows[id.0];
            match mode {
                PlacementMode::Detach => row.attached = false,
                PlacementMode::Sorted => {
                    row.attached = true;
                    self.sections[0].order.push(id);
                }
                PlacementMode::Original => {
                    row.attached = true;
                    self.sections[row.home].order.push(id);
                }
            }
        }
    }

    pub fn head_cell(&self, id: CellId) -> Option<&HeadCell> {
        self.head.get(id.row).and_then(|r| r.cells.get(id.cell))
    }

    pub fn head_cell_mut(&mut self, id: CellId) -> Option<&mut HeadCell> {
        self.head.get_mut(id.row).and_then(|r| r.cells.get_mut(id.cell))
    }

    pub fn set_mark(&mut self, id: CellId, mark: SortMark) {
        if let Some(cell) = self.head_cell_mut(id) {
            cell.mark = mark;
        }
    }

    pub fn widget_mut(&mut self, id: CellId) -> Option<&mut SortWidget> {
        self.head_cell_mut(id).and_then(|c| c.widget.as_mut())
    }
}
