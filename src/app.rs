use std::io;
use std::time::Duration;

use crossterm::event::{self, poll, Event, KeyCode, KeyEvent, KeyModifiers};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::{debug, error};

use crate::config::SortOptions;
use crate::dom::TableElement;
use crate::error::SortError;
use crate::fileio::FileIO;
use crate::registry::{BindRequest, Registry};
use crate::table::columns::ColumnMap;
use crate::table::engine::{SortState, Transition};
use crate::ui;

pub struct App {
    pub table: TableElement,
    pub registry: Registry,
    pub file_io: FileIO,
    pub cursor_col: usize,
    /// First body row shown
    pub scroll: usize,
    pub message: Option<String>,
    pub should_quit: bool,
}

impl App {
    /// Bind `table` with `options`; the app owns the only sorter for it
    pub fn new(mut table: TableElement, file_io: FileIO, options: SortOptions) -> Result<Self, SortError> {
        let mut registry = Registry::new();
        registry.bind(&mut table, BindRequest::Options(options))?;

        Ok(Self {
            table,
            registry,
            file_io,
            cursor_col: 0,
            scroll: 0,
            message: None,
            should_quit: false,
        })
    }

    pub fn columns(&self) -> Option<&ColumnMap> {
        self.registry.get(self.table.id()).map(|s| s.engine().columns())
    }

    pub fn state(&self) -> SortState {
        self.registry
            .get(self.table.id())
            .map_or(SortState::Unsorted, |s| s.state())
    }

    /// Header text of a column, or its 1-based number when it has none
    pub fn column_name(&self, col: usize) -> String {
        self.columns()
            .and_then(|c| c.header(col))
            .and_then(|id| self.table.head_cell(id))
            .map(|cell| cell.text.clone())
            .filter(|text| !text.is_empty())
            .unwrap_or_else(|| format!("#{}", col + 1))
    }

    pub fn run(&mut self, terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> io::Result<()> {
        while !self.should_quit {
            terminal.draw(|f| ui::render(f, self))?;

            if poll(Duration::from_millis(16))? {
                if let Event::Key(key) = event::read()? {
                    self.message = None;
                    self.handle_key(key);
                }
            }
        }
        Ok(())
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        let column_count = self.columns().map_or(0, |c| c.len());
        let visible = self.table.visible_rows().count();

        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.should_quit = true
            }
            KeyCode::Char('h') | KeyCode::Left => {
                self.cursor_col = self.cursor_col.saturating_sub(1);
            }
            KeyCode::Char('l') | KeyCode::Right => {
                if self.cursor_col + 1 < column_count {
                    self.cursor_col += 1;
                }
            }
            KeyCode::Char('j') | KeyCode::Down => {
                if self.scroll + 1 < visible {
                    self.scroll += 1;
                }
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.scroll = self.scroll.saturating_sub(1);
            }
            KeyCode::Char('g') => self.scroll = 0,
            KeyCode::Char('a') | KeyCode::Char('+') => self.press(true),
            KeyCode::Char('d') | KeyCode::Char('-') => self.press(false),
            KeyCode::Char('r') | KeyCode::Char('0') => self.restore(),
            _ => {}
        }
    }

    /// Press the ascending or descending control of the cursor column
    fn press(&mut self, ascending: bool) {
        let host = self
            .registry
            .get(self.table.id())
            .and_then(|s| s.binder().binding(self.cursor_col))
            .map(|b| b.host);

        let Some(host) = host else {
            self.message = Some(format!("Column {} is not sortable", self.column_name(self.cursor_col)));
            return;
        };

        match self.registry.press(&mut self.table, host, ascending) {
            Ok(Some(transition)) => self.report(&transition),
            Ok(None) => {}
            Err(e) => {
                error!(error = %e, "sort failed");
                self.message = Some(format!("Sort failed: {}", e));
            }
        }
    }

    fn restore(&mut self) {
        match self.registry.bind(&mut self.table, BindRequest::Restore) {
            Ok(_) => self.message = Some("Original order".to_string()),
            Err(e) => {
                error!(error = %e, "restore failed");
                self.message = Some(format!("Restore failed: {}", e));
            }
        }
    }

    fn report(&mut self, transition: &Transition) {
        debug!(previous = ?transition.previous, current = ?transition.current, "sort state changed");
        self.scroll = 0;
        self.message = Some(match transition.current {
            SortState::Unsorted => "Original order".to_string(),
            SortState::Ascending(col) => format!("Sorted by {} (ascending)", self.column_name(col)),
            SortState::Descending(col) => format!("Sorted by {} (descending)", self.column_name(col)),
        });
    }
}
