use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table as RatatuiTable},
    Frame,
};
use unicode_width::UnicodeWidthStr;

use crate::app::App;
use crate::dom::{CellId, HeadCell, SortMark, TableElement};
use crate::table::columns::ColumnMap;
use crate::table::engine::SortState;

const MIN_COL_WIDTH: usize = 3;
const MAX_COL_WIDTH: usize = 30;

pub fn render(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(3),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(frame.size());

    render_table(frame, app, chunks[0]);
    render_status_bar(frame, app, chunks[1]);
    render_message(frame, app, chunks[2]);
}

/// Header text as shown: content, sort mark and control labels
pub fn head_label(cell: &HeadCell) -> String {
    let mut label = cell.text.clone();

    match cell.mark {
        SortMark::Ascending => label.push_str(" ▲"),
        SortMark::Descending => label.push_str(" ▼"),
        SortMark::None => {}
    }

    if let Some(widget) = &cell.widget {
        label.push_str(&format!(" [{}][{}]", widget.ascending.label, widget.descending.label));
    }

    label
}

/// Width of each logical column from header labels and visible cells
fn column_widths(table: &TableElement, columns: &ColumnMap) -> Vec<usize> {
    let mut widths = vec![MIN_COL_WIDTH; columns.len()];

    for (r, row) in table.head.iter().enumerate() {
        for (i, cell) in row.cells.iter().enumerate() {
            if cell.colspan != 1 {
                continue;
            }
            let id = CellId { row: r, cell: i };
            if let Some(col) = columns.column_of(id) {
                if let Some(w) = widths.get_mut(col) {
                    *w = (*w).max(head_label(cell).width());
                }
            }
        }
    }

    for id in table.visible_rows() {
        let row = table.row(id);
        if row.spans_columns() {
            continue;
        }
        for (col, cell) in row.cells.iter().enumerate() {
            if let Some(w) = widths.get_mut(col) {
                *w = (*w).max(cell.text.width());
            }
        }
    }

    widths.into_iter().map(|w| w.min(MAX_COL_WIDTH)).collect()
}

fn render_table(frame: &mut Frame, app: &App, area: Rect) {
    let Some(columns) = app.columns() else {
        return;
    };
    if columns.is_empty() {
        return;
    }

    let widths: Vec<Constraint> = column_widths(&app.table, columns)
        .into_iter()
        .map(|w| Constraint::Length(w as u16 + 1))
        .collect();

    let header_style = Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD);
    let cursor_style = header_style.bg(Color::DarkGray);
    let sorted_style = Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD);

    let mut rows: Vec<Row> = Vec::new();

    // head rows: a cell is drawn in the first slot it covers
    for r in 0..app.table.head.len() {
        let cells: Vec<Cell> = (0..columns.len())
            .map(|col| {
                let style = if col == app.cursor_col { cursor_style } else { header_style };
                match columns.occupant(r, col) {
                    Some((id, _)) if id.row == r && columns.column_of(id) == Some(col) => {
                        let cell = &app.table.head[r].cells[id.cell];
                        let style = if cell.mark != SortMark::None { sorted_style } else { style };
                        Cell::from(head_label(cell)).style(style)
                    }
                    _ => Cell::from("").style(style),
                }
            })
            .collect();
        rows.push(Row::new(cells));
    }

    let separator_style = Style::default().fg(Color::Green).add_modifier(Modifier::ITALIC);
    let body_height = area.height.saturating_sub(2 + app.table.head.len() as u16) as usize;

    for id in app.table.visible_rows().skip(app.scroll).take(body_height) {
        let row = app.table.row(id);
        let cells: Vec<Cell> = if row.spans_columns() {
            row.cells
                .iter()
                .map(|c| Cell::from(c.text.clone()).style(separator_style))
                .collect()
        } else {
            row.cells.iter().map(|c| Cell::from(c.text.clone())).collect()
        };
        rows.push(Row::new(cells));
    }

    let title = format!("{} ", app.file_io.file_name());
    let table = RatatuiTable::new(rows, widths)
        .block(Block::default().borders(Borders::ALL).title(title));

    frame.render_widget(table, area);
}

fn state_text(app: &App) -> String {
    match app.state() {
        SortState::Unsorted => "original order".to_string(),
        SortState::Ascending(col) => format!("{} ascending", app.column_name(col)),
        SortState::Descending(col) => format!("{} descending", app.column_name(col)),
    }
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let mode_style = if app.state().is_sorted() {
        Style::default().bg(Color::Yellow).fg(Color::Black)
    } else {
        Style::default().bg(Color::Blue).fg(Color::White)
    };

    let position = format!(
        "col {} | {} rows ",
        app.column_name(app.cursor_col),
        app.table.visible_rows().count()
    );

    let status = Line::from(vec![
        Span::styled(
            format!(" {} ", state_text(app)),
            mode_style.add_modifier(Modifier::BOLD),
        ),
        Span::raw(" "),
        Span::raw(app.file_io.file_name()),
        Span::raw(" ".repeat(
            area.width
                .saturating_sub(30)
                .saturating_sub(position.len() as u16) as usize,
        )),
        Span::raw(position),
    ]);

    let status_bar = Paragraph::new(status).style(Style::default().bg(Color::DarkGray));

    frame.render_widget(status_bar, area);
}

fn render_message(frame: &mut Frame, app: &App, area: Rect) {
    let content = app.message.clone().unwrap_or_default();
    frame.render_widget(Paragraph::new(content), area);
}
