use std::fs::File;
use std::io::{self, BufReader, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::dom::{BodyCell, BodyRow, HeadCell, HeadRow, TableElement};
use crate::table::columns::ColumnMap;

/// Detected file format
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FileFormat {
    Csv,
    Tsv,
}

impl FileFormat {
    /// Detect format from file extension
    fn from_extension(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_lowercase();
        match ext.as_str() {
            "csv" => Some(FileFormat::Csv),
            "tsv" => Some(FileFormat::Tsv),
            _ => None,
        }
    }

    /// Get the delimiter for CSV-like formats
    fn delimiter(&self) -> u8 {
        match self {
            FileFormat::Csv => b',',
            FileFormat::Tsv => b'\t',
        }
    }
}

/// Result of loading a file, including any warnings
pub struct LoadResult {
    pub table: TableElement,
    pub warnings: Vec<String>,
}

pub struct FileIO {
    pub file_path: PathBuf,
    delimiter: u8,
    header_rows: usize,
}

impl FileIO {
    /// `delimiter` overrides the one implied by the file extension
    pub fn new(file_path: PathBuf, delimiter: Option<u8>, header_rows: usize) -> Self {
        let delimiter = delimiter
            .or_else(|| FileFormat::from_extension(&file_path).map(|f| f.delimiter()))
            .unwrap_or(b',');
        Self { file_path, delimiter, header_rows }
    }

    pub fn file_name(&self) -> String {
        self.file_path.display().to_string()
    }

    pub fn delimiter_name(&self) -> String {
        match self.delimiter {
            b',' => "comma".to_string(),
            b'\t' => "tab".to_string(),
            b';' => "semicolon".to_string(),
            b'|' => "pipe".to_string(),
            other => format!("'{}'", other as char),
        }
    }

    /// Load the table, returning warnings about any modifications
    pub fn load_table(&self) -> io::Result<LoadResult> {
        let file = File::open(&self.file_path)?;
        let reader = BufReader::with_capacity(1 << 20, file); // 1 MB

        let mut csv_reader = csv::ReaderBuilder::new()
            .delimiter(self.delimiter)
            .has_headers(false)
            .flexible(true)
            .trim(csv::Trim::Fields)
            .from_reader(reader);

        let mut records: Vec<Vec<String>> = Vec::new();
        let mut record = csv::StringRecord::new();
        let mut next_line = 1;

        // the reader skips blank lines; a gap in line numbers after the head
        // becomes an empty record so it still separates sections
        while csv_reader
            .read_record(&mut record)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?
        {
            let line = record.position().map_or(next_line, |p| p.line());
            if line > next_line && records.len() > self.header_rows {
                records.push(Vec::new());
            }
            records.push(record.iter().map(|s| s.to_string()).collect());
            next_line = csv_reader.position().line();
        }

        let result = build_table(records, self.header_rows);
        info!(
            file = %self.file_name(),
            rows = result.table.row_count(),
            header_rows = result.table.head.len(),
            "loaded table"
        );
        Ok(result)
    }
}

/// Split records into head and body.
///
/// Head spans follow the merged-cell convention: an empty cell in a non-final
/// head row extends the cell to its left, an empty cell below a single-column
/// cell extends it downwards. In the body, a record of empty fields (a blank
/// line or bare delimiters) starts a new section and a record with only its
/// first field filled, such as a lone label, becomes a full-width row.
pub fn build_table(records: Vec<Vec<String>>, header_rows: usize) -> LoadResult {
    let mut warnings = Vec::new();
    let width = records.iter().map(|r| r.len()).max().unwrap_or(0).max(1);

    let header_rows = if records.len() < header_rows {
        warnings.push(format!("Only {} header rows available", records.len()));
        records.len()
    } else {
        header_rows
    };

    let (head_records, body_records) = records.split_at(header_rows);
    let mut table = TableElement::new(build_head(head_records, width));

    let mut section = 0;
    let mut needs_padding = false;

    for record in body_records {
        if record.iter().all(|f| f.is_empty()) {
            if !table.sections().get(section).map_or(true, |s| s.rows().is_empty()) {
                section += 1;
            }
            continue;
        }

        let separator = width > 1 && record[1..].iter().all(|f| f.is_empty());
        let row = if separator {
            BodyRow::new(vec![BodyCell::new(&record[0]).with_colspan(width)])
        } else {
            if record.len() < width {
                needs_padding = true;
            }
            let mut cells: Vec<BodyCell> = record.iter().map(|f| BodyCell::new(f)).collect();
            cells.resize(width, BodyCell::new(""));
            BodyRow::new(cells)
        };
        table.push_row(section, row);
    }

    if needs_padding {
        warnings.push(format!(
            "Padded rows with empty cells (max width: {} columns)",
            width
        ));
    }

    debug!(sections = table.sections().len(), "built table body");
    LoadResult { table, warnings }
}

fn build_head(records: &[Vec<String>], width: usize) -> Vec<HeadRow> {
    let rows = records.len();
    let text = |r: usize, c: usize| records[r].get(c).map(String::as_str).unwrap_or("");
    let mut covered = vec![vec![false; width]; rows];
    let mut head = Vec::with_capacity(rows);

    for r in 0..rows {
        let mut cells = Vec::new();

        for c in 0..width {
            if covered[r][c] {
                continue;
            }

            let content = text(r, c);
            let mut colspan = 1;
            if r + 1 < rows && !content.is_empty() {
                while c + colspan < width && !covered[r][c + colspan] && text(r, c + colspan).is_empty() {
                    colspan += 1;
                }
            }

            let mut rowspan = 1;
            if colspan == 1 && !content.is_empty() {
                while r + rowspan < rows && !covered[r + rowspan][c] && text(r + rowspan, c).is_empty() {
                    rowspan += 1;
                }
            }

            for row in covered.iter_mut().skip(r).take(rowspan) {
                for slot in row.iter_mut().skip(c).take(colspan) {
                    *slot = true;
                }
            }

            cells.push(HeadCell::header(content).with_colspan(colspan).with_rowspan(rowspan));
        }

        head.push(HeadRow::new(cells));
    }

    head
}

/// Write one header line (each column's header text) and the rows currently shown
pub fn write_visible<W: Write>(table: &TableElement, writer: W, delimiter: u8) -> io::Result<()> {
    let mut csv_writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .from_writer(writer);

    if let Ok(columns) = ColumnMap::resolve(&table.head) {
        let names: Vec<&str> = columns
            .headers()
            .iter()
            .map(|h| h.and_then(|id| table.head_cell(id)).map_or("", |c| c.text.as_str()))
            .collect();
        csv_writer
            .write_record(&names)
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
    }

    for id in table.visible_rows() {
        csv_writer
            .write_record(table.cell_texts(id))
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
    }

    csv_writer
        .flush()
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;

    Ok(())
}
