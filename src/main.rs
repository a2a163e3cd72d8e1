use std::io::{self, Write};
use std::panic;
use std::path::PathBuf;

use tracing::{error, info, Level};
use tracing_subscriber::fmt::writer::MakeWriter;

use crossterm::{
    cursor::MoveToColumn,
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};

use tablesort::app::App;
use tablesort::config::AppConfig;
use tablesort::error::SortError;
use tablesort::fileio::{self, FileIO};
use tablesort::registry::{BindRequest, Registry};

/// Parsed command line
struct Args {
    file_path: PathBuf,
    delimiter: Option<u8>,
    header_rows: Option<usize>,
    config: Option<PathBuf>,
    /// 0-based column and direction
    sort: Option<(usize, bool)>,
    print: bool,
    verbose: bool,
}

fn parse_args() -> Args {
    let args: Vec<String> = std::env::args().collect();
    let mut file_path: Option<PathBuf> = None;
    let mut delimiter: Option<u8> = None;
    let mut header_rows: Option<usize> = None;
    let mut config: Option<PathBuf> = None;
    let mut sort: Option<(usize, bool)> = None;
    let mut print = false;
    let mut verbose = false;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "-d" | "--delimiter" => {
                delimiter = parse_delimiter(&required_value(&args, i));
                i += 2;
            }
            "--header-rows" => {
                let value = required_value(&args, i);
                header_rows = Some(value.parse().unwrap_or_else(|_| {
                    eprintln!("Error: --header-rows expects a number, got '{}'", value);
                    std::process::exit(1);
                }));
                i += 2;
            }
            "-c" | "--config" => {
                config = Some(PathBuf::from(required_value(&args, i)));
                i += 2;
            }
            "-s" | "--sort" => {
                sort = Some(parse_sort(&required_value(&args, i)));
                i += 2;
            }
            "-p" | "--print" => {
                print = true;
                i += 1;
            }
            "-v" | "--verbose" => {
                verbose = true;
                i += 1;
            }
            "-h" | "--help" => {
                print_help();
                std::process::exit(0);
            }
            arg if arg.starts_with('-') => {
                eprintln!("Unknown option: {}", arg);
                std::process::exit(1);
            }
            _ => {
                file_path = Some(PathBuf::from(&args[i]));
                i += 1;
            }
        }
    }

    let Some(file_path) = file_path else {
        print_help();
        std::process::exit(1);
    };

    Args { file_path, delimiter, header_rows, config, sort, print, verbose }
}

fn required_value(args: &[String], i: usize) -> String {
    match args.get(i + 1) {
        Some(value) => value.clone(),
        None => {
            eprintln!("Error: {} requires an argument", args[i]);
            std::process::exit(1);
        }
    }
}

/// Parse a delimiter string into a byte
fn parse_delimiter(s: &str) -> Option<u8> {
    match s.to_lowercase().as_str() {
        "comma" | "," => Some(b','),
        "tab" | "\\t" | "\t" => Some(b'\t'),
        "semicolon" | ";" => Some(b';'),
        "pipe" | "|" => Some(b'|'),
        _ if s.len() == 1 => Some(s.as_bytes()[0]),
        _ => {
            eprintln!("Invalid delimiter: '{}'. Use comma, tab, semicolon, pipe, or a single character.", s);
            std::process::exit(1);
        }
    }
}

/// Parse `COL[:asc|desc]` with a 1-based column number
fn parse_sort(s: &str) -> (usize, bool) {
    let (col, dir) = s.split_once(':').unwrap_or((s, "asc"));
    let ascending = match dir.to_lowercase().as_str() {
        "asc" | "a" | "+" => true,
        "desc" | "d" | "-" => false,
        _ => {
            eprintln!("Invalid sort direction: '{}'. Use asc or desc.", dir);
            std::process::exit(1);
        }
    };
    match col.parse::<usize>() {
        Ok(n) if n > 0 => (n - 1, ascending),
        _ => {
            eprintln!("Invalid sort column: '{}'. Columns are numbered from 1.", col);
            std::process::exit(1);
        }
    }
}

/// Handle panics gracefully
fn install_panic_hook() {
    let default_hook = panic::take_hook();

    panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();

        if let Some(location) = info.location() {
            error!(
                file = location.file(),
                line = location.line(),
                "panic occured"
            );
        } else {
            error!("panic occured");
        }

        if let Some(s) = info.payload().downcast_ref::<&str>() {
            error!(message = %s);
        } else if let Some(s) = info.payload().downcast_ref::<String>() {
            error!(message = %s);
        }

        default_hook(info);
    }));
}

/// A `MakeWriter` for `tracing` that logs to the **main screen** by leaving the alternate screen temporarily.
pub struct MainScreenWriter;

impl<'a> MakeWriter<'a> for MainScreenWriter {
    type Writer = MainScreenWriterHandle;

    fn make_writer(&'a self) -> Self::Writer {
        MainScreenWriterHandle
    }
}

/// A handle that writes to stdout outside the alternate screen
pub struct MainScreenWriterHandle;

impl Write for MainScreenWriterHandle {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        // Temporarily leave the alternate screen
        execute!(io::stdout(), LeaveAlternateScreen)?;
        println!();
        execute!(io::stdout(), MoveToColumn(0))?;
        let result = io::stdout().write(buf);
        execute!(io::stdout(), MoveToColumn(0))?;
        io::stdout().flush()?; // flush immediately
        // Re-enter the alternate screen
        execute!(io::stdout(), EnterAlternateScreen)?;
        result
    }

    fn flush(&mut self) -> io::Result<()> {
        io::stdout().flush()
    }
}

fn invalid_input(e: SortError) -> io::Error {
    error!(error = %e, "failed to sort table");
    io::Error::new(io::ErrorKind::InvalidInput, e)
}

fn print_help() {
    eprintln!("tablesort - view a CSV table and sort it by column: ascending, descending, or original order");
    eprintln!();
    eprintln!("USAGE:");
    eprintln!("    tablesort [OPTIONS] FILE");
    eprintln!();
    eprintln!("OPTIONS:");
    eprintln!("    -d, --delimiter <DELIM>  Set the field delimiter (comma, tab, semicolon, pipe, or char)");
    eprintln!("    --header-rows <N>        Number of leading records forming the table head (default 1)");
    eprintln!("    -c, --config <FILE>      Read options from a TOML file");
    eprintln!("    -s, --sort <COL[:DIR]>   Sort on a column (numbered from 1), DIR is asc or desc");
    eprintln!("    -p, --print              Print the visible rows as CSV instead of opening the viewer");
    eprintln!("    -v, --verbose            Debug logging");
    eprintln!("    -h, --help               Print this help message");
    eprintln!();
    eprintln!("FILE:");
    eprintln!("    Blank lines split the body into sections. A line with only its first field");
    eprintln!("    filled is a full-width row, hidden while the table is sorted.");
    eprintln!();
    eprintln!("KEYS:");
    eprintln!("    h/l, arrows   move between columns     j/k   scroll");
    eprintln!("    a or +        ascending control        d or -   descending control");
    eprintln!("    r or 0        original order           q     quit");
}

fn main() -> io::Result<()> {
    let args = parse_args();
    let level = if args.verbose { Level::DEBUG } else { Level::INFO };

    if args.print {
        tracing_subscriber::fmt().with_max_level(level).with_writer(io::stderr).init();
    } else {
        tracing_subscriber::fmt().with_max_level(level).with_writer(MainScreenWriter).init();
    }
    info!("tablesort started");

    install_panic_hook();

    let mut config = match &args.config {
        Some(path) => AppConfig::from_file(path).map_err(|e| {
            error!(error = %e, "failed to load config");
            io::Error::new(io::ErrorKind::InvalidData, e)
        })?,
        None => AppConfig::default(),
    };
    if let Some(rows) = args.header_rows {
        config.header_rows = rows;
    }

    let file_io = FileIO::new(args.file_path.clone(), args.delimiter, config.header_rows);
    let load_result = file_io.load_table().map_err(|e| {
        error!(error = %e, "Failed to load table");
        e
    })?;
    for warning in &load_result.warnings {
        info!(%warning, "load warning");
    }

    let mut table = load_result.table;

    if args.print {
        let mut registry = Registry::new();
        registry
            .bind(&mut table, BindRequest::Options(config.sort))
            .map_err(invalid_input)?;
        if let Some((column, ascending)) = args.sort {
            registry
                .bind(&mut table, BindRequest::Sort { column, ascending })
                .map_err(invalid_input)?;
        }
        return fileio::write_visible(&table, io::stdout().lock(), b',');
    }

    let mut app = App::new(table, file_io, config.sort).map_err(invalid_input)?;

    if let Some((column, ascending)) = args.sort {
        if let Err(e) = app.registry.bind(&mut app.table, BindRequest::Sort { column, ascending }) {
            app.message = Some(format!("Sort failed: {}", e));
        }
    }

    let mut messages: Vec<String> = load_result.warnings;
    messages.push(format!("Delimiter: {}", app.file_io.delimiter_name()));
    if app.message.is_none() {
        app.message = Some(messages.join("; "));
    }

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = app.run(&mut terminal);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;

    result
}
