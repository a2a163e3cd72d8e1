use std::path::PathBuf;

use thiserror::Error;

/// Precondition violations raised while binding or sorting a table
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SortError {
    #[error("table has no header rows")]
    EmptyHeader,

    #[error("header row {index} out of range (table has {count} header rows)")]
    HeaderRowOutOfRange { index: usize, count: usize },

    #[error("column {column} out of range (table has {count} columns)")]
    ColumnOutOfRange { column: usize, count: usize },

    #[error("invalid selector '{0}'")]
    InvalidSelector(String),
}

/// Failures while loading the application configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}
