//! Three-state table sorting: ascending, descending, or back to the original order.
//!
//! A [`registry::Registry`] keeps one [`registry::Sorter`] per bound
//! [`dom::TableElement`]. Each sorter owns a [`table::SortEngine`] holding the
//! row keys and sort state, and a [`binder::WidgetBinder`] that places the
//! sort controls in the table head and keeps them in line with that state.

pub mod app;
pub mod binder;
pub mod config;
pub mod dom;
pub mod error;
pub mod fileio;
pub mod registry;
pub mod selector;
pub mod table;
pub mod ui;

pub use config::{AppConfig, Hints, SortOptions};
pub use error::{ConfigError, SortError};
pub use registry::{BindRequest, Registry, Sorter};
