//! Core logic for the productivity summary tool.
//!
//! Turns project work-breakdown trees into per-person contribution summaries
//! and routes keyboard shortcuts to the UI region that owns them.

pub mod config;
pub mod document;
pub mod logging;
pub mod model;
pub mod shortcut;
pub mod summary;

pub use config::DisplayConfig;
pub use document::{
    load_project_file, load_project_files, parse_project, validate_project, DocumentError,
    SchemaError,
};
pub use logging::{default_log_level, init_logging, logging_status, LoggingConfig};
pub use model::{generate_id, Amount, AmountError, Contribution, Node, Phase, Project};
pub use shortcut::{
    encode, DispatchOutcome, HandlerToken, KeyEvent, Platform, ShortcutBinding, ShortcutError,
    ShortcutHost, ShortcutRegistry,
};
pub use summary::{
    aggregate, aggregate_with_report, group, reachable_total, AggregateReport, EmptyState,
    GroupedSource, PersonStats, ProjectLookup, SelectionFilter, SourceData, SummaryCache,
    SummarySnapshot,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
