//! Output module for recording runs and reporting on them
//!
//! This module handles:
//! - Recording runs and their outcomes in SQLite
//! - Printing a console summary after a run
//! - Writing a Markdown summary file

mod sqlite;
mod summary;

pub use sqlite::{OutcomeStore, PageRecord, RunRecord, RunStatus, SCHEMA_SQL};
pub use summary::{
    format_markdown_summary, print_summary, write_markdown_summary, FilterRow, RunSummary,
};
