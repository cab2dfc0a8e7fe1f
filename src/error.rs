//! Error and diagnostic types shared by every pipeline stage.
//!
//! `PipelineError` aborts a run. `Diagnostic` records a degraded result that
//! the run survives (imputation skipped, value parsed to null, statistic NaN).

use polars::prelude::PolarsError;
use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, PipelineError>;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Source file not found: {}", .0.display())]
    SourceNotFound(PathBuf),
    #[error("Polars error: {0}")]
    Polars(#[from] PolarsError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid pattern: {0}")]
    Pattern(#[from] regex::Error),
    #[error("Invalid configuration: {0}")]
    Config(String),
    #[error("Chart rendering failed: {0}")]
    Chart(String),
    #[error("Column not found: {0}")]
    ColumnNotFound(String),
    #[error("Column '{column}' has type {actual}, expected {expected}")]
    TypeMismatch {
        column: String,
        expected: &'static str,
        actual: &'static str,
    },
    #[error("Column '{column}' has {actual} rows, table has {expected}")]
    LengthMismatch {
        column: String,
        expected: usize,
        actual: usize,
    },
    #[error("Column '{0}' cannot be used as a group key")]
    UnsupportedGroupKey(String),
}

/// A non-fatal event raised while cleaning or summarising.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    /// Mean or mode undefined: the column has no present values.
    ImputationUndefined { column: String },
    /// `count` present values failed strict parsing and became null.
    ParseFallback { column: String, count: usize },
    /// Fewer than two present values; the statistic is NaN.
    DispersionUndefined { column: String },
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Diagnostic::ImputationUndefined { column } => {
                write!(f, "could not impute '{}': no present values", column)
            }
            Diagnostic::ParseFallback { column, count } => {
                write!(f, "{} value(s) in '{}' failed to parse and became null", count, column)
            }
            Diagnostic::DispersionUndefined { column } => {
                write!(f, "dispersion of '{}' undefined: fewer than two values", column)
            }
        }
    }
}

/// Ordered collection of diagnostics raised during one run.
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    events: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a diagnostic and log it at `warn`.
    pub fn push(&mut self, diagnostic: Diagnostic) {
        log::warn!("{}", diagnostic);
        self.events.push(diagnostic);
    }

    pub fn events(&self) -> &[Diagnostic] {
        &self.events
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn contains(&self, diagnostic: &Diagnostic) -> bool {
        self.events.contains(diagnostic)
    }
}
