//! Chartify Catalog
//!
//! Batch analysis of a movie/series catalog CSV: load with polars, impute
//! missing values, normalise runtimes, aggregate ratings, derive a weighted
//! overall score and export CSV, JSON and PNG artifacts.

pub mod charts;
pub mod config;
pub mod data;
pub mod error;
pub mod export;
pub mod pipeline;
pub mod stats;

pub use config::PipelineConfig;
pub use error::{Diagnostic, Diagnostics, PipelineError, Result};
pub use pipeline::{run, RunReport};
