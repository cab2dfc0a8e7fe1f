//! CSV Data Loader Module
//! Reads a delimited file into a polars frame.

use crate::data::frame;
use crate::data::table::Table;
use crate::error::{PipelineError, Result};
use polars::prelude as pl;
use std::path::Path;

/// Handles CSV file loading with Polars for high performance.
#[derive(Debug, Clone)]
pub struct DataLoader {
    infer_schema_length: Option<usize>,
}

impl Default for DataLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl DataLoader {
    pub fn new() -> Self {
        Self {
            infer_schema_length: Some(10000),
        }
    }

    /// Rows scanned for type inference; `None` scans the whole file.
    pub fn with_infer_schema_length(mut self, rows: Option<usize>) -> Self {
        self.infer_schema_length = rows;
        self
    }

    /// Load a CSV file into a frame. The path is checked before any parsing
    /// starts.
    pub fn load_frame(&self, file_path: impl AsRef<Path>) -> Result<pl::DataFrame> {
        let file_path = file_path.as_ref();
        if !file_path.is_file() {
            return Err(PipelineError::SourceNotFound(file_path.to_path_buf()));
        }

        let df = self.read_frame(file_path)?;
        log::info!(
            "Loaded {} rows x {} columns from {}",
            df.height(),
            df.width(),
            file_path.display()
        );
        Ok(df)
    }

    /// Load a CSV file as a typed `Table`.
    pub fn load_csv(&self, file_path: impl AsRef<Path>) -> Result<Table> {
        frame::to_table(&self.load_frame(file_path)?)
    }

    fn read_frame(&self, file_path: &Path) -> pl::PolarsResult<pl::DataFrame> {
        use polars::prelude::*;

        // Use lazy evaluation for memory efficiency, then collect
        LazyCsvReader::new(file_path)
            .with_has_header(true)
            .with_infer_schema_length(self.infer_schema_length)
            .with_ignore_errors(true)
            .finish()?
            .collect()
    }
}
