//! Data Processor Module
//! Chains the cleaning stages: classify, impute, parse dates, normalize runtime.

use crate::data::frame;
use crate::data::imputer::{self, CategoricalFill};
use crate::data::runtime::RuntimeNormalizer;
use crate::data::schema::{self, ColumnClasses};
use crate::data::table::Table;
use crate::error::{Diagnostics, Result};
use polars::prelude as pl;

/// Settings for the cleaning stage.
#[derive(Debug, Clone)]
pub struct CleanOptions {
    pub categorical_fill: CategoricalFill,
    pub date_columns: Vec<String>,
    pub runtime_column: Option<String>,
}

/// Cleaned data as a polars frame (for group-bys) and as a typed table (for
/// statistics), plus the column split it was imputed with.
#[derive(Debug, Clone)]
pub struct Cleaned {
    pub frame: pl::DataFrame,
    pub table: Table,
    pub classes: ColumnClasses,
}

impl Cleaned {
    pub fn new(table: Table, classes: ColumnClasses) -> Result<Self> {
        Ok(Self {
            frame: frame::to_frame(&table)?,
            table,
            classes,
        })
    }
}

/// Handles data cleaning and transformation operations.
pub struct DataProcessor {
    runtime: RuntimeNormalizer,
}

impl DataProcessor {
    pub fn new() -> Result<Self> {
        Ok(Self {
            runtime: RuntimeNormalizer::new()?,
        })
    }

    /// Run the full cleaning stage over a loaded frame.
    ///
    /// The runtime column is left out of imputation: its nulls go through
    /// runtime normalization and become the 0-minute fallback.
    pub fn clean(
        &self,
        df: pl::DataFrame,
        options: &CleanOptions,
        diagnostics: &mut Diagnostics,
    ) -> Result<Cleaned> {
        let mut classes = schema::classify(&df);
        if let Some(runtime) = options.runtime_column.as_deref() {
            classes.exclude(runtime);
        }
        log::info!("Categorical columns: {:?}", classes.categorical);
        log::info!("Numeric columns: {:?}", classes.numeric);

        let df = imputer::impute(df, &classes, &options.categorical_fill, diagnostics)?;
        let table = frame::to_table(&df)?;
        let table = imputer::parse_date_columns(table, &options.date_columns, diagnostics)?;

        let table = match options.runtime_column.as_deref() {
            Some(name) => self.normalize_runtime(table, name, diagnostics)?,
            None => table,
        };

        Cleaned::new(table, classes)
    }

    /// Replace the runtime column with integer minutes. A table without the
    /// column is returned unchanged.
    pub fn normalize_runtime(
        &self,
        table: Table,
        column: &str,
        diagnostics: &mut Diagnostics,
    ) -> Result<Table> {
        let Some(runtime) = table.get_column(column).cloned() else {
            log::warn!("Runtime column '{}' not present; skipping normalization", column);
            return Ok(table);
        };
        table.with_column(self.runtime.normalize(runtime, diagnostics))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::table::{Column, DataType, Value};
    use crate::error::Diagnostic;

    fn options() -> CleanOptions {
        CleanOptions {
            categorical_fill: CategoricalFill::Mode,
            date_columns: vec!["Release Date".into()],
            runtime_column: Some("Runtime".into()),
        }
    }

    fn df(columns: Vec<Column>) -> pl::DataFrame {
        frame::to_frame(&Table::new(columns).unwrap()).unwrap()
    }

    #[test]
    fn clean_runs_every_stage() {
        let data = df(vec![
            Column::text("Genre", vec![Some("Drama"), None]),
            Column::float("IMDb Score", vec![Some(6.0), None]),
            Column::text("Runtime", vec![Some("1-2 hour"), None]),
            Column::text("Release Date", vec![Some("2015-10-01"), Some("bad")]),
        ]);

        let processor = DataProcessor::new().unwrap();
        let mut diags = Diagnostics::new();
        let cleaned = processor.clean(data, &options(), &mut diags).unwrap();
        let t = &cleaned.table;

        assert_eq!(cleaned.classes.numeric, vec!["IMDb Score"]);
        assert_eq!(cleaned.classes.categorical, vec!["Genre", "Release Date"]);
        assert_eq!(t.value("Genre", 1).unwrap(), Value::Text("Drama".into()));
        assert_eq!(t.value("IMDb Score", 1).unwrap(), Value::Float(6.0));
        assert_eq!(t.value("Runtime", 0).unwrap(), Value::Integer(90));
        assert_eq!(t.column("Release Date").unwrap().dtype(), DataType::Date);
        assert!(t.value("Release Date", 1).unwrap().is_null());
        assert_eq!(t.column_names(), vec!["Genre", "IMDb Score", "Runtime", "Release Date"]);
        assert_eq!(cleaned.frame.height(), 2);
    }

    #[test]
    fn missing_runtime_is_zero_not_the_mode() {
        let data = df(vec![
            Column::text("Title", vec![Some("A"), Some("B"), Some("C")]),
            Column::text("Runtime", vec![Some("2 hrs"), None, Some("2 hrs")]),
        ]);

        let processor = DataProcessor::new().unwrap();
        let mut diags = Diagnostics::new();
        let cleaned = processor.clean(data, &options(), &mut diags).unwrap();

        assert!(!cleaned.classes.categorical.contains(&"Runtime".to_string()));
        assert_eq!(cleaned.table.value("Runtime", 0).unwrap(), Value::Integer(120));
        assert_eq!(cleaned.table.value("Runtime", 1).unwrap(), Value::Integer(0));
        assert!(!diags.contains(&Diagnostic::ParseFallback {
            column: "Runtime".into(),
            count: 1,
        }));
    }

    #[test]
    fn missing_runtime_column_is_skipped() {
        let table = Table::new(vec![Column::integer("x", vec![Some(1)])]).unwrap();
        let processor = DataProcessor::new().unwrap();
        let mut diags = Diagnostics::new();
        let cleaned = processor
            .clean(frame::to_frame(&table).unwrap(), &options(), &mut diags)
            .unwrap();
        assert_eq!(cleaned.table, table);
    }
}
