//! Null imputation: mean for numeric columns, mode (or a sentinel) for
//! categorical columns, and non-strict `YYYY-MM-DD` parsing for date columns.
//!
//! Fills are built as polars expressions and applied in one `with_columns`
//! pass; date parsing runs on the typed `Table` afterwards.

use crate::data::frame;
use crate::data::schema::ColumnClasses;
use crate::data::table::{Column, ColumnData, Table, DATE_FORMAT};
use crate::error::{Diagnostic, Diagnostics, Result};
use chrono::NaiveDate;
use polars::prelude as pl;
use polars::prelude::{col, len, lit, IntoLazy, SortMultipleOptions};
use serde::Deserialize;

/// Occurrence count column used while ranking modes.
const OCCURRENCES: &str = "__occurrences";

/// How missing categorical values are filled.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoricalFill {
    /// Most frequent present value; ties go to the earliest first occurrence.
    Mode,
    /// A fixed placeholder such as `"Unknown"`.
    Sentinel(String),
}

impl Default for CategoricalFill {
    fn default() -> Self {
        CategoricalFill::Mode
    }
}

/// Arithmetic mean of the present values, `None` when there are none.
pub fn mean(df: &pl::DataFrame, name: &str) -> Result<Option<f64>> {
    Ok(frame::column(df, name)?.as_materialized_series().mean())
}

/// Most frequent present value. Ties resolve to the value seen first.
pub fn mode(df: &pl::DataFrame, name: &str) -> Result<Option<String>> {
    let ranked = df
        .clone()
        .lazy()
        .select([col(name).cast(pl::DataType::String)])
        .filter(col(name).is_not_null())
        .group_by_stable([col(name)])
        .agg([len().alias(OCCURRENCES)])
        .sort_by_exprs(
            [col(OCCURRENCES)],
            SortMultipleOptions::default()
                .with_order_descending(true)
                .with_maintain_order(true),
        )
        .limit(1)
        .collect()?;

    let values = ranked.column(name)?.as_materialized_series().str()?;
    Ok(values.get(0).map(str::to_owned))
}

/// Expression filling a numeric column with its mean, or `None` when the
/// column needs no fill. Integer columns that receive a fill become Float.
pub fn impute_numeric(
    df: &pl::DataFrame,
    name: &str,
    diagnostics: &mut Diagnostics,
) -> Result<Option<pl::Expr>> {
    let nulls = frame::column(df, name)?.null_count();
    if nulls == 0 {
        return Ok(None);
    }
    let Some(fill) = mean(df, name)? else {
        diagnostics.push(Diagnostic::ImputationUndefined {
            column: name.to_string(),
        });
        return Ok(None);
    };

    log::debug!("Filling {} null(s) in '{}' with mean {}", nulls, name, fill);
    Ok(Some(
        col(name)
            .fill_null(col(name).mean())
            .cast(pl::DataType::Float64),
    ))
}

/// Expression filling a text column according to `strategy`, or `None` when
/// the column needs no fill. A column with no present values is never
/// filled, whatever the strategy, so it still reads as missing numbers.
pub fn impute_categorical(
    df: &pl::DataFrame,
    name: &str,
    strategy: &CategoricalFill,
    diagnostics: &mut Diagnostics,
) -> Result<Option<pl::Expr>> {
    let nulls = frame::column(df, name)?.null_count();
    if nulls == 0 {
        return Ok(None);
    }
    let fill = if nulls == df.height() {
        None
    } else {
        match strategy {
            CategoricalFill::Sentinel(sentinel) => Some(sentinel.clone()),
            CategoricalFill::Mode => mode(df, name)?,
        }
    };
    let Some(fill) = fill else {
        diagnostics.push(Diagnostic::ImputationUndefined {
            column: name.to_string(),
        });
        return Ok(None);
    };

    log::debug!("Filling {} null(s) in '{}' with '{}'", nulls, name, fill);
    Ok(Some(col(name).fill_null(lit(fill))))
}

/// Parse a text column as `YYYY-MM-DD` dates. Unparsable values become null
/// and are reported as a single `ParseFallback`.
pub fn parse_dates(column: Column, diagnostics: &mut Diagnostics) -> Column {
    let name = column.name().to_string();
    let (parsed, failures): (Vec<Option<NaiveDate>>, usize) = match column.data() {
        ColumnData::Date(_) => return column,
        ColumnData::Text(values) => {
            let mut failures = 0;
            let parsed: Vec<Option<NaiveDate>> = values
                .iter()
                .map(|v| {
                    let text = v.as_deref()?;
                    let date = NaiveDate::parse_from_str(text.trim(), DATE_FORMAT).ok();
                    if date.is_none() {
                        failures += 1;
                    }
                    date
                })
                .collect();
            (parsed, failures)
        }
        other => {
            let present = other.len() - other.null_count();
            (vec![None; other.len()], present)
        }
    };

    if failures > 0 {
        diagnostics.push(Diagnostic::ParseFallback {
            column: name.clone(),
            count: failures,
        });
    }
    Column::new(name, ColumnData::Date(parsed))
}

/// Mean/mode imputation over the classified columns, in frame column
/// order. Columns named in neither list pass through untouched.
pub fn impute(
    df: pl::DataFrame,
    classes: &ColumnClasses,
    strategy: &CategoricalFill,
    diagnostics: &mut Diagnostics,
) -> Result<pl::DataFrame> {
    let names: Vec<String> = df.get_columns().iter().map(|c| c.name().to_string()).collect();

    let mut fills = Vec::new();
    for name in &names {
        let fill = if classes.numeric.contains(name) {
            impute_numeric(&df, name, diagnostics)?
        } else if classes.categorical.contains(name) {
            impute_categorical(&df, name, strategy, diagnostics)?
        } else {
            None
        };
        fills.extend(fill);
    }

    if fills.is_empty() {
        return Ok(df);
    }
    Ok(df.lazy().with_columns(fills).collect()?)
}

/// Parse each named date column that the table has; absent names are skipped.
pub fn parse_date_columns(
    table: Table,
    date_columns: &[String],
    diagnostics: &mut Diagnostics,
) -> Result<Table> {
    let mut table = table;
    for name in date_columns {
        let Some(column) = table.get_column(name).cloned() else {
            continue;
        };
        table = table.with_column(parse_dates(column, diagnostics))?;
    }
    Ok(table)
}
