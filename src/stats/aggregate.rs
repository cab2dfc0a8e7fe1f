//! Group-wise reductions over a cleaned frame.
//!
//! Grouping, counting and averaging run as polars lazy queries; results are
//! read back into plain records for the summary and chart builders.

use crate::data::frame;
use crate::data::{Column, ColumnData, KeyValue, Table};
use crate::error::{PipelineError, Result};
use chrono::Datelike;
use polars::prelude as pl;
use polars::prelude::{col, len, lit, IntoLazy, SortMultipleOptions};
use serde::Serialize;

/// Row count column of every grouped query.
const ROWS: &str = "__rows";

/// Occurrences of one atomic token from a multi-valued text column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokenCount {
    pub token: String,
    pub count: usize,
}

/// Per-group row count and mean of each requested value column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupMean {
    pub key: KeyValue,
    pub count: usize,
    pub means: Vec<f64>,
}

/// Row count for one combination of key values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupCount {
    pub key: Vec<KeyValue>,
    pub count: usize,
}

/// Ordering of `group_mean` results. Sorts are descending and stable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeanSort {
    /// By the mean of the value column at this index.
    Metric(usize),
    /// By row count.
    Count,
    /// Order in which groups were first seen.
    Discovery,
}

fn descending() -> SortMultipleOptions {
    SortMultipleOptions::default()
        .with_order_descending(true)
        .with_nulls_last(true)
        .with_maintain_order(true)
}

/// Float columns cannot group.
fn check_key(df: &pl::DataFrame, name: &str) -> Result<()> {
    if frame::column(df, name)?.dtype().is_float() {
        return Err(PipelineError::UnsupportedGroupKey(name.to_string()));
    }
    Ok(())
}

/// `name` as a Float64 expression. A column with no present values counts
/// as numeric whatever its inferred type.
fn numeric(df: &pl::DataFrame, name: &str) -> Result<pl::Expr> {
    let column = frame::column(df, name)?;
    let dtype = column.dtype();
    if dtype.is_integer() || dtype.is_float() || column.null_count() == column.len() {
        Ok(col(name).cast(pl::DataType::Float64))
    } else {
        Err(PipelineError::TypeMismatch {
            column: name.to_string(),
            expected: "numeric",
            actual: frame::element_type(dtype).name(),
        })
    }
}

fn row_counts(grouped: &pl::DataFrame) -> Result<Vec<usize>> {
    let counts = grouped
        .column(ROWS)?
        .as_materialized_series()
        .cast(&pl::DataType::UInt64)?;
    Ok(counts
        .u64()?
        .into_iter()
        .map(|c| c.unwrap_or(0) as usize)
        .collect())
}

fn keys_of(column: &Column) -> Vec<KeyValue> {
    (0..column.len())
        .map(|row| column.data().key(row).unwrap_or(KeyValue::Null))
        .collect()
}

/// All rows whose `column` value equals the column maximum, ties included,
/// in original order. A column without present values yields no rows.
pub fn superlative(df: &pl::DataFrame, column: &str) -> Result<pl::DataFrame> {
    let value = numeric(df, column)?;
    Ok(df
        .clone()
        .lazy()
        .filter(value.clone().eq(value.max()))
        .collect()?)
}

/// Split each present value of a delimited text column and count tokens.
///
/// Tokens are kept verbatim. Ties keep first-seen order. `top_n` truncates
/// after sorting.
pub fn explode_count(
    df: &pl::DataFrame,
    column: &str,
    delimiter: &str,
    top_n: Option<usize>,
) -> Result<Vec<TokenCount>> {
    let dtype = frame::column(df, column)?.dtype();
    if dtype != &pl::DataType::String {
        return Err(PipelineError::TypeMismatch {
            column: column.to_string(),
            expected: "text",
            actual: frame::element_type(dtype).name(),
        });
    }

    let counted = df
        .clone()
        .lazy()
        .select([col(column).str().split(lit(delimiter))])
        .explode([col(column)])
        .filter(col(column).is_not_null())
        .group_by_stable([col(column)])
        .agg([len().alias(ROWS)])
        .sort_by_exprs([col(ROWS)], descending());
    let counted = match top_n {
        Some(n) => counted.limit(pl::IdxSize::try_from(n).unwrap_or(pl::IdxSize::MAX)),
        None => counted,
    }
    .collect()?;

    let tokens = counted.column(column)?.as_materialized_series().str()?;
    Ok(tokens
        .into_iter()
        .zip(row_counts(&counted)?)
        .map(|(token, count)| TokenCount {
            token: token.unwrap_or_default().to_string(),
            count,
        })
        .collect())
}

/// Group rows by `key` and average each of `value_columns` per group.
///
/// Means ignore missing values; a group with none is NaN.
pub fn group_mean(
    df: &pl::DataFrame,
    key: &str,
    value_columns: &[&str],
    sort: MeanSort,
) -> Result<Vec<GroupMean>> {
    check_key(df, key)?;
    let mut aggs = vec![len().alias(ROWS)];
    for name in value_columns {
        aggs.push(numeric(df, name)?.mean());
    }

    let grouped = df.clone().lazy().group_by_stable([col(key)]).agg(aggs);
    let grouped = match sort {
        MeanSort::Metric(i) => match value_columns.get(i) {
            Some(name) => grouped.sort_by_exprs([col(*name)], descending()),
            None => grouped,
        },
        MeanSort::Count => grouped.sort_by_exprs([col(ROWS)], descending()),
        MeanSort::Discovery => grouped,
    }
    .collect()?;

    let counts = row_counts(&grouped)?;
    let table = frame::to_table(&grouped)?;
    let keys = keys_of(table.column(key)?);
    let means = value_columns
        .iter()
        .map(|name| table.column(name)?.f64_values())
        .collect::<Result<Vec<_>>>()?;

    Ok(keys
        .into_iter()
        .zip(counts)
        .enumerate()
        .map(|(row, (key, count))| GroupMean {
            key,
            count,
            means: means.iter().map(|m| m[row].unwrap_or(f64::NAN)).collect(),
        })
        .collect())
}

/// Count rows per distinct combination of `keys`, ascending by key with
/// nulls first.
pub fn group_count(df: &pl::DataFrame, keys: &[&str]) -> Result<Vec<GroupCount>> {
    for key in keys {
        check_key(df, key)?;
    }
    let by: Vec<pl::Expr> = keys.iter().map(|k| col(*k)).collect();

    let grouped = df
        .clone()
        .lazy()
        .group_by(by.clone())
        .agg([len().alias(ROWS)])
        .sort_by_exprs(by, SortMultipleOptions::default().with_maintain_order(true))
        .collect()?;

    let counts = row_counts(&grouped)?;
    let table = frame::to_table(&grouped)?;
    let key_columns = keys
        .iter()
        .map(|k| table.column(k).map(keys_of))
        .collect::<Result<Vec<_>>>()?;

    Ok(counts
        .into_iter()
        .enumerate()
        .map(|(row, count)| GroupCount {
            key: key_columns.iter().map(|c| c[row].clone()).collect(),
            count,
        })
        .collect())
}

/// Integer year column derived from a date column.
pub fn release_year(table: &Table, date_column: &str, name: &str) -> Result<Column> {
    let column = table.column(date_column)?;
    match column.data() {
        ColumnData::Date(dates) => Ok(Column::integer(
            name,
            dates.iter().map(|d| d.map(|d| i64::from(d.year()))).collect(),
        )),
        other => Err(PipelineError::TypeMismatch {
            column: date_column.to_string(),
            expected: "date",
            actual: other.dtype().name(),
        }),
    }
}
