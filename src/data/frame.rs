//! Conversions between polars frames and the typed `Table` view.
//!
//! Cleaning reductions and group-bys run on `pl::DataFrame`; element-wise
//! parsing, scoring and statistics read the typed `Table`.

use crate::data::table::{Column, ColumnData, DataType, Table};
use crate::error::{PipelineError, Result};
use chrono::NaiveDate;
use polars::prelude as pl;

/// Days from 0001-01-01 (CE) to 1970-01-01, the polars `Date` epoch.
const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

/// Missing-value counts for one column.
#[derive(Debug, Clone, PartialEq)]
pub struct NullSummary {
    pub column: String,
    pub null_count: usize,
    pub percent: f64,
}

/// Element type a polars dtype is read as. Unsupported dtypes read as text.
pub fn element_type(dtype: &pl::DataType) -> DataType {
    match dtype {
        pl::DataType::Date => DataType::Date,
        dt if dt.is_integer() => DataType::Integer,
        dt if dt.is_float() => DataType::Float,
        _ => DataType::Text,
    }
}

/// Column lookup that reports a missing name as `ColumnNotFound`.
pub fn column<'a>(frame: &'a pl::DataFrame, name: &str) -> Result<&'a pl::Column> {
    frame
        .column(name)
        .map_err(|_| PipelineError::ColumnNotFound(name.to_string()))
}

pub fn null_report(frame: &pl::DataFrame) -> Vec<NullSummary> {
    let height = frame.height();
    frame
        .get_columns()
        .iter()
        .map(|c| {
            let null_count = c.null_count();
            let percent = if height == 0 {
                0.0
            } else {
                null_count as f64 / height as f64 * 100.0
            };
            NullSummary {
                column: c.name().to_string(),
                null_count,
                percent,
            }
        })
        .collect()
}

/// Convert a polars frame into a `Table`, mapping dtypes onto the four
/// supported element types.
pub fn to_table(frame: &pl::DataFrame) -> Result<Table> {
    let columns = frame
        .get_columns()
        .iter()
        .map(to_table_column)
        .collect::<Result<Vec<_>>>()?;
    Table::new(columns)
}

fn to_table_column(column: &pl::Column) -> Result<Column> {
    let name = column.name().to_string();
    let series = column.as_materialized_series();

    let data = match element_type(series.dtype()) {
        DataType::Date => {
            let days = series.cast(&pl::DataType::Int32)?;
            ColumnData::Date(
                days.i32()?
                    .into_iter()
                    .map(|d| d.and_then(date_from_epoch_days))
                    .collect(),
            )
        }
        DataType::Integer => {
            let cast = series.cast(&pl::DataType::Int64)?;
            ColumnData::Integer(cast.i64()?.into_iter().collect())
        }
        DataType::Float => {
            let cast = series.cast(&pl::DataType::Float64)?;
            ColumnData::Float(cast.f64()?.into_iter().collect())
        }
        DataType::Text => {
            if series.dtype() != &pl::DataType::String {
                log::debug!("Column '{}' has dtype {:?}; reading as text", name, series.dtype());
            }
            let cast = series.cast(&pl::DataType::String)?;
            ColumnData::Text(
                cast.str()?
                    .into_iter()
                    .map(|v| v.map(str::to_owned))
                    .collect(),
            )
        }
    };

    Ok(Column::new(name, data))
}

/// Convert a `Table` into a polars frame. Dates become polars `Date`.
pub fn to_frame(table: &Table) -> Result<pl::DataFrame> {
    let columns = table
        .columns()
        .iter()
        .map(to_frame_column)
        .collect::<Result<Vec<_>>>()?;
    Ok(pl::DataFrame::new(columns)?)
}

fn to_frame_column(column: &Column) -> Result<pl::Column> {
    let name: pl::PlSmallStr = column.name().into();
    let converted = match column.data() {
        ColumnData::Text(v) => pl::Column::new(name, v.as_slice()),
        ColumnData::Integer(v) => pl::Column::new(name, v.as_slice()),
        ColumnData::Float(v) => pl::Column::new(name, v.as_slice()),
        ColumnData::Date(v) => {
            let days: Vec<Option<i32>> = v.iter().map(|d| d.map(epoch_days)).collect();
            pl::Column::new(name, days).cast(&pl::DataType::Date)?
        }
    };
    Ok(converted)
}

fn date_from_epoch_days(days: i32) -> Option<NaiveDate> {
    NaiveDate::from_num_days_from_ce_opt(days.checked_add(UNIX_EPOCH_DAYS_FROM_CE)?)
}

fn epoch_days(date: NaiveDate) -> i32 {
    use chrono::Datelike;
    date.num_days_from_ce() - UNIX_EPOCH_DAYS_FROM_CE
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::table::Value;

    fn sample() -> Table {
        Table::new(vec![
            Column::text("Title", vec![Some("A"), None, Some("C")]),
            Column::float("Score", vec![Some(1.0), Some(2.5), None]),
            Column::integer("Votes", vec![Some(3), Some(4), Some(5)]),
            Column::date(
                "Release Date",
                vec![NaiveDate::from_ymd_opt(2021, 3, 4), None, NaiveDate::from_ymd_opt(1970, 1, 1)],
            ),
        ])
        .unwrap()
    }

    #[test]
    fn frame_round_trip_keeps_types_and_nulls() {
        let table = sample();
        let frame = to_frame(&table).unwrap();
        assert_eq!(frame.column("Release Date").unwrap().dtype(), &pl::DataType::Date);
        assert_eq!(frame.column("Votes").unwrap().dtype(), &pl::DataType::Int64);

        let back = to_table(&frame).unwrap();
        assert_eq!(back, table);
        assert!(back.value("Title", 1).unwrap().is_null());
        assert_eq!(
            back.value("Release Date", 2).unwrap(),
            Value::Date(NaiveDate::from_ymd_opt(1970, 1, 1).unwrap())
        );
    }

    #[test]
    fn null_report_percentages() {
        let report = null_report(&to_frame(&sample()).unwrap());
        assert_eq!(report[0].column, "Title");
        assert_eq!(report[0].null_count, 1);
        assert!((report[0].percent - 100.0 / 3.0).abs() < 1e-9);
        assert_eq!(report[2].null_count, 0);
    }

    #[test]
    fn unknown_column_is_reported_by_name() {
        let frame = to_frame(&sample()).unwrap();
        let err = column(&frame, "Nope").unwrap_err();
        assert!(matches!(err, PipelineError::ColumnNotFound(ref c) if c == "Nope"));
    }

    #[test]
    fn epoch_round_trip() {
        let date = NaiveDate::from_ymd_opt(2021, 3, 4).unwrap();
        assert_eq!(date_from_epoch_days(epoch_days(date)), Some(date));
        assert_eq!(epoch_days(NaiveDate::from_ymd_opt(1970, 1, 1).unwrap()), 0);
    }
}
