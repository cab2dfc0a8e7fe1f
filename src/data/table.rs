//! Typed columnar view over a cleaned frame.
//!
//! Every column is a tagged union over the supported element types, and every
//! element is an `Option`: `None` is the missing-value marker and is never
//! confused with `0` or `""`. Element-wise stages (date and runtime parsing,
//! scoring, statistics) take a `Table` by value and hand back a new one.

use crate::error::{PipelineError, Result};
use chrono::NaiveDate;
use serde::Serialize;
use serde_json::{Map, Value as JsonValue};

/// Output format for `Date` values (CSV and JSON).
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Declared element type of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataType {
    Text,
    Integer,
    Float,
    Date,
}

impl DataType {
    pub fn name(&self) -> &'static str {
        match self {
            DataType::Text => "text",
            DataType::Integer => "integer",
            DataType::Float => "float",
            DataType::Date => "date",
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, DataType::Integer | DataType::Float)
    }
}

/// A single cell, detached from its column.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Text(String),
    Integer(i64),
    Float(f64),
    Date(NaiveDate),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// JSON form; non-finite floats become `null`.
    pub fn to_json(&self) -> JsonValue {
        match self {
            Value::Null => JsonValue::Null,
            Value::Text(s) => JsonValue::String(s.clone()),
            Value::Integer(v) => JsonValue::from(*v),
            Value::Float(v) => serde_json::Number::from_f64(*v)
                .map(JsonValue::Number)
                .unwrap_or(JsonValue::Null),
            Value::Date(d) => JsonValue::String(d.format(DATE_FORMAT).to_string()),
        }
    }
}

/// Hashable, orderable grouping key. Floats are not valid keys.
///
/// Variant order makes `Null` sort before any present value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(untagged)]
pub enum KeyValue {
    Null,
    Text(String),
    Integer(i64),
    Date(NaiveDate),
}

impl std::fmt::Display for KeyValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            KeyValue::Null => write!(f, "null"),
            KeyValue::Text(s) => write!(f, "{}", s),
            KeyValue::Integer(v) => write!(f, "{}", v),
            KeyValue::Date(d) => write!(f, "{}", d.format(DATE_FORMAT)),
        }
    }
}

/// Column storage, one variant per element type.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnData {
    Text(Vec<Option<String>>),
    Integer(Vec<Option<i64>>),
    Float(Vec<Option<f64>>),
    Date(Vec<Option<NaiveDate>>),
}

impl ColumnData {
    pub fn len(&self) -> usize {
        match self {
            ColumnData::Text(v) => v.len(),
            ColumnData::Integer(v) => v.len(),
            ColumnData::Float(v) => v.len(),
            ColumnData::Date(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn dtype(&self) -> DataType {
        match self {
            ColumnData::Text(_) => DataType::Text,
            ColumnData::Integer(_) => DataType::Integer,
            ColumnData::Float(_) => DataType::Float,
            ColumnData::Date(_) => DataType::Date,
        }
    }

    pub fn null_count(&self) -> usize {
        match self {
            ColumnData::Text(v) => v.iter().filter(|x| x.is_none()).count(),
            ColumnData::Integer(v) => v.iter().filter(|x| x.is_none()).count(),
            ColumnData::Float(v) => v.iter().filter(|x| x.is_none()).count(),
            ColumnData::Date(v) => v.iter().filter(|x| x.is_none()).count(),
        }
    }

    pub fn value(&self, row: usize) -> Value {
        match self {
            ColumnData::Text(v) => v
                .get(row)
                .cloned()
                .flatten()
                .map(Value::Text)
                .unwrap_or(Value::Null),
            ColumnData::Integer(v) => v
                .get(row)
                .copied()
                .flatten()
                .map(Value::Integer)
                .unwrap_or(Value::Null),
            ColumnData::Float(v) => v
                .get(row)
                .copied()
                .flatten()
                .map(Value::Float)
                .unwrap_or(Value::Null),
            ColumnData::Date(v) => v
                .get(row)
                .copied()
                .flatten()
                .map(Value::Date)
                .unwrap_or(Value::Null),
        }
    }

    /// Group key for `row`, or `None` when this column type cannot group.
    pub fn key(&self, row: usize) -> Option<KeyValue> {
        let key = match self {
            ColumnData::Text(v) => v
                .get(row)
                .cloned()
                .flatten()
                .map(KeyValue::Text)
                .unwrap_or(KeyValue::Null),
            ColumnData::Integer(v) => v
                .get(row)
                .copied()
                .flatten()
                .map(KeyValue::Integer)
                .unwrap_or(KeyValue::Null),
            ColumnData::Date(v) => v
                .get(row)
                .copied()
                .flatten()
                .map(KeyValue::Date)
                .unwrap_or(KeyValue::Null),
            ColumnData::Float(_) => return None,
        };
        Some(key)
    }

    /// Rows at `indices`, in that order. Out-of-range indices yield null.
    pub fn take(&self, indices: &[usize]) -> ColumnData {
        fn pick<T: Clone>(v: &[Option<T>], indices: &[usize]) -> Vec<Option<T>> {
            indices
                .iter()
                .map(|&i| v.get(i).cloned().flatten())
                .collect()
        }
        match self {
            ColumnData::Text(v) => ColumnData::Text(pick(v, indices)),
            ColumnData::Integer(v) => ColumnData::Integer(pick(v, indices)),
            ColumnData::Float(v) => ColumnData::Float(pick(v, indices)),
            ColumnData::Date(v) => ColumnData::Date(pick(v, indices)),
        }
    }

    /// Numeric view widened to `f64`; `None` for non-numeric columns. A
    /// column with no present values reads as all-missing numbers whatever
    /// its type, since an empty CSV column is inferred as text.
    pub fn to_f64(&self) -> Option<Vec<Option<f64>>> {
        match self {
            ColumnData::Integer(v) => Some(v.iter().map(|x| x.map(|i| i as f64)).collect()),
            ColumnData::Float(v) => Some(v.clone()),
            _ if self.null_count() == self.len() => Some(vec![None; self.len()]),
            _ => None,
        }
    }
}

/// A named column.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    name: String,
    data: ColumnData,
}

impl Column {
    pub fn new(name: impl Into<String>, data: ColumnData) -> Self {
        Self {
            name: name.into(),
            data,
        }
    }

    pub fn text(name: impl Into<String>, values: Vec<Option<&str>>) -> Self {
        Self::new(
            name,
            ColumnData::Text(values.into_iter().map(|v| v.map(str::to_owned)).collect()),
        )
    }

    pub fn integer(name: impl Into<String>, values: Vec<Option<i64>>) -> Self {
        Self::new(name, ColumnData::Integer(values))
    }

    pub fn float(name: impl Into<String>, values: Vec<Option<f64>>) -> Self {
        Self::new(name, ColumnData::Float(values))
    }

    pub fn date(name: impl Into<String>, values: Vec<Option<NaiveDate>>) -> Self {
        Self::new(name, ColumnData::Date(values))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn data(&self) -> &ColumnData {
        &self.data
    }

    pub fn into_data(self) -> ColumnData {
        self.data
    }

    pub fn dtype(&self) -> DataType {
        self.data.dtype()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn null_count(&self) -> usize {
        self.data.null_count()
    }

    /// Numeric values widened to `f64`, or a type error.
    pub fn f64_values(&self) -> Result<Vec<Option<f64>>> {
        self.data.to_f64().ok_or_else(|| PipelineError::TypeMismatch {
            column: self.name.clone(),
            expected: "numeric",
            actual: self.dtype().name(),
        })
    }

    pub fn text_values(&self) -> Result<&[Option<String>]> {
        match &self.data {
            ColumnData::Text(v) => Ok(v),
            other => Err(PipelineError::TypeMismatch {
                column: self.name.clone(),
                expected: "text",
                actual: other.dtype().name(),
            }),
        }
    }
}

/// Ordered collection of equal-length named columns.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    columns: Vec<Column>,
}

impl Table {
    /// Build a table, rejecting columns whose length differs from the first.
    pub fn new(columns: Vec<Column>) -> Result<Self> {
        if let Some(first) = columns.first() {
            let expected = first.len();
            if let Some(bad) = columns.iter().find(|c| c.len() != expected) {
                return Err(PipelineError::LengthMismatch {
                    column: bad.name().to_string(),
                    expected,
                    actual: bad.len(),
                });
            }
        }
        Ok(Self { columns })
    }

    pub fn height(&self) -> usize {
        self.columns.first().map(Column::len).unwrap_or(0)
    }

    pub fn width(&self) -> usize {
        self.columns.len()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn into_columns(self) -> Vec<Column> {
        self.columns
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name().to_string()).collect()
    }

    pub fn get_column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name() == name)
    }

    pub fn column(&self, name: &str) -> Result<&Column> {
        self.get_column(name)
            .ok_or_else(|| PipelineError::ColumnNotFound(name.to_string()))
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.get_column(name).is_some()
    }

    /// Replace the same-named column in place, or append a new one.
    pub fn with_column(mut self, column: Column) -> Result<Self> {
        if !self.columns.is_empty() && column.len() != self.height() {
            return Err(PipelineError::LengthMismatch {
                column: column.name().to_string(),
                expected: self.height(),
                actual: column.len(),
            });
        }
        match self.columns.iter().position(|c| c.name() == column.name()) {
            Some(pos) => self.columns[pos] = column,
            None => self.columns.push(column),
        }
        Ok(self)
    }

    /// Project the named columns, in the order given.
    pub fn select(&self, names: &[&str]) -> Result<Table> {
        let columns = names
            .iter()
            .map(|name| self.column(name).cloned())
            .collect::<Result<Vec<_>>>()?;
        Table::new(columns)
    }

    /// Rows at `indices`, in that order.
    pub fn take(&self, indices: &[usize]) -> Table {
        Table {
            columns: self
                .columns
                .iter()
                .map(|c| Column::new(c.name(), c.data().take(indices)))
                .collect(),
        }
    }

    pub fn value(&self, column: &str, row: usize) -> Result<Value> {
        Ok(self.column(column)?.data().value(row))
    }

    /// Column-oriented JSON object: `{"col": [v0, v1, ...], ...}`.
    pub fn to_json_columns(&self) -> Map<String, JsonValue> {
        let height = self.height();
        self.columns
            .iter()
            .map(|c| {
                let values = (0..height).map(|i| c.data().value(i).to_json()).collect();
                (c.name().to_string(), JsonValue::Array(values))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Table {
        Table::new(vec![
            Column::text("Title", vec![Some("A"), None, Some("C")]),
            Column::float("Score", vec![Some(1.0), Some(2.5), None]),
        ])
        .unwrap()
    }

    #[test]
    fn rejects_ragged_columns() {
        let err = Table::new(vec![
            Column::integer("a", vec![Some(1), Some(2)]),
            Column::integer("b", vec![Some(1)]),
        ])
        .unwrap_err();
        assert!(matches!(err, PipelineError::LengthMismatch { ref column, .. } if column == "b"));
    }

    #[test]
    fn with_column_replaces_in_place() {
        let table = sample()
            .with_column(Column::integer("Title", vec![Some(1), Some(2), Some(3)]))
            .unwrap();
        assert_eq!(table.column_names(), vec!["Title", "Score"]);
        assert_eq!(table.column("Title").unwrap().dtype(), DataType::Integer);
    }

    #[test]
    fn with_column_checks_length() {
        let err = sample()
            .with_column(Column::integer("x", vec![Some(1)]))
            .unwrap_err();
        assert!(matches!(err, PipelineError::LengthMismatch { .. }));
    }

    #[test]
    fn missing_is_not_zero_or_empty() {
        let table = Table::new(vec![
            Column::text("t", vec![Some(""), None]),
            Column::integer("n", vec![Some(0), None]),
        ])
        .unwrap();
        assert_eq!(table.value("t", 0).unwrap(), Value::Text(String::new()));
        assert!(table.value("t", 1).unwrap().is_null());
        assert_eq!(table.value("n", 0).unwrap(), Value::Integer(0));
        assert!(table.value("n", 1).unwrap().is_null());
    }

    #[test]
    fn take_and_select() {
        let table = sample().take(&[2, 0]);
        assert_eq!(table.height(), 2);
        assert_eq!(table.value("Title", 0).unwrap(), Value::Text("C".into()));
        let projected = table.select(&["Score"]).unwrap();
        assert_eq!(projected.width(), 1);
        assert!(table.select(&["Nope"]).is_err());
    }

    #[test]
    fn json_columns_map_nan_to_null() {
        let table = Table::new(vec![Column::float("x", vec![Some(f64::NAN), Some(1.5)])]).unwrap();
        let json = table.to_json_columns();
        assert_eq!(json["x"], serde_json::json!([null, 1.5]));
    }

    #[test]
    fn all_missing_text_reads_as_numbers() {
        let empty = Column::text("Metacritic Score", vec![None, None]);
        assert_eq!(empty.f64_values().unwrap(), vec![None, None]);
        let text = Column::text("Genre", vec![Some("Drama"), None]);
        assert!(matches!(text.f64_values(), Err(PipelineError::TypeMismatch { .. })));
    }

    #[test]
    fn null_keys_sort_first() {
        let mut keys = vec![KeyValue::Integer(2001), KeyValue::Null, KeyValue::Integer(1999)];
        keys.sort();
        assert_eq!(keys[0], KeyValue::Null);
        assert_eq!(keys[1], KeyValue::Integer(1999));
    }
}
