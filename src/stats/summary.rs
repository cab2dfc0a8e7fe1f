//! Statistics summary document written at the end of a run.
//!
//! Record sets are column-oriented (`{"Title": [...], "IMDb Score": [...]}`)
//! so each aggregate reads like the table it came from.

use crate::data::KeyValue;
use crate::stats::aggregate::{GroupCount, GroupMean, TokenCount};
use serde::Serialize;
use serde_json::{Map, Value as JsonValue};

/// Label of the count column in aggregate record sets.
pub const COUNT_LABEL: &str = "count";

#[derive(Debug, Clone, Default, Serialize)]
pub struct StatisticsSummary {
    pub top_imdb: Map<String, JsonValue>,
    pub top_rotten_tomatoes: Map<String, JsonValue>,
    pub leading_country_availability: Map<String, JsonValue>,
    pub genre_averages: Map<String, JsonValue>,
    pub type_counts: Map<String, JsonValue>,
    /// Sample standard deviation per score column; NaN serializes as null.
    pub standard_deviation: Map<String, JsonValue>,
    pub score_correlation: Vec<Vec<f64>>,
}

/// The fixed top-level keys, in document order.
pub const SUMMARY_KEYS: [&str; 7] = [
    "top_imdb",
    "top_rotten_tomatoes",
    "leading_country_availability",
    "genre_averages",
    "type_counts",
    "standard_deviation",
    "score_correlation",
];

fn number(v: f64) -> JsonValue {
    serde_json::Number::from_f64(v)
        .map(JsonValue::Number)
        .unwrap_or(JsonValue::Null)
}

fn key_json(key: &KeyValue) -> JsonValue {
    serde_json::to_value(key).unwrap_or(JsonValue::Null)
}

pub fn token_counts_json(token_label: &str, counts: &[TokenCount]) -> Map<String, JsonValue> {
    let mut map = Map::new();
    map.insert(
        token_label.to_string(),
        counts.iter().map(|c| JsonValue::from(c.token.clone())).collect(),
    );
    map.insert(
        COUNT_LABEL.to_string(),
        counts.iter().map(|c| JsonValue::from(c.count)).collect(),
    );
    map
}

pub fn group_means_json(
    key_label: &str,
    mean_labels: &[&str],
    groups: &[GroupMean],
) -> Map<String, JsonValue> {
    let mut map = Map::new();
    map.insert(
        key_label.to_string(),
        groups.iter().map(|g| key_json(&g.key)).collect(),
    );
    for (i, label) in mean_labels.iter().enumerate() {
        map.insert(
            label.to_string(),
            groups
                .iter()
                .map(|g| number(g.means.get(i).copied().unwrap_or(f64::NAN)))
                .collect(),
        );
    }
    map
}

pub fn group_counts_json(key_labels: &[&str], groups: &[GroupCount]) -> Map<String, JsonValue> {
    let mut map = Map::new();
    for (i, label) in key_labels.iter().enumerate() {
        map.insert(
            label.to_string(),
            groups
                .iter()
                .map(|g| g.key.get(i).map(key_json).unwrap_or(JsonValue::Null))
                .collect(),
        );
    }
    map.insert(
        COUNT_LABEL.to_string(),
        groups.iter().map(|g| JsonValue::from(g.count)).collect(),
    );
    map
}

pub fn scalars_json(values: &[(String, f64)]) -> Map<String, JsonValue> {
    values
        .iter()
        .map(|(name, v)| (name.clone(), number(*v)))
        .collect()
}
