//! Weighted composite score and simple derived columns.

use crate::data::{Column, Table};
use crate::error::Result;

pub const IMDB_WEIGHT: f64 = 0.5;
pub const ROTTEN_TOMATOES_WEIGHT: f64 = 0.3;
pub const METACRITIC_WEIGHT: f64 = 0.2;

/// Name of the appended composite column.
pub const OVERALL_SCORE: &str = "Overall Score";

/// The three rating columns feeding the composite score.
#[derive(Debug, Clone, Copy)]
pub struct ScoreColumns<'a> {
    pub imdb: &'a str,
    pub rotten_tomatoes: &'a str,
    pub metacritic: &'a str,
}

pub fn overall_score(imdb: f64, rotten_tomatoes: f64, metacritic: f64) -> f64 {
    imdb * IMDB_WEIGHT + rotten_tomatoes * ROTTEN_TOMATOES_WEIGHT + metacritic * METACRITIC_WEIGHT
}

/// Append the weighted score as a Float column named `name`. Inputs are used
/// at whatever scale they carry; a missing input gives a missing score.
pub fn append_overall_score(table: Table, columns: ScoreColumns<'_>, name: &str) -> Result<Table> {
    let imdb = table.column(columns.imdb)?.f64_values()?;
    let rotten = table.column(columns.rotten_tomatoes)?.f64_values()?;
    let meta = table.column(columns.metacritic)?.f64_values()?;

    let scores = imdb
        .iter()
        .zip(&rotten)
        .zip(&meta)
        .map(|((a, b), c)| Some(overall_score((*a)?, (*b)?, (*c)?)))
        .collect();
    table.with_column(Column::float(name, scores))
}

/// Append `column / divisor` as a Float column, e.g. a 0-100 score rescaled
/// to 0-10.
pub fn append_scaled(table: Table, column: &str, divisor: f64, name: &str) -> Result<Table> {
    let values = table.column(column)?.f64_values()?;
    let scaled = values.iter().map(|v| v.map(|v| v / divisor)).collect();
    table.with_column(Column::float(name, scaled))
}
