//! Run configuration.
//!
//! Every field has a default, so a config file only needs the keys it
//! changes. CLI flags are applied on top of the loaded values.

use crate::data::imputer::CategoricalFill;
use crate::error::{PipelineError, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Names of the catalog columns the pipeline reads.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ColumnNames {
    pub title: String,
    pub genre: String,
    pub imdb: String,
    pub rotten_tomatoes: String,
    pub metacritic: String,
    pub runtime: String,
    pub release_date: String,
    pub country_availability: String,
    pub kind: String,
}

impl Default for ColumnNames {
    fn default() -> Self {
        Self {
            title: "Title".to_string(),
            genre: "Genre".to_string(),
            imdb: "IMDb Score".to_string(),
            rotten_tomatoes: "Rotten Tomatoes Score".to_string(),
            metacritic: "Metacritic Score".to_string(),
            runtime: "Runtime".to_string(),
            release_date: "Release Date".to_string(),
            country_availability: "Country Availability".to_string(),
            kind: "Series or Movie".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub input: PathBuf,
    pub output_dir: PathBuf,
    pub columns: ColumnNames,
    /// Text columns parsed as `YYYY-MM-DD` after imputation.
    pub date_columns: Vec<String>,
    pub categorical_fill: CategoricalFill,
    pub country_delimiter: String,
    /// Countries reported under `leading_country_availability`.
    pub top_countries: usize,
    /// Genres shown in the grouped bar chart, most common first.
    pub top_genres_chart: usize,
    pub histogram_bins: usize,
    pub sample_size: usize,
    pub sample_seed: Option<u64>,
    pub render_charts: bool,
    /// Rows scanned for CSV type inference; `None` scans the whole file.
    pub infer_schema_length: Option<usize>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        let columns = ColumnNames::default();
        Self {
            input: PathBuf::from("catalog.csv"),
            output_dir: PathBuf::from("output"),
            date_columns: vec![
                columns.release_date.clone(),
                "Netflix Release Date".to_string(),
            ],
            columns,
            categorical_fill: CategoricalFill::Mode,
            country_delimiter: ",".to_string(),
            top_countries: 1,
            top_genres_chart: 10,
            histogram_bins: 10,
            sample_size: 20,
            sample_seed: None,
            render_charts: true,
            infer_schema_length: Some(10000),
        }
    }
}

impl PipelineConfig {
    /// Load a JSON config file. Missing keys keep their defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            PipelineError::Config(format!("cannot read {}: {}", path.display(), e))
        })?;
        let config: Self = serde_json::from_str(&text)
            .map_err(|e| PipelineError::Config(format!("{}: {}", path.display(), e)))?;
        config.validate()?;
        log::debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.country_delimiter.is_empty() {
            return Err(PipelineError::Config(
                "country_delimiter must not be empty".to_string(),
            ));
        }
        if self.histogram_bins == 0 {
            return Err(PipelineError::Config(
                "histogram_bins must be at least 1".to_string(),
            ));
        }
        if self.top_countries == 0 {
            return Err(PipelineError::Config(
                "top_countries must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_match_catalog_layout() {
        let config = PipelineConfig::default();
        assert_eq!(config.columns.imdb, "IMDb Score");
        assert_eq!(config.date_columns, vec!["Release Date", "Netflix Release Date"]);
        assert_eq!(config.sample_size, 20);
        assert_eq!(config.categorical_fill, CategoricalFill::Mode);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"sample_size": 5, "categorical_fill": {{"sentinel": "Unknown"}},
                "columns": {{"title": "Name"}}}}"#
        )
        .unwrap();

        let config = PipelineConfig::from_file(file.path()).unwrap();
        assert_eq!(config.sample_size, 5);
        assert_eq!(config.categorical_fill, CategoricalFill::Sentinel("Unknown".into()));
        assert_eq!(config.columns.title, "Name");
        assert_eq!(config.columns.genre, "Genre");
        assert_eq!(config.histogram_bins, 10);
    }

    #[test]
    fn bad_file_is_config_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"histogram_bins": 0}}"#).unwrap();
        let err = PipelineConfig::from_file(file.path()).unwrap_err();
        assert!(matches!(err, PipelineError::Config(_)));

        let err = PipelineConfig::from_file(Path::new("/no/such/config.json")).unwrap_err();
        assert!(matches!(err, PipelineError::Config(_)));
    }
}
