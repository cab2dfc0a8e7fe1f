//! One batch run: load, clean, summarise, score, export.

use crate::charts::{ChartSeries, ChartSet, StaticChartRenderer};
use crate::config::PipelineConfig;
use crate::data::frame;
use crate::data::{CleanOptions, Cleaned, DataLoader, DataProcessor, Table};
use crate::error::{Diagnostics, Result};
use crate::export::{self, SAMPLE_CSV_FILE, SCORED_CSV_FILE, SUMMARY_JSON_FILE};
use crate::stats::aggregate::{self, MeanSort};
use crate::stats::score::{self, ScoreColumns, OVERALL_SCORE};
use crate::stats::summary;
use crate::stats::{StatisticsSummary, StatsCalculator};
use polars::prelude as pl;
use std::path::PathBuf;

/// Labels of the per-genre mean columns, aligned with the score columns.
pub const GENRE_MEAN_LABELS: [&str; 3] =
    ["Average IMDb", "Average Rotten Tomatoes", "Average Metacritic"];

/// Rotten Tomatoes rescaled to the 0-10 IMDb scale for charting.
pub const RT_NORMALIZED: &str = "Rotten Tomatoes Score Normalized";
pub const RELEASE_YEAR: &str = "Release Year";

/// `(legend label, value in the type column)` per timeline line.
pub const TIMELINE_KINDS: [(&str, &str); 2] = [("Movies", "Movie"), ("Series", "Series")];

/// What a run produced.
#[derive(Debug)]
pub struct RunReport {
    pub rows: usize,
    pub summary: StatisticsSummary,
    pub diagnostics: Diagnostics,
    /// Every file written, in write order.
    pub outputs: Vec<PathBuf>,
}

pub fn run(config: &PipelineConfig) -> Result<RunReport> {
    config.validate()?;
    let mut diagnostics = Diagnostics::new();

    let df = DataLoader::new()
        .with_infer_schema_length(config.infer_schema_length)
        .load_frame(&config.input)?;
    log_null_report("Missing values after load", &df);

    let options = CleanOptions {
        categorical_fill: config.categorical_fill.clone(),
        date_columns: config.date_columns.clone(),
        runtime_column: Some(config.columns.runtime.clone()),
    };
    let cleaned = DataProcessor::new()?.clean(df, &options, &mut diagnostics)?;
    log_null_report("Missing values after cleaning", &cleaned.frame);

    let summary = summarize(&cleaned, config, &mut diagnostics)?;

    let columns = &config.columns;
    let table = score::append_overall_score(
        cleaned.table,
        ScoreColumns {
            imdb: &columns.imdb,
            rotten_tomatoes: &columns.rotten_tomatoes,
            metacritic: &columns.metacritic,
        },
        OVERALL_SCORE,
    )?;

    std::fs::create_dir_all(&config.output_dir)?;
    let mut outputs = Vec::new();

    let csv_path = config.output_dir.join(SCORED_CSV_FILE);
    export::write_csv(&table, &csv_path)?;
    outputs.push(csv_path);

    let json_path = config.output_dir.join(SUMMARY_JSON_FILE);
    export::write_json(&summary, &json_path)?;
    outputs.push(json_path);

    if config.render_charts {
        let charts = build_charts(&table, config)?;
        outputs.extend(StaticChartRenderer::render_all(&charts, &config.output_dir)?);
    } else {
        log::info!("Chart rendering disabled");
    }

    let sample_path = config.output_dir.join(SAMPLE_CSV_FILE);
    export::write_sample(&table, config.sample_size, config.sample_seed, &sample_path)?;
    outputs.push(sample_path);

    if !diagnostics.is_empty() {
        log::warn!("Run finished with {} diagnostic(s)", diagnostics.len());
    }

    Ok(RunReport {
        rows: table.height(),
        summary,
        diagnostics,
        outputs,
    })
}

/// Build the statistics document from cleaned data. Group-bys run on the
/// frame; dispersion and correlation read the typed table.
pub fn summarize(
    cleaned: &Cleaned,
    config: &PipelineConfig,
    diagnostics: &mut Diagnostics,
) -> Result<StatisticsSummary> {
    let c = &config.columns;
    let df = &cleaned.frame;
    let table = &cleaned.table;
    let scores = [c.imdb.as_str(), c.rotten_tomatoes.as_str(), c.metacritic.as_str()];

    let top_imdb = top_titles(df, &c.title, &c.imdb)?;
    let top_rotten = top_titles(df, &c.title, &c.rotten_tomatoes)?;
    log::info!("Top {}: {} title(s)", c.imdb, top_imdb.height());
    log::info!("Top {}: {} title(s)", c.rotten_tomatoes, top_rotten.height());

    let countries = aggregate::explode_count(
        df,
        &c.country_availability,
        &config.country_delimiter,
        Some(config.top_countries),
    )?;
    if let Some(first) = countries.first() {
        log::info!("Leading availability: {} ({} titles)", first.token, first.count);
    }

    let genres = aggregate::group_mean(df, &c.genre, &scores, MeanSort::Metric(0))?;
    let types = aggregate::group_count(df, &[c.kind.as_str()])?;

    let imdb = table.column(&c.imdb)?.f64_values()?;
    let rotten = table.column(&c.rotten_tomatoes)?.f64_values()?;
    let meta = table.column(&c.metacritic)?.f64_values()?;
    let dispersion = StatsCalculator::dispersion(
        &[
            (scores[0], imdb.as_slice()),
            (scores[1], rotten.as_slice()),
            (scores[2], meta.as_slice()),
        ],
        diagnostics,
    );
    let correlation =
        StatsCalculator::correlation_matrix(&[imdb.as_slice(), rotten.as_slice(), meta.as_slice()]);
    log::debug!("Score correlation: {:?}", correlation);

    Ok(StatisticsSummary {
        top_imdb: top_imdb.to_json_columns(),
        top_rotten_tomatoes: top_rotten.to_json_columns(),
        leading_country_availability: summary::token_counts_json(
            &c.country_availability,
            &countries,
        ),
        genre_averages: summary::group_means_json(&c.genre, &GENRE_MEAN_LABELS, &genres),
        type_counts: summary::group_counts_json(&[c.kind.as_str()], &types),
        standard_deviation: summary::scalars_json(&dispersion),
        score_correlation: correlation,
    })
}

/// Rows holding the maximum of `score`, projected to title and score.
fn top_titles(df: &pl::DataFrame, title: &str, score: &str) -> Result<Table> {
    frame::column(df, title)?;
    let top = aggregate::superlative(df, score)?;
    frame::to_table(&top.select([title, score])?)
}

/// Chart series from the scored table. Rotten Tomatoes is rescaled to 0-10
/// so it shares the IMDb axis.
pub fn build_charts(table: &Table, config: &PipelineConfig) -> Result<ChartSet> {
    let c = &config.columns;
    let chart_table =
        score::append_scaled(table.clone(), &c.rotten_tomatoes, 10.0, RT_NORMALIZED)?;
    let year = aggregate::release_year(&chart_table, &c.release_date, RELEASE_YEAR)?;
    let chart_table = chart_table.with_column(year)?;
    let chart_frame = frame::to_frame(&chart_table)?;

    Ok(ChartSet {
        genre_scores: ChartSeries::genre_scores(
            &chart_frame,
            &c.genre,
            [
                (c.imdb.as_str(), "Average IMDb"),
                (RT_NORMALIZED, "Average Rotten Tomatoes (normalized)"),
            ],
            config.top_genres_chart,
        )?,
        score_relationship: ChartSeries::score_relationship(&chart_table, &c.imdb, RT_NORMALIZED)?,
        imdb_distribution: ChartSeries::score_distribution(
            &chart_table,
            &c.imdb,
            config.histogram_bins,
        )?,
        release_timeline: ChartSeries::release_timeline(
            &chart_frame,
            RELEASE_YEAR,
            &c.kind,
            &TIMELINE_KINDS,
        )?,
    })
}

fn log_null_report(heading: &str, df: &pl::DataFrame) {
    log::info!("{} ({} rows):", heading, df.height());
    for entry in frame::null_report(df) {
        if entry.null_count > 0 {
            log::info!(
                "  {}: {} ({:.2}%)",
                entry.column,
                entry.null_count,
                entry.percent
            );
        }
    }
}
