//! Chart data contracts.
//!
//! Each chart is described by precomputed series and labels; the renderer
//! only draws what it is handed.

use crate::data::{KeyValue, Table};
use crate::error::Result;
use polars::prelude as pl;
use crate::stats::aggregate::{self, MeanSort};
use crate::stats::{HistogramBin, LinearFit, StatsCalculator};

/// One labelled series of bar heights, aligned with the chart categories.
#[derive(Debug, Clone, PartialEq)]
pub struct NamedSeries {
    pub label: String,
    pub values: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GroupedBarChart {
    pub title: String,
    pub x_desc: String,
    pub y_desc: String,
    pub categories: Vec<String>,
    /// Left and right bar of each category.
    pub series: [NamedSeries; 2],
}

impl GroupedBarChart {
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// Y range padded by one unit on each side of the finite values.
    pub fn value_range(&self) -> (f64, f64) {
        let finite = self
            .series
            .iter()
            .flat_map(|s| s.values.iter().copied())
            .filter(|v| v.is_finite());
        let (lo, hi) = finite.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });
        if lo > hi {
            (0.0, 1.0)
        } else {
            (lo - 1.0, hi + 1.0)
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScatterChart {
    pub title: String,
    pub x_desc: String,
    pub y_desc: String,
    pub points: Vec<(f64, f64)>,
    pub trend: Option<LinearFit>,
}

impl ScatterChart {
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HistogramChart {
    pub title: String,
    pub x_desc: String,
    pub y_desc: String,
    pub bins: Vec<HistogramBin>,
    pub mean: f64,
    pub median: f64,
}

impl HistogramChart {
    pub fn is_empty(&self) -> bool {
        self.bins.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NamedLine {
    pub label: String,
    pub points: Vec<(i64, f64)>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeriesChart {
    pub title: String,
    pub x_desc: String,
    pub y_desc: String,
    pub lines: Vec<NamedLine>,
}

impl TimeSeriesChart {
    pub fn is_empty(&self) -> bool {
        self.lines.iter().all(|l| l.points.is_empty())
    }
}

/// The four charts emitted per run.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSet {
    pub genre_scores: GroupedBarChart,
    pub score_relationship: ScatterChart,
    pub imdb_distribution: HistogramChart,
    pub release_timeline: TimeSeriesChart,
}

/// Builds chart series from a scored frame and its typed table.
pub struct ChartSeries;

impl ChartSeries {
    /// Mean of two score columns for the `top_n` most common genres.
    pub fn genre_scores(
        df: &pl::DataFrame,
        genre: &str,
        scores: [(&str, &str); 2],
        top_n: usize,
    ) -> Result<GroupedBarChart> {
        let mut groups = aggregate::group_mean(
            df,
            genre,
            &[scores[0].0, scores[1].0],
            MeanSort::Count,
        )?;
        groups.truncate(top_n);

        let series = [0, 1].map(|i| NamedSeries {
            label: scores[i].1.to_string(),
            values: groups.iter().map(|g| g.means[i]).collect(),
        });

        Ok(GroupedBarChart {
            title: format!("Average Scores by Genre (Top {})", top_n),
            x_desc: "Genre".to_string(),
            y_desc: "Average Score (0-10 scale)".to_string(),
            categories: groups.iter().map(|g| g.key.to_string()).collect(),
            series,
        })
    }

    /// Paired scores with a least-squares trend line.
    pub fn score_relationship(table: &Table, x: &str, y: &str) -> Result<ScatterChart> {
        let xs = table.column(x)?.f64_values()?;
        let ys = table.column(y)?.f64_values()?;
        let points = xs
            .iter()
            .zip(&ys)
            .filter_map(|(a, b)| Some(((*a)?, (*b)?)))
            .collect();

        Ok(ScatterChart {
            title: format!("Relationship between {} and {}", x, y),
            x_desc: x.to_string(),
            y_desc: y.to_string(),
            points,
            trend: StatsCalculator::linear_fit(&xs, &ys),
        })
    }

    pub fn score_distribution(table: &Table, column: &str, bins: usize) -> Result<HistogramChart> {
        let values: Vec<f64> = table.column(column)?.f64_values()?.into_iter().flatten().collect();
        let stats = StatsCalculator::compute_descriptive_stats(&values);
        log::info!(
            "{}: mean {:.2}, median {:.2}, std {:.2}",
            column,
            stats.mean,
            stats.median,
            stats.population_std
        );

        Ok(HistogramChart {
            title: format!("Distribution of {}", column),
            x_desc: column.to_string(),
            y_desc: "Frequency".to_string(),
            bins: StatsCalculator::histogram(&values, bins),
            mean: stats.mean,
            median: stats.median,
        })
    }

    /// Titles per year, one line per `(label, kind value)` pair.
    pub fn release_timeline(
        df: &pl::DataFrame,
        year: &str,
        kind: &str,
        kinds: &[(&str, &str)],
    ) -> Result<TimeSeriesChart> {
        let counts = aggregate::group_count(df, &[year, kind])?;
        let lines = kinds
            .iter()
            .map(|(label, value)| NamedLine {
                label: label.to_string(),
                points: counts
                    .iter()
                    .filter_map(|c| match (&c.key[0], &c.key[1]) {
                        (KeyValue::Integer(y), KeyValue::Text(k)) if k == value => {
                            Some((*y, c.count as f64))
                        }
                        _ => None,
                    })
                    .collect(),
            })
            .collect();

        Ok(TimeSeriesChart {
            title: "Titles per Release Year".to_string(),
            x_desc: "Release Year".to_string(),
            y_desc: "Count".to_string(),
            lines,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{frame, Column};
    use chrono::NaiveDate;

    fn table() -> Table {
        Table::new(vec![
            Column::text("Genre", vec![Some("Drama"), Some("Comedy"), Some("Drama"), Some("Horror")]),
            Column::float("IMDb Score", vec![Some(8.0), Some(6.0), Some(7.0), Some(5.0)]),
            Column::float("RT Normalized", vec![Some(9.0), Some(5.0), Some(7.0), Some(4.0)]),
            Column::integer("Release Year", vec![Some(2019), Some(2019), Some(2020), None]),
            Column::text("Series or Movie", vec![Some("Movie"), Some("Series"), Some("Movie"), Some("Movie")]),
            Column::date("d", vec![NaiveDate::from_ymd_opt(2019, 1, 1), None, None, None]),
        ])
        .unwrap()
    }

    #[test]
    fn genre_bars_take_most_common_first() {
        let chart = ChartSeries::genre_scores(
            &frame::to_frame(&table()).unwrap(),
            "Genre",
            [("IMDb Score", "Average IMDb"), ("RT Normalized", "Average Rotten Tomatoes")],
            2,
        )
        .unwrap();
        assert_eq!(chart.categories, vec!["Drama", "Comedy"]);
        assert_eq!(chart.series[0].values, vec![7.5, 6.0]);
        assert_eq!(chart.series[1].label, "Average Rotten Tomatoes");
        assert_eq!(chart.value_range(), (4.0, 9.0));
    }

    #[test]
    fn scatter_has_trend() {
        let chart = ChartSeries::score_relationship(&table(), "IMDb Score", "RT Normalized").unwrap();
        assert_eq!(chart.points.len(), 4);
        assert!(chart.trend.unwrap().slope > 0.0);
    }

    #[test]
    fn histogram_marks_mean_and_median() {
        let chart = ChartSeries::score_distribution(&table(), "IMDb Score", 10).unwrap();
        assert_eq!(chart.bins.len(), 10);
        assert!((chart.mean - 6.5).abs() < 1e-12);
        assert!((chart.median - 6.5).abs() < 1e-12);
    }

    #[test]
    fn timeline_skips_unknown_years() {
        let chart = ChartSeries::release_timeline(
            &frame::to_frame(&table()).unwrap(),
            "Release Year",
            "Series or Movie",
            &[("Movies", "Movie"), ("Series", "Series")],
        )
        .unwrap();
        assert_eq!(chart.lines[0].points, vec![(2019, 1.0), (2020, 1.0)]);
        assert_eq!(chart.lines[1].points, vec![(2019, 1.0)]);
        assert!(!chart.is_empty());
    }
}
