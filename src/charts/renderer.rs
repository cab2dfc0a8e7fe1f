//! Static Chart Renderer
//! Draws the precomputed chart series to PNG files with plotters.
//!
//! Layout for every chart: caption on top, axis descriptions, series legend
//! in the upper-right corner.

use crate::charts::series::{
    ChartSet, GroupedBarChart, HistogramChart, ScatterChart, TimeSeriesChart,
};
use crate::error::{PipelineError, Result};
use plotters::prelude::*;
use std::error::Error;
use std::path::{Path, PathBuf};

// Colors (RGB)
const BAR_BLUE: RGBColor = RGBColor(91, 155, 213);
const BAR_ORANGE: RGBColor = RGBColor(237, 125, 49);
const SKY_BLUE: RGBColor = RGBColor(135, 206, 235);
const PURPLE: RGBColor = RGBColor(128, 0, 128);
const DARK_GREEN: RGBColor = RGBColor(0, 128, 0);
const SERIES_COLORS: [RGBColor; 4] = [BAR_BLUE, BAR_ORANGE, RGBColor(112, 173, 71), PURPLE];

const CHART_SIZE: (u32, u32) = (1000, 600);
const WIDE_CHART_SIZE: (u32, u32) = (1200, 600);

pub const GENRE_CHART_FILE: &str = "genre_score_averages.png";
pub const SCATTER_CHART_FILE: &str = "score_relationship.png";
pub const HISTOGRAM_CHART_FILE: &str = "imdb_distribution.png";
pub const TIMELINE_CHART_FILE: &str = "release_timeline.png";

type DrawResult = std::result::Result<(), Box<dyn Error>>;

pub struct StaticChartRenderer;

impl StaticChartRenderer {
    /// Render every non-empty chart of `charts` into `output_dir` and return
    /// the written paths.
    pub fn render_all(charts: &ChartSet, output_dir: &Path) -> Result<Vec<PathBuf>> {
        let mut written = Vec::new();

        Self::render_one(
            &mut written,
            output_dir,
            GENRE_CHART_FILE,
            charts.genre_scores.is_empty(),
            |p| Self::render_grouped_bars(&charts.genre_scores, p),
        )?;
        Self::render_one(
            &mut written,
            output_dir,
            SCATTER_CHART_FILE,
            charts.score_relationship.is_empty(),
            |p| Self::render_scatter(&charts.score_relationship, p),
        )?;
        Self::render_one(
            &mut written,
            output_dir,
            HISTOGRAM_CHART_FILE,
            charts.imdb_distribution.is_empty(),
            |p| Self::render_histogram(&charts.imdb_distribution, p),
        )?;
        Self::render_one(
            &mut written,
            output_dir,
            TIMELINE_CHART_FILE,
            charts.release_timeline.is_empty(),
            |p| Self::render_timeline(&charts.release_timeline, p),
        )?;

        Ok(written)
    }

    fn render_one<F>(
        written: &mut Vec<PathBuf>,
        output_dir: &Path,
        file_name: &str,
        is_empty: bool,
        draw: F,
    ) -> Result<()>
    where
        F: FnOnce(&Path) -> DrawResult,
    {
        if is_empty {
            log::warn!("No data for {}; chart skipped", file_name);
            return Ok(());
        }
        let path = output_dir.join(file_name);
        draw(&path).map_err(|e| PipelineError::Chart(format!("{}: {}", file_name, e)))?;
        log::info!("Chart saved as {}", path.display());
        written.push(path);
        Ok(())
    }

    /// Side-by-side bars per category on a segmented x axis, one color per
    /// series.
    pub fn render_grouped_bars(chart: &GroupedBarChart, path: &Path) -> DrawResult {
        let root = BitMapBackend::new(path, CHART_SIZE).into_drawing_area();
        root.fill(&WHITE)?;

        let n = chart.categories.len() as u32;
        let (y_min, y_max) = chart.value_range();
        let mut ctx = ChartBuilder::on(&root)
            .caption(&chart.title, ("sans-serif", 24))
            .margin(15)
            .x_label_area_size(70)
            .y_label_area_size(60)
            .build_cartesian_2d((0..n).into_segmented(), y_min..y_max)?;

        let categories = &chart.categories;
        ctx.configure_mesh()
            .disable_x_mesh()
            .x_labels(categories.len() + 1)
            .x_label_formatter(&|v| category_label(categories, v))
            .x_desc(chart.x_desc.as_str())
            .y_desc(chart.y_desc.as_str())
            .draw()?;

        for (side, series) in chart.series.iter().enumerate() {
            let color = SERIES_COLORS[side];
            ctx.draw_series(
                series
                    .values
                    .iter()
                    .enumerate()
                    .filter(|(_, v)| v.is_finite())
                    .map(|(i, v)| {
                        let (left, right) = bar_span(side, i as u32);
                        let mut bar = Rectangle::new([(left, y_min), (right, *v)], color.filled());
                        bar.set_margin(0, 0, 3, 3);
                        bar
                    }),
            )?
            .label(series.label.as_str())
            .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], color.filled()));
        }

        ctx.configure_series_labels()
            .position(SeriesLabelPosition::UpperRight)
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()?;
        root.present()?;
        Ok(())
    }

    pub fn render_scatter(chart: &ScatterChart, path: &Path) -> DrawResult {
        let root = BitMapBackend::new(path, CHART_SIZE).into_drawing_area();
        root.fill(&WHITE)?;

        let (x_min, x_max) = extent(chart.points.iter().map(|p| p.0));
        let (y_min, y_max) = extent(chart.points.iter().map(|p| p.1));
        let mut ctx = ChartBuilder::on(&root)
            .caption(&chart.title, ("sans-serif", 24))
            .margin(15)
            .x_label_area_size(50)
            .y_label_area_size(60)
            .build_cartesian_2d(x_min..x_max, y_min..y_max)?;

        ctx.configure_mesh()
            .x_desc(chart.x_desc.as_str())
            .y_desc(chart.y_desc.as_str())
            .draw()?;

        ctx.draw_series(
            chart
                .points
                .iter()
                .map(|&(x, y)| Circle::new((x, y), 3, PURPLE.mix(0.6).filled())),
        )?
        .label("Scores")
        .legend(|(x, y)| Circle::new((x + 5, y), 3, PURPLE.filled()));

        if let Some(fit) = chart.trend {
            ctx.draw_series(LineSeries::new(
                [(x_min, fit.predict(x_min)), (x_max, fit.predict(x_max))],
                RED.stroke_width(2),
            ))?
            .label("Trend line")
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], &RED));
        }

        ctx.configure_series_labels()
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()?;
        root.present()?;
        Ok(())
    }

    /// Histogram bars with vertical mean and median markers.
    pub fn render_histogram(chart: &HistogramChart, path: &Path) -> DrawResult {
        let root = BitMapBackend::new(path, CHART_SIZE).into_drawing_area();
        root.fill(&WHITE)?;

        let x_min = chart.bins.first().map(|b| b.start).unwrap_or(0.0);
        let x_max = chart.bins.last().map(|b| b.end).unwrap_or(1.0);
        let top = chart.bins.iter().map(|b| b.count).max().unwrap_or(0) as f64 * 1.1 + 1.0;

        let mut ctx = ChartBuilder::on(&root)
            .caption(&chart.title, ("sans-serif", 24))
            .margin(15)
            .x_label_area_size(50)
            .y_label_area_size(60)
            .build_cartesian_2d(x_min..x_max, 0f64..top)?;

        ctx.configure_mesh()
            .x_desc(chart.x_desc.as_str())
            .y_desc(chart.y_desc.as_str())
            .draw()?;

        ctx.draw_series(chart.bins.iter().map(|b| {
            Rectangle::new([(b.start, 0.0), (b.end, b.count as f64)], SKY_BLUE.mix(0.7).filled())
        }))?;
        ctx.draw_series(chart.bins.iter().map(|b| {
            Rectangle::new([(b.start, 0.0), (b.end, b.count as f64)], BLACK.stroke_width(1))
        }))?;

        for (label, value, color) in [
            ("Mean", chart.mean, RED),
            ("Median", chart.median, DARK_GREEN),
        ] {
            if !value.is_finite() {
                continue;
            }
            ctx.draw_series(LineSeries::new([(value, 0.0), (value, top)], color.stroke_width(1)))?
                .label(format!("{}: {:.2}", label, value))
                .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color));
        }

        ctx.configure_series_labels()
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()?;
        root.present()?;
        Ok(())
    }

    /// One line with point markers per series over integer years.
    pub fn render_timeline(chart: &TimeSeriesChart, path: &Path) -> DrawResult {
        let root = BitMapBackend::new(path, WIDE_CHART_SIZE).into_drawing_area();
        root.fill(&WHITE)?;

        let years = chart.lines.iter().flat_map(|l| l.points.iter().map(|p| p.0));
        let x_min = years.clone().min().unwrap_or(0) - 1;
        let x_max = years.max().unwrap_or(0) + 1;
        let top = chart
            .lines
            .iter()
            .flat_map(|l| l.points.iter().map(|p| p.1))
            .fold(0.0, f64::max)
            * 1.1
            + 1.0;

        let mut ctx = ChartBuilder::on(&root)
            .caption(&chart.title, ("sans-serif", 24))
            .margin(15)
            .x_label_area_size(50)
            .y_label_area_size(60)
            .build_cartesian_2d(x_min..x_max, 0f64..top)?;

        ctx.configure_mesh()
            .x_desc(chart.x_desc.as_str())
            .y_desc(chart.y_desc.as_str())
            .x_label_formatter(&|y| format!("{}", y))
            .draw()?;

        for (i, line) in chart.lines.iter().enumerate() {
            let color = SERIES_COLORS[i % SERIES_COLORS.len()];
            ctx.draw_series(LineSeries::new(line.points.iter().copied(), color.stroke_width(2)))?
                .label(line.label.as_str())
                .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color));
            ctx.draw_series(
                line.points
                    .iter()
                    .map(|&(x, y)| Circle::new((x, y), 4, color.filled())),
            )?;
        }

        ctx.configure_series_labels()
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()?;
        root.present()?;
        Ok(())
    }
}

/// Segment bounds of a grouped bar: series 0 fills the left half of the
/// category slot, series 1 the right half.
fn bar_span(side: usize, category: u32) -> (SegmentValue<u32>, SegmentValue<u32>) {
    if side == 0 {
        (SegmentValue::Exact(category), SegmentValue::CenterOf(category))
    } else {
        (SegmentValue::CenterOf(category), SegmentValue::Exact(category + 1))
    }
}

/// Category name under a segment center; other positions stay unlabelled.
fn category_label(categories: &[String], position: &SegmentValue<u32>) -> String {
    match position {
        SegmentValue::CenterOf(i) => categories.get(*i as usize).cloned().unwrap_or_default(),
        _ => String::new(),
    }
}

/// Min/max of finite values with 5% padding; a unit range when degenerate.
fn extent(values: impl Iterator<Item = f64>) -> (f64, f64) {
    let (lo, hi) = values
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));
    if lo > hi {
        return (0.0, 1.0);
    }
    if lo == hi {
        return (lo - 0.5, hi + 0.5);
    }
    let pad = (hi - lo) * 0.05;
    (lo - pad, hi + pad)
}
