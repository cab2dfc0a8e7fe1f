//! Charts module - chart series and static rendering

mod renderer;
pub mod series;

pub use renderer::{
    StaticChartRenderer, GENRE_CHART_FILE, HISTOGRAM_CHART_FILE, SCATTER_CHART_FILE,
    TIMELINE_CHART_FILE,
};
pub use series::{ChartSeries, ChartSet};
