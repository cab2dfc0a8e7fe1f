//! Partition frame columns into categorical and numeric sets by dtype.

use polars::prelude as pl;

/// Column names split by role. Dates belong to neither list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnClasses {
    pub categorical: Vec<String>,
    pub numeric: Vec<String>,
}

impl ColumnClasses {
    /// Drop `name` from both lists.
    pub fn exclude(&mut self, name: &str) {
        self.categorical.retain(|c| c != name);
        self.numeric.retain(|c| c != name);
    }
}

pub fn classify(frame: &pl::DataFrame) -> ColumnClasses {
    let mut classes = ColumnClasses::default();
    for column in frame.get_columns() {
        let name = column.name().to_string();
        match column.dtype() {
            pl::DataType::String => classes.categorical.push(name),
            dtype if dtype.is_integer() || dtype.is_float() => classes.numeric.push(name),
            _ => {}
        }
    }
    classes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::frame;
    use crate::data::table::{Column, Table};
    use chrono::NaiveDate;

    fn frame() -> pl::DataFrame {
        let table = Table::new(vec![
            Column::text("Title", vec![Some("A")]),
            Column::float("IMDb Score", vec![Some(7.0)]),
            Column::date("Release Date", vec![NaiveDate::from_ymd_opt(2020, 1, 1)]),
            Column::integer("Votes", vec![None]),
            Column::text("Genre", vec![None]),
        ])
        .unwrap();
        frame::to_frame(&table).unwrap()
    }

    #[test]
    fn splits_by_type_and_skips_dates() {
        let classes = classify(&frame());
        assert_eq!(classes.categorical, vec!["Title", "Genre"]);
        assert_eq!(classes.numeric, vec!["IMDb Score", "Votes"]);
    }

    #[test]
    fn excluded_column_leaves_both_lists() {
        let mut classes = classify(&frame());
        classes.exclude("Genre");
        classes.exclude("Votes");
        assert_eq!(classes.categorical, vec!["Title"]);
        assert_eq!(classes.numeric, vec!["IMDb Score"]);
    }
}
