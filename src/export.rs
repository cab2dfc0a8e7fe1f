//! File Export Module
//! Writes the scored table, the statistics summary and the row sample.

use crate::data::frame;
use crate::data::Table;
use crate::error::Result;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

pub const SCORED_CSV_FILE: &str = "catalog_with_overall_score.csv";
pub const SUMMARY_JSON_FILE: &str = "statistics_summary.json";
pub const SAMPLE_CSV_FILE: &str = "catalog_sample.csv";

const JSON_INDENT: &[u8] = b"    ";

/// Write `table` as comma-separated UTF-8 with a header row. Dates are
/// rendered as `YYYY-MM-DD`.
pub fn write_csv(table: &Table, path: &Path) -> Result<()> {
    use polars::prelude::{CsvWriter, SerWriter};

    let mut df = frame::to_frame(table)?;
    let file = File::create(path)?;
    CsvWriter::new(file).include_header(true).finish(&mut df)?;
    log::info!("Wrote {} rows to {}", table.height(), path.display());
    Ok(())
}

/// Write `value` as JSON indented with four spaces. Non-ASCII text is
/// written literally and non-finite floats become `null`.
pub fn write_json<T: Serialize>(value: &T, path: &Path) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    let formatter = serde_json::ser::PrettyFormatter::with_indent(JSON_INDENT);
    let mut serializer = serde_json::Serializer::with_formatter(&mut writer, formatter);
    value.serialize(&mut serializer)?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    log::info!("Wrote {}", path.display());
    Ok(())
}

/// Uniform random rows without replacement. `size` is clamped to the table
/// height; a fixed `seed` makes the draw reproducible.
pub fn sample_rows(table: &Table, size: usize, seed: Option<u64>) -> Table {
    let amount = size.min(table.height());
    if amount < size {
        log::warn!(
            "Sample size {} exceeds {} rows; sampling every row",
            size,
            table.height()
        );
    }

    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };
    let indices = rand::seq::index::sample(&mut rng, table.height(), amount).into_vec();
    table.take(&indices)
}

pub fn write_sample(table: &Table, size: usize, seed: Option<u64>, path: &Path) -> Result<Table> {
    let sample = sample_rows(table, size, seed);
    write_csv(&sample, path)?;
    Ok(sample)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{Column, DataLoader, DataType, Value};
    use chrono::NaiveDate;
    use std::collections::HashSet;

    fn table() -> Table {
        Table::new(vec![
            Column::text("Title", vec![Some("Amélie"), Some("B"), None]),
            Column::integer("Runtime", vec![Some(90), Some(0), Some(45)]),
            Column::float("Score", vec![Some(7.5), None, Some(6.0)]),
            Column::date(
                "Release Date",
                vec![NaiveDate::from_ymd_opt(2019, 4, 2), None, NaiveDate::from_ymd_opt(2001, 12, 31)],
            ),
        ])
        .unwrap()
    }

    #[test]
    fn csv_reloads_with_types_and_nulls() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        write_csv(&table(), &path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("Title,Runtime,Score,Release Date"));
        assert!(text.contains("2019-04-02"));

        let reloaded = DataLoader::new().load_csv(&path).unwrap();
        assert_eq!(reloaded.height(), 3);
        assert_eq!(reloaded.value("Title", 0).unwrap(), Value::Text("Amélie".into()));
        assert_eq!(reloaded.column("Runtime").unwrap().dtype(), DataType::Integer);
        assert!(reloaded.value("Score", 1).unwrap().is_null());
        assert!(reloaded.value("Title", 2).unwrap().is_null());
    }

    #[test]
    fn json_uses_four_space_indent_and_literal_unicode() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.json");
        let value = serde_json::json!({"country": ["España"], "std": f64::NAN});
        write_json(&value, &path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("\n    \"country\": [\n        \"España\"\n    ]"));
        assert!(text.contains("\"std\": null"));
    }

    #[test]
    fn sample_is_clamped_and_unique() {
        let t = table();
        let sample = sample_rows(&t, 20, Some(7));
        assert_eq!(sample.height(), 3);

        let runtimes: HashSet<String> = (0..sample.height())
            .map(|i| format!("{:?}", sample.value("Runtime", i).unwrap()))
            .collect();
        assert_eq!(runtimes.len(), 3);
    }

    #[test]
    fn seeded_sample_is_reproducible() {
        let t = Table::new(vec![Column::integer("n", (0..50).map(Some).collect())]).unwrap();
        let a = sample_rows(&t, 10, Some(42));
        let b = sample_rows(&t, 10, Some(42));
        assert_eq!(a, b);
        assert_eq!(a.height(), 10);
    }
}
