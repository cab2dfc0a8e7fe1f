//! Runtime field normalization.
//!
//! Free-text durations ("90 minutes", "> 2 hrs", "1-2 hour", "< 30 mins") are
//! converted to whole minutes by an ordered rule list: the first rule whose
//! pattern matches owns the value. Text matching no rule is coerced straight
//! to an integer, and anything still missing ends up as `0`.

use crate::data::table::{Column, ColumnData};
use crate::error::{Diagnostic, Diagnostics, Result};
use regex::Regex;

/// Minutes assigned to missing or unparsable runtimes.
pub const RUNTIME_FALLBACK: i64 = 0;

/// One conversion rule, tried in `RuntimeRule::ORDER`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuntimeRule {
    /// "90 minutes", "30 mins": first number, already minutes.
    Minutes,
    /// "1-2 hour": mean of both ends, times 60.
    HourRange,
    /// "2 hrs": first number times 60.
    Hours,
}

impl RuntimeRule {
    pub const ORDER: [RuntimeRule; 3] = [RuntimeRule::Minutes, RuntimeRule::HourRange, RuntimeRule::Hours];
}

/// Compiled patterns for the runtime rules.
#[derive(Debug, Clone)]
pub struct RuntimeNormalizer {
    minute_unit: Regex,
    hour_unit: Regex,
    first_number: Regex,
    range: Regex,
}

impl RuntimeNormalizer {
    pub fn new() -> Result<Self> {
        Ok(Self {
            minute_unit: Regex::new(r"\b(minutes|mins)\b")?,
            hour_unit: Regex::new(r"\b(hour|hrs)\b")?,
            first_number: Regex::new(r"(\d+)")?,
            range: Regex::new(r"(\d+)-?(\d+)?")?,
        })
    }

    /// Remove `>` / `<` markers and surrounding whitespace.
    pub fn strip_markers(text: &str) -> String {
        text.replace(['>', '<'], "").trim().to_string()
    }

    pub fn matches(&self, rule: RuntimeRule, text: &str) -> bool {
        match rule {
            RuntimeRule::Minutes => self.minute_unit.is_match(text),
            RuntimeRule::HourRange => self.hour_unit.is_match(text) && text.contains('-'),
            RuntimeRule::Hours => self.hour_unit.is_match(text) && !text.contains('-'),
        }
    }

    /// First rule that claims `text`, if any.
    pub fn rule_for(&self, text: &str) -> Option<RuntimeRule> {
        RuntimeRule::ORDER
            .into_iter()
            .find(|rule| self.matches(*rule, text))
    }

    /// Minutes produced by `rule`; `None` when the text carries no number.
    pub fn convert(&self, rule: RuntimeRule, text: &str) -> Option<i64> {
        match rule {
            RuntimeRule::Minutes => self.first_integer(text),
            RuntimeRule::HourRange => {
                let caps = self.range.captures(text)?;
                let low: f64 = caps.get(1)?.as_str().parse().ok()?;
                let high: f64 = caps
                    .get(2)
                    .and_then(|m| m.as_str().parse().ok())
                    .unwrap_or(0.0);
                Some(((low + high) / 2.0 * 60.0) as i64)
            }
            RuntimeRule::Hours => self.first_integer(text)?.checked_mul(60),
        }
    }

    fn first_integer(&self, text: &str) -> Option<i64> {
        self.first_number
            .captures(text)
            .and_then(|caps| caps.get(1))
            .and_then(|m| m.as_str().parse().ok())
    }

    /// Minutes for a single runtime value, before the zero fallback.
    pub fn parse(&self, raw: &str) -> Option<i64> {
        let text = Self::strip_markers(raw);
        match self.rule_for(&text) {
            Some(rule) => self.convert(rule, &text),
            None => text.parse::<i64>().ok(),
        }
    }

    /// Minutes for a single value, with missing/unparsable mapped to the
    /// fallback.
    pub fn minutes(&self, raw: Option<&str>) -> i64 {
        raw.and_then(|r| self.parse(r)).unwrap_or(RUNTIME_FALLBACK)
    }

    /// Normalize a whole column into Integer minutes with no nulls.
    ///
    /// Text that fails every rule and the integer coercion is counted in a
    /// `ParseFallback` diagnostic.
    pub fn normalize(&self, column: Column, diagnostics: &mut Diagnostics) -> Column {
        let name = column.name().to_string();
        let mut failures = 0usize;
        let minutes: Vec<Option<i64>> = match column.into_data() {
            ColumnData::Text(values) => values
                .iter()
                .map(|v| {
                    let parsed = v.as_deref().and_then(|raw| self.parse(raw));
                    if v.is_some() && parsed.is_none() {
                        failures += 1;
                    }
                    Some(parsed.unwrap_or(RUNTIME_FALLBACK))
                })
                .collect(),
            ColumnData::Integer(values) => values
                .into_iter()
                .map(|v| Some(v.unwrap_or(RUNTIME_FALLBACK)))
                .collect(),
            ColumnData::Float(values) => values
                .into_iter()
                .map(|v| Some(v.filter(|f| f.is_finite()).map_or(RUNTIME_FALLBACK, |f| f as i64)))
                .collect(),
            ColumnData::Date(values) => {
                failures = values.iter().filter(|v| v.is_some()).count();
                vec![Some(RUNTIME_FALLBACK); values.len()]
            }
        };

        if failures > 0 {
            diagnostics.push(Diagnostic::ParseFallback {
                column: name.clone(),
                count: failures,
            });
        }
        Column::new(name, ColumnData::Integer(minutes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::table::Value;

    fn normalizer() -> RuntimeNormalizer {
        RuntimeNormalizer::new().unwrap()
    }

    #[test]
    fn pure_minutes() {
        let n = normalizer();
        assert_eq!(n.minutes(Some("90 minutes")), 90);
        assert_eq!(n.minutes(Some("30 mins")), 30);
        assert_eq!(n.minutes(Some("< 30 minutes")), 30);
        assert_eq!(n.minutes(Some(">90 minutes")), 90);
    }

    #[test]
    fn pure_hours() {
        let n = normalizer();
        assert_eq!(n.minutes(Some("2 hrs")), 120);
        assert_eq!(n.minutes(Some("> 2 hrs")), 120);
        assert_eq!(n.minutes(Some("1 hour")), 60);
    }

    #[test]
    fn hour_ranges_average_and_truncate() {
        let n = normalizer();
        assert_eq!(n.minutes(Some("1-2 hour")), 90);
        assert_eq!(n.minutes(Some("2-3 hrs")), 150);
        // second end missing counts as zero
        assert_eq!(n.minutes(Some("3- hour")), 90);
    }

    #[test]
    fn minutes_rule_wins_over_hours() {
        let n = normalizer();
        let text = "1 hour 30 minutes";
        assert_eq!(n.rule_for(text), Some(RuntimeRule::Minutes));
        assert_eq!(n.minutes(Some(text)), 1);
    }

    #[test]
    fn unit_tokens_are_whole_words() {
        let n = normalizer();
        assert_eq!(n.rule_for("2 hours"), None);
        assert_eq!(n.rule_for("30 minutesish"), None);
        assert_eq!(n.minutes(Some("2 hours")), 0);
    }

    #[test]
    fn rules_in_isolation() {
        let n = normalizer();
        assert!(n.matches(RuntimeRule::Minutes, "45 mins"));
        assert!(!n.matches(RuntimeRule::Hours, "1-2 hour"));
        assert!(n.matches(RuntimeRule::HourRange, "1-2 hour"));
        assert_eq!(n.convert(RuntimeRule::HourRange, "1-2 hour"), Some(90));
        assert_eq!(n.convert(RuntimeRule::Hours, "hrs"), None);
        assert_eq!(n.convert(RuntimeRule::Minutes, "mins"), None);
    }

    #[test]
    fn passthrough_and_junk() {
        let n = normalizer();
        assert_eq!(n.minutes(Some("95")), 95);
        assert_eq!(n.minutes(Some(" 42 ")), 42);
        assert_eq!(n.minutes(Some("N/A")), 0);
        assert_eq!(n.minutes(Some("95.5")), 0);
        assert_eq!(n.minutes(None), 0);
        assert_eq!(RuntimeNormalizer::strip_markers(" >< 5 "), "5");
    }

    #[test]
    fn normalize_text_column() {
        let n = normalizer();
        let mut diags = Diagnostics::new();
        let col = Column::text(
            "Runtime",
            vec![Some("90 minutes"), Some("1-2 hour"), None, Some("N/A"), Some("2 hrs"), Some("75")],
        );
        let out = n.normalize(col, &mut diags);
        let expected = [90, 90, 0, 0, 120, 75];
        for (i, minutes) in expected.iter().enumerate() {
            assert_eq!(out.data().value(i), Value::Integer(*minutes), "row {}", i);
        }
        assert_eq!(out.null_count(), 0);
        assert_eq!(
            diags.events(),
            &[Diagnostic::ParseFallback { column: "Runtime".into(), count: 1 }]
        );
    }

    #[test]
    fn normalize_numeric_columns() {
        let n = normalizer();
        let mut diags = Diagnostics::new();
        let out = n.normalize(Column::integer("Runtime", vec![Some(80), None]), &mut diags);
        assert_eq!(out.data().value(1), Value::Integer(0));
        let out = n.normalize(Column::float("Runtime", vec![Some(99.9), Some(f64::NAN)]), &mut diags);
        assert_eq!(out.data().value(0), Value::Integer(99));
        assert_eq!(out.data().value(1), Value::Integer(0));
        assert!(diags.is_empty());
    }
}
