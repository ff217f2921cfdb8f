//! Display formatting shared by the API, the chart specs, and the exported documents.

use serde::Serialize;

const UNITS: [(f64, &str); 3] = [(1e3, "K"), (1e6, "M"), (1e9, "B")];

/// Abbreviate a count with a K/M/B suffix.
///
/// Values below 1000 are printed as-is. Larger values get one decimal with a
/// trailing `.0` removed, so `1_500` becomes `1.5K` and `2_000_000` becomes
/// `2M`. A value that rounds up to 1000 of its unit is promoted to the next
/// unit (`999_999_999` prints as `1B`, not `1000M`).
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn format_number(value: i64) -> String {
    let sign = if value < 0 { "-" } else { "" };
    let abs = value.unsigned_abs() as f64;
    if abs < 1e3 {
        return value.to_string();
    }

    let mut idx = if abs >= 1e9 {
        2
    } else if abs >= 1e6 {
        1
    } else {
        0
    };
    let mut rounded = round_one(abs / UNITS[idx].0);
    if rounded >= 1e3 && idx + 1 < UNITS.len() {
        idx += 1;
        rounded = round_one(abs / UNITS[idx].0);
    }

    format!("{sign}{}{}", trim_zero_decimal(rounded), UNITS[idx].1)
}

/// Format a value that is already a percentage (`12.5` means 12.5%).
///
/// Precision grows as the magnitude shrinks so that small non-zero rates never
/// print as `0.0%`: below 1 gets three decimals, below 10 gets two, anything
/// else gets one. Exactly zero (and non-finite input) prints as `0%`.
#[must_use]
pub fn format_percent(percent: f64) -> String {
    if !percent.is_finite() || percent.abs() < f64::EPSILON {
        return "0%".to_string();
    }
    let abs = percent.abs();
    let decimals = if abs < 1.0 {
        3
    } else if abs < 10.0 {
        2
    } else {
        1
    };
    format!("{percent:.decimals$}%")
}

/// `part / total` as a percentage, returning 0 when `total` is 0.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn share_percent(part: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        part as f64 / total as f64 * 100.0
    }
}

fn round_one(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

fn trim_zero_decimal(v: f64) -> String {
    let s = format!("{v:.1}");
    match s.strip_suffix(".0") {
        Some(trimmed) => trimmed.to_string(),
        None => s,
    }
}

/// Comment sentiment counts with zero-safe percentage helpers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SentimentBreakdown {
    pub positive: u64,
    pub neutral: u64,
    pub negative: u64,
}

impl SentimentBreakdown {
    /// Build from stored counts; negative values are treated as 0.
    #[must_use]
    pub fn from_counts(positive: i32, neutral: i32, negative: i32) -> Self {
        let clamp = |v: i32| u64::try_from(v).unwrap_or(0);
        Self {
            positive: clamp(positive),
            neutral: clamp(neutral),
            negative: clamp(negative),
        }
    }

    #[must_use]
    pub fn total(&self) -> u64 {
        self.positive + self.neutral + self.negative
    }

    #[must_use]
    pub fn positive_percent(&self) -> f64 {
        share_percent(self.positive, self.total())
    }

    #[must_use]
    pub fn neutral_percent(&self) -> f64 {
        share_percent(self.neutral, self.total())
    }

    #[must_use]
    pub fn negative_percent(&self) -> f64 {
        share_percent(self.negative, self.total())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_number_below_thousand_is_verbatim() {
        assert_eq!(format_number(0), "0");
        assert_eq!(format_number(950), "950");
        assert_eq!(format_number(999), "999");
    }

    #[test]
    fn format_number_thousands() {
        assert_eq!(format_number(1_000), "1K");
        assert_eq!(format_number(1_500), "1.5K");
        assert_eq!(format_number(12_345), "12.3K");
    }

    #[test]
    fn format_number_millions_and_billions() {
        assert_eq!(format_number(2_000_000), "2M");
        assert_eq!(format_number(3_450_000), "3.5M");
        assert_eq!(format_number(1_000_000_000), "1B");
    }

    #[test]
    fn format_number_promotes_when_rounding_reaches_next_unit() {
        assert_eq!(format_number(999_999), "1M");
        assert_eq!(format_number(999_999_999), "1B");
    }

    #[test]
    fn format_number_keeps_sign() {
        assert_eq!(format_number(-1_500), "-1.5K");
        assert_eq!(format_number(-42), "-42");
    }

    #[test]
    fn format_percent_precision_follows_magnitude() {
        assert_eq!(format_percent(0.123_4), "0.123%");
        assert_eq!(format_percent(4.567), "4.57%");
        assert_eq!(format_percent(60.0), "60.0%");
        assert_eq!(format_percent(0.0), "0%");
        assert_eq!(format_percent(f64::NAN), "0%");
    }

    #[test]
    fn sentiment_percentages_sum_to_hundred() {
        let s = SentimentBreakdown::from_counts(60, 25, 15);
        assert_eq!(s.total(), 100);
        assert_eq!(format_percent(s.positive_percent()), "60.0%");
        assert_eq!(format_percent(s.neutral_percent()), "25.0%");
        assert_eq!(format_percent(s.negative_percent()), "15.0%");
    }

    #[test]
    fn sentiment_percentages_zero_total_are_zero() {
        let s = SentimentBreakdown::from_counts(0, 0, 0);
        assert_eq!(s.positive_percent(), 0.0);
        assert!(!s.neutral_percent().is_nan());
        assert_eq!(format_percent(s.negative_percent()), "0%");
    }

    #[test]
    fn sentiment_negative_counts_clamp_to_zero() {
        let s = SentimentBreakdown::from_counts(-3, 2, 0);
        assert_eq!(s.positive, 0);
        assert_eq!(s.total(), 2);
    }
}
