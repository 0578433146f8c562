use serde::{Deserialize, Serialize};
use std::fmt;

const BILLION: f64 = 1_000_000_000.0;
const MILLION: f64 = 1_000_000.0;
const THOUSAND: f64 = 1_000.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sign {
    Positive,
    Negative,
    Neutral,
}

impl Sign {
    pub fn of(value: f64) -> Self {
        if value > 0.0 {
            Sign::Positive
        } else if value < 0.0 {
            Sign::Negative
        } else {
            Sign::Neutral
        }
    }

    /// Color keyword dashboards conventionally bind to each sign.
    pub fn color_hint(&self) -> &'static str {
        match self {
            Sign::Positive => "green",
            Sign::Negative => "red",
            Sign::Neutral => "gray",
        }
    }
}

/// Change between the last two observations of a series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodDelta {
    pub latest: Option<f64>,
    pub previous: Option<f64>,
    pub absolute_change: f64,
    pub percent_change: f64,
    pub magnitude: String,
    pub sign: Sign,
}

impl PeriodDelta {
    /// Computes the delta over the non-missing values of `series`, in order.
    pub fn compute(series: &[Option<f64>]) -> Self {
        let observed: Vec<f64> = series.iter().flatten().copied().collect();

        let (previous, latest) = match observed.as_slice() {
            [.., previous, latest] => (*previous, *latest),
            _ => {
                return Self {
                    latest: observed.last().copied(),
                    previous: None,
                    absolute_change: 0.0,
                    percent_change: 0.0,
                    magnitude: "0".to_string(),
                    sign: Sign::Neutral,
                }
            }
        };

        let absolute_change = latest - previous;
        let percent_change = if previous != 0.0 {
            absolute_change / previous * 100.0
        } else {
            0.0
        };

        Self {
            latest: Some(latest),
            previous: Some(previous),
            absolute_change,
            percent_change,
            magnitude: format_magnitude(absolute_change),
            sign: Sign::of(absolute_change),
        }
    }

    /// Whether both a latest and a previous observation exist.
    pub fn is_defined(&self) -> bool {
        self.previous.is_some()
    }

    pub fn percent_string(&self) -> String {
        format!("{:+.1}%", self.percent_change)
    }
}

impl fmt::Display for PeriodDelta {
    /// `[+1.2M +3.4%]`, or `0` when there is nothing to compare.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.is_defined() {
            return write!(f, "{}", self.magnitude);
        }
        write!(f, "[{} {}]", self.magnitude, self.percent_string())
    }
}

pub fn compute_delta(series: &[Option<f64>]) -> PeriodDelta {
    PeriodDelta::compute(series)
}

/// Formats `change` with an explicit sign, scaled to the B/M/K tier of `|change|`.
///
/// Below one thousand the change is rounded to an integer with no suffix.
pub fn format_magnitude(change: f64) -> String {
    // Avoid "-0" for an exact zero.
    let change = if change == 0.0 { 0.0 } else { change };
    let scale = change.abs();

    if scale >= BILLION {
        format!("{:+.1}B", change / BILLION)
    } else if scale >= MILLION {
        format!("{:+.1}M", change / MILLION)
    } else if scale >= THOUSAND {
        format!("{:+.1}K", change / THOUSAND)
    } else {
        format!("{:+.0}", change)
    }
}

/// Rounds to a whole number and groups thousands with commas: `1234567.4` -> `"1,234,567"`.
pub fn format_grouped(value: f64) -> String {
    let rounded = value.round();
    let digits = format!("{:.0}", rounded.abs());

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    if rounded < 0.0 {
        format!("-{}", grouped)
    } else {
        grouped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_increase() {
        let delta = PeriodDelta::compute(&[Some(100.0), Some(150.0)]);
        assert_eq!(delta.latest, Some(150.0));
        assert_eq!(delta.previous, Some(100.0));
        assert!((delta.absolute_change - 50.0).abs() < 1e-12);
        assert!((delta.percent_change - 50.0).abs() < 1e-12);
        assert_eq!(delta.sign, Sign::Positive);
        assert_eq!(delta.magnitude, "+50");
        assert_eq!(delta.to_string(), "[+50 +50.0%]");
    }

    #[test]
    fn test_tier_follows_the_change_not_the_level() {
        let delta = PeriodDelta::compute(&[Some(2_000_000_000.0), Some(2_500_000_000.0)]);
        assert_eq!(delta.magnitude, "+500.0M");
        assert!((delta.percent_change - 25.0).abs() < 1e-9);

        let delta = PeriodDelta::compute(&[Some(1_000_000_000.0), Some(2_200_000_000.0)]);
        assert_eq!(delta.magnitude, "+1.2B");
    }

    #[test]
    fn test_small_change_on_large_balance_stays_visible() {
        let delta = PeriodDelta::compute(&[Some(1_000_000.0), Some(1_000_400.0)]);
        assert_eq!(delta.sign, Sign::Positive);
        assert_eq!(delta.magnitude, "+400");

        let delta = PeriodDelta::compute(&[Some(999.0), Some(1_001.0)]);
        assert_eq!(delta.magnitude, "+2");
        assert_eq!(delta.to_string(), "[+2 +0.2%]");
    }

    #[test]
    fn test_tiers_and_negative_changes() {
        assert_eq!(format_magnitude(-1_500_000.0), "-1.5M");
        assert_eq!(format_magnitude(2_500.0), "+2.5K");
        assert_eq!(format_magnitude(1_000.0), "+1.0K");
        assert_eq!(format_magnitude(-999.0), "-999");
        assert_eq!(format_magnitude(0.0), "+0");
        assert_eq!(format_magnitude(-0.0), "+0");
        assert_eq!(format_magnitude(3_000_000_000.0), "+3.0B");
    }

    #[test]
    fn test_missing_values_are_skipped() {
        let delta = PeriodDelta::compute(&[Some(10.0), None, Some(8.0), None]);
        assert_eq!(delta.previous, Some(10.0));
        assert_eq!(delta.latest, Some(8.0));
        assert_eq!(delta.sign, Sign::Negative);
        assert_eq!(delta.magnitude, "-2");
        assert_eq!(delta.percent_string(), "-20.0%");
    }

    #[test]
    fn test_fewer_than_two_values_is_neutral() {
        let single = PeriodDelta::compute(&[None, Some(42.0)]);
        assert_eq!(single.latest, Some(42.0));
        assert_eq!(single.previous, None);
        assert_eq!(single.absolute_change, 0.0);
        assert_eq!(single.percent_change, 0.0);
        assert_eq!(single.sign, Sign::Neutral);
        assert_eq!(single.magnitude, "0");
        assert_eq!(single.to_string(), "0");

        let empty = PeriodDelta::compute(&[]);
        assert_eq!(empty.latest, None);
        assert_eq!(empty.sign, Sign::Neutral);
    }

    #[test]
    fn test_zero_previous_gives_zero_percent() {
        let delta = PeriodDelta::compute(&[Some(0.0), Some(500.0)]);
        assert_eq!(delta.percent_change, 0.0);
        assert_eq!(delta.sign, Sign::Positive);
    }

    #[test]
    fn test_unchanged_is_neutral() {
        let delta = PeriodDelta::compute(&[Some(7.0), Some(7.0)]);
        assert_eq!(delta.sign, Sign::Neutral);
        assert_eq!(delta.sign.color_hint(), "gray");
        assert_eq!(delta.magnitude, "+0");
    }

    #[test]
    fn test_format_grouped() {
        assert_eq!(format_grouped(0.0), "0");
        assert_eq!(format_grouped(999.4), "999");
        assert_eq!(format_grouped(1_000.0), "1,000");
        assert_eq!(format_grouped(1_234_567.4), "1,234,567");
        assert_eq!(format_grouped(-98_765.0), "-98,765");
    }
}
