//! Descriptive statistics of a price series

use serde::{Deserialize, Serialize};
use std::fmt;

/// Count, mean, sample standard deviation, extremes and quartiles
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeriesSummary {
    pub count: usize,
    pub mean: f64,
    /// Sample standard deviation (n - 1 denominator)
    pub std: f64,
    pub min: f64,
    pub q25: f64,
    pub median: f64,
    pub q75: f64,
    pub max: f64,
}

impl SeriesSummary {
    /// Summarize the non-NaN values. Returns `None` if there are none.
    pub fn describe(values: &[f64]) -> Option<Self> {
        let mut sorted: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
        if sorted.is_empty() {
            return None;
        }
        sorted.sort_by(f64::total_cmp);

        let count = sorted.len();
        let mean = sorted.iter().sum::<f64>() / count as f64;
        let std = if count > 1 {
            let ss: f64 = sorted.iter().map(|v| (v - mean).powi(2)).sum();
            (ss / (count - 1) as f64).sqrt()
        } else {
            f64::NAN
        };

        Some(Self {
            count,
            mean,
            std,
            min: sorted[0],
            q25: percentile(&sorted, 0.25),
            median: percentile(&sorted, 0.5),
            q75: percentile(&sorted, 0.75),
            max: sorted[count - 1],
        })
    }
}

/// Linear-interpolated quantile of sorted, non-empty data
fn percentile(sorted: &[f64], q: f64) -> f64 {
    let rank = q * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    let frac = rank - lower as f64;
    sorted[lower] + (sorted[upper] - sorted[lower]) * frac
}

impl fmt::Display for SeriesSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "count  {:>14}", self.count)?;
        writeln!(f, "mean   {:>14.4}", self.mean)?;
        writeln!(f, "std    {:>14.4}", self.std)?;
        writeln!(f, "min    {:>14.4}", self.min)?;
        writeln!(f, "25%    {:>14.4}", self.q25)?;
        writeln!(f, "50%    {:>14.4}", self.median)?;
        writeln!(f, "75%    {:>14.4}", self.q75)?;
        write!(f, "max    {:>14.4}", self.max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_describe() {
        let summary = SeriesSummary::describe(&[4.0, 1.0, 3.0, 2.0]).unwrap();

        assert_eq!(summary.count, 4);
        assert_abs_diff_eq!(summary.mean, 2.5, epsilon = 1e-12);
        // sample variance 5/3
        assert_abs_diff_eq!(summary.std, (5.0f64 / 3.0).sqrt(), epsilon = 1e-12);
        assert_eq!(summary.min, 1.0);
        assert_abs_diff_eq!(summary.q25, 1.75, epsilon = 1e-12);
        assert_abs_diff_eq!(summary.median, 2.5, epsilon = 1e-12);
        assert_abs_diff_eq!(summary.q75, 3.25, epsilon = 1e-12);
        assert_eq!(summary.max, 4.0);
    }

    #[test]
    fn test_nan_ignored() {
        let summary = SeriesSummary::describe(&[f64::NAN, 2.0, 2.0]).unwrap();
        assert_eq!(summary.count, 2);
        assert_eq!(summary.std, 0.0);
    }

    #[test]
    fn test_empty() {
        assert!(SeriesSummary::describe(&[]).is_none());
        assert!(SeriesSummary::describe(&[f64::NAN]).is_none());
    }

    #[test]
    fn test_display_lists_quartiles() {
        let text = SeriesSummary::describe(&[1.0, 2.0, 3.0]).unwrap().to_string();
        assert!(text.contains("25%"));
        assert!(text.lines().count() == 8);
    }
}
