//! Summary statistics over per-value frequency counts.

use serde::{Deserialize, Serialize};

/// Describes a distribution of repetition counts (one count per distinct value).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FrequencySummary {
    /// Number of distinct values.
    pub count: usize,
    pub mean: f64,
    /// Sample standard deviation (n - 1); 0 for fewer than two values.
    pub std: f64,
    pub min: f64,
    /// First quartile (25th percentile).
    pub q1: f64,
    pub median: f64,
    /// Third quartile (75th percentile).
    pub q3: f64,
    pub max: f64,
}

impl FrequencySummary {
    /// Summarize frequency counts. An empty input yields all zeros.
    pub fn from_counts(counts: impl IntoIterator<Item = usize>) -> Self {
        let mut values: Vec<f64> = counts.into_iter().map(|c| c as f64).collect();
        if values.is_empty() {
            return Self::default();
        }
        values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

        let n = values.len();
        let mean = values.iter().sum::<f64>() / n as f64;
        let std = if n < 2 {
            0.0
        } else {
            let ss: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
            (ss / (n - 1) as f64).sqrt()
        };

        Self {
            count: n,
            mean,
            std,
            min: values[0],
            q1: percentile(&values, 0.25),
            median: percentile(&values, 0.50),
            q3: percentile(&values, 0.75),
            max: values[n - 1],
        }
    }
}

/// Linear-interpolated percentile of sorted, non-empty values.
fn percentile(sorted: &[f64], p: f64) -> f64 {
    let rank = p * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    let weight = rank - lower as f64;
    sorted[lower] + (sorted[upper] - sorted[lower]) * weight
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_matches_describe() {
        let summary = FrequencySummary::from_counts([1, 2, 3, 4]);
        assert_eq!(summary.count, 4);
        assert_eq!(summary.mean, 2.5);
        assert!((summary.std - 1.290_994).abs() < 1e-6);
        assert_eq!(summary.min, 1.0);
        assert_eq!(summary.q1, 1.75);
        assert_eq!(summary.median, 2.5);
        assert_eq!(summary.q3, 3.25);
        assert_eq!(summary.max, 4.0);
    }

    #[test]
    fn test_single_value() {
        let summary = FrequencySummary::from_counts([5]);
        assert_eq!(summary.std, 0.0);
        assert_eq!(summary.median, 5.0);
    }

    #[test]
    fn test_empty() {
        assert_eq!(FrequencySummary::from_counts(Vec::new()), FrequencySummary::default());
    }
}
