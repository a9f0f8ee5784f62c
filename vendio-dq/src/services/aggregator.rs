//! Summary aggregation over per-record validation results

use crate::models::{RiskBand, RiskCounts, ValidationResult, ValidationSummary};

/// Reduce a run's per-record results into summary statistics
///
/// Empty input yields the all-zero summary.
pub fn summarize(results: &[ValidationResult]) -> ValidationSummary {
    if results.is_empty() {
        return ValidationSummary::default();
    }

    let total = results.len();
    let valid_count = results.iter().filter(|r| r.is_valid).count();

    let mut by_risk = RiskCounts::default();
    let mut score_sum = 0u32;
    for result in results {
        score_sum += result.score as u32;
        match RiskBand::from_score(result.score) {
            RiskBand::Low => by_risk.low += 1,
            RiskBand::Medium => by_risk.medium += 1,
            RiskBand::High => by_risk.high += 1,
        }
    }

    ValidationSummary {
        total,
        valid_count,
        invalid_count: total - valid_count,
        by_risk,
        average_score: (score_sum as f64 / total as f64).round() as u8,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(score: u8, is_valid: bool) -> ValidationResult {
        ValidationResult {
            is_valid,
            score,
            errors: Vec::new(),
            warnings: Vec::new(),
            suggestions: Vec::new(),
        }
    }

    #[test]
    fn test_empty_input_yields_zero_summary() {
        let summary = summarize(&[]);
        assert_eq!(summary.total, 0);
        assert_eq!(summary.valid_count, 0);
        assert_eq!(summary.invalid_count, 0);
        assert_eq!(summary.average_score, 0);
        assert_eq!(summary.by_risk, RiskCounts::default());
    }

    #[test]
    fn test_counts_and_average() {
        let results = vec![
            result(100, true),
            result(75, true),
            result(30, false),
        ];

        let summary = summarize(&results);
        assert_eq!(summary.total, 3);
        assert_eq!(summary.valid_count, 2);
        assert_eq!(summary.invalid_count, 1);
        // (100 + 75 + 30) / 3 = 68.33 -> 68
        assert_eq!(summary.average_score, 68);
    }

    #[test]
    fn test_risk_buckets_independent_of_validity() {
        // A record can fail the validity policy yet sit in the medium band
        let results = vec![result(85, true), result(65, false), result(10, false)];

        let summary = summarize(&results);
        assert_eq!(summary.by_risk.low, 1);
        assert_eq!(summary.by_risk.medium, 1);
        assert_eq!(summary.by_risk.high, 1);
    }
}
