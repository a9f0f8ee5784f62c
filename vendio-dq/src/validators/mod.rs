//! Field validators
//!
//! One pure function per entity kind. A validator never touches the store:
//! given the same record and the same [`RuleContext`] it always produces the
//! same [`ValidationResult`].
//!
//! Scoring: each satisfied positive criterion adds a fixed point weight; the
//! weights of a kind sum to 100 and the final score is clamped to [0, 100].
//! Validity policy (uniform across kinds): no error-severity findings AND
//! score >= [`MIN_VALID_SCORE`].

pub mod customer;
pub mod deal;
pub mod test_data;
pub mod transaction;

pub use customer::validate_customer;
pub use deal::validate_deal;
pub use transaction::validate_transaction;

use chrono::{DateTime, NaiveDate, Utc};

use crate::models::{ValidationFinding, ValidationResult};

/// Minimum score a record needs to count as valid
pub const MIN_VALID_SCORE: u8 = 60;

/// Time reference and tunable thresholds shared by all rule checklists
///
/// Passed in rather than read from the clock inside the rules, so validation
/// stays a pure function of its inputs.
#[derive(Debug, Clone, Copy)]
pub struct RuleContext {
    pub now: DateTime<Utc>,
    pub today: NaiveDate,
    /// Days without contact before a customer counts as stale
    pub stale_contact_days: i64,
    /// Transaction amounts above this raise a plausibility warning
    pub amount_warning_threshold: f64,
}

impl RuleContext {
    /// Context at the current wall-clock time with default thresholds
    pub fn current() -> Self {
        Self::at(Utc::now())
    }

    /// Context frozen at a specific instant (tests, replays)
    pub fn at(now: DateTime<Utc>) -> Self {
        Self {
            now,
            today: now.date_naive(),
            stale_contact_days: 90,
            amount_warning_threshold: 500_000.0,
        }
    }
}

/// Assemble a result from accumulated findings and score points
pub(crate) fn build_result(
    points: u32,
    errors: Vec<ValidationFinding>,
    warnings: Vec<ValidationFinding>,
    suggestions: Vec<String>,
) -> ValidationResult {
    let score = points.min(100) as u8;
    ValidationResult {
        is_valid: errors.is_empty() && score >= MIN_VALID_SCORE,
        score,
        errors,
        warnings,
        suggestions,
    }
}
