//! Transaction validation rules
//!
//! Checklist and score weights (sum 100):
//! - amount > 0 .................. error / +25 (warning above the threshold)
//! - date not in the future ...... warning / +25
//! - title length >= 3 ........... error / +20
//! - category non-empty .......... error / +15
//! - type present ................ +15 (constrained by the enum)
//! - test-data keyword ........... info, no score effect

use super::{build_result, test_data::looks_like_test_data, RuleContext};
use crate::models::{Severity, Transaction, ValidationFinding, ValidationResult};

const WEIGHT_AMOUNT: u32 = 25;
const WEIGHT_DATE: u32 = 25;
const WEIGHT_TITLE: u32 = 20;
const WEIGHT_CATEGORY: u32 = 15;
const WEIGHT_TYPE: u32 = 15;

/// Validate one transaction record against the fixed checklist
pub fn validate_transaction(tx: &Transaction, ctx: &RuleContext) -> ValidationResult {
    let mut points = 0u32;
    let mut errors = Vec::new();
    let mut warnings = Vec::new();
    let mut suggestions = Vec::new();

    // Amount: zero/negative blocks regardless of anything else
    if tx.amount > 0.0 {
        points += WEIGHT_AMOUNT;
        if tx.amount > ctx.amount_warning_threshold {
            warnings.push(ValidationFinding::new(
                "amount",
                format!(
                    "Amount {:.2} exceeds the plausibility threshold {:.0}",
                    tx.amount, ctx.amount_warning_threshold
                ),
                Severity::Warning,
            ));
        }
    } else {
        errors.push(ValidationFinding::new(
            "amount",
            "Amount must be greater than zero",
            Severity::Error,
        ));
    }

    // Date: presence and parseability are guaranteed by the type; a future
    // date is suspicious but not blocking
    if tx.occurred_on <= ctx.today {
        points += WEIGHT_DATE;
    } else {
        warnings.push(ValidationFinding::new(
            "occurred_on",
            "Transaction date is in the future",
            Severity::Warning,
        ));
    }

    // Title
    if tx.title.trim().len() >= 3 {
        points += WEIGHT_TITLE;
    } else {
        errors.push(ValidationFinding::new(
            "title",
            "Title must have at least 3 characters",
            Severity::Error,
        ));
    }

    // Category
    if !tx.category.trim().is_empty() {
        points += WEIGHT_CATEGORY;
    } else {
        errors.push(ValidationFinding::new(
            "category",
            "Category is required",
            Severity::Error,
        ));
    }

    // Type is always one of receita/despesa once parsed
    points += WEIGHT_TYPE;

    if looks_like_test_data(&tx.title) {
        suggestions.push("Title looks like test data; review before reporting".to_string());
        warnings.push(ValidationFinding::new(
            "title",
            "Record looks like test data",
            Severity::Info,
        ));
    }

    build_result(points, errors, warnings, suggestions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TxType;
    use chrono::{NaiveDate, TimeZone, Utc};
    use uuid::Uuid;

    fn ctx() -> RuleContext {
        RuleContext::at(Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap())
    }

    fn sale(amount: f64) -> Transaction {
        Transaction {
            id: Uuid::new_v4(),
            title: "Venda Produto".to_string(),
            description: None,
            category: "Vendas".to_string(),
            tx_type: TxType::Receita,
            amount,
            occurred_on: NaiveDate::from_ymd_opt(2024, 5, 15).unwrap(),
            status: Some("pago".to_string()),
            payment_method: Some("PIX".to_string()),
            source: None,
            customer_name: None,
            data_quality_score: None,
            validation_errors: Vec::new(),
            created_at: ctx().now,
        }
    }

    #[test]
    fn test_complete_transaction_scores_100() {
        let result = validate_transaction(&sale(1500.0), &ctx());
        assert_eq!(result.score, 100);
        assert!(result.is_valid);
    }

    #[test]
    fn test_nonpositive_amount_always_errors() {
        for amount in [0.0, -1.0, -1500.50] {
            let result = validate_transaction(&sale(amount), &ctx());
            assert!(
                result.errors.iter().any(|f| f.field == "amount"),
                "amount {} must produce an error finding",
                amount
            );
            assert!(!result.is_valid);
        }
    }

    #[test]
    fn test_nonpositive_amount_errors_even_when_rest_is_broken() {
        let mut tx = sale(-10.0);
        tx.title = String::new();
        tx.category = String::new();

        let result = validate_transaction(&tx, &ctx());
        assert!(result.errors.iter().any(|f| f.field == "amount"));
    }

    #[test]
    fn test_huge_amount_warns_but_passes() {
        let result = validate_transaction(&sale(750_000.0), &ctx());
        assert!(result.is_valid);
        assert!(result
            .warnings
            .iter()
            .any(|f| f.field == "amount" && f.severity == Severity::Warning));
    }

    #[test]
    fn test_future_date_warns() {
        let mut tx = sale(100.0);
        tx.occurred_on = NaiveDate::from_ymd_opt(2024, 7, 1).unwrap();

        let result = validate_transaction(&tx, &ctx());
        assert!(result.warnings.iter().any(|f| f.field == "occurred_on"));
        assert_eq!(result.score, 75);
        // Still valid under the uniform policy: no errors, score above cutoff
        assert!(result.is_valid);
    }

    #[test]
    fn test_short_title_is_error() {
        let mut tx = sale(100.0);
        tx.title = "ab".to_string();

        let result = validate_transaction(&tx, &ctx());
        assert!(!result.is_valid);
        assert!(result.errors.iter().any(|f| f.field == "title"));
    }

    #[test]
    fn test_empty_category_is_error() {
        let mut tx = sale(100.0);
        tx.category = "  ".to_string();

        let result = validate_transaction(&tx, &ctx());
        assert!(!result.is_valid);
        assert!(result.errors.iter().any(|f| f.field == "category"));
    }

    #[test]
    fn test_test_data_title_is_info_only() {
        let mut tx = sale(100.0);
        tx.title = "Teste de venda".to_string();

        let result = validate_transaction(&tx, &ctx());
        assert!(result.is_valid);
        assert!(result
            .warnings
            .iter()
            .any(|f| f.severity == Severity::Info));
    }
}
