//! Deal validation rules
//!
//! Checklist and score weights (sum 100):
//! - title length >= 3 ........... error / +25
//! - customer link present ....... error / +25
//! - value > 0 ................... suggestion / +20
//! - status non-empty ............ suggestion / +10
//! - close date consistent ....... warning / +10
//! - assignee present ............ suggestion / +10

use chrono::Duration;

use super::{build_result, RuleContext};
use crate::models::{Deal, Severity, ValidationFinding, ValidationResult};

const WEIGHT_TITLE: u32 = 25;
const WEIGHT_CUSTOMER: u32 = 25;
const WEIGHT_VALUE: u32 = 20;
const WEIGHT_STATUS: u32 = 10;
const WEIGHT_CLOSE_DATE: u32 = 10;
const WEIGHT_ASSIGNEE: u32 = 10;

/// Statuses that mean the deal is no longer open
const CLOSED_STATUSES: &[&str] = &["won", "lost", "closed", "ganho", "perdido", "fechado"];

/// Validate one deal record against the fixed checklist
pub fn validate_deal(deal: &Deal, ctx: &RuleContext) -> ValidationResult {
    let mut points = 0u32;
    let mut errors = Vec::new();
    let mut warnings = Vec::new();
    let mut suggestions = Vec::new();

    // Title
    if deal.title.trim().len() >= 3 {
        points += WEIGHT_TITLE;
    } else {
        errors.push(ValidationFinding::new(
            "title",
            "Title must have at least 3 characters",
            Severity::Error,
        ));
    }

    // Customer link: a deal without a customer cannot move through the
    // pipeline
    if deal.customer_id.is_some() {
        points += WEIGHT_CUSTOMER;
    } else {
        errors.push(ValidationFinding::new(
            "customer_id",
            "Deal must be linked to a customer",
            Severity::Error,
        ));
    }

    // Value
    match deal.value {
        Some(value) if value > 0.0 => points += WEIGHT_VALUE,
        _ => suggestions.push("Estimate a deal value for forecasting".to_string()),
    }

    // Status
    let status = deal.status.as_deref().map(str::trim).unwrap_or("");
    if !status.is_empty() {
        points += WEIGHT_STATUS;
    } else {
        suggestions.push("Set a pipeline status".to_string());
    }

    // Close date sanity relative to status
    let closed = CLOSED_STATUSES.contains(&status.to_lowercase().as_str());
    match deal.expected_close_on {
        Some(close) if closed && close > ctx.today => {
            warnings.push(ValidationFinding::new(
                "expected_close_on",
                "Closed deal has a close date in the future",
                Severity::Warning,
            ));
        }
        Some(close) if !closed && close > ctx.today + Duration::days(730) => {
            warnings.push(ValidationFinding::new(
                "expected_close_on",
                "Close date is more than two years out",
                Severity::Warning,
            ));
        }
        _ => points += WEIGHT_CLOSE_DATE,
    }

    // Assignee
    if deal
        .assignee
        .as_deref()
        .map(|a| !a.trim().is_empty())
        .unwrap_or(false)
    {
        points += WEIGHT_ASSIGNEE;
    } else {
        suggestions.push("Assign an owner to this deal".to_string());
    }

    build_result(points, errors, warnings, suggestions)
}
