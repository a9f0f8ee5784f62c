//! Customer validation rules
//!
//! Checklist and score weights (sum 100):
//! - name length >= 2 ............ error / +25
//! - email format, when present .. error / +20 (absent email is a suggestion)
//! - phone with >= 10 digits ..... suggestion / +15
//! - address + city + state ...... suggestion / +15
//! - contacted recently .......... warning / +25
//! - test-data keyword ........... warning, no score effect

use chrono::Duration;
use once_cell::sync::Lazy;
use regex::Regex;

use super::{build_result, test_data::looks_like_test_data, RuleContext};
use crate::models::{Customer, Severity, ValidationFinding, ValidationResult};

const WEIGHT_NAME: u32 = 25;
const WEIGHT_EMAIL: u32 = 20;
const WEIGHT_PHONE: u32 = 15;
const WEIGHT_ADDRESS: u32 = 15;
const WEIGHT_RECENT_CONTACT: u32 = 25;

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email regex is valid"));

/// Validate one customer record against the fixed checklist
pub fn validate_customer(customer: &Customer, ctx: &RuleContext) -> ValidationResult {
    let mut points = 0u32;
    let mut errors = Vec::new();
    let mut warnings = Vec::new();
    let mut suggestions = Vec::new();

    // Name
    if customer.name.trim().len() >= 2 {
        points += WEIGHT_NAME;
    } else {
        errors.push(ValidationFinding::new(
            "name",
            "Name must have at least 2 characters",
            Severity::Error,
        ));
    }

    // Email: invalid blocks, absent only suggests
    match customer.email.as_deref().map(str::trim) {
        Some(email) if !email.is_empty() => {
            if EMAIL_RE.is_match(email) {
                points += WEIGHT_EMAIL;
            } else {
                errors.push(ValidationFinding::new(
                    "email",
                    "Email address is not valid",
                    Severity::Error,
                ));
            }
        }
        _ => suggestions.push("Add an email address to reach this customer".to_string()),
    }

    // Phone
    let phone_digits = customer
        .phone
        .as_deref()
        .map(|p| p.chars().filter(char::is_ascii_digit).count())
        .unwrap_or(0);
    if phone_digits >= 10 {
        points += WEIGHT_PHONE;
    } else {
        suggestions.push("Add a phone number with area code".to_string());
    }

    // Address block: all three parts or nothing
    let has_address = [&customer.address, &customer.city, &customer.state]
        .iter()
        .all(|part| part.as_deref().map(|s| !s.trim().is_empty()).unwrap_or(false));
    if has_address {
        points += WEIGHT_ADDRESS;
    } else {
        suggestions.push("Complete the address (street, city, state)".to_string());
    }

    // Contact recency
    match customer.last_contact_at {
        Some(last_contact)
            if ctx.now - last_contact <= Duration::days(ctx.stale_contact_days) =>
        {
            points += WEIGHT_RECENT_CONTACT;
        }
        Some(_) => {
            warnings.push(ValidationFinding::new(
                "last_contact_at",
                format!("No contact in over {} days", ctx.stale_contact_days),
                Severity::Warning,
            ));
        }
        None => {
            warnings.push(ValidationFinding::new(
                "last_contact_at",
                "Customer has never been contacted",
                Severity::Warning,
            ));
        }
    }

    // Test data is flagged but never blocks
    let email_text = customer.email.as_deref().unwrap_or("");
    if looks_like_test_data(&customer.name) || looks_like_test_data(email_text) {
        warnings.push(ValidationFinding::new(
            "name",
            "Record looks like test data",
            Severity::Warning,
        ));
    }

    build_result(points, errors, warnings, suggestions)
}
