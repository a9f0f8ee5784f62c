//! Validation outcome types
//!
//! Rule findings are data, never errors: a validator returns a
//! [`ValidationResult`] describing everything it found, and only store
//! round-trips can fail.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::record::EntityKind;

/// Finding severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Info,
}

/// A single field-level finding produced during one validation run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationFinding {
    pub field: String,
    pub message: String,
    pub severity: Severity,
}

impl ValidationFinding {
    pub fn new(field: &str, message: impl Into<String>, severity: Severity) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
            severity,
        }
    }
}

/// Outcome of validating one record
///
/// `score` is always within [0, 100]. A record with any error-severity
/// finding is never valid.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub score: u8,
    pub errors: Vec<ValidationFinding>,
    pub warnings: Vec<ValidationFinding>,
    pub suggestions: Vec<String>,
}

impl ValidationResult {
    /// Degenerate result for a record that could not be loaded
    pub fn not_found(kind: EntityKind, id: Uuid) -> Self {
        Self {
            is_valid: false,
            score: 0,
            errors: vec![ValidationFinding::new(
                "record",
                format!("{} record not found: {}", kind, id),
                Severity::Error,
            )],
            warnings: Vec::new(),
            suggestions: Vec::new(),
        }
    }

    /// Flattened error and warning messages, in severity order, for
    /// persistence onto the record row
    pub fn messages(&self) -> Vec<String> {
        self.errors
            .iter()
            .chain(self.warnings.iter())
            .map(|f| format!("{}: {}", f.field, f.message))
            .collect()
    }
}

/// Risk band used for dashboard display
///
/// Independent of the validity policy: a record can be invalid yet land in
/// the medium band, and vice versa.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskBand {
    Low,
    Medium,
    High,
}

impl RiskBand {
    /// score >= 80 -> low, 50..=79 -> medium, < 50 -> high
    pub fn from_score(score: u8) -> Self {
        if score >= 80 {
            RiskBand::Low
        } else if score >= 50 {
            RiskBand::Medium
        } else {
            RiskBand::High
        }
    }
}

/// Per-band record counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskCounts {
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

/// Summary statistics over one full validation run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValidationSummary {
    pub total: usize,
    pub valid_count: usize,
    pub invalid_count: usize,
    pub by_risk: RiskCounts,
    pub average_score: u8,
}

/// Append-only audit entry, one per full validation run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationLog {
    pub id: Uuid,
    pub module_name: String,
    pub table_name: String,
    pub validation_type: String,
    pub validation_status: String,
    pub errors: Vec<String>,
    pub suggestions: Vec<String>,
    pub validated_by: String,
    pub validated_at: DateTime<Utc>,
}

impl ValidationLog {
    /// Build the audit entry for a completed full-table run
    pub fn for_run(
        kind: EntityKind,
        summary: &ValidationSummary,
        errors: Vec<String>,
        suggestions: Vec<String>,
    ) -> Self {
        let validation_status = if summary.invalid_count == 0 {
            "passed".to_string()
        } else {
            "issues_found".to_string()
        };

        Self {
            id: Uuid::new_v4(),
            module_name: "vendio-dq".to_string(),
            table_name: kind.table_name().to_string(),
            validation_type: "full_table".to_string(),
            validation_status,
            errors,
            suggestions,
            validated_by: "system".to_string(),
            validated_at: Utc::now(),
        }
    }
}
