//! Data models for vendio-dq (Data Quality service)

pub mod bulk_session;
pub mod record;
pub mod validation;

pub use bulk_session::{BulkMode, BulkOperation, BulkOutcome, BulkSession, BulkState};
pub use record::{
    Customer, CustomerPatch, Deal, DealPatch, EntityKind, Transaction, TransactionPatch, TxType,
};
pub use validation::{
    RiskBand, RiskCounts, Severity, ValidationFinding, ValidationLog, ValidationResult,
    ValidationSummary,
};
