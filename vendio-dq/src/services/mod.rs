//! Service layer for vendio-dq
//!
//! Orchestrates validators, aggregation, bulk mutation, and CSV
//! import/export over the db modules.

pub mod aggregator;
pub mod bulk;
pub mod export;
pub mod import;
pub mod validation_run;

pub use aggregator::summarize;
pub use bulk::BulkPatch;
pub use import::ImportReport;
pub use validation_run::{RecordOutcome, RunReport};
