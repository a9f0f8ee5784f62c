//! Bulk operation session state machine
//!
//! A bulk run progresses RUNNING → COMPLETED | FAILED, or starts and ends at
//! REJECTED when the request is refused before the first write. Progress
//! moves monotonically `0 → processed/total → 1`; an aborted run keeps the
//! fraction it reached.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::record::EntityKind;

/// Bulk session state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum BulkState {
    /// Writes in flight
    Running,
    /// Every selected id was written
    Completed,
    /// Aborted mid-run; earlier writes remain applied
    Failed,
    /// Refused before the first write
    Rejected,
}

/// Kind of bulk operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BulkOperation {
    Update,
    Delete,
}

/// Execution strategy, selected via the `dq_bulk_mode` setting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BulkMode {
    /// One write per id in selection order, per-item progress, abort on first
    /// failure with no rollback
    Sequential,
    /// Single transaction, all-or-nothing, no per-item progress
    Transactional,
}

impl BulkMode {
    pub fn from_setting(value: &str) -> BulkMode {
        match value {
            "transactional" => BulkMode::Transactional,
            _ => BulkMode::Sequential,
        }
    }
}

/// Typed terminal result of a bulk run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum BulkOutcome {
    FullyApplied {
        applied: usize,
    },
    /// Ids before `failed_id` stay applied; ids after it were never issued
    PartiallyApplied {
        applied: usize,
        failed_id: Uuid,
    },
    Rejected {
        reason: String,
    },
}

/// Bulk operation session, persisted and polled over HTTP
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkSession {
    pub session_id: Uuid,
    pub state: BulkState,
    pub operation: BulkOperation,
    pub kind: EntityKind,
    /// Ids written so far
    pub processed: usize,
    /// Size of the selection
    pub total: usize,
    /// processed/total in [0, 1]
    pub fraction: f64,
    pub outcome: Option<BulkOutcome>,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
}

impl BulkSession {
    /// Create a running session for a selection of `total` ids
    pub fn new(operation: BulkOperation, kind: EntityKind, total: usize) -> Self {
        Self {
            session_id: Uuid::new_v4(),
            state: BulkState::Running,
            operation,
            kind,
            processed: 0,
            total,
            fraction: 0.0,
            outcome: None,
            started_at: Utc::now(),
            ended_at: None,
        }
    }

    /// Create a session already refused before the first write
    pub fn rejected(operation: BulkOperation, kind: EntityKind, reason: impl Into<String>) -> Self {
        let mut session = Self::new(operation, kind, 0);
        let reason = reason.into();
        session.state = BulkState::Rejected;
        session.outcome = Some(BulkOutcome::Rejected { reason });
        session.ended_at = Some(Utc::now());
        session
    }

    /// Record one completed id
    pub fn advance(&mut self) {
        self.processed += 1;
        self.fraction = if self.total > 0 {
            self.processed as f64 / self.total as f64
        } else {
            0.0
        };
    }

    /// Transition to COMPLETED with the given outcome
    pub fn complete(&mut self, outcome: BulkOutcome) {
        self.state = BulkState::Completed;
        self.outcome = Some(outcome);
        self.ended_at = Some(Utc::now());
    }

    /// Transition to FAILED with the given outcome
    pub fn fail(&mut self, outcome: BulkOutcome) {
        self.state = BulkState::Failed;
        self.outcome = Some(outcome);
        self.ended_at = Some(Utc::now());
    }

    /// True once the session can no longer change
    pub fn is_terminal(&self) -> bool {
        !matches!(self.state, BulkState::Running)
    }
}
