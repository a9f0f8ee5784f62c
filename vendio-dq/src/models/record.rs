//! Typed CRM entity records
//!
//! Each entity kind is a distinct struct with named, typed fields; the
//! validators dispatch statically over these types rather than probing open
//! field maps. The `data_quality_score` / `validation_errors` pair on every
//! record reflects only the most recent validation run.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Entity kind discriminator, doubling as the table selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Customers,
    Transactions,
    Deals,
}

impl EntityKind {
    /// Backing-store table name for this kind
    pub fn table_name(&self) -> &'static str {
        match self {
            EntityKind::Customers => "customers",
            EntityKind::Transactions => "transactions",
            EntityKind::Deals => "deals",
        }
    }
}

impl std::str::FromStr for EntityKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "customers" => Ok(EntityKind::Customers),
            "transactions" => Ok(EntityKind::Transactions),
            "deals" => Ok(EntityKind::Deals),
            other => Err(format!("Unknown entity kind: {}", other)),
        }
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.table_name())
    }
}

/// Financial transaction direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TxType {
    Receita,
    Despesa,
}

impl TxType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TxType::Receita => "receita",
            TxType::Despesa => "despesa",
        }
    }

    /// Lenient parse used by the CSV importer: anything that does not name an
    /// expense is income
    pub fn from_cell(raw: &str) -> TxType {
        if raw.to_lowercase().contains("despesa") {
            TxType::Despesa
        } else {
            TxType::Receita
        }
    }
}

impl std::str::FromStr for TxType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "receita" => Ok(TxType::Receita),
            "despesa" => Ok(TxType::Despesa),
            other => Err(format!("Unknown transaction type: {}", other)),
        }
    }
}

/// Customer record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Customer {
    pub id: Uuid,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub status: Option<String>,
    pub last_contact_at: Option<DateTime<Utc>>,
    pub data_quality_score: Option<i64>,
    pub validation_errors: Vec<String>,
    pub created_at: DateTime<Utc>,
}

/// Financial transaction record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub category: String,
    pub tx_type: TxType,
    pub amount: f64,
    /// Date the transaction occurred (not the insertion time)
    pub occurred_on: NaiveDate,
    pub status: Option<String>,
    pub payment_method: Option<String>,
    pub source: Option<String>,
    pub customer_name: Option<String>,
    pub data_quality_score: Option<i64>,
    pub validation_errors: Vec<String>,
    pub created_at: DateTime<Utc>,
}

/// Deal / sales opportunity record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Deal {
    pub id: Uuid,
    pub title: String,
    pub customer_id: Option<Uuid>,
    pub value: Option<f64>,
    pub status: Option<String>,
    pub expected_close_on: Option<NaiveDate>,
    pub assignee: Option<String>,
    pub data_quality_score: Option<i64>,
    pub validation_errors: Vec<String>,
    pub created_at: DateTime<Utc>,
}

/// Partial update for customers; only present fields are written
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CustomerPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub status: Option<String>,
}

impl CustomerPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.email.is_none()
            && self.phone.is_none()
            && self.address.is_none()
            && self.city.is_none()
            && self.state.is_none()
            && self.status.is_none()
    }
}

/// Partial update for transactions
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TransactionPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub tx_type: Option<TxType>,
    pub amount: Option<f64>,
    pub occurred_on: Option<NaiveDate>,
    pub status: Option<String>,
    pub payment_method: Option<String>,
}

impl TransactionPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.category.is_none()
            && self.tx_type.is_none()
            && self.amount.is_none()
            && self.occurred_on.is_none()
            && self.status.is_none()
            && self.payment_method.is_none()
    }
}

/// Partial update for deals
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DealPatch {
    pub title: Option<String>,
    pub customer_id: Option<Uuid>,
    pub value: Option<f64>,
    pub status: Option<String>,
    pub expected_close_on: Option<NaiveDate>,
    pub assignee: Option<String>,
}

impl DealPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.customer_id.is_none()
            && self.value.is_none()
            && self.status.is_none()
            && self.expected_close_on.is_none()
            && self.assignee.is_none()
    }
}
