//! Bulk mutator semantics tests
//!
//! Exercises the runner directly (no HTTP) so ordering and abort behavior
//! are deterministic: sequential mode applies ids in selection order and
//! never rolls back; transactional mode is all-or-nothing.

use chrono::{Duration, Utc};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use uuid::Uuid;
use vendio_common::db::settings::set_setting;
use vendio_dq::db;
use vendio_dq::models::{
    BulkOperation, BulkOutcome, BulkSession, BulkState, EntityKind, Transaction, TransactionPatch,
    TxType,
};
use vendio_dq::services::bulk::{self, BulkPatch};

async fn setup_test_db() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("Should open in-memory database");

    vendio_common::db::create_schema(&pool)
        .await
        .expect("Should create schema");

    pool
}

fn transaction(title: &str) -> Transaction {
    Transaction {
        id: Uuid::new_v4(),
        title: title.to_string(),
        description: None,
        category: "Vendas".to_string(),
        tx_type: TxType::Receita,
        amount: 100.0,
        occurred_on: (Utc::now() - Duration::days(1)).date_naive(),
        status: Some("pendente".to_string()),
        payment_method: None,
        source: None,
        customer_name: None,
        data_quality_score: None,
        validation_errors: Vec::new(),
        created_at: Utc::now(),
    }
}

fn status_patch(status: &str) -> BulkPatch {
    BulkPatch::Transaction(TransactionPatch {
        status: Some(status.to_string()),
        ..Default::default()
    })
}

async fn seed_three(pool: &SqlitePool) -> (Transaction, Transaction, Transaction) {
    let t1 = transaction("Venda 1");
    let t2 = transaction("Venda 2");
    let t3 = transaction("Venda 3");
    db::transactions::insert(pool, &t1).await.unwrap();
    db::transactions::insert(pool, &t2).await.unwrap();
    db::transactions::insert(pool, &t3).await.unwrap();
    (t1, t2, t3)
}

async fn status_of(pool: &SqlitePool, id: Uuid) -> String {
    db::transactions::fetch_one(pool, id)
        .await
        .unwrap()
        .unwrap()
        .status
        .unwrap()
}

#[tokio::test]
async fn test_sequential_update_applies_all_in_order() {
    let pool = setup_test_db().await;
    let (t1, t2, t3) = seed_three(&pool).await;

    let session = BulkSession::new(BulkOperation::Update, EntityKind::Transactions, 3);
    let session_id = session.session_id;

    bulk::run_update(
        pool.clone(),
        session,
        vec![t1.id, t2.id, t3.id],
        status_patch("pago"),
    )
    .await
    .unwrap();

    let session = db::bulk_sessions::load(&pool, session_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(session.state, BulkState::Completed);
    assert_eq!(session.processed, 3);
    assert_eq!(session.fraction, 1.0);
    assert_eq!(session.outcome, Some(BulkOutcome::FullyApplied { applied: 3 }));

    for id in [t1.id, t2.id, t3.id] {
        assert_eq!(status_of(&pool, id).await, "pago");
    }
}

#[tokio::test]
async fn test_sequential_update_aborts_at_first_failure_without_rollback() {
    let pool = setup_test_db().await;
    let (t1, _t2, t3) = seed_three(&pool).await;

    // The second id does not exist, so its UPDATE affects zero rows and fails
    let bogus = Uuid::new_v4();
    let session = BulkSession::new(BulkOperation::Update, EntityKind::Transactions, 3);
    let session_id = session.session_id;

    bulk::run_update(
        pool.clone(),
        session,
        vec![t1.id, bogus, t3.id],
        status_patch("pago"),
    )
    .await
    .unwrap();

    let session = db::bulk_sessions::load(&pool, session_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(session.state, BulkState::Failed);
    assert_eq!(session.processed, 1);
    assert_eq!(
        session.outcome,
        Some(BulkOutcome::PartiallyApplied {
            applied: 1,
            failed_id: bogus,
        })
    );

    // The id before the failure stays applied, the one after was never issued
    assert_eq!(status_of(&pool, t1.id).await, "pago");
    assert_eq!(status_of(&pool, t3.id).await, "pendente");
}

#[tokio::test]
async fn test_transactional_update_rolls_back_on_failure() {
    let pool = setup_test_db().await;
    let (t1, _t2, t3) = seed_three(&pool).await;
    set_setting(&pool, "dq_bulk_mode", "transactional")
        .await
        .unwrap();

    let bogus = Uuid::new_v4();
    let session = BulkSession::new(BulkOperation::Update, EntityKind::Transactions, 3);
    let session_id = session.session_id;

    bulk::run_update(
        pool.clone(),
        session,
        vec![t1.id, bogus, t3.id],
        status_patch("pago"),
    )
    .await
    .unwrap();

    let session = db::bulk_sessions::load(&pool, session_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(session.state, BulkState::Failed);
    assert!(matches!(
        session.outcome,
        Some(BulkOutcome::Rejected { .. })
    ));

    // Nothing is applied in all-or-nothing mode
    assert_eq!(status_of(&pool, t1.id).await, "pendente");
    assert_eq!(status_of(&pool, t3.id).await, "pendente");
}

#[tokio::test]
async fn test_transactional_update_commits_when_all_succeed() {
    let pool = setup_test_db().await;
    let (t1, t2, t3) = seed_three(&pool).await;
    set_setting(&pool, "dq_bulk_mode", "transactional")
        .await
        .unwrap();

    let session = BulkSession::new(BulkOperation::Update, EntityKind::Transactions, 3);
    let session_id = session.session_id;

    bulk::run_update(
        pool.clone(),
        session,
        vec![t1.id, t2.id, t3.id],
        status_patch("pago"),
    )
    .await
    .unwrap();

    let session = db::bulk_sessions::load(&pool, session_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(session.state, BulkState::Completed);
    assert_eq!(session.fraction, 1.0);

    for id in [t1.id, t2.id, t3.id] {
        assert_eq!(status_of(&pool, id).await, "pago");
    }
}

#[tokio::test]
async fn test_sequential_delete_keeps_earlier_deletes_on_failure() {
    let pool = setup_test_db().await;
    let (t1, t2, t3) = seed_three(&pool).await;

    let bogus = Uuid::new_v4();
    let session = BulkSession::new(BulkOperation::Delete, EntityKind::Transactions, 3);
    let session_id = session.session_id;

    bulk::run_delete(pool.clone(), session, vec![t1.id, bogus, t2.id])
        .await
        .unwrap();

    let session = db::bulk_sessions::load(&pool, session_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(session.state, BulkState::Failed);

    // t1 is gone, t2 and t3 remain
    assert!(db::transactions::fetch_one(&pool, t1.id).await.unwrap().is_none());
    assert!(db::transactions::fetch_one(&pool, t2.id).await.unwrap().is_some());
    assert!(db::transactions::fetch_one(&pool, t3.id).await.unwrap().is_some());
    assert_eq!(db::transactions::count(&pool).await.unwrap(), 2);
}

#[tokio::test]
async fn test_rejection_reasons() {
    let patch = status_patch("pago");
    assert!(bulk::update_rejection(&[], &patch).is_some());

    let empty_patch = BulkPatch::Transaction(TransactionPatch::default());
    assert!(bulk::update_rejection(&[Uuid::new_v4()], &empty_patch).is_some());

    assert!(bulk::update_rejection(&[Uuid::new_v4()], &patch).is_none());
    assert!(bulk::delete_rejection(&[]).is_some());
    assert!(bulk::delete_rejection(&[Uuid::new_v4()]).is_none());
}
