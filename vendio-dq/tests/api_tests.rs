//! Integration tests for vendio-dq API endpoints
//!
//! Router-level tests over an in-memory SQLite database: validation runs,
//! bulk session lifecycle, CSV import/export, and the health endpoint.

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use chrono::{Duration, Utc};
use serde_json::{json, Value};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use tower::util::ServiceExt; // for `oneshot` method
use uuid::Uuid;
use vendio_dq::models::{Customer, Transaction, TxType};
use vendio_dq::{build_router, AppState};

/// Test helper: In-memory database with the full schema
async fn setup_test_db() -> SqlitePool {
    // Single connection so every query sees the same in-memory database
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

fn setup_app(db: SqlitePool) -> axum::Router {
    build_router(AppState::new(db))
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn post_text(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "text/csv")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn extract_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Should read body");
    serde_json::from_slice(&bytes).expect("Should parse JSON")
}

async fn extract_text(body: Body) -> String {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Should read body");
    String::from_utf8(bytes.to_vec()).expect("Should be UTF-8")
}

fn customer(name: &str, email: Option<&str>) -> Customer {
    Customer {
        id: Uuid::new_v4(),
        name: name.to_string(),
        email: email.map(String::from),
        phone: Some("11987654321".to_string()),
        address: Some("Rua das Flores, 123".to_string()),
        city: Some("São Paulo".to_string()),
        state: Some("SP".to_string()),
        status: Some("active".to_string()),
        last_contact_at: Some(Utc::now() - Duration::days(5)),
        data_quality_score: None,
        validation_errors: Vec::new(),
        created_at: Utc::now(),
    }
}

fn transaction(title: &str, amount: f64) -> Transaction {
    Transaction {
        id: Uuid::new_v4(),
        title: title.to_string(),
        description: None,
        category: "Vendas".to_string(),
        tx_type: TxType::Receita,
        amount,
        occurred_on: (Utc::now() - Duration::days(3)).date_naive(),
        status: Some("pago".to_string()),
        payment_method: Some("PIX".to_string()),
        source: None,
        customer_name: None,
        data_quality_score: None,
        validation_errors: Vec::new(),
        created_at: Utc::now(),
    }
}

// =============================================================================
// Health
// =============================================================================

#[tokio::test]
async fn test_health_endpoint() {
    let db = setup_test_db().await;
    let app = setup_app(db);

    let response = app.oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["database"], "reachable");
}

// =============================================================================
// Validation runs
// =============================================================================

#[tokio::test]
async fn test_full_validation_run_persists_scores_and_log() {
    let db = setup_test_db().await;

    let good = customer("Maria Silva", Some("maria@empresa.com.br"));
    let mut bad = customer("X", Some("not-an-email"));
    bad.phone = None;
    vendio_dq::db::customers::insert(&db, &good).await.unwrap();
    vendio_dq::db::customers::insert(&db, &bad).await.unwrap();

    let app = setup_app(db.clone());
    let response = app.oneshot(post_json("/api/validate/customers", json!({}))).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["summary"]["total"], 2);
    assert_eq!(body["summary"]["valid_count"], 1);
    assert_eq!(body["summary"]["invalid_count"], 1);

    // Scores are written back onto the rows
    let good_row = vendio_dq::db::customers::fetch_one(&db, good.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(good_row.data_quality_score, Some(100));
    assert!(good_row.validation_errors.is_empty());

    let bad_row = vendio_dq::db::customers::fetch_one(&db, bad.id)
        .await
        .unwrap()
        .unwrap();
    assert!(bad_row.data_quality_score.unwrap() < 60);
    assert!(!bad_row.validation_errors.is_empty());

    // Exactly one audit entry per run
    assert_eq!(vendio_dq::db::validation_logs::count(&db).await.unwrap(), 1);
}

#[tokio::test]
async fn test_revalidation_overwrites_previous_errors() {
    let db = setup_test_db().await;

    let mut c = customer("Ana", None);
    c.phone = None;
    vendio_dq::db::customers::insert(&db, &c).await.unwrap();

    let app = setup_app(db.clone());
    app.clone()
        .oneshot(post_json("/api/validate/customers", json!({})))
        .await
        .unwrap();
    let first = vendio_dq::db::customers::fetch_one(&db, c.id).await.unwrap().unwrap();

    // Fix the record, re-run: the persisted list reflects only the new run
    vendio_dq::db::customers::update(
        &db,
        c.id,
        &vendio_dq::models::CustomerPatch {
            phone: Some("11987654321".to_string()),
            email: Some("ana@empresa.com".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    app.oneshot(post_json("/api/validate/customers", json!({})))
        .await
        .unwrap();
    let second = vendio_dq::db::customers::fetch_one(&db, c.id).await.unwrap().unwrap();

    assert!(second.data_quality_score.unwrap() > first.data_quality_score.unwrap());
    assert_eq!(vendio_dq::db::validation_logs::count(&db).await.unwrap(), 2);
}

#[tokio::test]
async fn test_validate_missing_record_returns_degenerate_result() {
    let db = setup_test_db().await;
    let app = setup_app(db);

    let uri = format!("/api/validate/customers/{}", Uuid::new_v4());
    let response = app.oneshot(get(&uri)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["is_valid"], false);
    assert_eq!(body["score"], 0);
    assert_eq!(body["errors"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_unknown_entity_kind_is_bad_request() {
    let db = setup_test_db().await;
    let app = setup_app(db);

    let response = app
        .oneshot(post_json("/api/validate/invoices", json!({})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_empty_table_run_yields_zero_summary() {
    let db = setup_test_db().await;
    let app = setup_app(db);

    let response = app.oneshot(post_json("/api/validate/deals", json!({}))).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["summary"]["total"], 0);
    assert_eq!(body["summary"]["average_score"], 0);
    assert_eq!(body["records"].as_array().unwrap().len(), 0);
}

// =============================================================================
// Bulk sessions over HTTP
// =============================================================================

#[tokio::test]
async fn test_bulk_update_with_empty_selection_is_rejected() {
    let db = setup_test_db().await;
    let app = setup_app(db);

    let request = post_json(
        "/api/bulk/update",
        json!({ "kind": "customers", "ids": [], "patch": { "status": "inactive" } }),
    );
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::ACCEPTED);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["state"], "REJECTED");
}

#[tokio::test]
async fn test_bulk_update_with_empty_patch_is_rejected() {
    let db = setup_test_db().await;
    let app = setup_app(db);

    let request = post_json(
        "/api/bulk/update",
        json!({ "kind": "customers", "ids": [Uuid::new_v4()], "patch": {} }),
    );
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::ACCEPTED);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["state"], "REJECTED");
}

#[tokio::test]
async fn test_bulk_status_unknown_session_is_not_found() {
    let db = setup_test_db().await;
    let app = setup_app(db);

    let uri = format!("/api/bulk/status/{}", Uuid::new_v4());
    let response = app.oneshot(get(&uri)).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_bulk_update_runs_to_completion() {
    let db = setup_test_db().await;

    let t1 = transaction("Venda A", 100.0);
    let t2 = transaction("Venda B", 200.0);
    vendio_dq::db::transactions::insert(&db, &t1).await.unwrap();
    vendio_dq::db::transactions::insert(&db, &t2).await.unwrap();

    let app = setup_app(db.clone());
    let request = post_json(
        "/api/bulk/update",
        json!({
            "kind": "transactions",
            "ids": [t1.id, t2.id],
            "patch": { "status": "conciliado" }
        }),
    );
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::ACCEPTED);

    let body = extract_json(response.into_body()).await;
    let session_id = body["session_id"].as_str().unwrap().to_string();

    // Poll until the background task reaches a terminal state
    let mut last = json!(null);
    for _ in 0..100 {
        let response = app
            .clone()
            .oneshot(get(&format!("/api/bulk/status/{}", session_id)))
            .await
            .unwrap();
        last = extract_json(response.into_body()).await;
        if last["state"] != "RUNNING" {
            break;
        }
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    }

    assert_eq!(last["state"], "COMPLETED");
    assert_eq!(last["processed"], 2);
    assert_eq!(last["fraction"], 1.0);
    assert_eq!(last["outcome"]["result"], "fully_applied");

    let updated = vendio_dq::db::transactions::fetch_one(&db, t1.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.status.as_deref(), Some("conciliado"));
}

// =============================================================================
// CSV import / export
// =============================================================================

#[tokio::test]
async fn test_import_endpoint_counts_rows() {
    let db = setup_test_db().await;
    let app = setup_app(db.clone());

    let csv = "data,descricao,categoria,tipo,valor,status,forma_pagamento,fonte,cliente\n\
               02/01/2024,Venda Produto,Receita,receita,1500.00,pago,PIX,site,Cliente ABC\n\
               02/01/2024,Venda Produto,Receita,receita,1500.00,pago,PIX,site,Cliente ABC\n\
               03/01/2024,,Receita,receita,99.00,pago,PIX,site,Cliente B\n\
               04/01/2024,Outra Venda,Receita,receita,-5.00,pago,PIX,site,Cliente C\n";

    let response = app
        .clone()
        .oneshot(post_text("/api/import/transactions", csv))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["total_rows"], 4);
    assert_eq!(body["imported"], 1);
    assert_eq!(body["duplicates"], 1);
    assert_eq!(body["skipped"], 2);

    // The imported row carries the normalized date and amount
    let rows = vendio_dq::db::transactions::fetch_all(&db).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].occurred_on.to_string(), "2024-01-02");
    assert_eq!(rows[0].amount, 1500.0);
    assert_eq!(rows[0].status.as_deref(), Some("pago"));

    // Re-importing the same file inserts nothing new
    let response = app
        .oneshot(post_text("/api/import/transactions", csv))
        .await
        .unwrap();
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["imported"], 0);
    assert_eq!(body["duplicates"], 2);
}

#[tokio::test]
async fn test_template_download() {
    let db = setup_test_db().await;
    let app = setup_app(db);

    let response = app.oneshot(get("/api/import/template")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let content_type = response
        .headers()
        .get("content-type")
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(content_type.starts_with("text/csv"));

    let text = extract_text(response.into_body()).await;
    assert!(text.starts_with("data,descricao,categoria,tipo,valor"));
}

#[tokio::test]
async fn test_export_quotes_embedded_commas() {
    let db = setup_test_db().await;

    let c = customer("Silva, Maria & Filhos", Some("maria@empresa.com"));
    vendio_dq::db::customers::insert(&db, &c).await.unwrap();

    let app = setup_app(db);
    let response = app.oneshot(get("/api/export/customers")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let text = extract_text(response.into_body()).await;
    assert!(text.contains("\"Silva, Maria & Filhos\""));
}

#[tokio::test]
async fn test_export_unknown_kind_is_bad_request() {
    let db = setup_test_db().await;
    let app = setup_app(db);

    let response = app.oneshot(get("/api/export/invoices")).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
