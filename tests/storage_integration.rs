use std::env;
use uuid::Uuid;

use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use rust_leads_api::analytics::Analytics;
use rust_leads_api::config::Config;
use rust_leads_api::db::Database;
use rust_leads_api::db_storage::{self, RATE_LIMIT_MAX_SUBMISSIONS};
use rust_leads_api::errors::AppError;
use rust_leads_api::handlers::{submit_contact, AppState};
use rust_leads_api::models::{RequestMeta, Submission};
use std::collections::HashMap;
use std::sync::Arc;

/// All tests here write to a real leads table and are marked ignored to avoid
/// running against production by accident; set TEST_DATABASE_URL to run.
async fn test_db() -> anyhow::Result<Database> {
    let db_url = env::var("TEST_DATABASE_URL")
        .or_else(|_| env::var("DATABASE_URL"))
        .map_err(|_| anyhow::anyhow!("Set TEST_DATABASE_URL or DATABASE_URL to run this test"))?;

    Database::new(&db_url).await
}

fn test_state(db: &Database) -> Arc<AppState> {
    Arc::new(AppState {
        db: db.pool.clone(),
        config: Config {
            database_url: "postgresql://test".to_string(),
            service_role_key: "test_key".to_string(),
            port: 8080,
            posthog_key: None,
            posthog_host: None,
        },
        analytics: Analytics::disabled(),
    })
}

/// The IP is an opaque rate key (never validated as an address), so a unique
/// string per run keeps repeated runs from tripping each other's windows.
fn unique_ip() -> String {
    format!("test-ip-{}", Uuid::new_v4())
}

#[tokio::test]
#[ignore]
async fn round_trip_stores_submission_and_metadata() -> anyhow::Result<()> {
    let db = test_db().await?;

    let submission = Submission {
        name: "Jane".to_string(),
        email: "jane@x.com".to_string(),
        role: "DS".to_string(),
        message: "hi".to_string(),
        company: String::new(),
        client_timezone: String::new(),
    };
    let meta = RequestMeta {
        ip_address: unique_ip(),
        ..Default::default()
    };

    let id = db_storage::insert_lead(&db.pool, &submission, &meta)
        .await
        .map_err(|e| anyhow::anyhow!(e.to_string()))?;

    let lead = db_storage::fetch_lead(&db.pool, id)
        .await
        .map_err(|e| anyhow::anyhow!(e.to_string()))?;

    assert_eq!(lead.email, "jane@x.com");
    assert_eq!(lead.name, "Jane");
    // No query string on the request: all UTM fields stored as empty strings
    assert_eq!(lead.utm_source, "");
    assert_eq!(lead.utm_medium, "");
    assert_eq!(lead.utm_campaign, "");
    assert_eq!(lead.utm_term, "");
    assert_eq!(lead.utm_content, "");

    Ok(())
}

#[tokio::test]
#[ignore]
async fn duplicate_submissions_create_distinct_leads() -> anyhow::Result<()> {
    let db = test_db().await?;

    let submission = Submission {
        email: "jane@x.com".to_string(),
        ..Default::default()
    };
    let meta = RequestMeta {
        ip_address: unique_ip(),
        ..Default::default()
    };

    let first = db_storage::insert_lead(&db.pool, &submission, &meta)
        .await
        .map_err(|e| anyhow::anyhow!(e.to_string()))?;
    let second = db_storage::insert_lead(&db.pool, &submission, &meta)
        .await
        .map_err(|e| anyhow::anyhow!(e.to_string()))?;

    assert_ne!(first, second);

    let count = db_storage::count_recent_by_ip(&db.pool, &meta.ip_address)
        .await
        .map_err(|e| anyhow::anyhow!(e.to_string()))?;
    assert_eq!(count, 2);

    Ok(())
}

#[tokio::test]
#[ignore]
async fn window_excludes_rows_older_than_ten_minutes() -> anyhow::Result<()> {
    let db = test_db().await?;
    let ip = unique_ip();

    let submission = Submission {
        email: "jane@x.com".to_string(),
        ..Default::default()
    };
    let meta = RequestMeta {
        ip_address: ip.clone(),
        ..Default::default()
    };

    let id = db_storage::insert_lead(&db.pool, &submission, &meta)
        .await
        .map_err(|e| anyhow::anyhow!(e.to_string()))?;

    let count = db_storage::count_recent_by_ip(&db.pool, &ip)
        .await
        .map_err(|e| anyhow::anyhow!(e.to_string()))?;
    assert_eq!(count, 1);

    // Age the row past the window on the database clock, the same clock that
    // evaluates the bound
    sqlx::query("UPDATE leads SET created_at = now() - interval '11 minutes' WHERE id = $1")
        .bind(id)
        .execute(&db.pool)
        .await?;

    let count = db_storage::count_recent_by_ip(&db.pool, &ip)
        .await
        .map_err(|e| anyhow::anyhow!(e.to_string()))?;
    assert_eq!(count, 0);

    Ok(())
}

#[tokio::test]
#[ignore]
async fn sixth_submission_in_window_is_rate_limited() -> anyhow::Result<()> {
    let db = test_db().await?;
    let state = test_state(&db);
    let ip = unique_ip();

    let submission = Submission {
        email: "jane@x.com".to_string(),
        ..Default::default()
    };
    let meta = RequestMeta {
        ip_address: ip.clone(),
        ..Default::default()
    };

    for _ in 0..RATE_LIMIT_MAX_SUBMISSIONS {
        db_storage::insert_lead(&db.pool, &submission, &meta)
            .await
            .map_err(|e| anyhow::anyhow!(e.to_string()))?;
    }

    let mut headers = HeaderMap::new();
    headers.insert("x-forwarded-for", HeaderValue::from_str(&ip)?);

    let result = submit_contact(
        State(state.clone()),
        Query(HashMap::new()),
        headers,
        Bytes::from_static(br#"{"email": "jane@x.com"}"#),
    )
    .await;

    assert!(matches!(result, Err(AppError::RateLimited)));

    // A different IP in the same window sails through
    let other_ip = unique_ip();
    let mut headers = HeaderMap::new();
    headers.insert("x-forwarded-for", HeaderValue::from_str(&other_ip)?);

    let result = submit_contact(
        State(state),
        Query(HashMap::new()),
        headers,
        Bytes::from_static(br#"{"email": "jane@x.com"}"#),
    )
    .await;

    let (status, body) = result.map_err(|e| anyhow::anyhow!(e.to_string()))?;
    assert_eq!(status, StatusCode::OK);
    assert!(body.0.success);

    Ok(())
}

#[tokio::test]
#[ignore]
async fn accepted_submission_records_utm_from_query() -> anyhow::Result<()> {
    let db = test_db().await?;
    let state = test_state(&db);
    let ip = unique_ip();

    let mut headers = HeaderMap::new();
    headers.insert("x-forwarded-for", HeaderValue::from_str(&ip)?);
    headers.insert("x-vercel-ip-country", HeaderValue::from_static("BR"));

    let mut query = HashMap::new();
    query.insert("utm_source".to_string(), "newsletter".to_string());

    let result = submit_contact(
        State(state),
        Query(query),
        headers,
        Bytes::from_static(br#"{"name": "Jane", "email": "jane@x.com"}"#),
    )
    .await;

    let (status, _) = result.map_err(|e| anyhow::anyhow!(e.to_string()))?;
    assert_eq!(status, StatusCode::OK);

    // Exactly one row landed for this IP, carrying the UTM source
    let count = db_storage::count_recent_by_ip(&db.pool, &ip)
        .await
        .map_err(|e| anyhow::anyhow!(e.to_string()))?;
    assert_eq!(count, 1);

    Ok(())
}
