use crate::analytics::Analytics;
use crate::config::{Config, ENV_DATABASE_URL, ENV_SERVICE_ROLE_KEY, ENV_SUPABASE_DB_URL};
use crate::db_storage::{self, RATE_LIMIT_MAX_SUBMISSIONS, RATE_LIMIT_WINDOW_MINUTES};
use crate::errors::AppError;
use crate::models::{ContactAccepted, EnvHealth};
use crate::{request_meta, validation};
use axum::{
    body::Bytes,
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use serde_json::json;
use sqlx::PgPool;
use std::collections::HashMap;
use std::sync::Arc;
use utoipa::OpenApi;

/// Shared application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub db: PgPool,
    /// Application configuration.
    pub config: Config,
    /// Analytics capture client (no-op when unconfigured).
    pub analytics: Analytics,
}

/// Liveness check endpoint.
///
/// Bypasses the edge rate limiter so the hosting platform can poll it freely.
#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Service is up"))
)]
pub async fn health() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::OK,
        Json(json!({
            "status": "healthy",
            "service": "rust-leads-api",
            "version": "0.1.0"
        })),
    )
}

fn env_present(name: &str) -> bool {
    std::env::var(name)
        .map(|v| !v.trim().is_empty())
        .unwrap_or(false)
}

/// GET /api/health/env
///
/// Deployment verification: reports presence (never value) of the two
/// required secrets, reading the environment at request time. Overall status
/// is OK only when both are set.
#[utoipa::path(
    get,
    path = "/api/health/env",
    responses(
        (status = 200, description = "Both required secrets present", body = EnvHealth),
        (status = 500, description = "One or both secrets missing", body = EnvHealth),
    )
)]
pub async fn env_health() -> (StatusCode, Json<EnvHealth>) {
    let has_url = env_present(ENV_SUPABASE_DB_URL) || env_present(ENV_DATABASE_URL);
    let has_service_key = env_present(ENV_SERVICE_ROLE_KEY);
    let ok = has_url && has_service_key;

    let status = if ok {
        StatusCode::OK
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };

    (
        status,
        Json(EnvHealth {
            ok,
            has_url,
            has_service_key,
        }),
    )
}

/// POST /api/contact
///
/// Lead-submission pipeline:
/// 1. Validate and normalize the raw JSON body.
/// 2. Honeypot tripped → report success, write nothing. The honeypot wins
///    over every field-level rejection; only an unparseable body beats it.
/// 3. Extract request metadata (geo headers, client IP, user agent, referrer,
///    UTM query parameters).
/// 4. If an IP resolved, enforce the trailing-window submission limit against
///    the leads table; a failed count query is a storage fault, never a pass.
/// 5. Insert the enriched lead.
#[utoipa::path(
    post,
    path = "/api/contact",
    request_body = crate::models::ContactSubmissionDoc,
    responses(
        (status = 200, description = "Submission accepted", body = ContactAccepted),
        (status = 400, description = "Malformed payload or failed validation", body = crate::models::ContactRejected),
        (status = 429, description = "Too many submissions from this IP", body = crate::models::ErrorBody),
        (status = 500, description = "Storage fault", body = crate::models::ErrorBody),
    )
)]
pub async fn submit_contact(
    State(state): State<Arc<AppState>>,
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<(StatusCode, Json<ContactAccepted>), AppError> {
    let submission = validation::parse_submission(&body)?;
    let meta = request_meta::extract(&headers, &params);

    // Honeypot: indistinguishable from a real acceptance to the submitter.
    if !submission.company.is_empty() {
        tracing::warn!(
            "Honeypot tripped, deflecting submission (ip: {})",
            meta.ip_address
        );
        let analytics = state.analytics.clone();
        tokio::spawn(async move {
            analytics
                .capture("lead_deflected", json!({ "reason": "honeypot" }))
                .await;
        });
        return Ok((StatusCode::OK, Json(ContactAccepted { success: true })));
    }

    if !meta.ip_address.is_empty() {
        let recent = db_storage::count_recent_by_ip(&state.db, &meta.ip_address).await?;
        if recent >= RATE_LIMIT_MAX_SUBMISSIONS {
            tracing::warn!(
                "Rate limit hit for {}: {} submissions in the last {} minutes",
                meta.ip_address,
                recent,
                RATE_LIMIT_WINDOW_MINUTES
            );
            let analytics = state.analytics.clone();
            let identity = format!("rate_limited:{}", meta.ip_address);
            tokio::spawn(async move {
                analytics
                    .capture_once(&identity, "lead_rate_limited", json!({}))
                    .await;
            });
            return Err(AppError::RateLimited);
        }
    }

    let lead_id = db_storage::insert_lead(&state.db, &submission, &meta).await?;
    tracing::info!(
        "New contact submission stored: {} ({})",
        lead_id,
        submission.email
    );

    let analytics = state.analytics.clone();
    let utm_source = meta.utm_source.clone();
    tokio::spawn(async move {
        analytics
            .capture("lead_captured", json!({ "utm_source": utm_source }))
            .await;
    });

    Ok((StatusCode::OK, Json(ContactAccepted { success: true })))
}

/// OpenAPI document served through Swagger UI at `/docs`.
#[derive(OpenApi)]
#[openapi(
    paths(submit_contact, env_health, health),
    components(schemas(
        crate::models::ContactSubmissionDoc,
        ContactAccepted,
        crate::models::ContactRejected,
        crate::models::ErrorBody,
        EnvHealth,
    )),
    tags(
        (name = "rust-leads-api", description = "Lead-capture API for the landing page contact form")
    )
)]
pub struct ApiDoc;
