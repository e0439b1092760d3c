use crate::errors::AppError;
use crate::models::{Lead, RequestMeta, Submission};
use sqlx::PgPool;
use uuid::Uuid;

/// Maximum accepted submissions per client IP within the trailing window.
pub const RATE_LIMIT_MAX_SUBMISSIONS: i64 = 5;
/// Length of the trailing rate-limit window, in minutes.
pub const RATE_LIMIT_WINDOW_MINUTES: i64 = 10;

/// Counts leads recorded for `ip_address` within the trailing rate-limit
/// window. The bound is computed in SQL so the clock that assigns
/// `created_at` also evaluates the window; app-side clock skew cannot widen
/// or narrow it. Concurrent submissions racing between this count and the
/// insert can still overshoot the cap slightly; the limit is an abuse
/// deterrent, not a hard guarantee.
pub async fn count_recent_by_ip(pool: &PgPool, ip_address: &str) -> Result<i64, AppError> {
    let count = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM leads \
         WHERE ip_address = $1 AND created_at >= now() - make_interval(mins => $2)",
    )
    .bind(ip_address)
    .bind(RATE_LIMIT_WINDOW_MINUTES as i32)
    .fetch_one(pool)
    .await?;

    Ok(count)
}

/// Inserts an enriched lead and returns its database-assigned id.
///
/// `created_at` is assigned by the store at insert time. The honeypot field
/// is intentionally not persisted.
pub async fn insert_lead(
    pool: &PgPool,
    submission: &Submission,
    meta: &RequestMeta,
) -> Result<Uuid, AppError> {
    let id = sqlx::query_scalar::<_, Uuid>(
        r#"
        INSERT INTO leads (
            name,
            email,
            role,
            message,
            country,
            region,
            city,
            ip_address,
            user_agent,
            referrer,
            utm_source,
            utm_medium,
            utm_campaign,
            utm_term,
            utm_content,
            client_timezone
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
        RETURNING id
        "#,
    )
    .bind(&submission.name)
    .bind(&submission.email)
    .bind(&submission.role)
    .bind(&submission.message)
    .bind(&meta.country)
    .bind(&meta.region)
    .bind(&meta.city)
    .bind(&meta.ip_address)
    .bind(&meta.user_agent)
    .bind(&meta.referrer)
    .bind(&meta.utm_source)
    .bind(&meta.utm_medium)
    .bind(&meta.utm_campaign)
    .bind(&meta.utm_term)
    .bind(&meta.utm_content)
    .bind(&submission.client_timezone)
    .fetch_one(pool)
    .await?;

    Ok(id)
}

/// Fetches a stored lead by id.
pub async fn fetch_lead(pool: &PgPool, id: Uuid) -> Result<Lead, AppError> {
    let lead = sqlx::query_as::<_, Lead>("SELECT * FROM leads WHERE id = $1")
        .bind(id)
        .fetch_one(pool)
        .await?;

    Ok(lead)
}
