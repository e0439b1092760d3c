use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

// ============ Wire Models ============

/// Normalized contact-form submission, produced by the validator.
///
/// Every field is owned text; absent or non-textual inputs normalize to the
/// empty string. `company` is the honeypot field and is never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Submission {
    pub name: String,
    pub email: String,
    pub role: String,
    pub message: String,
    /// Honeypot signal; any non-empty value marks the submission as automated.
    pub company: String,
    pub client_timezone: String,
}

/// Request-derived metadata attached to an accepted submission.
///
/// All fields default to the empty string when the corresponding header or
/// query parameter is absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestMeta {
    /// Geographic hints from the proxy (`x-vercel-ip-*` headers).
    pub country: String,
    pub region: String,
    pub city: String,
    /// First comma-separated token of `x-forwarded-for`, trimmed.
    pub ip_address: String,
    pub user_agent: String,
    pub referrer: String,
    pub utm_source: String,
    pub utm_medium: String,
    pub utm_campaign: String,
    pub utm_term: String,
    pub utm_content: String,
}

// ============ Database Models ============

/// A persisted lead: submission fields plus request metadata.
///
/// Created exactly once per accepted submission; `id` and `created_at` are
/// assigned by the database. There is no update or delete path.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Lead {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: String,
    pub message: String,
    pub country: String,
    pub region: String,
    pub city: String,
    pub ip_address: String,
    pub user_agent: String,
    pub referrer: String,
    pub utm_source: String,
    pub utm_medium: String,
    pub utm_campaign: String,
    pub utm_term: String,
    pub utm_content: String,
    pub client_timezone: String,
    pub created_at: DateTime<Utc>,
}

// ============ API Documentation Models ============

/// Contact-form request body as documented to API consumers.
///
/// The handler itself parses the raw body leniently (any field may be absent
/// or non-textual); this schema describes the intended shape.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ContactSubmissionDoc {
    #[schema(example = "Jane Doe")]
    pub name: Option<String>,
    #[schema(example = "jane@example.com")]
    pub email: String,
    #[schema(example = "Data Scientist")]
    pub role: Option<String>,
    pub message: Option<String>,
    /// Honeypot field. Leave empty; any value causes silent deflection.
    pub company: Option<String>,
    #[schema(example = "America/Sao_Paulo")]
    pub client_timezone: Option<String>,
}

/// Successful submission acknowledgement.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ContactAccepted {
    pub success: bool,
}

/// Validation rejection body (400 responses).
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ContactRejected {
    pub success: bool,
    pub error: String,
}

/// Opaque error body (429 and 500 responses).
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    pub error: String,
}

/// Deployment-verification report: presence (never value) of the two
/// required configuration secrets.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct EnvHealth {
    pub ok: bool,
    #[serde(rename = "hasUrl")]
    pub has_url: bool,
    #[serde(rename = "hasServiceKey")]
    pub has_service_key: bool,
}
