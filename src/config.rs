use serde::Deserialize;

/// Environment variable holding the Postgres connection string for the
/// hosted database (Supabase exposes it as a plain Postgres URL).
pub const ENV_DATABASE_URL: &str = "DATABASE_URL";
/// Alternate name used by the Supabase deployment environment.
pub const ENV_SUPABASE_DB_URL: &str = "SUPABASE_DB_URL";
/// Environment variable holding the Supabase service-role key.
pub const ENV_SERVICE_ROLE_KEY: &str = "SUPABASE_SERVICE_ROLE_KEY";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub database_url: String,
    pub service_role_key: String,
    pub port: u16,
    pub posthog_key: Option<String>,
    pub posthog_host: Option<String>,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let config = Self {
            database_url: std::env::var(ENV_SUPABASE_DB_URL)
                .or_else(|_| std::env::var(ENV_DATABASE_URL))
                .map_err(|_| {
                    anyhow::anyhow!(
                        "SUPABASE_DB_URL or DATABASE_URL environment variable required"
                    )
                })
                .and_then(|url| {
                    if url.trim().is_empty() {
                        anyhow::bail!("SUPABASE_DB_URL cannot be empty");
                    }
                    if !url.starts_with("postgresql://") && !url.starts_with("postgres://") {
                        anyhow::bail!(
                            "SUPABASE_DB_URL must start with postgresql:// or postgres://"
                        );
                    }
                    Ok(url)
                })?,
            service_role_key: std::env::var(ENV_SERVICE_ROLE_KEY)
                .map_err(|_| {
                    anyhow::anyhow!("SUPABASE_SERVICE_ROLE_KEY environment variable required")
                })
                .and_then(|key| {
                    if key.trim().is_empty() {
                        anyhow::bail!("SUPABASE_SERVICE_ROLE_KEY cannot be empty");
                    }
                    Ok(key)
                })?,
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number between 1-65535"))?,
            posthog_key: std::env::var("POSTHOG_KEY")
                .ok()
                .filter(|s| !s.trim().is_empty()),
            posthog_host: std::env::var("POSTHOG_HOST")
                .ok()
                .filter(|s| !s.trim().is_empty()),
        };

        // Log successful configuration load (without sensitive values)
        tracing::info!("Configuration loaded successfully");
        tracing::debug!(
            "Database URL: {}...",
            &config.database_url[..20.min(config.database_url.len())]
        );
        tracing::debug!("Server Port: {}", config.port);
        if config.posthog_key.is_some() {
            tracing::info!("Analytics capture enabled");
        } else {
            tracing::info!("Analytics capture disabled (no POSTHOG_KEY)");
        }

        Ok(config)
    }
}
