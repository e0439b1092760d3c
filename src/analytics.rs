use chrono::Utc;
use moka::future::Cache;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::OnceLock;
use url::Url;

/// Default capture host when only an API key is configured.
const DEFAULT_HOST: &str = "https://us.i.posthog.com";

static INITIALIZED: AtomicBool = AtomicBool::new(false);
static INSTANCE: OnceLock<Analytics> = OnceLock::new();

/// Server-side analytics capture client.
///
/// Delivery is strictly best-effort: capture failures are logged and never
/// propagate into request handling. When no API key is configured the client
/// is a silent no-op.
#[derive(Clone)]
pub struct Analytics {
    client: reqwest::Client,
    endpoint: Option<Url>,
    api_key: Option<String>,
    /// Event identities already fired this process (fire-once semantics).
    fired: Cache<String, ()>,
}

impl Analytics {
    pub fn new(api_key: Option<String>, host: Option<String>) -> Self {
        let endpoint = api_key.as_ref().and_then(|_| {
            let host = host.unwrap_or_else(|| DEFAULT_HOST.to_string());
            match Url::parse(&host).and_then(|u| u.join("/capture/")) {
                Ok(url) => Some(url),
                Err(e) => {
                    tracing::warn!("Invalid analytics host '{}': {}", host, e);
                    None
                }
            }
        });

        Self {
            client: reqwest::Client::new(),
            endpoint,
            api_key,
            fired: Cache::builder().max_capacity(10_000).build(),
        }
    }

    /// No-op client for tests and deployments without an analytics key.
    pub fn disabled() -> Self {
        Self::new(None, None)
    }

    pub fn is_enabled(&self) -> bool {
        self.endpoint.is_some()
    }

    /// Captures a single event with the given properties.
    pub async fn capture(&self, event: &str, properties: Value) {
        let (Some(endpoint), Some(api_key)) = (&self.endpoint, &self.api_key) else {
            return;
        };

        let payload = json!({
            "api_key": api_key,
            "event": event,
            "properties": properties,
            "timestamp": Utc::now().to_rfc3339(),
        });

        match self.client.post(endpoint.clone()).json(&payload).send().await {
            Ok(resp) if resp.status().is_success() => {
                tracing::debug!("Captured analytics event '{}'", event);
            }
            Ok(resp) => {
                tracing::warn!(
                    "Analytics capture for '{}' returned {}",
                    event,
                    resp.status()
                );
            }
            Err(e) => {
                tracing::warn!("Analytics capture for '{}' failed: {}", event, e);
            }
        }
    }

    /// Captures the event only the first time `identity` is seen in this
    /// process; later calls with the same identity are dropped. The claim on
    /// the identity is atomic, so concurrent callers cannot both fire.
    pub async fn capture_once(&self, identity: &str, event: &str, properties: Value) {
        let entry = self.fired.entry(identity.to_string()).or_insert(()).await;
        if !entry.is_fresh() {
            return;
        }
        self.capture(event, properties).await;
    }
}

/// Process-wide idempotent initialization.
///
/// The first call builds the client from the provided key/host; every later
/// call returns the already-initialized instance regardless of arguments.
pub fn init(api_key: Option<String>, host: Option<String>) -> Analytics {
    if INITIALIZED.swap(true, Ordering::SeqCst) {
        return INSTANCE.get().cloned().unwrap_or_else(Analytics::disabled);
    }
    INSTANCE.get_or_init(|| Analytics::new(api_key, host)).clone()
}
