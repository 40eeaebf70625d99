//! Server configuration, loaded from environment variables at startup.

/// Default system instruction prepended to every prompt.
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful, multilingual assistant. \
     Answer concisely in whichever language the user writes, \
     and stop—do not ask any follow-up questions.";

/// Runtime configuration for chatgate-server.
///
/// Every field except the signing secret has a sensible default so the
/// server works out-of-the-box against a local llama-server.  The secret
/// has no default on purpose: starting without one would silently issue
/// forgeable credentials, so [`Config::from_env`] fails instead.
#[derive(Debug, Clone)]
pub struct Config {
    /// TCP address to bind (default: `"0.0.0.0:3000"`).
    pub bind_address: String,

    /// SQLite (or other sqlx-compatible) database URL
    /// (default: `"sqlite://chatgate.db"`).
    pub database_url: String,

    /// Symmetric secret used to sign and verify access tokens.
    /// Required; the process refuses to start without it.
    pub secret: String,

    /// Streaming completion endpoint of the inference backend
    /// (default: `"http://127.0.0.1:8080/completion"`).
    pub backend_url: String,

    /// Access-token lifetime in minutes (default: 60).
    pub token_ttl_mins: i64,

    /// When `false`, `/api` routes are open – useful for LAN-only
    /// deployments where the gateway runs without accounts.
    pub auth_required: bool,

    /// When `false`, the caller-supplied history is ignored and every
    /// request is treated as a single-turn conversation.
    pub include_history: bool,

    /// System instruction prepended to every prompt.
    pub system_prompt: String,

    /// Comma-separated allow-list of CORS origins.  `None` falls back to a
    /// permissive wildcard suitable for development only.
    pub cors_allowed_origins: Option<String>,

    /// Seconds to wait for the next backend read before giving up on the
    /// stream (default: 300).  The backend itself has no deadline, so this
    /// is what keeps an unresponsive generation from pinning a relay slot.
    pub backend_read_timeout_secs: u64,

    /// Seconds to wait when opening the backend connection (default: 10).
    pub backend_connect_timeout_secs: u64,

    /// `tracing` filter string, e.g. `"info"` or `"debug,tower_http=warn"`.
    pub log_level: String,

    /// When `true`, emit log records as newline-delimited JSON.
    pub log_json: bool,
}

impl Config {
    /// Build [`Config`] from environment variables, falling back to defaults.
    ///
    /// Fails only when `CHATGATE_SECRET` is unset or empty.
    pub fn from_env() -> anyhow::Result<Self> {
        let secret = std::env::var("CHATGATE_SECRET").unwrap_or_default();
        if secret.is_empty() {
            anyhow::bail!("CHATGATE_SECRET is not set; refusing to start without a signing secret");
        }

        Ok(Self {
            bind_address: env_or("CHATGATE_BIND", "0.0.0.0:3000"),
            database_url: env_or("CHATGATE_DATABASE_URL", "sqlite://chatgate.db"),
            secret,
            backend_url: env_or("CHATGATE_BACKEND_URL", "http://127.0.0.1:8080/completion"),
            token_ttl_mins: parse_env("CHATGATE_TOKEN_TTL_MINS", 60),
            auth_required: bool_env("CHATGATE_AUTH_REQUIRED", true),
            include_history: bool_env("CHATGATE_INCLUDE_HISTORY", true),
            system_prompt: env_or("CHATGATE_SYSTEM_PROMPT", DEFAULT_SYSTEM_PROMPT),
            cors_allowed_origins: std::env::var("CHATGATE_CORS_ORIGINS").ok(),
            backend_read_timeout_secs: parse_env("CHATGATE_BACKEND_READ_TIMEOUT_SECS", 300),
            backend_connect_timeout_secs: parse_env("CHATGATE_BACKEND_CONNECT_TIMEOUT_SECS", 10),
            log_level: env_or("CHATGATE_LOG", "info"),
            log_json: bool_env("CHATGATE_LOG_JSON", false),
        })
    }
}

// ── private helpers ──────────────────────────────────────────────────────────

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_owned())
}

fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn bool_env(key: &str, default: bool) -> bool {
    std::env::var(key)
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(default)
}
