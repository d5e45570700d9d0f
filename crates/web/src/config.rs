//! App configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `SHOPIFY_API_KEY` - App client ID (also injected into the frontend HTML)
//! - `SHOPIFY_API_SECRET` - App client secret (OAuth, webhook HMAC, session tokens)
//! - `SHOPIFY_APP_URL` (or `HOST`) - Public URL the app is served from
//!
//! ## Optional
//! - `BACKEND_PORT` / `PORT` - Listen port (default: 3000, `BACKEND_PORT` wins)
//! - `BACKEND_HOST` - Bind address (default: 0.0.0.0)
//! - `NODE_ENV` - `production` serves `frontend/dist`, anything else `frontend/`
//! - `SCOPES` - Comma separated Admin API access scopes
//! - `SHOPIFY_API_VERSION` - API version (default: 2026-01)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT`, `SENTRY_SAMPLE_RATE`, `SENTRY_TRACES_SAMPLE_RATE`

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};

use merchant_app_core::AuthScopes;
use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

const DEFAULT_PORT: &str = "3000";
const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_API_VERSION: &str = "2026-01";
const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "secret",
    "password",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "enter-",
    "put-your",
    "add-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Runtime environment, selected by `NODE_ENV`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    /// `NODE_ENV=production`: serve the built frontend, JSON logs.
    Production,
    /// Anything else: serve the frontend sources, text logs.
    Development,
}

impl Environment {
    fn from_node_env(value: Option<&str>) -> Self {
        match value {
            Some("production") => Self::Production,
            _ => Self::Development,
        }
    }

    /// Returns `true` in production.
    #[must_use]
    pub const fn is_production(self) -> bool {
        matches!(self, Self::Production)
    }
}

/// Application configuration.
///
/// Built once at startup and handed to the router through `AppState`;
/// nothing reads the environment after that.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Runtime environment
    pub environment: Environment,
    /// Directory the frontend is served from
    pub static_path: PathBuf,
    /// Public app URL without trailing slash (e.g. `https://app.example.com`)
    pub app_url: String,
    /// Shopify app credentials
    pub shopify: ShopifyAppConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g., "development", "staging", "production")
    pub sentry_environment: Option<String>,
    /// Sentry error sample rate (0.0 to 1.0)
    pub sentry_sample_rate: f32,
    /// Sentry traces sample rate for performance monitoring (0.0 to 1.0)
    pub sentry_traces_sample_rate: f32,
}

/// Shopify app credentials and API settings.
///
/// Implements `Debug` manually to redact the client secret.
#[derive(Clone)]
pub struct ShopifyAppConfig {
    /// App client ID
    pub api_key: String,
    /// App client secret
    pub api_secret: SecretString,
    /// Access scopes requested during OAuth
    pub scopes: AuthScopes,
    /// Admin API version (e.g., 2026-01)
    pub api_version: String,
}

impl std::fmt::Debug for ShopifyAppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShopifyAppConfig")
            .field("api_key", &self.api_key)
            .field("api_secret", &"[REDACTED]")
            .field("scopes", &self.scopes)
            .field("api_version", &self.api_version)
            .finish()
    }
}

impl AppConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if secrets fail validation (placeholder detection, entropy check).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let cwd = std::env::current_dir().map_err(|e| {
            ConfigError::InvalidEnvVar("current directory".to_string(), e.to_string())
        })?;

        Self::from_lookup(|key| std::env::var(key).ok(), &cwd)
    }

    /// Load configuration from an arbitrary variable source.
    ///
    /// `cwd` is the directory the frontend paths are resolved against.
    ///
    /// # Errors
    ///
    /// Same as [`AppConfig::from_env`].
    pub fn from_lookup<F>(lookup: F, cwd: &Path) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let vars = Vars(&lookup);

        let port_raw = vars
            .optional("BACKEND_PORT")
            .or_else(|| vars.optional("PORT"))
            .unwrap_or_else(|| DEFAULT_PORT.to_string());
        let port = port_raw
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("BACKEND_PORT".to_string(), e.to_string()))?;
        let host = vars
            .or_default("BACKEND_HOST", DEFAULT_HOST)
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("BACKEND_HOST".to_string(), e.to_string()))?;

        let environment = Environment::from_node_env(vars.optional("NODE_ENV").as_deref());
        let static_path = static_path_for(environment, cwd);

        let app_url = vars
            .optional("SHOPIFY_APP_URL")
            .or_else(|| vars.optional("HOST"))
            .ok_or_else(|| ConfigError::MissingEnvVar("SHOPIFY_APP_URL".to_string()))?;
        let app_url = normalize_app_url(&app_url)?;

        let shopify = ShopifyAppConfig::from_vars(&vars)?;

        let sentry_dsn = vars.optional("SENTRY_DSN");
        let sentry_environment = vars.optional("SENTRY_ENVIRONMENT");
        let sentry_sample_rate = vars
            .optional("SENTRY_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(1.0);
        let sentry_traces_sample_rate = vars
            .optional("SENTRY_TRACES_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(1.0);

        Ok(Self {
            host,
            port,
            environment,
            static_path,
            app_url,
            shopify,
            sentry_dsn,
            sentry_environment,
            sentry_sample_rate,
            sentry_traces_sample_rate,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Path of the frontend entry document.
    #[must_use]
    pub fn index_html_path(&self) -> PathBuf {
        self.static_path.join("index.html")
    }

    /// OAuth redirect URI registered with Shopify.
    #[must_use]
    pub fn oauth_callback_url(&self) -> String {
        format!("{}{}", self.app_url, crate::routes::auth::CALLBACK_PATH)
    }
}

impl ShopifyAppConfig {
    fn from_vars<F>(vars: &Vars<'_, F>) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_secret = vars.required("SHOPIFY_API_SECRET")?;
        validate_secret_strength(&api_secret, "SHOPIFY_API_SECRET")?;

        Ok(Self {
            api_key: vars.required("SHOPIFY_API_KEY")?,
            api_secret: SecretString::from(api_secret),
            scopes: AuthScopes::parse(&vars.optional("SCOPES").unwrap_or_default()),
            api_version: vars.or_default("SHOPIFY_API_VERSION", DEFAULT_API_VERSION),
        })
    }

    /// The client secret as bytes, for HMAC and JWT keys.
    #[must_use]
    pub fn secret_bytes(&self) -> &[u8] {
        self.api_secret.expose_secret().as_bytes()
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Variable source wrapper. Empty values count as unset.
struct Vars<'a, F>(&'a F);

impl<F> Vars<'_, F>
where
    F: Fn(&str) -> Option<String>,
{
    /// Get a required variable.
    fn required(&self, key: &str) -> Result<String, ConfigError> {
        self.optional(key)
            .ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
    }

    /// Get an optional variable.
    fn optional(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|value| !value.is_empty())
    }

    /// Get a variable with a default value.
    fn or_default(&self, key: &str, default: &str) -> String {
        self.optional(key).unwrap_or_else(|| default.to_string())
    }
}

/// Frontend directory for the given environment.
fn static_path_for(environment: Environment, cwd: &Path) -> PathBuf {
    match environment {
        Environment::Production => cwd.join("frontend").join("dist"),
        Environment::Development => cwd.join("frontend"),
    }
}

/// Validate the public app URL and strip any trailing slash.
fn normalize_app_url(raw: &str) -> Result<String, ConfigError> {
    let parsed = url::Url::parse(raw)
        .map_err(|e| ConfigError::InvalidEnvVar("SHOPIFY_APP_URL".to_string(), e.to_string()))?;

    if !matches!(parsed.scheme(), "http" | "https") || parsed.host_str().is_none() {
        return Err(ConfigError::InvalidEnvVar(
            "SHOPIFY_APP_URL".to_string(),
            "must be an absolute http(s) URL".to_string(),
        ));
    }

    Ok(raw.trim_end_matches('/').to_string())
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.len() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)] // Character count will never exceed f64 precision
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is not a placeholder and has sufficient entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use the secret from the Partner Dashboard."
            ),
        ));
    }

    Ok(())
}
