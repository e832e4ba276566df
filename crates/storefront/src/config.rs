//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Airtable (optional as a pair; without them the catalog runs on seed data)
//! - `AIRTABLE_API_KEY` - Personal access token (falls back to `VITE_AIRTABLE_API_KEY`)
//! - `AIRTABLE_BASE_ID` - Base id, `app...` (falls back to `VITE_AIRTABLE_BASE_ID`)
//!
//! ## Optional
//! - `MACHBAR_HOST` - Bind address (default: 127.0.0.1)
//! - `MACHBAR_PORT` - Listen port (default: 3000)
//! - `AIRTABLE_API_URL` - REST endpoint (default: <https://api.airtable.com/v0>)
//! - `AIRTABLE_MAKERS_TABLE` - Creators table (default: Makers)
//! - `AIRTABLE_PRODUCTS_TABLE` - Listings table (default: Products)
//! - `AIRTABLE_VIEW` - View to read from (default: Grid view; empty for none)
//! - `AIRTABLE_TIMEOUT_SECS` - Per-request timeout (default: 10)
//! - `AIRTABLE_MAKERS_CACHE_SECS` - Maker directory cache TTL (default: 300)
//! - `CATALOG_REFRESH_INTERVAL_SECS` - Periodic refresh, 0 disables (default: 0)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Error sample rate (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Trace sample rate (default: 0.0)

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use url::Url;

const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "your_",
    "changeme",
    "replace",
    "placeholder",
    "example",
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

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Remote catalog source; `None` runs on the bundled seed only
    pub airtable: Option<AirtableConfig>,
    /// Catalog refresh behaviour
    pub catalog: CatalogConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
    /// Fraction of errors sent to Sentry
    pub sentry_sample_rate: f32,
    /// Fraction of transactions traced
    pub sentry_traces_sample_rate: f32,
}

/// Airtable REST API configuration.
///
/// Implements `Debug` manually to redact the API key.
#[derive(Clone)]
pub struct AirtableConfig {
    /// REST endpoint, without the base id
    pub api_url: Url,
    /// Personal access token
    pub api_key: SecretString,
    /// Base id (`app...`)
    pub base_id: String,
    /// Creators table name
    pub makers_table: String,
    /// Listings table name
    pub products_table: String,
    /// View to list records from
    pub view: Option<String>,
    /// Per-request timeout
    pub timeout: Duration,
    /// How long the maker directory is reused between fetches
    pub makers_cache_ttl: Duration,
}

impl std::fmt::Debug for AirtableConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AirtableConfig")
            .field("api_url", &self.api_url.as_str())
            .field("api_key", &"[REDACTED]")
            .field("base_id", &self.base_id)
            .field("makers_table", &self.makers_table)
            .field("products_table", &self.products_table)
            .field("view", &self.view)
            .field("timeout", &self.timeout)
            .field("makers_cache_ttl", &self.makers_cache_ttl)
            .finish()
    }
}

/// Catalog store configuration.
#[derive(Debug, Clone, Copy, Default)]
pub struct CatalogConfig {
    /// Interval between background refreshes; `None` refreshes once at start-up
    pub refresh_interval: Option<Duration>,
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but invalid, or if the
    /// Airtable key fails validation (placeholder detection, entropy check).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let host = parse_env_or_default::<IpAddr>("MACHBAR_HOST", "127.0.0.1")?;
        let port = parse_env_or_default::<u16>("MACHBAR_PORT", "3000")?;
        let airtable = AirtableConfig::from_env()?;
        let catalog = CatalogConfig::from_env()?;

        Ok(Self {
            host,
            port,
            airtable,
            catalog,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
            sentry_sample_rate: parse_env_or_default("SENTRY_SAMPLE_RATE", "1.0")?,
            sentry_traces_sample_rate: parse_env_or_default("SENTRY_TRACES_SAMPLE_RATE", "0.0")?,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl AirtableConfig {
    /// Load the Airtable section.
    ///
    /// Returns `Ok(None)` when the key or the base id is not set at all.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if any Airtable variable is set but invalid.
    pub fn from_env() -> Result<Option<Self>, ConfigError> {
        let api_key = get_env_with_fallback("AIRTABLE_API_KEY", "VITE_AIRTABLE_API_KEY");
        let base_id = get_env_with_fallback("AIRTABLE_BASE_ID", "VITE_AIRTABLE_BASE_ID");
        let (Some(api_key), Some(base_id)) = (api_key, base_id) else {
            return Ok(None);
        };

        validate_secret_strength(&api_key, "AIRTABLE_API_KEY")?;
        validate_base_id(&base_id)?;

        let api_url = Url::parse(&get_env_or_default(
            "AIRTABLE_API_URL",
            "https://api.airtable.com/v0",
        ))
        .map_err(|e| ConfigError::InvalidEnvVar("AIRTABLE_API_URL".to_string(), e.to_string()))?;

        let view = get_env_or_default("AIRTABLE_VIEW", "Grid view");

        Ok(Some(Self {
            api_url,
            api_key: SecretString::from(api_key),
            base_id,
            makers_table: get_env_or_default("AIRTABLE_MAKERS_TABLE", "Makers"),
            products_table: get_env_or_default("AIRTABLE_PRODUCTS_TABLE", "Products"),
            view: Some(view).filter(|v| !v.trim().is_empty()),
            timeout: Duration::from_secs(parse_env_or_default("AIRTABLE_TIMEOUT_SECS", "10")?),
            makers_cache_ttl: Duration::from_secs(parse_env_or_default(
                "AIRTABLE_MAKERS_CACHE_SECS",
                "300",
            )?),
        }))
    }

    /// Expose the API key for building the authorization header.
    pub(crate) fn bearer_token(&self) -> &str {
        self.api_key.expose_secret()
    }
}

impl CatalogConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let secs: u64 = parse_env_or_default("CATALOG_REFRESH_INTERVAL_SECS", "0")?;
        Ok(Self {
            refresh_interval: (secs > 0).then(|| Duration::from_secs(secs)),
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    get_optional_env(key).unwrap_or_else(|| default.to_string())
}

/// Try `primary`, then the legacy `fallback` name (the `VITE_` names used by
/// the browser build).
fn get_env_with_fallback(primary: &str, fallback: &str) -> Option<String> {
    get_optional_env(primary).or_else(|| get_optional_env(fallback))
}

/// Parse an environment variable, using `default` when it is unset.
fn parse_env_or_default<T>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    get_env_or_default(key, default)
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

/// Airtable base ids look like `appXXXXXXXXXXXXXX`.
fn validate_base_id(base_id: &str) -> Result<(), ConfigError> {
    if base_id.starts_with("app") && base_id.chars().all(|c| c.is_ascii_alphanumeric()) {
        Ok(())
    } else {
        Err(ConfigError::InvalidEnvVar(
            "AIRTABLE_BASE_ID".to_string(),
            "expected an id of the form appXXXXXXXXXXXXXX".to_string(),
        ))
    }
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
    let len = s.chars().count() as f64;
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

    // Check blocklist
    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    // Real access tokens are long random strings
    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Paste the real access token."
            ),
        ));
    }

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn airtable_config() -> AirtableConfig {
        AirtableConfig {
            api_url: Url::parse("https://api.airtable.com/v0").unwrap(),
            api_key: SecretString::from("patQ8vXk2LmN4rT7.super_secret_token_value"),
            base_id: "appAbC123dEf456Gh".to_string(),
            makers_table: "Makers".to_string(),
            products_table: "Products".to_string(),
            view: Some("Grid view".to_string()),
            timeout: Duration::from_secs(10),
            makers_cache_ttl: Duration::from_secs(300),
        }
    }

    #[test]
    fn test_shannon_entropy_empty() {
        assert!((shannon_entropy("") - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_shannon_entropy_single_char() {
        // All same character = 0 entropy
        assert!((shannon_entropy("aaaaaaa") - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_shannon_entropy_two_chars() {
        let entropy = shannon_entropy("ab");
        assert!((entropy - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_validate_secret_strength_placeholder() {
        let result = validate_secret_strength("your-airtable-key", "AIRTABLE_API_KEY");
        assert!(matches!(result, Err(ConfigError::InsecureSecret(_, _))));
    }

    #[test]
    fn test_validate_secret_strength_low_entropy() {
        let result = validate_secret_strength("patpatpatpatpatpat", "AIRTABLE_API_KEY");
        assert!(matches!(result, Err(ConfigError::InsecureSecret(_, _))));
    }

    #[test]
    fn test_validate_secret_strength_valid() {
        let result = validate_secret_strength(
            "patQ8vXk2LmN4rT7.9f3e1c0b7a6d5e4f3a2b1c0d9e8f7a6b",
            "AIRTABLE_API_KEY",
        );
        assert!(result.is_ok());
    }

    #[test]
    fn test_validate_base_id() {
        assert!(validate_base_id("appAbC123dEf456Gh").is_ok());
        assert!(validate_base_id("tblAbC123").is_err());
        assert!(validate_base_id("app with spaces").is_err());
    }

    #[test]
    fn test_socket_addr() {
        let config = StorefrontConfig {
            host: "127.0.0.1".parse().unwrap(),
            port: 3000,
            airtable: None,
            catalog: CatalogConfig::default(),
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 0.0,
        };

        let addr = config.socket_addr();
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 3000);
    }

    #[test]
    fn test_airtable_config_debug_redacts_key() {
        let debug_output = format!("{:?}", airtable_config());

        assert!(debug_output.contains("appAbC123dEf456Gh"));
        assert!(debug_output.contains("Makers"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("super_secret_token_value"));
    }
}
