//! Storefront client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All variables are optional.
//!
//! - `RELUX_API_URL` - Base URL of the Relux API (default: `https://reloxapi.online/api`)
//! - `RELUX_STATE_DIR` - Directory for durable client state (default: `<data dir>/relux`)
//! - `RELUX_PER_PAGE` - Products per shop page (default: 50)
//! - `RELUX_SEARCH_DEBOUNCE_MS` - Quiet period before a search is sent (default: 300)
//! - `RELUX_PRODUCT_CACHE_TTL_SECS` - Product listing cache lifetime, 0 disables (default: 60)
//! - `RELUX_HTTP_TIMEOUT_SECS` - Per-request timeout (default: none)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

/// Production API endpoint.
pub const DEFAULT_API_URL: &str = "https://reloxapi.online/api";

const DEFAULT_PER_PAGE: u32 = 50;
const DEFAULT_DEBOUNCE_MS: u64 = 300;
const DEFAULT_CACHE_TTL_SECS: u64 = 60;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Could not determine a state directory; set RELUX_STATE_DIR")]
    NoStateDir,
}

/// Storefront client configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// Base URL of the Relux API, always ending in `/`
    pub api_url: Url,
    /// Directory holding the durable key-value store
    pub state_dir: PathBuf,
    /// Products requested per shop page
    pub per_page: u32,
    /// Quiet period before a search request is sent
    pub search_debounce: Duration,
    /// Lifetime of cached product listings (`None` disables caching)
    pub product_cache_ttl: Option<Duration>,
    /// Per-request timeout (`None` keeps the HTTP client default)
    pub http_timeout: Option<Duration>,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an unparseable value or
    /// no state directory can be determined.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let api_url = parse_api_url(&get_env_or_default("RELUX_API_URL", DEFAULT_API_URL))?;
        let state_dir = match get_optional_env("RELUX_STATE_DIR") {
            Some(dir) => PathBuf::from(dir),
            None => default_state_dir()?,
        };
        let per_page = get_parsed_or_default("RELUX_PER_PAGE", DEFAULT_PER_PAGE)?;
        let debounce_ms = get_parsed_or_default("RELUX_SEARCH_DEBOUNCE_MS", DEFAULT_DEBOUNCE_MS)?;
        let cache_ttl = get_parsed_or_default("RELUX_PRODUCT_CACHE_TTL_SECS", DEFAULT_CACHE_TTL_SECS)?;
        let http_timeout = get_optional_env("RELUX_HTTP_TIMEOUT_SECS")
            .map(|v| parse_value::<u64>("RELUX_HTTP_TIMEOUT_SECS", &v))
            .transpose()?
            .map(Duration::from_secs);

        Ok(Self {
            api_url,
            state_dir,
            per_page: per_page.max(1),
            search_debounce: Duration::from_millis(debounce_ms),
            product_cache_ttl: (cache_ttl > 0).then(|| Duration::from_secs(cache_ttl)),
            http_timeout,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
        })
    }

    /// Configuration for a given API and state directory with default tuning.
    ///
    /// Used by tests and embedders that do not read the environment.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if `api_url` is not a valid http(s) URL.
    pub fn new(api_url: &str, state_dir: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        Ok(Self {
            api_url: parse_api_url(api_url)?,
            state_dir: state_dir.into(),
            per_page: DEFAULT_PER_PAGE,
            search_debounce: Duration::from_millis(DEFAULT_DEBOUNCE_MS),
            product_cache_ttl: Some(Duration::from_secs(DEFAULT_CACHE_TTL_SECS)),
            http_timeout: None,
            sentry_dsn: None,
            sentry_environment: None,
        })
    }

    /// Path of the durable key-value store file.
    #[must_use]
    pub fn storage_path(&self) -> PathBuf {
        self.state_dir.join("storage.json")
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Parse the API base URL, normalizing it to end with `/` so relative joins
/// keep the path prefix (`/api`).
fn parse_api_url(raw: &str) -> Result<Url, ConfigError> {
    let invalid = |msg: String| ConfigError::InvalidEnvVar("RELUX_API_URL".to_string(), msg);

    let mut url = Url::parse(raw.trim()).map_err(|e| invalid(e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme '{}'", url.scheme())));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

fn default_state_dir() -> Result<PathBuf, ConfigError> {
    dirs::data_dir()
        .map(|dir| dir.join("relux"))
        .ok_or(ConfigError::NoStateDir)
}

/// Get an optional environment variable, treating empty values as unset.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    get_optional_env(key).unwrap_or_else(|| default.to_string())
}

fn parse_value<T>(key: &str, value: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

fn get_parsed_or_default<T>(key: &str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    get_optional_env(key).map_or(Ok(default), |v| parse_value(key, &v))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_api_url_gets_trailing_slash() {
        let url = parse_api_url("https://reloxapi.online/api").unwrap();
        assert_eq!(url.as_str(), "https://reloxapi.online/api/");
        assert_eq!(url.join("cart/items").unwrap().path(), "/api/cart/items");
    }

    #[test]
    fn test_api_url_keeps_existing_slash() {
        let url = parse_api_url("http://127.0.0.1:8080/").unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:8080/");
    }

    #[test]
    fn test_api_url_rejects_other_schemes() {
        let err = parse_api_url("ftp://reloxapi.online/api").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(_, _)));
        assert!(parse_api_url("not a url").is_err());
    }

    #[test]
    fn test_parse_value_reports_key() {
        let err = parse_value::<u32>("RELUX_PER_PAGE", "fifty").unwrap_err();
        assert!(err.to_string().contains("RELUX_PER_PAGE"));
        assert_eq!(parse_value::<u32>("RELUX_PER_PAGE", " 24 ").unwrap(), 24);
    }

    #[test]
    fn test_new_uses_defaults() {
        let config = StorefrontConfig::new("http://localhost:8000/api", "/tmp/relux").unwrap();
        assert_eq!(config.per_page, 50);
        assert_eq!(config.search_debounce, Duration::from_millis(300));
        assert_eq!(config.storage_path(), PathBuf::from("/tmp/relux/storage.json"));
        assert!(config.http_timeout.is_none());
    }
}
