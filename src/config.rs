/*
 * Responsibility
 * - read settings from the environment (PORT, SUPABASE_URL, cookie/guard tuning, ...)
 * - validate values (malformed numbers/URLs fail startup)
 * - decide skip-auth mode: missing or placeholder provider credentials are NOT an error
 */
use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use url::Url;

use crate::middleware::guard::policy::DEFAULT_EXCLUDED_PREFIXES;

/// Values shipped in `.env.example`; treated the same as "not set".
const PLACEHOLDER_PROVIDER_URL: &str = "your-supabase-url-here";
const PLACEHOLDER_ANON_KEY: &str = "your-anon-key-here";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    fn parse(raw: Option<String>) -> Self {
        match raw
            .unwrap_or_else(|| "development".to_string())
            .to_ascii_lowercase()
            .as_str()
        {
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Invalid(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Invalid(key) => write!(f, "invalid configuration: {}", key),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Connection details for the hosted backend (auth + data share one project URL).
#[derive(Clone)]
pub struct ProviderConfig {
    pub url: Url,
    pub anon_key: String,
}

impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // anon_key omitted
        f.debug_struct("ProviderConfig")
            .field("url", &self.url.as_str())
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub addr: SocketAddr,
    pub app_env: AppEnv,
    pub public_base_url: Url,
    pub cors_allowed_origins: Vec<String>,

    /// `None` => skip-auth mode.
    pub provider: Option<ProviderConfig>,
    pub provider_timeout: Duration,

    pub session_refresh_margin_seconds: i64,
    pub session_cookie_secure: bool,
    pub session_cookie_max_age_seconds: i64,

    pub guard_excluded_prefixes: Vec<String>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the config from an arbitrary key lookup (the process env in production).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let port: u16 = match lookup("PORT") {
            Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid("PORT"))?,
            None => 3000,
        };

        let addr: SocketAddr = SocketAddr::from_str(&format!("0.0.0.0:{}", port))
            .map_err(|_| ConfigError::Invalid("PORT"))?;

        let app_env = AppEnv::parse(lookup("APP_ENV"));

        let public_base_url = lookup("PUBLIC_BASE_URL")
            .unwrap_or_else(|| format!("http://localhost:{}", port));
        let public_base_url =
            Url::parse(public_base_url.trim()).map_err(|_| ConfigError::Invalid("PUBLIC_BASE_URL"))?;

        let cors_allowed_origins = split_list(lookup("CORS_ALLOWED_ORIGINS"));

        let provider = provider_config(lookup("SUPABASE_URL"), lookup("SUPABASE_ANON_KEY"))?;

        let provider_timeout_ms: u64 = parse_or("PROVIDER_TIMEOUT_MS", lookup("PROVIDER_TIMEOUT_MS"), 500)?;
        if provider_timeout_ms == 0 {
            return Err(ConfigError::Invalid("PROVIDER_TIMEOUT_MS"));
        }

        let session_refresh_margin_seconds = parse_or(
            "SESSION_REFRESH_MARGIN_SECONDS",
            lookup("SESSION_REFRESH_MARGIN_SECONDS"),
            60,
        )?;

        let session_cookie_secure = match lookup("SESSION_COOKIE_SECURE") {
            Some(raw) => parse_bool(&raw).ok_or(ConfigError::Invalid("SESSION_COOKIE_SECURE"))?,
            None => app_env.is_production(),
        };

        let session_cookie_max_age_seconds = parse_or(
            "SESSION_COOKIE_MAX_AGE_SECONDS",
            lookup("SESSION_COOKIE_MAX_AGE_SECONDS"),
            7 * 24 * 60 * 60,
        )?;

        let guard_excluded_prefixes = match lookup("GUARD_EXCLUDED_PREFIXES") {
            Some(raw) => split_list(Some(raw)),
            None => DEFAULT_EXCLUDED_PREFIXES
                .iter()
                .map(|p| p.to_string())
                .collect(),
        };

        Ok(Self {
            addr,
            app_env,
            public_base_url,
            cors_allowed_origins,
            provider,
            provider_timeout: Duration::from_millis(provider_timeout_ms),
            session_refresh_margin_seconds,
            session_cookie_secure,
            session_cookie_max_age_seconds,
            guard_excluded_prefixes,
        })
    }

    pub fn skip_auth(&self) -> bool {
        self.provider.is_none()
    }
}

fn provider_config(
    url: Option<String>,
    anon_key: Option<String>,
) -> Result<Option<ProviderConfig>, ConfigError> {
    let url = url.map(|v| v.trim().to_string()).unwrap_or_default();
    let anon_key = anon_key.map(|v| v.trim().to_string()).unwrap_or_default();

    if url.is_empty()
        || anon_key.is_empty()
        || url == PLACEHOLDER_PROVIDER_URL
        || anon_key == PLACEHOLDER_ANON_KEY
    {
        return Ok(None);
    }

    let url = Url::parse(&url).map_err(|_| ConfigError::Invalid("SUPABASE_URL"))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::Invalid("SUPABASE_URL"));
    }

    Ok(Some(ProviderConfig { url, anon_key }))
}

fn parse_or<T: FromStr>(key: &'static str, raw: Option<String>, default: T) -> Result<T, ConfigError> {
    match raw {
        Some(v) => v.trim().parse().map_err(|_| ConfigError::Invalid(key)),
        None => Ok(default),
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn split_list(raw: Option<String>) -> Vec<String> {
    raw.unwrap_or_default()
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
