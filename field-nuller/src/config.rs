use crate::types::{NullerError, Result, MAX_BATCH_SIZE};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use url::Url;

pub const DEFAULT_BASE_URL: &str = "https://api.example.com/v1";
pub const DEFAULT_TOKEN_URL: &str = "https://auth.example.com/oauth/token";
pub const DEFAULT_FLOW: &str = "client_credentials";
pub const DEFAULT_SCOPE: &str = "contacts.write";

/// Settings resolved once at startup and handed to every component that
/// needs them.
#[derive(Debug, Clone)]
pub struct Config {
    pub base_url: String,
    pub token_url: String,
    /// OAuth grant type sent to the token endpoint
    pub flow: String,
    pub scope: String,
    pub batch_size: usize,
    pub dispatch_delay: Duration,
    pub request_timeout: Duration,
    pub user_agent: String,
    pub output_dir: PathBuf,
    pub api_key: Option<String>,
    pub api_secret: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            token_url: DEFAULT_TOKEN_URL.to_string(),
            flow: DEFAULT_FLOW.to_string(),
            scope: DEFAULT_SCOPE.to_string(),
            batch_size: MAX_BATCH_SIZE,
            dispatch_delay: Duration::from_millis(1000),
            request_timeout: Duration::from_secs(30),
            user_agent: format!("field-nuller/{}", env!("CARGO_PKG_VERSION")),
            output_dir: PathBuf::from("output"),
            api_key: None,
            api_secret: None,
        }
    }
}

impl Config {
    /// Load `.env` if present, then read the process environment.
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Unset or blank keys keep defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let mut config = Self::default();

        if let Some(value) = get("BASE_URL") {
            config.base_url = parse_url("BASE_URL", &value)?;
        }
        if let Some(value) = get("TOKEN_URL") {
            config.token_url = parse_url("TOKEN_URL", &value)?;
        }
        if let Some(value) = get("FLOW") {
            config.flow = value;
        }
        if let Some(value) = get("SCOPE") {
            config.scope = value;
        }
        if let Some(value) = get("BATCH_SIZE") {
            let size: usize = parse_number("BATCH_SIZE", &value)?;
            config.batch_size = size.clamp(1, MAX_BATCH_SIZE);
        }
        if let Some(value) = get("DISPATCH_DELAY_MS") {
            config.dispatch_delay = Duration::from_millis(parse_number("DISPATCH_DELAY_MS", &value)?);
        }
        if let Some(value) = get("REQUEST_TIMEOUT_SECS") {
            config.request_timeout = Duration::from_secs(parse_number("REQUEST_TIMEOUT_SECS", &value)?);
        }
        if let Some(value) = get("OUTPUT_DIR") {
            config.output_dir = PathBuf::from(value);
        }
        config.api_key = get("API_KEY");
        config.api_secret = get("API_SECRET");

        Ok(config)
    }

    /// `{base_url}/contacts/update`, tolerating a trailing slash on the base.
    pub fn update_url(&self) -> String {
        format!("{}/contacts/update", self.base_url.trim_end_matches('/'))
    }

    /// Where the built batches are staged before dispatch.
    pub fn staging_path(&self) -> PathBuf {
        self.output_dir.join("batches.json")
    }

    /// Directory holding one result artifact per batch.
    pub fn results_dir(&self) -> PathBuf {
        self.output_dir.join("results")
    }
}

fn parse_url(key: &str, value: &str) -> Result<String> {
    let url = Url::parse(value)?;
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(NullerError::Config(format!(
            "{} must be an http(s) URL, got {}",
            key, value
        )));
    }
    Ok(value.to_string())
}

fn parse_number<T: FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .parse()
        .map_err(|_| NullerError::Config(format!("{} is not a valid number: {}", key, value)))
}
