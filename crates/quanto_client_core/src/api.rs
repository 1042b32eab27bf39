//! HTTP client for the exchange-rate provider (openexchangerates.org).
use crate::models::ExchangeRatesResponse;
use once_cell::sync::Lazy;

pub const DEFAULT_BASE_URL: &str = "https://openexchangerates.org/api";
pub const APP_ID_ENV: &str = "QUANTO_OXR_APP_ID";
pub const BASE_URL_ENV: &str = "QUANTO_RATES_BASE_URL";

static CLIENT: Lazy<reqwest::Client> = Lazy::new(|| {
    reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(30))
        .build()
        .expect("reqwest client")
});

static RUNTIME: Lazy<tokio::runtime::Runtime> = Lazy::new(|| {
    tokio::runtime::Runtime::new().expect("tokio runtime")
});

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RatesConfig {
    pub base_url: String,
    pub app_id: String,
}

impl RatesConfig {
    pub fn new(base_url: impl Into<String>, app_id: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: if base_url.trim().is_empty() {
                DEFAULT_BASE_URL.to_string()
            } else {
                base_url.trim_end_matches('/').to_string()
            },
            app_id: app_id.into(),
        }
    }

    pub fn from_env() -> Self {
        Self::new(
            std::env::var(BASE_URL_ENV).unwrap_or_default(),
            std::env::var(APP_ID_ENV).unwrap_or_default(),
        )
    }

    fn latest_url(&self) -> String {
        format!("{}/latest.json", self.base_url)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RatesError {
    #[error("Missing API key. Set QUANTO_OXR_APP_ID in your environment or call set_rates_config.")]
    MissingAppId,
    #[error("{0}")]
    Api(String),
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("Invalid rates response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl RatesError {
    /// Worth backing off for (as opposed to a configuration problem).
    pub fn is_transient(&self) -> bool {
        match self {
            RatesError::MissingAppId => false,
            RatesError::Api(_) | RatesError::Network(_) | RatesError::Decode(_) => true,
        }
    }
}

/// Error for a non-success status: the provider's `message` when the body has
/// one, else `API error: <status>`.
pub(crate) fn error_from_body(status: u16, body: &str) -> RatesError {
    let message = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|json| json.get("message").and_then(|v| v.as_str()).map(String::from))
        .filter(|m| !m.is_empty());
    RatesError::Api(message.unwrap_or_else(|| format!("API error: {}", status)))
}

pub(crate) fn parse_rates_body(body: &str) -> Result<ExchangeRatesResponse, RatesError> {
    Ok(serde_json::from_str(body)?)
}

async fn get_latest(url: &str, app_id: &str) -> Result<ExchangeRatesResponse, RatesError> {
    let resp = CLIENT.get(url).query(&[("app_id", app_id)]).send().await?;
    let status = resp.status();
    let text = resp.text().await?;
    if !status.is_success() {
        return Err(error_from_body(status.as_u16(), &text));
    }
    parse_rates_body(&text)
}

/// GET {base_url}/latest.json?app_id=...
pub fn fetch_latest_rates(config: &RatesConfig) -> Result<ExchangeRatesResponse, RatesError> {
    if config.app_id.trim().is_empty() {
        return Err(RatesError::MissingAppId);
    }
    RUNTIME.block_on(get_latest(&config.latest_url(), &config.app_id))
}
