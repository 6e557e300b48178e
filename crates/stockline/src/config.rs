//! Configuration for the LINE stock bot

use crate::error::{Result, StockError};
use stockline_utils::{EnvSource, ProcessEnv};
use std::fmt;
use std::time::Duration;

/// Model used for the analysis report when `OPENAI_MODEL` is unset
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo-1106";

/// Default OpenAI endpoint
pub const DEFAULT_OPENAI_API_BASE: &str = "https://api.openai.com/v1";

/// Longest price window accepted for the price and chart commands
pub const MAX_DAYS: i64 = 3650;

/// Configuration for the bot and its external collaborators
#[derive(Clone)]
pub struct BotConfig {
    /// LINE channel access token (Bearer token for the reply API)
    pub channel_access_token: String,

    /// LINE channel secret (HMAC key for webhook signatures)
    pub channel_secret: String,

    /// Imgur client id; chart replies are disabled without it
    pub imgur_client_id: Option<String>,

    /// OpenAI API key; analysis reports are disabled without it
    pub openai_api_key: Option<String>,

    /// OpenAI-compatible API base URL
    pub openai_api_base: String,

    /// Chat model used for reports
    pub openai_model: String,

    /// Timeout for data, news, image and LINE requests
    pub request_timeout: Duration,

    /// Timeout for the LLM request
    pub llm_timeout: Duration,

    /// Calendar days of prices shown by the price-info command
    pub price_days: i64,

    /// Calendar days of prices drawn by the chart command
    pub chart_days: i64,

    /// Number of news articles fetched per query
    pub news_limit: usize,

    /// Port the webhook server listens on
    pub port: u16,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            channel_access_token: String::new(),
            channel_secret: String::new(),
            imgur_client_id: None,
            openai_api_key: None,
            openai_api_base: DEFAULT_OPENAI_API_BASE.to_string(),
            openai_model: DEFAULT_MODEL.to_string(),
            request_timeout: Duration::from_secs(30),
            llm_timeout: Duration::from_secs(120),
            price_days: 10,
            chart_days: 31,
            news_limit: 5,
            port: 5000,
        }
    }
}

impl fmt::Debug for BotConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn redact(value: &str) -> &'static str {
            if value.is_empty() { "<unset>" } else { "<redacted>" }
        }

        f.debug_struct("BotConfig")
            .field("channel_access_token", &redact(&self.channel_access_token))
            .field("channel_secret", &redact(&self.channel_secret))
            .field("imgur_client_id", &self.imgur_client_id.as_deref().map(redact))
            .field("openai_api_key", &self.openai_api_key.as_deref().map(redact))
            .field("openai_api_base", &self.openai_api_base)
            .field("openai_model", &self.openai_model)
            .field("request_timeout", &self.request_timeout)
            .field("llm_timeout", &self.llm_timeout)
            .field("price_days", &self.price_days)
            .field("chart_days", &self.chart_days)
            .field("news_limit", &self.news_limit)
            .field("port", &self.port)
            .finish()
    }
}

impl BotConfig {
    /// Create a new configuration builder
    pub fn builder() -> BotConfigBuilder {
        BotConfigBuilder::default()
    }

    /// Load configuration from the process environment
    ///
    /// Both the lower-case names used by the original deployment
    /// (`channel_access_token`, `channel_secret`, `openai_api_key`) and
    /// conventional upper-case names are accepted.
    pub fn from_env() -> Result<Self> {
        Self::from_source(&ProcessEnv)
    }

    /// Load configuration from any [`EnvSource`]
    pub fn from_source(env: &impl EnvSource) -> Result<Self> {
        let defaults = Self::default();

        let config = Self {
            channel_access_token: env
                .require(&["channel_access_token", "LINE_CHANNEL_ACCESS_TOKEN"])?,
            channel_secret: env.require(&["channel_secret", "LINE_CHANNEL_SECRET"])?,
            imgur_client_id: env.first_of(&["IMGUR_CLIENT_ID", "imgur_client_id"]),
            openai_api_key: env.first_of(&["openai_api_key", "OPENAI_API_KEY"]),
            openai_api_base: env
                .first_of(&["OPENAI_API_BASE"])
                .unwrap_or(defaults.openai_api_base),
            openai_model: env
                .first_of(&["OPENAI_MODEL"])
                .unwrap_or(defaults.openai_model),
            request_timeout: Duration::from_secs(
                env.parse_or("REQUEST_TIMEOUT_SECS", defaults.request_timeout.as_secs())?,
            ),
            llm_timeout: Duration::from_secs(
                env.parse_or("LLM_TIMEOUT_SECS", defaults.llm_timeout.as_secs())?,
            ),
            price_days: env.parse_or("PRICE_DAYS", defaults.price_days)?,
            chart_days: env.parse_or("CHART_DAYS", defaults.chart_days)?,
            news_limit: env.parse_or("NEWS_LIMIT", defaults.news_limit)?,
            port: env.parse_or("PORT", defaults.port)?,
        };

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.channel_access_token.trim().is_empty() {
            return Err(StockError::ConfigError(
                "LINE channel access token is required".to_string(),
            ));
        }

        if self.channel_secret.trim().is_empty() {
            return Err(StockError::ConfigError(
                "LINE channel secret is required".to_string(),
            ));
        }

        if self.price_days < 2 || self.chart_days < 2 {
            return Err(StockError::ConfigError(
                "price_days and chart_days must be at least 2".to_string(),
            ));
        }

        if self.price_days > MAX_DAYS || self.chart_days > MAX_DAYS {
            return Err(StockError::ConfigError(format!(
                "price_days and chart_days must be at most {MAX_DAYS}"
            )));
        }

        if self.request_timeout.is_zero() || self.llm_timeout.is_zero() {
            return Err(StockError::ConfigError(
                "request and LLM timeouts must be greater than 0".to_string(),
            ));
        }

        if self.news_limit == 0 {
            return Err(StockError::ConfigError(
                "news_limit must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

/// Builder for BotConfig
#[derive(Debug, Default)]
pub struct BotConfigBuilder {
    channel_access_token: Option<String>,
    channel_secret: Option<String>,
    imgur_client_id: Option<String>,
    openai_api_key: Option<String>,
    openai_api_base: Option<String>,
    openai_model: Option<String>,
    request_timeout: Option<Duration>,
    price_days: Option<i64>,
    news_limit: Option<usize>,
    port: Option<u16>,
}

impl BotConfigBuilder {
    /// Set the LINE channel credentials
    pub fn channel(mut self, access_token: impl Into<String>, secret: impl Into<String>) -> Self {
        self.channel_access_token = Some(access_token.into());
        self.channel_secret = Some(secret.into());
        self
    }

    /// Set the Imgur client id
    pub fn imgur_client_id(mut self, id: impl Into<String>) -> Self {
        self.imgur_client_id = Some(id.into());
        self
    }

    /// Set the OpenAI API key
    pub fn openai_api_key(mut self, key: impl Into<String>) -> Self {
        self.openai_api_key = Some(key.into());
        self
    }

    /// Set the OpenAI-compatible API base URL
    pub fn openai_api_base(mut self, base: impl Into<String>) -> Self {
        self.openai_api_base = Some(base.into());
        self
    }

    /// Set the report model
    pub fn openai_model(mut self, model: impl Into<String>) -> Self {
        self.openai_model = Some(model.into());
        self
    }

    /// Set request timeout
    pub fn request_timeout(mut self, duration: Duration) -> Self {
        self.request_timeout = Some(duration);
        self
    }

    /// Set the price-info window in calendar days
    pub fn price_days(mut self, days: i64) -> Self {
        self.price_days = Some(days);
        self
    }

    /// Set the number of news articles per query
    pub fn news_limit(mut self, limit: usize) -> Self {
        self.news_limit = Some(limit);
        self
    }

    /// Set the listen port
    pub fn port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<BotConfig> {
        let defaults = BotConfig::default();

        let config = BotConfig {
            channel_access_token: self.channel_access_token.unwrap_or_default(),
            channel_secret: self.channel_secret.unwrap_or_default(),
            imgur_client_id: self.imgur_client_id,
            openai_api_key: self.openai_api_key,
            openai_api_base: self.openai_api_base.unwrap_or(defaults.openai_api_base),
            openai_model: self.openai_model.unwrap_or(defaults.openai_model),
            request_timeout: self.request_timeout.unwrap_or(defaults.request_timeout),
            llm_timeout: defaults.llm_timeout,
            price_days: self.price_days.unwrap_or(defaults.price_days),
            chart_days: defaults.chart_days,
            news_limit: self.news_limit.unwrap_or(defaults.news_limit),
            port: self.port.unwrap_or(defaults.port),
        };

        config.validate()?;
        Ok(config)
    }
}
