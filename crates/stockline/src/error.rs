//! Error types for bot operations

use thiserror::Error;

/// Errors raised while answering a message
#[derive(Debug, Error)]
pub enum StockError {
    /// API request failed
    #[error("API error: {0}")]
    ApiError(String),

    /// Invalid stock symbol provided
    #[error("Invalid symbol: {0}")]
    InvalidSymbol(String),

    /// Data not available for the requested symbol
    #[error("Data not available for {symbol}: {reason}")]
    DataUnavailable { symbol: String, reason: String },

    /// Network or HTTP error
    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Yahoo Finance API error
    #[error("Yahoo Finance error: {0}")]
    YahooFinanceError(String),

    /// A scraped page did not have the expected shape
    #[error("Scrape error: {0}")]
    ScrapeError(String),

    /// Image host rejected the upload
    #[error("Upload error: {0}")]
    UploadError(String),

    /// Chart could not be rendered
    #[error("Chart error: {0}")]
    ChartError(String),

    /// Language model call failed
    #[error("LLM error: {0}")]
    LlmError(#[from] stockline_llm::LLMError),

    /// Prompt template failed to render
    #[error("Prompt error: {0}")]
    PromptError(#[from] minijinja::Error),

    /// A feature needs a credential that is not configured
    #[error("{feature} is disabled: {setting} is not configured")]
    FeatureDisabled {
        feature: &'static str,
        setting: &'static str,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl StockError {
    /// Text shown to the LINE user when a command fails
    pub fn user_message(&self) -> String {
        match self {
            StockError::InvalidSymbol(symbol) => {
                format!("股票代號格式錯誤：{symbol}，請輸入例如 2330")
            }
            StockError::DataUnavailable { symbol, .. } => {
                format!("查無 {symbol} 的資料，請確認股票代號是否正確。")
            }
            StockError::FeatureDisabled { feature, .. } => {
                format!("目前無法使用{feature}功能，請聯絡管理員。")
            }
            StockError::LlmError(_) | StockError::PromptError(_) => {
                "分析報告產生失敗，請稍後再試。".to_string()
            }
            _ => "資料取得失敗，請稍後再試。".to_string(),
        }
    }
}

/// Result type alias for bot operations
pub type Result<T> = std::result::Result<T, StockError>;

impl From<stockline_utils::EnvError> for StockError {
    fn from(err: stockline_utils::EnvError) -> Self {
        StockError::ConfigError(err.to_string())
    }
}
