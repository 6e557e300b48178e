//! Clients for the external services the bot reads from and writes to
//!
//! Each concern sits behind a small trait so the dispatcher can be tested
//! without network access.

pub mod cnyes;
pub mod imgur;
pub mod twse;
pub mod yahoo;

use crate::error::Result;
use async_trait::async_trait;

pub use cnyes::{CnyesClient, NewsArticle};
pub use imgur::ImgurClient;
pub use twse::TwseClient;
pub use yahoo::{QuarterFigures, QuarterlyFinancials, Quote, YahooFinanceClient};

/// Browser-like user agent; several of these sites reject the reqwest default
pub(crate) const USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";

/// Daily prices and quarterly financials
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MarketData: Send + Sync {
    /// Daily bars from `days` calendar days ago until now, oldest first
    async fn daily_bars(&self, symbol: &str, days: i64) -> Result<Vec<Quote>>;

    /// Quarterly revenue and EPS, newest quarter first
    async fn quarterly_financials(&self, symbol: &str) -> Result<QuarterlyFinancials>;
}

/// Keyword news search
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NewsSource: Send + Sync {
    async fn search(&self, keyword: &str, limit: usize) -> Result<Vec<NewsArticle>>;
}

/// Public hosting for rendered images
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ImageHost: Send + Sync {
    /// Upload a PNG and return its public https URL
    async fn upload_png(&self, png: Vec<u8>) -> Result<String>;
}
