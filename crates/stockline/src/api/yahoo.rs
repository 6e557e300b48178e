//! Yahoo Finance API client

use super::{MarketData, USER_AGENT};
use crate::error::{Result, StockError};
use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use time::OffsetDateTime;
use tracing::{debug, instrument};
use yahoo_finance_api as yahoo;

pub const TIMESERIES_URL: &str =
    "https://query2.finance.yahoo.com/ws/fundamentals-timeseries/v1/finance/timeseries";
const REVENUE_KEY: &str = "quarterlyTotalRevenue";
const EPS_KEY: &str = "quarterlyBasicEPS";

/// Taipei is UTC+8 all year
const TAIPEI_OFFSET_HOURS: i64 = 8;

/// Yahoo Finance API client
pub struct YahooFinanceClient {
    connector: yahoo::YahooConnector,
    http: Client,
    timeseries_url: String,
}

/// One daily price bar
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub symbol: String,
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
    pub adjclose: f64,
}

impl Quote {
    /// Trading day in Taipei local time
    pub fn date(&self) -> NaiveDate {
        (self.timestamp + Duration::hours(TAIPEI_OFFSET_HOURS)).date_naive()
    }
}

/// Revenue and EPS reported for one quarter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuarterFigures {
    pub date: NaiveDate,
    pub total_revenue: Option<f64>,
    pub basic_eps: Option<f64>,
}

/// Quarterly financials, newest quarter first
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuarterlyFinancials {
    pub symbol: String,
    pub quarters: Vec<QuarterFigures>,
}

impl YahooFinanceClient {
    /// Create a new Yahoo Finance client
    pub fn new(timeout: std::time::Duration) -> Result<Self> {
        let connector = yahoo::YahooConnector::new()
            .map_err(|e| StockError::YahooFinanceError(e.to_string()))?;
        let http = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            connector,
            http,
            timeseries_url: TIMESERIES_URL.to_string(),
        })
    }

    /// Fetch fundamentals from another timeseries endpoint, e.g. a local mock server
    pub fn with_timeseries_url(mut self, url: impl Into<String>) -> Self {
        self.timeseries_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Get historical quotes for a symbol
    pub async fn get_historical_quotes(
        &self,
        symbol: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Quote>> {
        // Convert chrono DateTime to time OffsetDateTime
        let start_odt = OffsetDateTime::from_unix_timestamp(start.timestamp())
            .map_err(|e| StockError::YahooFinanceError(format!("Invalid start timestamp: {e}")))?;
        let end_odt = OffsetDateTime::from_unix_timestamp(end.timestamp())
            .map_err(|e| StockError::YahooFinanceError(format!("Invalid end timestamp: {e}")))?;

        let response = self
            .connector
            .get_quote_history(symbol, start_odt, end_odt)
            .await
            .map_err(|e| StockError::YahooFinanceError(e.to_string()))?;

        let quotes = response
            .quotes()
            .map_err(|e| StockError::YahooFinanceError(e.to_string()))?;

        Ok(quotes
            .iter()
            .filter_map(|q| {
                Some(Quote {
                    symbol: symbol.to_string(),
                    timestamp: DateTime::from_timestamp(q.timestamp as i64, 0)?,
                    open: q.open,
                    high: q.high,
                    low: q.low,
                    close: q.close,
                    volume: q.volume,
                    adjclose: q.adjclose,
                })
            })
            .collect())
    }

    /// Fetch quarterly revenue and EPS from the fundamentals-timeseries endpoint
    pub async fn get_quarterly_financials(&self, symbol: &str) -> Result<QuarterlyFinancials> {
        let now = Utc::now();
        let start = now - Duration::days(5 * 365);

        let body: Value = self
            .http
            .get(format!("{}/{symbol}", self.timeseries_url))
            .query(&[
                ("symbol", symbol.to_string()),
                ("type", format!("{REVENUE_KEY},{EPS_KEY}")),
                ("period1", start.timestamp().to_string()),
                ("period2", now.timestamp().to_string()),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let quarters = parse_timeseries(&body)?;
        debug!(symbol, quarters = quarters.len(), "Fetched quarterly financials");

        if quarters.is_empty() {
            return Err(StockError::DataUnavailable {
                symbol: symbol.to_string(),
                reason: "no quarterly financials reported".to_string(),
            });
        }

        Ok(QuarterlyFinancials {
            symbol: symbol.to_string(),
            quarters,
        })
    }
}

#[async_trait]
impl MarketData for YahooFinanceClient {
    #[instrument(skip(self))]
    async fn daily_bars(&self, symbol: &str, days: i64) -> Result<Vec<Quote>> {
        let end = Utc::now();
        let start = end - Duration::days(days);
        let quotes = self.get_historical_quotes(symbol, start, end).await?;

        if quotes.is_empty() {
            return Err(StockError::DataUnavailable {
                symbol: symbol.to_string(),
                reason: format!("no trading data in the last {days} days"),
            });
        }

        Ok(quotes)
    }

    #[instrument(skip(self))]
    async fn quarterly_financials(&self, symbol: &str) -> Result<QuarterlyFinancials> {
        self.get_quarterly_financials(symbol).await
    }
}

/// Merge the revenue and EPS series of a timeseries response by quarter
///
/// Each result names its series in `meta.type[0]` and carries the data
/// points under that same key; null points are skipped.
pub fn parse_timeseries(body: &Value) -> Result<Vec<QuarterFigures>> {
    let results = body
        .pointer("/timeseries/result")
        .and_then(Value::as_array)
        .ok_or_else(|| {
            StockError::YahooFinanceError("timeseries response has no result array".to_string())
        })?;

    let mut by_date: BTreeMap<NaiveDate, QuarterFigures> = BTreeMap::new();

    for result in results {
        let Some(key) = result.pointer("/meta/type/0").and_then(Value::as_str) else {
            continue;
        };
        let Some(points) = result.get(key).and_then(Value::as_array) else {
            continue;
        };

        for point in points {
            let date = point
                .get("asOfDate")
                .and_then(Value::as_str)
                .and_then(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok());
            let value = point.pointer("/reportedValue/raw").and_then(Value::as_f64);
            let (Some(date), Some(value)) = (date, value) else {
                continue;
            };

            let entry = by_date.entry(date).or_insert(QuarterFigures {
                date,
                total_revenue: None,
                basic_eps: None,
            });
            match key {
                REVENUE_KEY => entry.total_revenue = Some(value),
                EPS_KEY => entry.basic_eps = Some(value),
                _ => {}
            }
        }
    }

    Ok(by_date.into_values().rev().collect())
}
