//! cnyes.com (鉅亨網) news search and article scraper

use super::{NewsSource, USER_AGENT};
use crate::error::{Result, StockError};
use async_trait::async_trait;
use chrono::DateTime;
use futures::future::join_all;
use regex::Regex;
use reqwest::Client;
use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use std::time::Duration;
use tracing::{instrument, warn};

pub const SEARCH_URL: &str = "https://ess.api.cnyes.com/ess/api/v1/news/keyword";
pub const ARTICLE_URL: &str = "https://news.cnyes.com/news/id";

/// Leading `<p>` elements on an article page are navigation chrome
const SKIPPED_PARAGRAPHS: usize = 4;

static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

/// A news article matched by a keyword search
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsArticle {
    /// The search keyword that found this article
    pub keyword: String,
    /// Publication date, `YYYY-MM-DD` in UTC
    pub date: String,
    pub title: String,
    pub content: String,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    data: SearchData,
}

#[derive(Debug, Deserialize)]
struct SearchData {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchItem {
    news_id: u64,
    title: String,
    publish_at: i64,
}

/// cnyes news client
pub struct CnyesClient {
    client: Client,
    search_url: String,
    article_url: String,
}

impl CnyesClient {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self {
            client,
            search_url: SEARCH_URL.to_string(),
            article_url: ARTICLE_URL.to_string(),
        })
    }

    /// Use other search and article endpoints, e.g. a local mock server
    ///
    /// Articles are fetched from `{article_url}/{news_id}`.
    pub fn with_endpoints(
        mut self,
        search_url: impl Into<String>,
        article_url: impl Into<String>,
    ) -> Self {
        self.search_url = search_url.into();
        self.article_url = article_url.into().trim_end_matches('/').to_string();
        self
    }

    async fn search_items(&self, keyword: &str, limit: usize) -> Result<Vec<SearchItem>> {
        let response: SearchResponse = self
            .client
            .get(&self.search_url)
            .query(&[
                ("q", keyword.to_string()),
                ("limit", limit.to_string()),
                ("page", "1".to_string()),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(response.data.items)
    }

    async fn fetch_article_body(&self, news_id: u64) -> Result<String> {
        let html = self
            .client
            .get(format!("{}/{news_id}", self.article_url))
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        parse_article_html(&html)
    }
}

#[async_trait]
impl NewsSource for CnyesClient {
    #[instrument(skip(self))]
    async fn search(&self, keyword: &str, limit: usize) -> Result<Vec<NewsArticle>> {
        let items = self.search_items(keyword, limit).await?;

        let bodies = join_all(items.iter().map(|item| self.fetch_article_body(item.news_id))).await;

        Ok(items
            .into_iter()
            .zip(bodies)
            .map(|(item, body)| {
                let content = body.unwrap_or_else(|e| {
                    warn!(news_id = item.news_id, error = %e, "Failed to fetch article body");
                    String::new()
                });
                NewsArticle {
                    keyword: keyword.to_string(),
                    date: format_publish_date(item.publish_at),
                    title: item.title,
                    content,
                }
            })
            .collect())
    }
}

/// `YYYY-MM-DD` (UTC) for a unix timestamp in seconds
pub fn format_publish_date(publish_at: i64) -> String {
    DateTime::from_timestamp(publish_at, 0)
        .map(|t| t.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

/// Concatenate the article paragraphs, skipping the page chrome
pub fn parse_article_html(html: &str) -> Result<String> {
    let document = Html::parse_document(html);
    let selector = Selector::parse("p").map_err(|e| StockError::ScrapeError(e.to_string()))?;

    let text: String = document
        .select(&selector)
        .skip(SKIPPED_PARAGRAPHS)
        .map(|p| p.text().collect::<String>())
        .collect();

    Ok(WHITESPACE.replace_all(text.trim(), " ").into_owned())
}
