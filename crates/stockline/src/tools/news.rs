//! News keyword building and formatting

use crate::api::NewsArticle;
use crate::directory::StockDirectory;
use crate::symbol::StockId;

/// Suffix that narrows cnyes results to intraday flash reports
pub const NEWS_SUFFIX: &str = " -盤中速報";

/// Search term used for the whole market
pub const MARKET_NEWS_TERM: &str = "台股";

const SNIPPET_CHARS: usize = 120;
const PROMPT_CONTENT_CHARS: usize = 400;

/// Build the cnyes search keyword for a news query
///
/// Known stock codes are replaced by the company name, which matches far
/// more headlines than the bare number.
pub fn news_keyword(query: &str, directory: &StockDirectory) -> String {
    let term = match StockId::parse(query) {
        StockId::Market => MARKET_NEWS_TERM.to_string(),
        StockId::Ticker(raw) => directory
            .get(&raw)
            .map_or(raw, |listing| listing.name.clone()),
    };
    format!("{term}{NEWS_SUFFIX}")
}

/// Chat reply listing the articles
pub fn format_news(keyword: &str, articles: &[NewsArticle]) -> String {
    if articles.is_empty() {
        return format!("找不到與「{keyword}」相關的新聞。");
    }

    let items: Vec<String> = articles
        .iter()
        .enumerate()
        .map(|(i, article)| {
            let snippet = truncate_chars(&article.content, SNIPPET_CHARS);
            if snippet.is_empty() {
                format!("{}. {} {}", i + 1, article.date, article.title)
            } else {
                format!("{}. {} {}\n{snippet}", i + 1, article.date, article.title)
            }
        })
        .collect();

    format!("「{keyword}」相關新聞\n\n{}", items.join("\n\n"))
}

/// Articles as context for the report prompt
pub fn news_prompt_text(articles: &[NewsArticle]) -> String {
    articles
        .iter()
        .map(|article| {
            format!(
                "[{}] {}: {}",
                article.date,
                article.title,
                truncate_chars(&article.content, PROMPT_CONTENT_CHARS)
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Truncate to `max` characters, appending `…` when cut
pub fn truncate_chars(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max.saturating_sub(1)).collect();
    out.push('…');
    out
}
