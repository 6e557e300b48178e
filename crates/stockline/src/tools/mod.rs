//! Formatting and derivations applied to fetched data

pub mod chart;
pub mod fundamental;
pub mod news;
pub mod price;

pub use chart::{chart_caption, chart_title, render_line_chart};
pub use fundamental::{FundamentalRow, FundamentalSummary};
pub use news::{format_news, news_keyword, news_prompt_text};
pub use price::{PriceRow, PriceSummary};
