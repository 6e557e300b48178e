//! Keyword routing for chat messages
//!
//! A message is classified by the first keyword in [`KEYWORDS`] that it
//! contains. The argument is the message with that keyword removed.

use crate::symbol::StockId;

/// Command recognised in a chat message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Ask the user to type `歷史股價XXXX`
    ChartPrompt,
    /// Feature carousel
    Menu,
    /// Popular-stock picker for price info
    PickStock,
    /// Quarterly fundamentals; `None` shows the stock picker
    Fundamentals { stock: Option<StockId> },
    /// AI trend report
    Report { stock: StockId },
    /// Ask the user to type `股票新聞XXX`
    NewsPrompt,
    /// Ask the user to type `股價資訊XXX`
    PriceInfoPrompt,
    /// Recent daily prices
    PriceInfo { stock: StockId },
    /// News search; the query may be a code, a name or `大盤`
    News { query: String },
    /// One-month chart; the code is validated by the handler
    PriceChart { code: String },
    /// Nothing matched
    Unknown,
}

type Builder = fn(&str) -> Command;

/// Keywords in match priority order
///
/// A keyword must come before any shorter keyword it contains, otherwise
/// the shorter one would shadow it.
pub const KEYWORDS: [(&str, Builder); 10] = [
    ("股價圖", |_: &str| Command::ChartPrompt),
    ("目錄", |_: &str| Command::Menu),
    ("哪一隻", |_: &str| Command::PickStock),
    ("基本面", |arg: &str| Command::Fundamentals {
        stock: (!arg.is_empty()).then(|| StockId::parse(arg)),
    }),
    ("股票分析GPT", |arg: &str| Command::Report {
        stock: StockId::parse(arg),
    }),
    ("股票news", |_: &str| Command::NewsPrompt),
    ("歷史股價資訊", |_: &str| Command::PriceInfoPrompt),
    ("股價資訊", |arg: &str| Command::PriceInfo {
        stock: StockId::parse(arg),
    }),
    ("股票新聞", |arg: &str| Command::News {
        query: arg.to_string(),
    }),
    ("歷史股價", |arg: &str| Command::PriceChart {
        code: arg.to_string(),
    }),
];

impl Command {
    /// Classify a chat message
    pub fn parse(input: &str) -> Self {
        let input = input.trim();

        KEYWORDS
            .iter()
            .find(|(keyword, _)| input.contains(keyword))
            .map_or(Command::Unknown, |(keyword, build)| {
                let arg = input.replace(keyword, "");
                build(arg.trim())
            })
    }

    /// Short name for logs
    pub fn name(&self) -> &'static str {
        match self {
            Command::ChartPrompt => "chart_prompt",
            Command::Menu => "menu",
            Command::PickStock => "pick_stock",
            Command::Fundamentals { .. } => "fundamentals",
            Command::Report { .. } => "report",
            Command::NewsPrompt => "news_prompt",
            Command::PriceInfoPrompt => "price_info_prompt",
            Command::PriceInfo { .. } => "price_info",
            Command::News { .. } => "news",
            Command::PriceChart { .. } => "price_chart",
            Command::Unknown => "unknown",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ticker(id: &str) -> StockId {
        StockId::Ticker(id.to_string())
    }

    #[test]
    fn test_no_keyword_is_shadowed() {
        for (i, (earlier, _)) in KEYWORDS.iter().enumerate() {
            for (later, _) in &KEYWORDS[i + 1..] {
                assert!(
                    !later.contains(earlier),
                    "{later} contains {earlier} but is checked after it"
                );
            }
        }
    }

    #[test]
    fn test_prompts_and_menus() {
        assert_eq!(Command::parse("股價圖"), Command::ChartPrompt);
        assert_eq!(Command::parse("目錄"), Command::Menu);
        assert_eq!(Command::parse("請給我目錄"), Command::Menu);
        assert_eq!(Command::parse("哪一隻"), Command::PickStock);
        assert_eq!(Command::parse("股票news"), Command::NewsPrompt);
        assert_eq!(Command::parse("歷史股價資訊"), Command::PriceInfoPrompt);
    }

    #[test]
    fn test_price_info() {
        assert_eq!(Command::parse("股價資訊2330"), Command::PriceInfo { stock: ticker("2330") });
        assert_eq!(Command::parse("股價資訊 2330 "), Command::PriceInfo { stock: ticker("2330") });
        assert_eq!(Command::parse("股價資訊"), Command::PriceInfo { stock: StockId::Market });
        assert_eq!(Command::parse("股價資訊大盤"), Command::PriceInfo { stock: StockId::Market });
    }

    #[test]
    fn test_history_overlap_resolved_by_order() {
        assert_eq!(Command::parse("歷史股價資訊2330"), Command::PriceInfoPrompt);
        assert_eq!(Command::parse("歷史股價2330"), Command::PriceChart { code: "2330".into() });
        assert_eq!(Command::parse("歷史股價"), Command::PriceChart { code: String::new() });
    }

    #[test]
    fn test_first_match_wins() {
        // 股價圖 is checked before 歷史股價
        assert_eq!(Command::parse("歷史股價圖2330"), Command::ChartPrompt);
        // 目錄 is checked before 股價資訊
        assert_eq!(Command::parse("股價資訊目錄"), Command::Menu);
    }

    #[test]
    fn test_fundamentals() {
        assert_eq!(Command::parse("基本面"), Command::Fundamentals { stock: None });
        assert_eq!(
            Command::parse("基本面2330"),
            Command::Fundamentals { stock: Some(ticker("2330")) }
        );
        assert_eq!(
            Command::parse("基本面大盤"),
            Command::Fundamentals { stock: Some(StockId::Market) }
        );
    }

    #[test]
    fn test_report_and_news() {
        assert_eq!(Command::parse("股票分析GPT"), Command::Report { stock: StockId::Market });
        assert_eq!(Command::parse("股票分析GPT2317"), Command::Report { stock: ticker("2317") });
        assert_eq!(Command::parse("股票新聞台積電"), Command::News { query: "台積電".into() });
        assert_eq!(Command::parse("股票新聞"), Command::News { query: String::new() });
    }

    #[test]
    fn test_unknown() {
        assert_eq!(Command::parse("hello"), Command::Unknown);
        assert_eq!(Command::parse(""), Command::Unknown);
        assert_eq!(Command::parse("股價"), Command::Unknown);
        assert_eq!(Command::Unknown.name(), "unknown");
    }
}
