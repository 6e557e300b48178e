//! Stock identifiers as typed by users

use std::fmt;

/// Word users type for the whole market
pub const MARKET_ALIAS: &str = "大盤";

/// Yahoo symbol of the TAIEX index
pub const MARKET_SYMBOL: &str = "^TWII";

/// A stock named in a chat message
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum StockId {
    /// The TAIEX index (`大盤`)
    Market,
    /// A listed stock, by code or company name as typed
    Ticker(String),
}

impl StockId {
    /// Parse a command argument; an empty argument means the whole market
    pub fn parse(arg: &str) -> Self {
        let arg = arg.trim();
        if arg.is_empty() || arg == MARKET_ALIAS {
            StockId::Market
        } else {
            StockId::Ticker(arg.to_string())
        }
    }

    /// Parse a numeric listing code such as `2330` or `00878`
    ///
    /// A trailing `.TW` is accepted and dropped.
    pub fn parse_code(arg: &str) -> Option<Self> {
        let code = arg.trim().replace(".TW", "");
        (!code.is_empty() && code.chars().all(|c| c.is_ascii_digit()))
            .then_some(StockId::Ticker(code))
    }

    /// Symbol understood by Yahoo Finance
    pub fn yahoo_symbol(&self) -> String {
        match self {
            StockId::Market => MARKET_SYMBOL.to_string(),
            StockId::Ticker(id) => format!("{id}.TW"),
        }
    }

    pub fn is_market(&self) -> bool {
        matches!(self, StockId::Market)
    }

    /// The raw id as the user typed it (`大盤` for the market)
    pub fn as_str(&self) -> &str {
        match self {
            StockId::Market => MARKET_ALIAS,
            StockId::Ticker(id) => id,
        }
    }
}

impl fmt::Display for StockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
