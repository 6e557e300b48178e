//! In-memory table of listed Taiwan stocks

use crate::symbol::StockId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One row of the TWSE listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockListing {
    pub code: String,
    pub name: String,
    pub industry: String,
}

/// Stock code to listing, built once at start-up and read-only afterwards
#[derive(Debug, Clone, Default)]
pub struct StockDirectory {
    by_code: HashMap<String, StockListing>,
}

impl StockDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a directory; later duplicates replace earlier rows
    pub fn from_listings(listings: impl IntoIterator<Item = StockListing>) -> Self {
        let by_code = listings
            .into_iter()
            .map(|listing| (listing.code.clone(), listing))
            .collect();
        Self { by_code }
    }

    pub fn get(&self, code: &str) -> Option<&StockListing> {
        self.by_code.get(code)
    }

    /// Company name for a stock, `大盤` for the market, the raw id when unknown
    pub fn name_of(&self, id: &StockId) -> String {
        match id {
            StockId::Market => id.as_str().to_string(),
            StockId::Ticker(code) => self
                .get(code)
                .map_or_else(|| code.clone(), |listing| listing.name.clone()),
        }
    }

    pub fn len(&self) -> usize {
        self.by_code.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_code.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> StockDirectory {
        StockDirectory::from_listings([
            StockListing {
                code: "2330".into(),
                name: "台積電".into(),
                industry: "半導體業".into(),
            },
            StockListing {
                code: "2317".into(),
                name: "鴻海".into(),
                industry: "其他電子業".into(),
            },
        ])
    }

    #[test]
    fn test_lookup() {
        let dir = sample();
        assert_eq!(dir.len(), 2);
        assert_eq!(dir.get("2330").map(|l| l.name.as_str()), Some("台積電"));
        assert!(dir.get("9999").is_none());
    }

    #[test]
    fn test_name_of() {
        let dir = sample();
        assert_eq!(dir.name_of(&StockId::Ticker("2317".into())), "鴻海");
        assert_eq!(dir.name_of(&StockId::Ticker("9999".into())), "9999");
        assert_eq!(dir.name_of(&StockId::Market), "大盤");
    }

    #[test]
    fn test_empty_directory() {
        let dir = StockDirectory::new();
        assert!(dir.is_empty());
        assert_eq!(dir.name_of(&StockId::Ticker("2330".into())), "2330");
    }
}
