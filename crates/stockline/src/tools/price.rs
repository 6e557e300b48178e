//! Recent price summary: close, daily return and price change per trading day

use crate::api::Quote;
use serde::Serialize;
use std::fmt::Write as _;

/// One trading day in a price summary
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceRow {
    /// `YYYY-MM-DD`
    pub date: String,
    pub close: f64,
    /// Percentage change of close vs. the previous row, as a ratio
    pub daily_return: Option<f64>,
    /// Difference of adjusted close vs. the previous row
    pub change: Option<f64>,
}

/// Daily rows for one symbol, oldest first
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceSummary {
    pub symbol: String,
    pub rows: Vec<PriceRow>,
}

impl PriceSummary {
    /// Derive daily return and change from consecutive bars
    pub fn from_quotes(symbol: impl Into<String>, quotes: &[Quote]) -> Self {
        let rows = quotes
            .iter()
            .enumerate()
            .map(|(i, quote)| {
                let previous = i.checked_sub(1).map(|p| &quotes[p]);
                PriceRow {
                    date: quote.date().format("%Y-%m-%d").to_string(),
                    close: quote.close,
                    daily_return: previous
                        .filter(|p| p.close != 0.0)
                        .map(|p| (quote.close - p.close) / p.close),
                    change: previous.map(|p| quote.adjclose - p.adjclose),
                }
            })
            .collect();

        Self {
            symbol: symbol.into(),
            rows,
        }
    }

    /// Chat-friendly table
    pub fn to_text(&self, title: &str) -> String {
        let mut out = format!("{title} 近期股價資訊\n日期 | 收盤價 | 每日報酬 | 漲跌價差\n");
        for row in &self.rows {
            let _ = writeln!(
                out,
                "{} | {:.2} | {} | {}",
                row.date,
                row.close,
                format_ratio(row.daily_return),
                format_signed(row.change),
            );
        }
        out.trim_end().to_string()
    }

    /// Compact form for the report prompt
    pub fn to_prompt_text(&self) -> String {
        self.rows
            .iter()
            .map(|row| {
                format!(
                    "{} 收盤價 {:.2}, 每日報酬 {}, 漲跌價差 {}",
                    row.date,
                    row.close,
                    format_ratio(row.daily_return),
                    format_signed(row.change)
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// `+1.43%` for a ratio, `-` when absent
pub fn format_ratio(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{:+.2}%", v * 100.0))
}

/// `+10.00` for a signed amount, `-` when absent
pub fn format_signed(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{v:+.2}"))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::{DateTime, Duration, Utc};

    /// Bars one day apart starting 2024-03-01 01:00 UTC (09:00 in Taipei)
    pub(crate) fn quotes(closes: &[f64]) -> Vec<Quote> {
        let start = DateTime::<Utc>::from_timestamp(1_709_254_800, 0).unwrap();
        closes
            .iter()
            .enumerate()
            .map(|(i, &close)| Quote {
                symbol: "2330.TW".to_string(),
                timestamp: start + Duration::days(i as i64),
                open: close,
                high: close,
                low: close,
                close,
                volume: 1_000,
                adjclose: close,
            })
            .collect()
    }

    #[test]
    fn test_from_quotes_derivations() {
        let summary = PriceSummary::from_quotes("2330.TW", &quotes(&[100.0, 110.0, 99.0]));

        assert_eq!(summary.rows.len(), 3);
        assert_eq!(summary.rows[0].date, "2024-03-01");
        assert_eq!(summary.rows[0].daily_return, None);
        assert_eq!(summary.rows[0].change, None);

        let second = &summary.rows[1];
        assert!((second.daily_return.unwrap() - 0.10).abs() < 1e-9);
        assert!((second.change.unwrap() - 10.0).abs() < 1e-9);

        let third = &summary.rows[2];
        assert!((third.daily_return.unwrap() + 0.10).abs() < 1e-9);
        assert!((third.change.unwrap() + 11.0).abs() < 1e-9);
    }

    #[test]
    fn test_change_uses_adjusted_close() {
        let mut bars = quotes(&[100.0, 100.0]);
        bars[1].adjclose = 97.5;
        let summary = PriceSummary::from_quotes("2330.TW", &bars);
        assert_eq!(summary.rows[1].daily_return, Some(0.0));
        assert!((summary.rows[1].change.unwrap() + 2.5).abs() < 1e-9);
    }

    #[test]
    fn test_to_text() {
        let summary = PriceSummary::from_quotes("2330.TW", &quotes(&[100.0, 110.0]));
        let text = summary.to_text("台積電");

        assert!(text.starts_with("台積電 近期股價資訊"));
        assert!(text.contains("2024-03-01 | 100.00 | - | -"));
        assert!(text.contains("2024-03-02 | 110.00 | +10.00% | +10.00"));
    }

    #[test]
    fn test_empty_summary() {
        let summary = PriceSummary::from_quotes("^TWII", &[]);
        assert!(summary.rows.is_empty());
        assert_eq!(summary.to_prompt_text(), "");
    }

    #[test]
    fn test_formatters() {
        assert_eq!(format_ratio(Some(-0.0125)), "-1.25%");
        assert_eq!(format_ratio(None), "-");
        assert_eq!(format_signed(Some(3.0)), "+3.00");
    }
}
