//! Quarter-over-quarter revenue and EPS growth

use crate::api::QuarterlyFinancials;
use crate::tools::price::format_ratio;
use serde::Serialize;
use std::fmt::Write as _;

/// One quarter of the fundamentals table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FundamentalRow {
    /// Quarter end, `YYYY-MM-DD`
    pub quarter: String,
    /// Revenue growth vs. the previous quarter, rounded to 2 decimals
    pub revenue_growth: Option<f64>,
    /// Basic EPS, rounded to 2 decimals
    pub eps: Option<f64>,
    /// EPS growth vs. the previous quarter, rounded to 2 decimals
    pub eps_growth: Option<f64>,
}

/// Fundamentals table, newest quarter first
///
/// The oldest reported quarter only serves as the base for growth and has
/// no row of its own.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FundamentalSummary {
    pub symbol: String,
    pub rows: Vec<FundamentalRow>,
}

impl FundamentalSummary {
    pub fn from_financials(financials: &QuarterlyFinancials) -> Self {
        let quarters = &financials.quarters;
        let rows = quarters
            .windows(2)
            .map(|pair| {
                let (current, previous) = (&pair[0], &pair[1]);
                FundamentalRow {
                    quarter: current.date.format("%Y-%m-%d").to_string(),
                    revenue_growth: growth(current.total_revenue, previous.total_revenue),
                    eps: current.basic_eps.map(round2),
                    eps_growth: growth(current.basic_eps, previous.basic_eps),
                }
            })
            .collect();

        Self {
            symbol: financials.symbol.clone(),
            rows,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn to_text(&self, title: &str) -> String {
        let mut out = format!("{title} 每季基本面\n季日期 | 營收成長率 | EPS | EPS 季增率\n");
        for row in &self.rows {
            let _ = writeln!(
                out,
                "{} | {} | {} | {}",
                row.quarter,
                format_ratio(row.revenue_growth),
                row.eps.map_or_else(|| "-".to_string(), |v| format!("{v:.2}")),
                format_ratio(row.eps_growth),
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
                    "{} 營收成長率 {}, EPS {}, EPS 季增率 {}",
                    row.quarter,
                    format_ratio(row.revenue_growth),
                    row.eps.map_or_else(|| "-".to_string(), |v| format!("{v:.2}")),
                    format_ratio(row.eps_growth),
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// `(current - previous) / previous`, rounded; `None` when either side is
/// missing or the base is zero
pub fn growth(current: Option<f64>, previous: Option<f64>) -> Option<f64> {
    match (current, previous) {
        (Some(current), Some(previous)) if previous != 0.0 => {
            Some(round2((current - previous) / previous))
        }
        _ => None,
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::QuarterFigures;
    use chrono::NaiveDate;

    fn quarter(date: &str, revenue: Option<f64>, eps: Option<f64>) -> QuarterFigures {
        QuarterFigures {
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            total_revenue: revenue,
            basic_eps: eps,
        }
    }

    fn sample() -> QuarterlyFinancials {
        QuarterlyFinancials {
            symbol: "2330.TW".to_string(),
            quarters: vec![
                quarter("2023-12-31", Some(625.0), Some(9.214)),
                quarter("2023-09-30", Some(546.0), Some(8.14)),
                quarter("2023-06-30", Some(480.0), Some(6.01)),
            ],
        }
    }

    #[test]
    fn test_growth() {
        assert_eq!(growth(Some(110.0), Some(100.0)), Some(0.1));
        assert_eq!(growth(Some(90.0), Some(100.0)), Some(-0.1));
        assert_eq!(growth(Some(1.0), Some(0.0)), None);
        assert_eq!(growth(None, Some(1.0)), None);
    }

    #[test]
    fn test_summary_drops_oldest_quarter() {
        let summary = FundamentalSummary::from_financials(&sample());

        assert_eq!(summary.rows.len(), 2);
        assert_eq!(summary.rows[0].quarter, "2023-12-31");
        assert_eq!(summary.rows[1].quarter, "2023-09-30");

        // 625 / 546 - 1 = 0.1447
        assert_eq!(summary.rows[0].revenue_growth, Some(0.14));
        assert_eq!(summary.rows[0].eps, Some(9.21));
        // 9.214 / 8.14 - 1 = 0.1319
        assert_eq!(summary.rows[0].eps_growth, Some(0.13));
        // 546 / 480 - 1 = 0.1375
        assert_eq!(summary.rows[1].revenue_growth, Some(0.14));
    }

    #[test]
    fn test_summary_with_single_quarter() {
        let financials = QuarterlyFinancials {
            symbol: "2330.TW".to_string(),
            quarters: vec![quarter("2023-12-31", Some(1.0), Some(1.0))],
        };
        assert!(FundamentalSummary::from_financials(&financials).is_empty());
    }

    #[test]
    fn test_to_text() {
        let text = FundamentalSummary::from_financials(&sample()).to_text("台積電");
        assert!(text.starts_with("台積電 每季基本面"));
        assert!(text.contains("2023-12-31 | +14.00% | 9.21 | +13.00%"));
    }
}
