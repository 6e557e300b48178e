//! User message template for the analysis report

use super::render;
use crate::error::Result;
use serde::Serialize;

const REPORT_TEMPLATE: &str = "請依據以下資料來進行分析並給出一份完整的分析報告:
近期價格資訊:
{{ prices }}
{% if fundamentals %}
每季營收資訊：
{{ fundamentals }}
{% endif %}
近期新聞資訊: 
{{ news }}
請給我{{ name }}近期的趨勢報告,請以詳細、嚴謹及專業的角度撰寫此報告,並提及重要的數字, reply in 繁體中文";

/// Data the report prompt is assembled from
#[derive(Debug, Clone, Default, Serialize)]
pub struct ReportContext {
    /// Company name, or `大盤` for the market
    pub name: String,
    pub prices: String,
    /// Omitted for the market index
    pub fundamentals: Option<String>,
    pub news: String,
}

/// Render the report request sent as the user message
pub fn render_report_prompt(context: &ReportContext) -> Result<String> {
    render(REPORT_TEMPLATE, context)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_prompt_for_stock() {
        let prompt = render_report_prompt(&ReportContext {
            name: "台積電".into(),
            prices: "2024-03-01 收盤價 700.00".into(),
            fundamentals: Some("2023-12-31 營收成長率 +14.00%".into()),
            news: "[2024-03-01] 台積電漲".into(),
        })
        .unwrap();

        assert_eq!(
            prompt,
            "請依據以下資料來進行分析並給出一份完整的分析報告:\n\
             近期價格資訊:\n\
             2024-03-01 收盤價 700.00\n\
             每季營收資訊：\n\
             2023-12-31 營收成長率 +14.00%\n\
             近期新聞資訊: \n\
             [2024-03-01] 台積電漲\n\
             請給我台積電近期的趨勢報告,請以詳細、嚴謹及專業的角度撰寫此報告,並提及重要的數字, reply in 繁體中文"
        );
    }

    #[test]
    fn test_report_prompt_for_market_skips_fundamentals() {
        let prompt = render_report_prompt(&ReportContext {
            name: "大盤".into(),
            prices: "p".into(),
            fundamentals: None,
            news: "n".into(),
        })
        .unwrap();

        assert!(!prompt.contains("每季營收資訊"));
        assert!(prompt.contains("近期價格資訊:\np\n近期新聞資訊: \nn\n"));
        assert!(prompt.contains("請給我大盤近期的趨勢報告"));
    }
}
