//! Menus sent as template messages
//!
//! Every action sends a chat text that the keyword router understands, so
//! tapping a button behaves exactly like typing the command.

use super::messaging::{Action, CarouselColumn, OutboundMessage, Template};

/// Popular stocks offered in the pickers: (code, name)
pub const POPULAR_STOCKS: [(&str, &str); 4] = [
    ("2330", "台積電"),
    ("2317", "鴻海"),
    ("2454", "聯發科"),
    ("2881", "富邦金"),
];

/// Carousel listing every feature (`目錄`)
pub fn menu_carousel() -> OutboundMessage {
    let columns = vec![
        CarouselColumn {
            title: Some("股價查詢".into()),
            text: "查看近期股價與走勢圖".into(),
            actions: vec![
                Action::message("熱門股價資訊", "哪一隻"),
                Action::message("歷史股價資訊", "歷史股價資訊"),
                Action::message("歷史股價圖", "股價圖"),
            ],
        },
        CarouselColumn {
            title: Some("新聞與基本面".into()),
            text: "盤中速報與每季營收、EPS".into(),
            actions: vec![
                Action::message("個股新聞", "股票news"),
                Action::message("大盤新聞", "股票新聞大盤"),
                Action::message("基本面", "基本面"),
            ],
        },
        CarouselColumn {
            title: Some("AI 趨勢報告".into()),
            text: "由 AI 統整股價、基本面與新聞".into(),
            actions: vec![
                Action::message("大盤分析", "股票分析GPT大盤"),
                Action::message("台積電分析", "股票分析GPT2330"),
                Action::message("鴻海分析", "股票分析GPT2317"),
            ],
        },
    ];

    OutboundMessage::template("功能目錄", Template::Carousel { columns })
}

/// Buttons choosing a stock for `基本面`
pub fn fundamentals_buttons() -> OutboundMessage {
    let actions = POPULAR_STOCKS
        .iter()
        .map(|(code, name)| Action::message(format!("{name} {code}"), format!("基本面{code}")))
        .collect();

    OutboundMessage::template(
        "請選擇要查詢基本面的股票",
        Template::Buttons {
            title: Some("基本面".into()),
            text: "請選擇股票，或輸入「基本面」加上股票代號".into(),
            actions,
        },
    )
}

/// Buttons choosing a stock for `股價資訊` (`哪一隻`)
pub fn stock_picker_buttons() -> OutboundMessage {
    let actions = POPULAR_STOCKS
        .iter()
        .take(3)
        .map(|(code, name)| Action::message(format!("{name} {code}"), format!("股價資訊{code}")))
        .chain(std::iter::once(Action::message("大盤", "股價資訊大盤")))
        .collect();

    OutboundMessage::template(
        "請選擇要查詢股價的股票",
        Template::Buttons {
            title: Some("哪一隻？".into()),
            text: "請選擇股票，或輸入「股價資訊」加上股票代號".into(),
            actions,
        },
    )
}
