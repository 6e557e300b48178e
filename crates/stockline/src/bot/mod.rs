//! Stock bot dispatcher
//!
//! [`StockBot::respond`] turns one chat message into the messages of one
//! reply. It never fails: every error is logged and answered with an
//! apology text, so the caller always has something to send.

pub mod commands;

use crate::api::{
    CnyesClient, ImageHost, ImgurClient, MarketData, NewsSource, YahooFinanceClient,
};
use crate::config::BotConfig;
use crate::directory::StockDirectory;
use crate::error::{Result, StockError};
use crate::platforms::line::{OutboundMessage, templates};
use crate::prompts::{ANALYST_SYSTEM_PROMPT, ReportContext, render_report_prompt};
use crate::symbol::StockId;
use crate::tools::{
    FundamentalSummary, PriceSummary, chart_caption, chart_title, format_news, news_keyword,
    news_prompt_text, render_line_chart,
};
use std::sync::Arc;
use stockline_llm::providers::{OpenAIConfig, OpenAIProvider};
use stockline_llm::{CompletionRequest, LLMProvider, Message};
use tracing::{Span, info, instrument, warn};

pub use commands::{Command, KEYWORDS};

pub const CHART_PROMPT_REPLY: &str = "請輸入歷史股價XXX";
pub const NEWS_PROMPT_REPLY: &str = "請輸入股票新聞XXX";
pub const PRICE_INFO_PROMPT_REPLY: &str = "請輸入股價資訊XXX";
pub const UNKNOWN_REPLY: &str = "請輸入\"目錄\"查找功能";
pub const MARKET_FUNDAMENTALS_REPLY: &str =
    "大盤沒有基本面資料，請輸入「基本面」加上股票代號，例如：基本面2330";

const MISSING_DATA: &str = "無資料";

/// Dispatches chat commands to the data clients and formats replies
pub struct StockBot {
    config: BotConfig,
    directory: Arc<StockDirectory>,
    market: Arc<dyn MarketData>,
    news: Arc<dyn NewsSource>,
    images: Option<Arc<dyn ImageHost>>,
    llm: Option<Arc<dyn LLMProvider>>,
}

impl StockBot {
    pub fn builder() -> StockBotBuilder {
        StockBotBuilder::default()
    }

    /// Wire the production clients described by `config`
    ///
    /// Charts are disabled without an Imgur client id and reports without an
    /// OpenAI key; both commands then answer with an explanation.
    pub fn from_config(config: BotConfig, directory: Arc<StockDirectory>) -> Result<Self> {
        let timeout = config.request_timeout;

        let images: Option<Arc<dyn ImageHost>> = match &config.imgur_client_id {
            Some(id) => Some(Arc::new(ImgurClient::new(id, timeout)?)),
            None => {
                warn!("IMGUR_CLIENT_ID not set; price charts are disabled");
                None
            }
        };

        let llm: Option<Arc<dyn LLMProvider>> = match &config.openai_api_key {
            Some(key) => {
                let provider = OpenAIProvider::with_config(
                    OpenAIConfig::new(key)
                        .with_api_base(&config.openai_api_base)
                        .with_timeout(config.llm_timeout.as_secs()),
                )?;
                Some(Arc::new(provider))
            }
            None => {
                warn!("OpenAI API key not set; analysis reports are disabled");
                None
            }
        };

        Self::builder()
            .market_data(Arc::new(YahooFinanceClient::new(timeout)?))
            .news_source(Arc::new(CnyesClient::new(timeout)?))
            .maybe_image_host(images)
            .maybe_llm(llm)
            .directory(directory)
            .config(config)
            .build()
    }

    /// Answer one chat message
    #[instrument(
        skip(self, text),
        fields(user_id = user_id.unwrap_or("-"), command = tracing::field::Empty)
    )]
    pub async fn respond(&self, user_id: Option<&str>, text: &str) -> Vec<OutboundMessage> {
        let command = Command::parse(text);
        Span::current().record("command", command.name());
        info!(text, "Dispatching command");

        match command {
            Command::ChartPrompt => vec![OutboundMessage::text(CHART_PROMPT_REPLY)],
            Command::Menu => vec![templates::menu_carousel()],
            Command::PickStock => vec![templates::stock_picker_buttons()],
            Command::Fundamentals { stock: None } => vec![templates::fundamentals_buttons()],
            Command::Fundamentals { stock: Some(stock) } => {
                reply_or_apologize(self.fundamentals(&stock).await)
            }
            Command::Report { stock } => reply_or_apologize(self.report(&stock).await),
            Command::NewsPrompt => vec![OutboundMessage::text(NEWS_PROMPT_REPLY)],
            Command::PriceInfoPrompt => vec![OutboundMessage::text(PRICE_INFO_PROMPT_REPLY)],
            Command::PriceInfo { stock } => reply_or_apologize(self.price_info(&stock).await),
            Command::News { query } => reply_or_apologize(self.news(&query).await),
            Command::PriceChart { code } => match self.price_chart(&code).await {
                Ok(messages) => messages,
                Err(e) => {
                    warn!(error = %e, code, "Price chart failed");
                    vec![OutboundMessage::text(chart_error_text(&code, &e))]
                }
            },
            Command::Unknown => vec![OutboundMessage::text(UNKNOWN_REPLY)],
        }
    }

    /// Recent daily prices as a text table
    #[instrument(skip(self), fields(symbol = %stock.yahoo_symbol()))]
    pub async fn price_info(&self, stock: &StockId) -> Result<Vec<OutboundMessage>> {
        let summary = self.price_summary(stock).await?;
        let title = format!("{} ({})", self.directory.name_of(stock), summary.symbol);
        Ok(vec![OutboundMessage::text(summary.to_text(&title))])
    }

    /// One-month closing-price chart, uploaded and sent as an image
    #[instrument(skip(self))]
    pub async fn price_chart(&self, code: &str) -> Result<Vec<OutboundMessage>> {
        let stock = StockId::parse_code(code)
            .ok_or_else(|| StockError::InvalidSymbol(code.to_string()))?;
        let images = self.images.as_ref().ok_or(StockError::FeatureDisabled {
            feature: "股價圖",
            setting: "IMGUR_CLIENT_ID",
        })?;

        let bars = self
            .market
            .daily_bars(&stock.yahoo_symbol(), self.config.chart_days)
            .await?;
        if bars.is_empty() {
            return Err(StockError::DataUnavailable {
                symbol: stock.yahoo_symbol(),
                reason: "empty price history".to_string(),
            });
        }

        let closes: Vec<f64> = bars.iter().map(|bar| bar.close).collect();
        let png = render_line_chart(&closes)?;
        let url = images.upload_png(png).await?;

        let title = chart_title(stock.as_str(), self.config.chart_days);
        Ok(vec![
            OutboundMessage::image(url),
            OutboundMessage::text(chart_caption(&title, &closes)),
        ])
    }

    /// Latest cnyes flash reports for a stock, a company name or the market
    #[instrument(skip(self))]
    pub async fn news(&self, query: &str) -> Result<Vec<OutboundMessage>> {
        let keyword = news_keyword(query, &self.directory);
        let articles = self.news.search(&keyword, self.config.news_limit).await?;
        info!(keyword, count = articles.len(), "Fetched news");
        Ok(vec![OutboundMessage::text(format_news(&keyword, &articles))])
    }

    /// Quarterly revenue growth, EPS and EPS growth
    #[instrument(skip(self), fields(symbol = %stock.yahoo_symbol()))]
    pub async fn fundamentals(&self, stock: &StockId) -> Result<Vec<OutboundMessage>> {
        if stock.is_market() {
            return Ok(vec![OutboundMessage::text(MARKET_FUNDAMENTALS_REPLY)]);
        }

        let summary = self.fundamental_summary(stock).await?;
        let title = format!("{} ({})", self.directory.name_of(stock), summary.symbol);
        Ok(vec![OutboundMessage::text(summary.to_text(&title))])
    }

    /// AI trend report built from prices, fundamentals and news
    ///
    /// Prices are required; missing fundamentals or news only thin out the
    /// prompt.
    #[instrument(skip(self), fields(symbol = %stock.yahoo_symbol()))]
    pub async fn report(&self, stock: &StockId) -> Result<Vec<OutboundMessage>> {
        let llm = self.llm.as_ref().ok_or(StockError::FeatureDisabled {
            feature: "AI 分析報告",
            setting: "OPENAI_API_KEY",
        })?;

        let name = self.directory.name_of(stock);
        let prices = self.price_summary(stock).await?.to_prompt_text();

        let fundamentals = if stock.is_market() {
            None
        } else {
            Some(match self.fundamental_summary(stock).await {
                Ok(summary) => summary.to_prompt_text(),
                Err(e) => {
                    warn!(error = %e, "Fundamentals unavailable for report");
                    MISSING_DATA.to_string()
                }
            })
        };

        let keyword = news_keyword(stock.as_str(), &self.directory);
        let news = match self.news.search(&keyword, self.config.news_limit).await {
            Ok(articles) if !articles.is_empty() => news_prompt_text(&articles),
            Ok(_) => MISSING_DATA.to_string(),
            Err(e) => {
                warn!(error = %e, "News unavailable for report");
                MISSING_DATA.to_string()
            }
        };

        let prompt = render_report_prompt(&ReportContext {
            name,
            prices,
            fundamentals,
            news,
        })?;

        let request = CompletionRequest::builder(&self.config.openai_model)
            .system(ANALYST_SYSTEM_PROMPT)
            .add_message(Message::user(prompt))
            .build();

        let response = llm.complete(request).await?;
        info!(
            provider = llm.name(),
            tokens = response.usage.total(),
            "Report generated"
        );

        let text = response.text().trim();
        if text.is_empty() {
            return Err(StockError::Other("model returned an empty report".to_string()));
        }
        Ok(vec![OutboundMessage::text(text)])
    }

    async fn price_summary(&self, stock: &StockId) -> Result<PriceSummary> {
        let symbol = stock.yahoo_symbol();
        let bars = self.market.daily_bars(&symbol, self.config.price_days).await?;
        if bars.is_empty() {
            return Err(StockError::DataUnavailable {
                symbol,
                reason: "empty price history".to_string(),
            });
        }
        Ok(PriceSummary::from_quotes(symbol, &bars))
    }

    async fn fundamental_summary(&self, stock: &StockId) -> Result<FundamentalSummary> {
        let symbol = stock.yahoo_symbol();
        let financials = self.market.quarterly_financials(&symbol).await?;
        let summary = FundamentalSummary::from_financials(&financials);
        if summary.is_empty() {
            return Err(StockError::DataUnavailable {
                symbol,
                reason: "fewer than two reported quarters".to_string(),
            });
        }
        Ok(summary)
    }
}

fn reply_or_apologize(result: Result<Vec<OutboundMessage>>) -> Vec<OutboundMessage> {
    result.unwrap_or_else(|e| {
        warn!(error = %e, "Command failed");
        vec![OutboundMessage::text(e.user_message())]
    })
}

/// Error text for the chart command
fn chart_error_text(code: &str, error: &StockError) -> String {
    match error {
        StockError::InvalidSymbol(_) => "Invalid stock code format".to_string(),
        StockError::DataUnavailable { .. } => "No stock data available".to_string(),
        StockError::FeatureDisabled { .. } => error.user_message(),
        _ => format!(
            "Unable to retrieve stock data for {}.TW. Please check the stock code.",
            code.trim().trim_end_matches(".TW")
        ),
    }
}

/// Builder for StockBot
#[derive(Default)]
pub struct StockBotBuilder {
    config: Option<BotConfig>,
    directory: Option<Arc<StockDirectory>>,
    market: Option<Arc<dyn MarketData>>,
    news: Option<Arc<dyn NewsSource>>,
    images: Option<Arc<dyn ImageHost>>,
    llm: Option<Arc<dyn LLMProvider>>,
}

impl StockBotBuilder {
    pub fn config(mut self, config: BotConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn directory(mut self, directory: Arc<StockDirectory>) -> Self {
        self.directory = Some(directory);
        self
    }

    pub fn market_data(mut self, market: Arc<dyn MarketData>) -> Self {
        self.market = Some(market);
        self
    }

    pub fn news_source(mut self, news: Arc<dyn NewsSource>) -> Self {
        self.news = Some(news);
        self
    }

    pub fn image_host(self, images: Arc<dyn ImageHost>) -> Self {
        self.maybe_image_host(Some(images))
    }

    pub fn maybe_image_host(mut self, images: Option<Arc<dyn ImageHost>>) -> Self {
        self.images = images;
        self
    }

    pub fn llm(self, llm: Arc<dyn LLMProvider>) -> Self {
        self.maybe_llm(Some(llm))
    }

    pub fn maybe_llm(mut self, llm: Option<Arc<dyn LLMProvider>>) -> Self {
        self.llm = llm;
        self
    }

    /// Build the bot; market data and news source are required
    pub fn build(self) -> Result<StockBot> {
        let config = self
            .config
            .ok_or_else(|| StockError::ConfigError("bot configuration is required".to_string()))?;
        let market = self
            .market
            .ok_or_else(|| StockError::ConfigError("market data client is required".to_string()))?;
        let news = self
            .news
            .ok_or_else(|| StockError::ConfigError("news source is required".to_string()))?;

        Ok(StockBot {
            config,
            directory: self.directory.unwrap_or_default(),
            market,
            news,
            images: self.images,
            llm: self.llm,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{
        MockImageHost, MockMarketData, MockNewsSource, NewsArticle, QuarterFigures,
        QuarterlyFinancials,
    };
    use crate::directory::StockListing;
    use crate::tools::price::tests::quotes;
    use chrono::NaiveDate;
    use mockall::predicate::eq;
    use std::sync::Mutex;
    use stockline_llm::{CompletionResponse, LLMError, StopReason, TokenUsage};

    /// Provider that records requests and answers with a fixed text
    struct ScriptedProvider {
        reply: Option<&'static str>,
        requests: Mutex<Vec<CompletionRequest>>,
    }

    impl ScriptedProvider {
        fn new(reply: Option<&'static str>) -> Arc<Self> {
            Arc::new(Self {
                reply,
                requests: Mutex::new(Vec::new()),
            })
        }

        fn prompts(&self) -> Vec<(Option<String>, String, String)> {
            self.requests
                .lock()
                .unwrap()
                .iter()
                .map(|r| (r.system.clone(), r.model.clone(), r.messages[0].text().to_string()))
                .collect()
        }
    }

    #[async_trait::async_trait]
    impl LLMProvider for ScriptedProvider {
        async fn complete(
            &self,
            request: CompletionRequest,
        ) -> stockline_llm::Result<CompletionResponse> {
            self.requests.lock().unwrap().push(request);
            match self.reply {
                Some(text) => Ok(CompletionResponse {
                    message: Message::assistant(text),
                    stop_reason: StopReason::EndTurn,
                    usage: TokenUsage::default(),
                }),
                None => Err(LLMError::RateLimitExceeded("slow down".into())),
            }
        }

        fn name(&self) -> &str {
            "scripted"
        }
    }

    fn config() -> BotConfig {
        BotConfig::builder().channel("token", "secret").build().unwrap()
    }

    fn directory() -> Arc<StockDirectory> {
        Arc::new(StockDirectory::from_listings([StockListing {
            code: "2330".into(),
            name: "台積電".into(),
            industry: "半導體業".into(),
        }]))
    }

    fn bot(market: MockMarketData, news: MockNewsSource) -> StockBotBuilder {
        StockBot::builder()
            .config(config())
            .directory(directory())
            .market_data(Arc::new(market))
            .news_source(Arc::new(news))
    }

    fn texts(messages: &[OutboundMessage]) -> Vec<&str> {
        messages.iter().filter_map(OutboundMessage::as_text).collect()
    }

    fn financials() -> QuarterlyFinancials {
        let quarter = |date: &str, revenue: f64, eps: f64| QuarterFigures {
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            total_revenue: Some(revenue),
            basic_eps: Some(eps),
        };
        QuarterlyFinancials {
            symbol: "2330.TW".into(),
            quarters: vec![
                quarter("2023-12-31", 625.0, 9.21),
                quarter("2023-09-30", 546.0, 8.14),
            ],
        }
    }

    fn article() -> NewsArticle {
        NewsArticle {
            keyword: "台積電 -盤中速報".into(),
            date: "2024-03-01".into(),
            title: "台積電早盤走高".into(),
            content: "外資買超".into(),
        }
    }

    #[tokio::test]
    async fn test_static_replies() {
        let bot = bot(MockMarketData::new(), MockNewsSource::new()).build().unwrap();

        assert_eq!(texts(&bot.respond(None, "股價圖").await), [CHART_PROMPT_REPLY]);
        assert_eq!(texts(&bot.respond(None, "股票news").await), [NEWS_PROMPT_REPLY]);
        assert_eq!(texts(&bot.respond(None, "歷史股價資訊").await), [PRICE_INFO_PROMPT_REPLY]);
        assert_eq!(texts(&bot.respond(Some("U1"), "你好").await), [UNKNOWN_REPLY]);
    }

    #[tokio::test]
    async fn test_menu_replies_are_templates() {
        let bot = bot(MockMarketData::new(), MockNewsSource::new()).build().unwrap();

        for text in ["目錄", "哪一隻", "基本面"] {
            let messages = bot.respond(None, text).await;
            assert_eq!(messages.len(), 1);
            assert!(matches!(messages[0], OutboundMessage::Template { .. }), "{text}");
        }
    }

    #[tokio::test]
    async fn test_price_info_uses_market_symbol() {
        let mut market = MockMarketData::new();
        market
            .expect_daily_bars()
            .with(eq("^TWII"), eq(10))
            .times(1)
            .returning(|_, _| Ok(quotes(&[17_000.0, 17_170.0])));

        let bot = bot(market, MockNewsSource::new()).build().unwrap();
        let messages = bot.respond(None, "股價資訊").await;

        let text = texts(&messages)[0];
        assert!(text.starts_with("大盤 (^TWII) 近期股價資訊"));
        assert!(text.contains("+1.00%"));
    }

    #[tokio::test]
    async fn test_price_info_failure_apologizes() {
        let mut market = MockMarketData::new();
        market.expect_daily_bars().returning(|symbol, _| {
            Err(StockError::DataUnavailable {
                symbol: symbol.to_string(),
                reason: "delisted".into(),
            })
        });

        let bot = bot(market, MockNewsSource::new()).build().unwrap();
        let messages = bot.respond(None, "股價資訊9999").await;
        assert_eq!(messages.len(), 1);
        assert!(texts(&messages)[0].contains("9999.TW"));
    }

    #[tokio::test]
    async fn test_chart_invalid_code() {
        let bot = bot(MockMarketData::new(), MockNewsSource::new()).build().unwrap();
        assert_eq!(
            texts(&bot.respond(None, "歷史股價abc").await),
            ["Invalid stock code format"]
        );
        assert_eq!(
            texts(&bot.respond(None, "歷史股價").await),
            ["Invalid stock code format"]
        );
    }

    #[tokio::test]
    async fn test_chart_uploads_and_replies_with_image() {
        let mut market = MockMarketData::new();
        market
            .expect_daily_bars()
            .with(eq("2330.TW"), eq(31))
            .returning(|_, _| Ok(quotes(&[600.0, 610.0, 605.0])));

        let mut images = MockImageHost::new();
        images
            .expect_upload_png()
            .withf(|png: &Vec<u8>| png.starts_with(&[0x89, b'P', b'N', b'G']))
            .times(1)
            .returning(|_| Ok("https://i.imgur.com/x.png".to_string()));

        let bot = bot(market, MockNewsSource::new())
            .image_host(Arc::new(images))
            .build()
            .unwrap();
        let messages = bot.respond(None, "歷史股價2330").await;

        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0], OutboundMessage::image("https://i.imgur.com/x.png"));
        assert!(texts(&messages)[0].starts_with("2330.TW - Last 31 days stock prices"));
    }

    #[tokio::test]
    async fn test_chart_accepts_etf_codes() {
        let mut market = MockMarketData::new();
        market
            .expect_daily_bars()
            .with(eq("00878.TW"), eq(31))
            .times(1)
            .returning(|_, _| Ok(quotes(&[21.5, 21.7])));
        market
            .expect_daily_bars()
            .with(eq("006208.TW"), eq(31))
            .times(1)
            .returning(|_, _| Ok(quotes(&[110.0, 111.0])));

        let mut images = MockImageHost::new();
        images
            .expect_upload_png()
            .times(2)
            .returning(|_| Ok("https://i.imgur.com/etf.png".to_string()));

        let bot = bot(market, MockNewsSource::new())
            .image_host(Arc::new(images))
            .build()
            .unwrap();

        let messages = bot.respond(None, "歷史股價00878").await;
        assert_eq!(messages[0], OutboundMessage::image("https://i.imgur.com/etf.png"));
        assert!(texts(&messages)[0].starts_with("00878.TW - Last 31 days stock prices"));

        let messages = bot.respond(None, "歷史股價006208.TW").await;
        assert_eq!(messages.len(), 2);
        assert!(texts(&messages)[0].starts_with("006208.TW - Last 31 days"));
    }

    #[tokio::test]
    async fn test_chart_error_texts() {
        let mut market = MockMarketData::new();
        market
            .expect_daily_bars()
            .with(eq("1111.TW"), eq(31))
            .returning(|_, _| Ok(Vec::new()));
        market
            .expect_daily_bars()
            .with(eq("2222.TW"), eq(31))
            .returning(|_, _| Err(StockError::YahooFinanceError("boom".into())));

        let bot = bot(market, MockNewsSource::new())
            .image_host(Arc::new(MockImageHost::new()))
            .build()
            .unwrap();

        assert_eq!(
            texts(&bot.respond(None, "歷史股價1111").await),
            ["No stock data available"]
        );
        assert_eq!(
            texts(&bot.respond(None, "歷史股價2222").await),
            ["Unable to retrieve stock data for 2222.TW. Please check the stock code."]
        );
    }

    #[tokio::test]
    async fn test_chart_disabled_without_image_host() {
        let bot = bot(MockMarketData::new(), MockNewsSource::new()).build().unwrap();
        let messages = bot.respond(None, "歷史股價2330").await;
        assert!(texts(&messages)[0].contains("股價圖"));
    }

    #[tokio::test]
    async fn test_news_resolves_company_name() {
        let mut news = MockNewsSource::new();
        news.expect_search()
            .with(eq("台積電 -盤中速報"), eq(5))
            .times(1)
            .returning(|_, _| Ok(vec![article()]));

        let bot = bot(MockMarketData::new(), news).build().unwrap();
        let messages = bot.respond(None, "股票新聞2330").await;
        let text = texts(&messages)[0];
        assert!(text.contains("台積電早盤走高"));
        assert!(text.contains("外資買超"));
    }

    #[tokio::test]
    async fn test_news_failure_apologizes() {
        let mut news = MockNewsSource::new();
        news.expect_search()
            .with(eq("台股 -盤中速報"), eq(5))
            .returning(|_, _| Err(StockError::ApiError("503".into())));

        let bot = bot(MockMarketData::new(), news).build().unwrap();
        assert_eq!(
            texts(&bot.respond(None, "股票新聞").await),
            ["資料取得失敗，請稍後再試。"]
        );
    }

    #[tokio::test]
    async fn test_fundamentals() {
        let mut market = MockMarketData::new();
        market
            .expect_quarterly_financials()
            .with(eq("2330.TW"))
            .returning(|_| Ok(financials()));

        let bot = bot(market, MockNewsSource::new()).build().unwrap();
        let messages = bot.respond(None, "基本面2330").await;
        let text = texts(&messages)[0];
        assert!(text.starts_with("台積電 (2330.TW) 每季基本面"));
        assert!(text.contains("2023-12-31 | +14.00% | 9.21 | +13.00%"));

        assert_eq!(
            texts(&bot.respond(None, "基本面大盤").await),
            [MARKET_FUNDAMENTALS_REPLY]
        );
    }

    #[tokio::test]
    async fn test_report_builds_prompt_and_calls_model() {
        let mut market = MockMarketData::new();
        market
            .expect_daily_bars()
            .with(eq("2330.TW"), eq(10))
            .returning(|_, _| Ok(quotes(&[600.0, 606.0])));
        market
            .expect_quarterly_financials()
            .returning(|_| Ok(financials()));

        let mut news = MockNewsSource::new();
        news.expect_search()
            .with(eq("台積電 -盤中速報"), eq(5))
            .returning(|_, _| Ok(vec![article()]));

        let llm = ScriptedProvider::new(Some("台積電趨勢報告"));
        let bot = bot(market, news).llm(llm.clone()).build().unwrap();
        assert_eq!(
            texts(&bot.respond(None, "股票分析GPT2330").await),
            ["台積電趨勢報告"]
        );

        let prompts = llm.prompts();
        assert_eq!(prompts.len(), 1);
        let (system, model, prompt) = &prompts[0];
        assert_eq!(system.as_deref(), Some(ANALYST_SYSTEM_PROMPT));
        assert_eq!(model, "gpt-3.5-turbo-1106");
        assert!(prompt.contains("近期價格資訊"));
        assert!(prompt.contains("每季營收資訊"));
        assert!(prompt.contains("台積電早盤走高"));
        assert!(prompt.contains("請給我台積電近期的趨勢報告"));
    }

    #[tokio::test]
    async fn test_report_for_market_skips_fundamentals() {
        let mut market = MockMarketData::new();
        market
            .expect_daily_bars()
            .with(eq("^TWII"), eq(10))
            .returning(|_, _| Ok(quotes(&[17_000.0, 17_100.0])));
        market.expect_quarterly_financials().never();

        let mut news = MockNewsSource::new();
        news.expect_search()
            .with(eq("台股 -盤中速報"), eq(5))
            .returning(|_, _| Err(StockError::ApiError("down".into())));

        let llm = ScriptedProvider::new(Some("大盤報告"));
        let bot = bot(market, news).llm(llm.clone()).build().unwrap();
        assert_eq!(texts(&bot.respond(None, "股票分析GPT").await), ["大盤報告"]);

        let (_, _, prompt) = &llm.prompts()[0];
        assert!(!prompt.contains("每季營收資訊"));
        assert!(prompt.contains("近期新聞資訊: \n無資料"));
        assert!(prompt.contains("請給我大盤近期的趨勢報告"));
    }

    #[tokio::test]
    async fn test_report_llm_failure_apologizes() {
        let mut market = MockMarketData::new();
        market
            .expect_daily_bars()
            .returning(|_, _| Ok(quotes(&[1.0, 2.0])));

        let mut news = MockNewsSource::new();
        news.expect_search().returning(|_, _| Ok(Vec::new()));

        let bot = bot(market, news)
            .llm(ScriptedProvider::new(None))
            .build()
            .unwrap();
        assert_eq!(
            texts(&bot.respond(None, "股票分析GPT大盤").await),
            ["分析報告產生失敗，請稍後再試。"]
        );
    }

    #[tokio::test]
    async fn test_report_disabled_without_key() {
        let bot = bot(MockMarketData::new(), MockNewsSource::new()).build().unwrap();
        let messages = bot.respond(None, "股票分析GPT2330").await;
        assert!(texts(&messages)[0].contains("AI 分析報告"));
    }

    #[test]
    fn test_builder_requires_clients() {
        assert!(StockBot::builder().config(config()).build().is_err());
        assert!(
            StockBot::builder()
                .market_data(Arc::new(MockMarketData::new()))
                .news_source(Arc::new(MockNewsSource::new()))
                .build()
                .is_err()
        );
    }
}
