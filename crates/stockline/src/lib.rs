//! LINE chat bot for Taiwan stocks
//!
//! The bot answers Chinese keyword commands sent to a LINE official account:
//!
//! - Recent daily prices of a listed stock or the TAIEX (`股價資訊2330`)
//! - A one-month closing-price chart, uploaded to Imgur (`歷史股價2330`)
//! - Flash reports from cnyes.com (`股票新聞台積電`)
//! - Quarterly revenue and EPS growth (`基本面2330`)
//! - An AI trend report combining all of the above (`股票分析GPT2330`)
//! - Menus built from LINE template messages (`目錄`)
//!
//! # Architecture
//!
//! [`server`] exposes the webhook over HTTP and hands verified deliveries to
//! [`platforms::LineBot`], which replies once per text message with what
//! [`StockBot::respond`] produces. `StockBot` talks to the outside world only
//! through the traits in [`api`], so every command can be exercised with mocks.
//!
//! # Example
//!
//! ```rust,ignore
//! use stockline::{BotConfig, StockBot, StockDirectory};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = BotConfig::from_env()?;
//!     let bot = StockBot::from_config(config, Arc::new(StockDirectory::new()))?;
//!
//!     for message in bot.respond(None, "股價資訊2330").await {
//!         println!("{message:?}");
//!     }
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod bot;
pub mod config;
pub mod directory;
pub mod error;
pub mod platforms;
pub mod prompts;
pub mod server;
pub mod symbol;
pub mod tools;

pub use bot::{Command, StockBot, StockBotBuilder};
pub use config::BotConfig;
pub use directory::{StockDirectory, StockListing};
pub use error::{Result, StockError};
pub use symbol::StockId;
