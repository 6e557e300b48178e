//! Chat platform integrations

pub mod line;

pub use line::{CallbackError, LineBot, LineMessagingClient};
