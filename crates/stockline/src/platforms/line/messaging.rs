//! Outbound messages and the reply API
//!
//! Constructors clamp text to LINE's documented limits so a long news
//! listing or report degrades to a truncated message instead of a 400 from
//! the reply endpoint.

use crate::error::{Result, StockError};
use crate::tools::news::truncate_chars;
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, instrument, warn};

pub const LINE_API_BASE: &str = "https://api.line.me";

pub const MAX_MESSAGES_PER_REPLY: usize = 5;
pub const MAX_TEXT_CHARS: usize = 5000;
pub const MAX_ALT_TEXT_CHARS: usize = 400;
pub const MAX_LABEL_CHARS: usize = 20;
pub const MAX_ACTION_TEXT_CHARS: usize = 300;
pub const MAX_BUTTONS_ACTIONS: usize = 4;
pub const MAX_COLUMN_ACTIONS: usize = 3;
pub const MAX_CAROUSEL_COLUMNS: usize = 10;

/// A message in a reply
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum OutboundMessage {
    Text {
        text: String,
    },
    #[serde(rename_all = "camelCase")]
    Image {
        original_content_url: String,
        preview_image_url: String,
    },
    #[serde(rename_all = "camelCase")]
    Template {
        alt_text: String,
        template: Template,
    },
}

impl OutboundMessage {
    pub fn text(text: impl AsRef<str>) -> Self {
        OutboundMessage::Text {
            text: truncate_chars(text.as_ref(), MAX_TEXT_CHARS),
        }
    }

    /// Image message using the same URL for the preview
    pub fn image(url: impl Into<String>) -> Self {
        let url = url.into();
        OutboundMessage::Image {
            original_content_url: url.clone(),
            preview_image_url: url,
        }
    }

    pub fn template(alt_text: impl AsRef<str>, template: Template) -> Self {
        OutboundMessage::Template {
            alt_text: truncate_chars(alt_text.as_ref(), MAX_ALT_TEXT_CHARS),
            template,
        }
    }

    /// Text content, if this is a text message
    pub fn as_text(&self) -> Option<&str> {
        match self {
            OutboundMessage::Text { text } => Some(text),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Template {
    Buttons {
        #[serde(skip_serializing_if = "Option::is_none")]
        title: Option<String>,
        text: String,
        actions: Vec<Action>,
    },
    Carousel {
        columns: Vec<CarouselColumn>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CarouselColumn {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub text: String,
    pub actions: Vec<Action>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Action {
    /// Sends `text` as if the user typed it
    Message { label: String, text: String },
}

impl Action {
    pub fn message(label: impl AsRef<str>, text: impl AsRef<str>) -> Self {
        Action::Message {
            label: truncate_chars(label.as_ref(), MAX_LABEL_CHARS),
            text: truncate_chars(text.as_ref(), MAX_ACTION_TEXT_CHARS),
        }
    }
}

impl Template {
    /// Check the action and column counts LINE accepts
    pub fn validate(&self) -> std::result::Result<(), String> {
        match self {
            Template::Buttons { actions, .. } => {
                if actions.is_empty() || actions.len() > MAX_BUTTONS_ACTIONS {
                    return Err(format!(
                        "buttons template needs 1 to {MAX_BUTTONS_ACTIONS} actions, got {}",
                        actions.len()
                    ));
                }
            }
            Template::Carousel { columns } => {
                if columns.is_empty() || columns.len() > MAX_CAROUSEL_COLUMNS {
                    return Err(format!(
                        "carousel needs 1 to {MAX_CAROUSEL_COLUMNS} columns, got {}",
                        columns.len()
                    ));
                }
                let expected = columns[0].actions.len();
                if expected == 0 || expected > MAX_COLUMN_ACTIONS {
                    return Err(format!(
                        "carousel columns need 1 to {MAX_COLUMN_ACTIONS} actions, got {expected}"
                    ));
                }
                if columns.iter().any(|c| c.actions.len() != expected) {
                    return Err("carousel columns must have the same number of actions".to_string());
                }
            }
        }
        Ok(())
    }
}

/// Body of `POST /v2/bot/message/reply`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplyMessageRequest {
    pub reply_token: String,
    pub messages: Vec<OutboundMessage>,
}

impl ReplyMessageRequest {
    /// Build a reply, keeping at most five messages
    pub fn new(reply_token: impl Into<String>, mut messages: Vec<OutboundMessage>) -> Self {
        if messages.len() > MAX_MESSAGES_PER_REPLY {
            warn!(
                count = messages.len(),
                "Reply has more than {MAX_MESSAGES_PER_REPLY} messages, dropping the rest"
            );
            messages.truncate(MAX_MESSAGES_PER_REPLY);
        }
        Self {
            reply_token: reply_token.into(),
            messages,
        }
    }
}

/// LINE Messaging API operations the bot needs
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessagingApi: Send + Sync {
    async fn reply(&self, request: ReplyMessageRequest) -> Result<()>;
}

/// HTTP client for the LINE Messaging API
pub struct LineMessagingClient {
    client: Client,
    access_token: String,
    api_base: String,
}

impl LineMessagingClient {
    pub fn new(access_token: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            access_token: access_token.into(),
            api_base: LINE_API_BASE.to_string(),
        })
    }

    /// Point the client at another host, e.g. a local mock server
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }
}

#[async_trait]
impl MessagingApi for LineMessagingClient {
    #[instrument(skip(self, request), fields(messages = request.messages.len()))]
    async fn reply(&self, request: ReplyMessageRequest) -> Result<()> {
        let response = self
            .client
            .post(format!("{}/v2/bot/message/reply", self.api_base))
            .bearer_auth(&self.access_token)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StockError::ApiError(format!(
                "LINE reply failed: HTTP {status}: {body}"
            )));
        }

        debug!("Reply delivered");
        Ok(())
    }
}
