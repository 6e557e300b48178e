//! Webhook callback body
//!
//! Only text message events are acted on; every other event kind
//! deserializes to an `Unsupported` variant so new LINE event types never
//! fail the whole callback.

use serde::Deserialize;

/// Body of a `POST /callback` request
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallbackRequest {
    /// Bot user id that received the events
    #[serde(default)]
    pub destination: String,
    #[serde(default)]
    pub events: Vec<Event>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Event {
    Message(MessageEvent),
    #[serde(other)]
    Unsupported,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageEvent {
    /// Absent for events delivered while the channel is in standby mode
    #[serde(default)]
    pub reply_token: String,
    pub source: Source,
    pub message: MessageContent,
    /// Milliseconds since the epoch
    #[serde(default)]
    pub timestamp: i64,
    #[serde(default)]
    pub webhook_event_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Source {
    #[serde(rename_all = "camelCase")]
    User { user_id: String },
    #[serde(rename_all = "camelCase")]
    Group {
        group_id: String,
        #[serde(default)]
        user_id: Option<String>,
    },
    #[serde(rename_all = "camelCase")]
    Room {
        room_id: String,
        #[serde(default)]
        user_id: Option<String>,
    },
}

impl Source {
    /// Sender's user id, when LINE discloses it
    pub fn user_id(&self) -> Option<&str> {
        match self {
            Source::User { user_id } => Some(user_id),
            Source::Group { user_id, .. } | Source::Room { user_id, .. } => user_id.as_deref(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum MessageContent {
    Text { id: String, text: String },
    #[serde(other)]
    Other,
}

/// A text message ready for dispatch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextEvent<'a> {
    pub reply_token: &'a str,
    pub user_id: Option<&'a str>,
    /// Message body with surrounding whitespace removed
    pub text: &'a str,
}

impl MessageEvent {
    /// The text payload, if this is a text message that can be replied to
    pub fn as_text(&self) -> Option<TextEvent<'_>> {
        if self.reply_token.is_empty() {
            return None;
        }
        match &self.message {
            MessageContent::Text { text, .. } => Some(TextEvent {
                reply_token: &self.reply_token,
                user_id: self.source.user_id(),
                text: text.trim(),
            }),
            MessageContent::Other => None,
        }
    }
}

impl Event {
    /// Kind name for logging
    pub fn kind(&self) -> &'static str {
        match self {
            Event::Message(event) => match event.message {
                MessageContent::Text { .. } => "message.text",
                MessageContent::Other => "message.other",
            },
            Event::Unsupported => "unsupported",
        }
    }
}
