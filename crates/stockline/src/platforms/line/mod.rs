//! LINE Messaging API bot
//!
//! [`LineBot::handle_callback`] authenticates a webhook delivery, parses its
//! events and sends exactly one reply per text message.

pub mod messaging;
pub mod signature;
pub mod templates;
pub mod webhook;

pub use messaging::{
    Action, CarouselColumn, LineMessagingClient, MessagingApi, OutboundMessage,
    ReplyMessageRequest, Template,
};
pub use signature::SIGNATURE_HEADER;
pub use webhook::{CallbackRequest, Event, MessageEvent, TextEvent};

use crate::bot::StockBot;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error, info, instrument};

/// Reasons a webhook delivery is rejected with 400
#[derive(Debug, Error)]
pub enum CallbackError {
    #[error("missing x-line-signature header")]
    MissingSignature,

    #[error("invalid signature")]
    InvalidSignature,

    #[error("malformed callback body: {0}")]
    MalformedBody(#[from] serde_json::Error),
}

/// Outcome of a processed webhook delivery
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CallbackSummary {
    pub events: usize,
    pub replied: usize,
    pub failed: usize,
}

/// LINE bot
pub struct LineBot {
    bot: Arc<StockBot>,
    messaging: Arc<dyn MessagingApi>,
    channel_secret: String,
}

impl LineBot {
    pub fn new(
        bot: Arc<StockBot>,
        messaging: Arc<dyn MessagingApi>,
        channel_secret: impl Into<String>,
    ) -> Self {
        Self {
            bot,
            messaging,
            channel_secret: channel_secret.into(),
        }
    }

    /// Verify, parse and answer one webhook delivery
    ///
    /// Events are handled in order. A failed reply is logged and does not
    /// affect the remaining events or the HTTP status.
    #[instrument(skip_all, fields(bytes = body.len()))]
    pub async fn handle_callback(
        &self,
        body: &[u8],
        signature: Option<&str>,
    ) -> Result<CallbackSummary, CallbackError> {
        let signature = signature.ok_or(CallbackError::MissingSignature)?;
        if !signature::verify(&self.channel_secret, body, signature) {
            return Err(CallbackError::InvalidSignature);
        }

        let request: CallbackRequest = serde_json::from_slice(body)?;
        let mut summary = CallbackSummary {
            events: request.events.len(),
            ..CallbackSummary::default()
        };

        for event in &request.events {
            let text = match event {
                Event::Message(message) => message.as_text(),
                Event::Unsupported => None,
            };
            let Some(text) = text else {
                debug!(kind = event.kind(), "Ignoring event");
                continue;
            };

            if self.reply_to(&text).await {
                summary.replied += 1;
            } else {
                summary.failed += 1;
            }
        }

        info!(
            events = summary.events,
            replied = summary.replied,
            failed = summary.failed,
            "Callback processed"
        );
        Ok(summary)
    }

    async fn reply_to(&self, event: &TextEvent<'_>) -> bool {
        let messages = self.bot.respond(event.user_id, event.text).await;
        let request = ReplyMessageRequest::new(event.reply_token, messages);

        match self.messaging.reply(request).await {
            Ok(()) => true,
            Err(e) => {
                error!(error = %e, "Failed to send reply");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::messaging::MockMessagingApi;
    use super::*;
    use crate::api::{MockMarketData, MockNewsSource};
    use crate::bot::UNKNOWN_REPLY;
    use crate::config::BotConfig;
    use crate::error::StockError;

    const SECRET: &str = "testsecret";

    fn line_bot(messaging: MockMessagingApi) -> LineBot {
        let bot = StockBot::builder()
            .config(BotConfig::builder().channel("token", SECRET).build().unwrap())
            .market_data(Arc::new(MockMarketData::new()))
            .news_source(Arc::new(MockNewsSource::new()))
            .build()
            .unwrap();
        LineBot::new(Arc::new(bot), Arc::new(messaging), SECRET)
    }

    fn text_event(reply_token: &str, text: &str) -> String {
        format!(
            r#"{{"type":"message","replyToken":"{reply_token}","timestamp":1,
                "source":{{"type":"user","userId":"U1"}},
                "message":{{"type":"text","id":"1","text":"{text}"}}}}"#
        )
    }

    fn body(events: &[String]) -> Vec<u8> {
        format!(r#"{{"destination":"U0","events":[{}]}}"#, events.join(",")).into_bytes()
    }

    #[tokio::test]
    async fn test_replies_once_per_text_event() {
        let mut messaging = MockMessagingApi::new();
        messaging
            .expect_reply()
            .withf(|request: &ReplyMessageRequest| {
                request.reply_token == "r1"
                    && request.messages == [OutboundMessage::text(UNKNOWN_REPLY)]
            })
            .times(1)
            .returning(|_| Ok(()));
        messaging
            .expect_reply()
            .withf(|request: &ReplyMessageRequest| {
                request.reply_token == "r2"
                    && matches!(request.messages[0], OutboundMessage::Template { .. })
            })
            .times(1)
            .returning(|_| Ok(()));

        let sticker = r#"{"type":"message","replyToken":"r3","timestamp":1,
            "source":{"type":"user","userId":"U1"},
            "message":{"type":"sticker","id":"2"}}"#
            .to_string();
        let body = body(&[text_event("r1", "hello"), sticker, text_event("r2", "目錄")]);
        let signature = signature::sign(SECRET, &body);

        let summary = line_bot(messaging)
            .handle_callback(&body, Some(&signature))
            .await
            .unwrap();
        assert_eq!(
            summary,
            CallbackSummary {
                events: 3,
                replied: 2,
                failed: 0
            }
        );
    }

    #[tokio::test]
    async fn test_reply_failure_is_not_fatal() {
        let mut messaging = MockMessagingApi::new();
        messaging
            .expect_reply()
            .times(2)
            .returning(|request| match request.reply_token.as_str() {
                "r1" => Err(StockError::ApiError("HTTP 400".into())),
                _ => Ok(()),
            });

        let body = body(&[text_event("r1", "目錄"), text_event("r2", "目錄")]);
        let signature = signature::sign(SECRET, &body);

        let summary = line_bot(messaging)
            .handle_callback(&body, Some(&signature))
            .await
            .unwrap();
        assert_eq!(summary.replied, 1);
        assert_eq!(summary.failed, 1);
    }

    #[tokio::test]
    async fn test_rejects_bad_signature() {
        let mut messaging = MockMessagingApi::new();
        messaging.expect_reply().never();
        let bot = line_bot(messaging);
        let body = body(&[text_event("r1", "目錄")]);

        assert!(matches!(
            bot.handle_callback(&body, None).await,
            Err(CallbackError::MissingSignature)
        ));
        assert!(matches!(
            bot.handle_callback(&body, Some("bm90IGEgc2lnbmF0dXJl")).await,
            Err(CallbackError::InvalidSignature)
        ));

        let forged = signature::sign("other-secret", &body);
        assert!(matches!(
            bot.handle_callback(&body, Some(&forged)).await,
            Err(CallbackError::InvalidSignature)
        ));
    }

    #[tokio::test]
    async fn test_rejects_malformed_body() {
        let bot = line_bot(MockMessagingApi::new());
        let body = b"{not json";
        let signature = signature::sign(SECRET, body);

        assert!(matches!(
            bot.handle_callback(body, Some(&signature)).await,
            Err(CallbackError::MalformedBody(_))
        ));
    }

    #[tokio::test]
    async fn test_verification_request() {
        let bot = line_bot(MockMessagingApi::new());
        let body = br#"{"destination":"U1","events":[]}"#;
        let signature = signature::sign(SECRET, body);

        let summary = bot.handle_callback(body, Some(&signature)).await.unwrap();
        assert_eq!(summary, CallbackSummary::default());
    }
}
