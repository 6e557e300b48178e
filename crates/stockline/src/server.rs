//! Webhook HTTP server

use crate::platforms::line::{CallbackError, LineBot, SIGNATURE_HEADER};
use axum::{
    Router,
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::warn;

pub const HEALTH_TEXT: &str = "Webhook Running!!!";

/// Routes: `GET /` health text and `POST /callback` for LINE deliveries
pub fn router(bot: Arc<LineBot>) -> Router {
    Router::new()
        .route("/", get(health))
        .route("/callback", post(callback))
        .layer(TraceLayer::new_for_http())
        .with_state(bot)
}

async fn health() -> &'static str {
    HEALTH_TEXT
}

async fn callback(
    State(bot): State<Arc<LineBot>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<&'static str, CallbackError> {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|value| value.to_str().ok());

    bot.handle_callback(&body, signature).await?;
    Ok("OK")
}

impl IntoResponse for CallbackError {
    fn into_response(self) -> Response {
        warn!(error = %self, "Rejected webhook delivery");
        (StatusCode::BAD_REQUEST, self.to_string()).into_response()
    }
}
