//! HTTP chat API.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET`  | `/` | Liveness probe (plain text) |
//! | `POST` | `/chat` | Answer a question against the knowledge base |
//!
//! # Request/Response Contract
//!
//! `POST /chat` takes `{"message": "..."}` and answers `{"reply": "..."}`.
//! A missing, non-string, or empty message is a 400:
//!
//! ```json
//! { "error": "No message provided" }
//! ```
//!
//! A chat model failure still answers 200, with the reply text describing
//! the error, so conversational clients always have something to display.
//! A query embedding failure is a 500.
//!
//! # CORS
//!
//! All origins, methods, and headers are permitted to support browser-based
//! chat widgets.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::engine::{AnswerError, Engine};

/// Shared application state passed to route handlers via Axum's `State`
/// extractor.
#[derive(Clone)]
struct AppState {
    engine: Arc<Engine>,
}

/// Starts the chat API server.
///
/// Binds to the address configured in `[server].bind` and serves requests
/// until the process is terminated.
pub async fn run_server(config: &Config, engine: Arc<Engine>) -> anyhow::Result<()> {
    let bind_addr = config.server.bind.clone();
    let app = build_router(engine);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!("listening on http://{}", bind_addr);
    axum::serve(listener, app).await?;

    Ok(())
}

/// Builds the router with all routes and middleware. Split out from
/// [`run_server`] so tests can drive the API against an ephemeral listener.
pub fn build_router(engine: Arc<Engine>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(handle_root))
        .route("/chat", post(handle_chat))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(AppState { engine })
}

// ============ Error response ============

/// JSON error response body.
#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

/// Internal error type that converts into an Axum HTTP response.
struct AppError {
    status: StatusCode,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.message,
        };
        (self.status, Json(body)).into_response()
    }
}

/// Constructs a 400 Bad Request error.
fn bad_request(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::BAD_REQUEST,
        message: message.into(),
    }
}

/// Constructs a 500 Internal Server Error.
fn internal_error(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::INTERNAL_SERVER_ERROR,
        message: message.into(),
    }
}

// ============ GET / ============

/// Handler for `GET /`. Plain-text liveness probe.
async fn handle_root() -> &'static str {
    "The API is running!"
}

// ============ POST /chat ============

/// JSON response body for `POST /chat`.
#[derive(Serialize)]
struct ChatReply {
    reply: String,
}

/// Handler for `POST /chat`.
///
/// Whitespace-only messages are accepted; only a missing, non-string, or
/// empty `message` field is rejected.
async fn handle_chat(
    State(state): State<AppState>,
    Json(body): Json<serde_json::Value>,
) -> Result<Json<ChatReply>, AppError> {
    let message = body.get("message").and_then(|m| m.as_str()).unwrap_or("");
    if message.is_empty() {
        return Err(bad_request("No message provided"));
    }

    match state.engine.answer(message).await {
        Ok(reply) => Ok(Json(ChatReply { reply })),
        Err(AnswerError::Completion(e)) => {
            warn!(error = %e, "chat completion failed, answering with the error text");
            Ok(Json(ChatReply {
                reply: e.to_reply(),
            }))
        }
        Err(AnswerError::Provider(e)) => {
            error!(error = %e, "query embedding failed");
            Err(internal_error(format!("embedding failed: {}", e)))
        }
    }
}
