use axum::{
    body::Bytes,
    extract::State,
    http::{header, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::any,
    Json, Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use crate::{
    cerebras::{CerebrasClient, CerebrasError},
    models::{WillRequest, WillResponse},
};

#[derive(Clone)]
pub struct AppState {
    /// `None` when CEREBRAS_AI_API_KEY was absent at startup; every POST is
    /// then rejected with a configuration error before any outbound call.
    pub cerebras: Option<Arc<CerebrasClient>>,
}

pub fn app(state: AppState) -> Router {
    Router::new()
        // Bound with `any` so the handler owns the method gate and can
        // answer non-POST methods with the JSON 405 body.
        .route("/api/generate-will", any(generate_will))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods([Method::GET, Method::HEAD, Method::POST, Method::OPTIONS])
                .allow_headers([header::CONTENT_TYPE]),
        )
        .with_state(state)
}

pub async fn generate_will(State(state): State<AppState>, method: Method, body: Bytes) -> Response {
    // Preflight is normally short-circuited by the CorsLayer; this covers a
    // bare OPTIONS hitting the handler directly.
    if method == Method::OPTIONS {
        return StatusCode::OK.into_response();
    }
    if method != Method::POST {
        return json_error(
            StatusCode::METHOD_NOT_ALLOWED,
            serde_json::json!({ "error": "Method Not Allowed. Use POST." }),
        );
    }

    let Some(cerebras) = state.cerebras.as_ref() else {
        tracing::error!("Missing CEREBRAS_AI_API_KEY; rejecting request");
        return json_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            serde_json::json!({ "error": "Server not configured. Missing CEREBRAS_AI_API_KEY." }),
        );
    };

    // An absent or unparseable body validates like an empty form: every
    // field is reported missing rather than failing on the parse.
    let request: WillRequest = serde_json::from_slice(&body).unwrap_or_default();
    let missing = request.missing_fields();
    if !missing.is_empty() {
        return json_error(
            StatusCode::BAD_REQUEST,
            serde_json::json!({ "error": "Missing required fields", "missing": missing }),
        );
    }

    tracing::info!("🚀 Drafting will for {}", request.full_name);

    let prompt = CerebrasClient::build_will_prompt(&request);
    match cerebras.generate_will(&prompt).await {
        Ok(will) => (StatusCode::OK, Json(WillResponse { will })).into_response(),
        Err(CerebrasError::Upstream { status, body }) => json_error(
            StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY),
            serde_json::json!({ "error": "Cerebras API request failed", "detail": body }),
        ),
        Err(CerebrasError::UnrecognizedShape(raw)) => json_error(
            StatusCode::BAD_GATEWAY,
            serde_json::json!({ "error": "Unexpected response from Cerebras AI", "raw": *raw }),
        ),
        Err(err @ CerebrasError::Transport(_)) => {
            tracing::error!("❌ Will generation failed: {}", err);
            json_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                serde_json::json!({ "error": "Internal server error", "detail": err.to_string() }),
            )
        }
    }
}

fn json_error(status: StatusCode, body: serde_json::Value) -> Response {
    (status, Json(body)).into_response()
}
