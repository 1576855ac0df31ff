use crate::config::WEBHOOK_PATH;
use crate::webhook::{RegistrationError, register_from_env};
use axum::{
    Router,
    body::{Body, to_bytes},
    extract::Request,
    http::{Method, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::get,
};
use serde_json::json;
use teloxide::types::Update;
use tracing::{error, warn};

pub const SET_WEBHOOK_PATH: &str = "/api/setwebhook";

/// Upper bound for an inbound update body.
const MAX_UPDATE_BYTES: usize = 1024 * 1024;

pub async fn health_handler() -> axum::Json<serde_json::Value> {
    axum::Json(json!({ "status": "ok" }))
}

async fn webhook_liveness() -> &'static str {
    "Webhook is active"
}

/// Runs the registrar with configuration read from the environment and
/// passes Telegram's answer straight through.
pub async fn set_webhook_handler() -> Response {
    match register_from_env().await {
        Ok(reg) => {
            let status = StatusCode::from_u16(reg.status).unwrap_or(StatusCode::BAD_GATEWAY);
            (status, reg.body).into_response()
        }
        Err(RegistrationError::Config(e)) => {
            error!("Webhook registration misconfigured: {e}");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
        Err(e) => {
            error!("Webhook registration failed: {e}");
            (StatusCode::BAD_GATEWAY, e.to_string()).into_response()
        }
    }
}

/// Answers 400 for bodies that are not a Telegram update instead of handing
/// them to the update listener. Anything but POST gets the liveness text.
async fn reject_malformed_updates(request: Request, next: Next) -> Response {
    if request.method() != Method::POST {
        return webhook_liveness().await.into_response();
    }

    let (parts, body) = request.into_parts();
    let bytes = match to_bytes(body, MAX_UPDATE_BYTES).await {
        Ok(b) => b,
        Err(e) => {
            warn!("Could not read update body: {e}");
            return (StatusCode::BAD_REQUEST, "unreadable body").into_response();
        }
    };

    if let Err(e) = serde_json::from_slice::<Update>(&bytes) {
        warn!("Rejected malformed update: {e}");
        return (StatusCode::BAD_REQUEST, "malformed update").into_response();
    }

    next.run(Request::from_parts(parts, Body::from(bytes))).await
}

/// Build the main router. `webhook_router` is the teloxide listener's router
/// (POST `/api/webhook`), or None to serve only the auxiliary routes.
pub fn build_router(webhook_router: Option<Router>) -> Router {
    let base = Router::new()
        .route("/health", get(health_handler))
        .route(WEBHOOK_PATH, get(webhook_liveness))
        .route(
            SET_WEBHOOK_PATH,
            get(set_webhook_handler).post(set_webhook_handler),
        );
    match webhook_router {
        Some(r) => base.merge(r.layer(middleware::from_fn(reject_malformed_updates))),
        None => base,
    }
}
