use std::sync::Arc;

use axum::{Extension, response::Json};
use serde_json::{Value, json};

use crate::spotify::AuthHandshake;

pub async fn health(Extension(handshake): Extension<Arc<AuthHandshake>>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "authenticated": handshake.credentials().is_set()
    }))
}
