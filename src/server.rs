use std::{net::SocketAddr, sync::Arc};

use axum::{Extension, Router, routing::get};
use tokio::net::TcpListener;

use crate::{api, spotify::AuthHandshake};

pub fn router(handshake: Arc<AuthHandshake>) -> Router {
    let callback_path = match handshake.config().redirect_uri.path() {
        "" => "/".to_string(),
        path => path.to_string(),
    };

    Router::new()
        .route("/health", get(api::health))
        .route(&callback_path, get(api::callback))
        .layer(Extension(handshake))
}

/// Binds the callback server. Binding happens before the browser is sent
/// away so a busy port is reported up front.
pub async fn bind(addr: SocketAddr) -> std::io::Result<TcpListener> {
    TcpListener::bind(addr).await
}

pub async fn serve(listener: TcpListener, handshake: Arc<AuthHandshake>) -> std::io::Result<()> {
    axum::serve(listener, router(handshake)).await
}
