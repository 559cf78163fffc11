use std::sync::Arc;

use axum::{Extension, extract::RawQuery, response::Html};

use crate::{
    spotify::{AuthHandshake, LoginOutcome},
    success, warning,
};

/// Runs the login completion for every load of the callback page.
pub async fn callback(
    RawQuery(query): RawQuery,
    Extension(handshake): Extension<Arc<AuthHandshake>>,
) -> Html<String> {
    let location = handshake.callback_location(query.as_deref());

    match handshake.complete_login(&location).await {
        Ok(LoginOutcome::Authorized { clean_location, .. }) => {
            success!("Authentication successful!");
            let visible = match clean_location.query() {
                Some(q) => format!("{}?{}", clean_location.path(), q),
                None => clean_location.path().to_string(),
            };
            Html(format!(
                "<h2>Authentication successful.</h2><p>You can close this browser window.</p>\
                 <script>window.history.replaceState(null, '', '{}');</script>",
                escape_js(&visible)
            ))
        }
        Ok(LoginOutcome::NoCallback) => {
            Html("<h4>Waiting for Spotify authorization.</h4>".to_string())
        }
        Err(e) => {
            warning!("Login failed: {}", e);
            Html(format!("<h4>Login failed.</h4><p>{}</p>", escape_html(&e.to_string())))
        }
    }
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn escape_js(text: &str) -> String {
    text.replace('\\', "\\\\")
        .replace('\'', "\\'")
        .replace('<', "\\u003c")
}
