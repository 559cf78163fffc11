use std::{sync::Arc, time::Duration};

use crate::{
    Res,
    config::AuthConfig,
    info,
    management::{Credential, CredentialCell, MemoryStore},
    server,
    spotify::{AuthHandshake, SpotifyClient},
    success, warning,
};

/// Maximum time to wait for the user to finish the authorization page.
pub const LOGIN_TIMEOUT: Duration = Duration::from_secs(60);

/// Everything a login needs, shared with the rest of the session.
pub struct LoginContext {
    pub handshake: Arc<AuthHandshake>,
    pub client: Arc<SpotifyClient>,
    pub credentials: CredentialCell,
}

impl LoginContext {
    pub fn from_env() -> Res<Self> {
        let config = AuthConfig::from_env()?;
        let client = Arc::new(SpotifyClient::from_config(&config));
        let credentials = CredentialCell::new();
        let handshake = Arc::new(AuthHandshake::new(
            config,
            Arc::new(MemoryStore::new()),
            client.clone(),
            credentials.clone(),
        ));

        Ok(Self {
            handshake,
            client,
            credentials,
        })
    }
}

/// Runs the login handshake end to end.
///
/// 1. Generates the PKCE pair and state, builds the authorization URL
/// 2. Binds the local callback server on the redirect target
/// 3. Opens the authorization URL in the default browser
/// 4. Waits until the callback handler stores a credential
///
/// The callback server keeps running afterwards; reloading the callback page
/// is harmless because the stored state is single-use.
pub async fn login(ctx: &LoginContext) -> Res<Credential> {
    let redirect = ctx.handshake.begin_login()?;

    let addr = ctx.handshake.config().server_addr()?;
    let listener = server::bind(addr)
        .await
        .map_err(|e| format!("Failed to bind callback server on {}: {}", addr, e))?;

    let handshake = Arc::clone(&ctx.handshake);
    tokio::spawn(async move {
        if let Err(e) = server::serve(listener, handshake).await {
            warning!("Callback server stopped: {}", e);
        }
    });

    if webbrowser::open(redirect.url.as_str()).is_err() {
        warning!(
            "Failed to open browser. Please navigate to the following URL manually:\n{}",
            redirect.url
        )
    }

    info!("Waiting for Spotify authorization...");
    ctx.credentials
        .wait_for(LOGIN_TIMEOUT)
        .await
        .ok_or_else(|| "Authentication failed or timed out.".into())
}

/// Greets the user; a failing profile lookup is only a warning.
pub async fn greet(ctx: &LoginContext, credential: &Credential) {
    match ctx.client.current_user(credential).await {
        Ok(user) => {
            let name = user.display_name.unwrap_or(user.id);
            info!("Welcome, {}!", name);
            if user.product.as_deref() != Some("premium") {
                warning!("You'll need a Spotify Premium account to use the playback features.");
            }
        }
        Err(e) => warning!("Error fetching user: {}", e),
    }
}

pub async fn auth() -> Res<()> {
    let ctx = LoginContext::from_env()?;
    let credential = login(&ctx).await?;
    greet(&ctx, &credential).await;

    if let Some(scope) = &credential.scope {
        info!("Granted scopes: {}", scope);
    }
    success!("Login works. Run `spotrack session` to search and play tracks.");

    ctx.handshake.logout();
    Ok(())
}
