use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{RequestBuilder, StatusCode, header::CONTENT_LENGTH};

use crate::{
    error::BrowseError,
    management::{Credential, PlayerReadiness},
    types::{Device, DevicesResponse, PlayRequest, PlaybackState},
};

use super::{SpotifyClient, parse_spotify_error};

/// Control surface of a Spotify Connect device.
///
/// Every command targets a device id and fails with
/// `BrowseError::PlaybackRejected` carrying Spotify's message, e.g. when the
/// account is not Premium or the device went away.
#[async_trait]
pub trait PlayerControl: Send + Sync {
    /// Lists the user's Connect devices (`GET /me/player/devices`).
    ///
    /// # Returns
    ///
    /// All devices, including restricted ones whose id is `None`.
    async fn devices(&self, credential: &Credential) -> Result<Vec<Device>, BrowseError>;

    /// Starts playing a single playable URI on the device.
    ///
    /// # Arguments
    ///
    /// * `credential` - Bearer credential of the logged in user
    /// * `device_id` - Target Connect device
    /// * `uri` - Track URI such as `spotify:track:4uLU6hMCjMI75M1A2tKUQC`
    ///
    /// # Example
    ///
    /// ```
    /// client.play(&credential, &device_id, &track.uri).await?;
    /// ```
    async fn play(&self, credential: &Credential, device_id: &str, uri: &str)
    -> Result<(), BrowseError>;

    /// Pauses the device (`PUT /me/player/pause`).
    async fn pause(&self, credential: &Credential, device_id: &str) -> Result<(), BrowseError>;

    /// Resumes whatever was playing, without a body.
    async fn resume(&self, credential: &Credential, device_id: &str) -> Result<(), BrowseError>;

    /// Skips to the next track in the device queue.
    async fn next(&self, credential: &Credential, device_id: &str) -> Result<(), BrowseError>;

    /// Skips to the previous track in the device queue.
    async fn previous(&self, credential: &Credential, device_id: &str)
    -> Result<(), BrowseError>;

    /// Current playback, `None` when nothing is active.
    ///
    /// # Returns
    ///
    /// `Ok(None)` for the 204 reply Spotify sends without an active device.
    async fn state(&self, credential: &Credential) -> Result<Option<PlaybackState>, BrowseError>;

    /// Pauses when playing and resumes otherwise, based on [`state`](Self::state).
    async fn toggle(&self, credential: &Credential, device_id: &str) -> Result<(), BrowseError> {
        match self.state(credential).await? {
            Some(state) if state.is_playing => self.pause(credential, device_id).await,
            _ => self.resume(credential, device_id).await,
        }
    }
}

impl SpotifyClient {
    async fn command(&self, request: RequestBuilder) -> Result<(), BrowseError> {
        let response = request
            .send()
            .await
            .map_err(|e| BrowseError::PlaybackRejected(e.to_string()))?;

        if response.status().is_success() {
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        Err(BrowseError::PlaybackRejected(parse_spotify_error(&body)))
    }

    fn player_put(&self, credential: &Credential, path: &str, device_id: &str) -> RequestBuilder {
        self.http
            .put(self.endpoint(path))
            .bearer_auth(credential.access_token())
            .query(&[("device_id", device_id)])
    }

    fn player_post(&self, credential: &Credential, path: &str, device_id: &str) -> RequestBuilder {
        self.http
            .post(self.endpoint(path))
            .bearer_auth(credential.access_token())
            .query(&[("device_id", device_id)])
            .header(CONTENT_LENGTH, "0")
    }
}

#[async_trait]
impl PlayerControl for SpotifyClient {
    async fn devices(&self, credential: &Credential) -> Result<Vec<Device>, BrowseError> {
        let response = self
            .http
            .get(self.endpoint("me/player/devices"))
            .bearer_auth(credential.access_token())
            .send()
            .await
            .map_err(|e| BrowseError::PlaybackRejected(e.to_string()))?;

        if !response.status().is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BrowseError::PlaybackRejected(parse_spotify_error(&body)));
        }

        let res = response
            .json::<DevicesResponse>()
            .await
            .map_err(|e| BrowseError::PlaybackRejected(e.to_string()))?;
        Ok(res.devices)
    }

    async fn play(
        &self,
        credential: &Credential,
        device_id: &str,
        uri: &str,
    ) -> Result<(), BrowseError> {
        let body = PlayRequest {
            uris: vec![uri.to_string()],
        };
        self.command(
            self.player_put(credential, "me/player/play", device_id)
                .json(&body),
        )
        .await
    }

    async fn pause(&self, credential: &Credential, device_id: &str) -> Result<(), BrowseError> {
        self.command(
            self.player_put(credential, "me/player/pause", device_id)
                .header(CONTENT_LENGTH, "0"),
        )
        .await
    }

    async fn resume(&self, credential: &Credential, device_id: &str) -> Result<(), BrowseError> {
        self.command(
            self.player_put(credential, "me/player/play", device_id)
                .header(CONTENT_LENGTH, "0"),
        )
        .await
    }

    async fn next(&self, credential: &Credential, device_id: &str) -> Result<(), BrowseError> {
        self.command(self.player_post(credential, "me/player/next", device_id))
            .await
    }

    async fn previous(
        &self,
        credential: &Credential,
        device_id: &str,
    ) -> Result<(), BrowseError> {
        self.command(self.player_post(credential, "me/player/previous", device_id))
            .await
    }

    async fn state(&self, credential: &Credential) -> Result<Option<PlaybackState>, BrowseError> {
        let response = self
            .http
            .get(self.endpoint("me/player"))
            .bearer_auth(credential.access_token())
            .send()
            .await
            .map_err(|e| BrowseError::PlaybackRejected(e.to_string()))?;

        if response.status() == StatusCode::NO_CONTENT {
            return Ok(None);
        }

        if !response.status().is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BrowseError::PlaybackRejected(parse_spotify_error(&body)));
        }

        response
            .json::<PlaybackState>()
            .await
            .map(Some)
            .map_err(|e| BrowseError::PlaybackRejected(e.to_string()))
    }
}

/// Picks the playback device: the one named `preferred`, else the active
/// device, else the first one listed. Devices without an id are skipped.
///
/// # Arguments
///
/// * `devices` - Devices as listed by [`PlayerControl::devices`]
/// * `preferred` - Device name to match case-insensitively
///
/// # Returns
///
/// `None` when no listed device can be targeted.
///
/// # Example
///
/// ```
/// let devices = player.devices(&credential).await?;
/// if let Some(device) = choose_device(&devices, Some("Kitchen")) {
///     info!("Playing on {}", device.name);
/// }
/// ```
pub fn choose_device<'a>(devices: &'a [Device], preferred: Option<&str>) -> Option<&'a Device> {
    let usable = || devices.iter().filter(|d| d.id.is_some());

    if let Some(name) = preferred {
        if let Some(device) = usable().find(|d| d.name.eq_ignore_ascii_case(name)) {
            return Some(device);
        }
    }

    usable().find(|d| d.is_active).or_else(|| usable().next())
}

/// Looks up the playback device and resolves the readiness signal once.
///
/// When no device is available the signal stays unresolved and waiters run
/// into their timeout.
///
/// # Arguments
///
/// * `player` - Connect control used to list devices
/// * `credential` - Bearer credential of the logged in user
/// * `readiness` - Signal resolved with the chosen device id
/// * `preferred` - Optional device name, see [`choose_device`]
///
/// # Returns
///
/// The chosen device.
///
/// # Errors
///
/// `BrowseError::PlayerNotReady` when no usable device is listed, or the
/// device listing error.
///
/// # Example
///
/// ```
/// tokio::spawn(bootstrap_player(player, credential, readiness.clone(), None));
/// let device_id = readiness.wait(Duration::from_secs(10)).await?;
/// ```
pub async fn bootstrap_player(
    player: Arc<dyn PlayerControl>,
    credential: Credential,
    readiness: PlayerReadiness,
    preferred: Option<String>,
) -> Result<Device, BrowseError> {
    let devices = player.devices(&credential).await?;
    let device = choose_device(&devices, preferred.as_deref())
        .cloned()
        .ok_or(BrowseError::PlayerNotReady)?;

    if let Some(id) = device.id.as_deref() {
        // a second bootstrap keeps the first device
        let _ = readiness.resolve(id);
    }

    Ok(device)
}
