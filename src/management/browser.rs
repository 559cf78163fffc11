use std::{sync::Arc, time::Duration};

use tokio::sync::Mutex;

use crate::{
    config::WindowConfig,
    error::BrowseError,
    spotify::{Catalog, PlayerControl},
    types::Track,
    utils, warning,
};

use super::{
    Credential, CredentialCell, PlayerEvents, PlayerReadiness,
    window::{PageOutcome, PageRequest, PlayerCommand, ResultWindow, WindowSnapshot},
};

pub const DEFAULT_READY_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackAction {
    Played,
    Paused,
    Resumed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrefetchStatus {
    NotNeeded,
    Completed(PageOutcome),
    Failed(BrowseError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectOutcome {
    pub track_id: String,
    pub action: PlaybackAction,
    pub trimmed: usize,
    pub prefetch: PrefetchStatus,
}

/// What the "now playing" panel shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NowPlaying {
    pub title: String,
    pub artist: String,
    pub image: Option<String>,
}

impl From<&Track> for NowPlaying {
    fn from(track: &Track) -> Self {
        Self {
            title: track.name.clone(),
            artist: track.artist_names(),
            image: utils::artwork_url(track).map(str::to_string),
        }
    }
}

/// Drives searching and playback over a shared [`ResultWindow`].
///
/// Network calls are made with the window unlocked; their results are
/// applied afterwards and dropped if a newer search started meanwhile.
#[derive(Clone)]
pub struct TrackBrowser {
    window: Arc<Mutex<ResultWindow>>,
    catalog: Arc<dyn Catalog>,
    player: Arc<dyn PlayerControl>,
    credentials: CredentialCell,
    readiness: PlayerReadiness,
    events: PlayerEvents,
    ready_timeout: Duration,
}

impl TrackBrowser {
    pub fn new(
        config: WindowConfig,
        catalog: Arc<dyn Catalog>,
        player: Arc<dyn PlayerControl>,
        credentials: CredentialCell,
        readiness: PlayerReadiness,
        events: PlayerEvents,
    ) -> Self {
        Self {
            window: Arc::new(Mutex::new(ResultWindow::new(config))),
            catalog,
            player,
            credentials,
            readiness,
            events,
            ready_timeout: DEFAULT_READY_TIMEOUT,
        }
    }

    pub fn with_ready_timeout(mut self, timeout: Duration) -> Self {
        self.ready_timeout = timeout;
        self
    }

    pub fn events(&self) -> &PlayerEvents {
        &self.events
    }

    pub async fn snapshot(&self) -> WindowSnapshot {
        self.window.lock().await.snapshot()
    }

    pub async fn now_playing(&self) -> Option<NowPlaying> {
        self.window.lock().await.current_track().map(NowPlaying::from)
    }

    /// Starts a new query and loads its first page.
    ///
    /// Returns [`PageOutcome::Stale`] when another search replaced this one
    /// before its page arrived.
    pub async fn search(&self, keyword: &str) -> Result<PageOutcome, BrowseError> {
        let request = self.window.lock().await.begin_search(keyword)?;

        let Some(credential) = self.credentials.current() else {
            self.window.lock().await.fail_fetch(&request);
            return Err(BrowseError::NotAuthenticated);
        };

        self.fetch(&credential, &request).await
    }

    /// Plays, pauses or resumes the selected track, then runs window
    /// maintenance for new plays.
    ///
    /// A rejected player command leaves the window unchanged.
    pub async fn select_and_play(&self, track_id: &str) -> Result<SelectOutcome, BrowseError> {
        let credential = self
            .credentials
            .current()
            .ok_or(BrowseError::NotAuthenticated)?;
        let device_id = self.readiness.wait(self.ready_timeout).await?;

        let plan = self.window.lock().await.plan_select(track_id)?;

        let action = match &plan.command {
            PlayerCommand::Play { uri } => {
                self.player.play(&credential, &device_id, uri).await?;
                PlaybackAction::Played
            }
            PlayerCommand::Pause => {
                self.player.pause(&credential, &device_id).await?;
                PlaybackAction::Paused
            }
            PlayerCommand::Resume => {
                self.player.resume(&credential, &device_id).await?;
                PlaybackAction::Resumed
            }
        };

        let maintenance = self.window.lock().await.commit_select(&plan);
        self.publish_state(&credential).await;

        let prefetch = match maintenance.prefetch {
            None => PrefetchStatus::NotNeeded,
            Some(request) => match self.fetch(&credential, &request).await {
                Ok(outcome) => PrefetchStatus::Completed(outcome),
                Err(e) => {
                    warning!("Failed to load more tracks: {}", e);
                    PrefetchStatus::Failed(e)
                }
            },
        };

        Ok(SelectOutcome {
            track_id: plan.track_id,
            action,
            trimmed: maintenance.trimmed,
            prefetch,
        })
    }

    /// Toggles playback on the device without touching the window.
    pub async fn toggle_playback(&self) -> Result<(), BrowseError> {
        let (credential, device_id) = self.player_target().await?;
        self.player.toggle(&credential, &device_id).await?;
        self.publish_state(&credential).await;
        Ok(())
    }

    pub async fn skip_next(&self) -> Result<(), BrowseError> {
        let (credential, device_id) = self.player_target().await?;
        self.player.next(&credential, &device_id).await?;
        self.publish_state(&credential).await;
        Ok(())
    }

    pub async fn skip_previous(&self) -> Result<(), BrowseError> {
        let (credential, device_id) = self.player_target().await?;
        self.player.previous(&credential, &device_id).await?;
        self.publish_state(&credential).await;
        Ok(())
    }

    async fn player_target(&self) -> Result<(Credential, String), BrowseError> {
        let credential = self
            .credentials
            .current()
            .ok_or(BrowseError::NotAuthenticated)?;
        let device_id = self.readiness.wait(self.ready_timeout).await?;
        Ok((credential, device_id))
    }

    async fn fetch(
        &self,
        credential: &Credential,
        request: &PageRequest,
    ) -> Result<PageOutcome, BrowseError> {
        let result = self.catalog.search_tracks(credential, request).await;

        let mut window = self.window.lock().await;
        match result {
            Ok(page) => Ok(window.apply_page(request, page)),
            Err(e) if window.fail_fetch(request) => Err(e),
            Err(_) => Ok(PageOutcome::Stale),
        }
    }

    async fn publish_state(&self, credential: &Credential) {
        match self.player.state(credential).await {
            Ok(Some(state)) => self.events.emit(&state),
            Ok(None) => {}
            Err(e) => warning!("Failed to read player state: {}", e),
        }
    }
}
