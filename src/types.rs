use serde::{Deserialize, Deserializer, Serialize, de::Error as _};
use tabled::Tabled;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: Option<String>,
    pub scope: Option<String>,
    pub expires_in: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artist {
    pub id: Option<String>,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Image {
    pub url: String,
    pub height: Option<u32>,
    pub width: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Album {
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub images: Vec<Image>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub artists: Vec<Artist>,
    pub album: Album,
    pub duration_ms: u64,
    pub uri: String,
}

impl Track {
    /// Whether a raw JSON track can be played. Local files and unavailable
    /// tracks come back as `null` or with a `null` id.
    fn is_playable(value: &serde_json::Value) -> bool {
        value.get("id").is_some_and(|id| !id.is_null())
    }

    pub fn artist_names(&self) -> String {
        self.artists
            .iter()
            .map(|a| a.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
    pub tracks: Option<TracksContainer>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TracksContainer {
    #[serde(default, deserialize_with = "playable_tracks")]
    pub items: Vec<Track>,
    pub total: usize,
    pub offset: Option<usize>,
    pub limit: Option<usize>,
    pub next: Option<String>,
}

/// One page of search results as the window consumes it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackPage {
    pub items: Vec<Track>,
    pub total: usize,
}

impl From<SearchResponse> for TrackPage {
    fn from(res: SearchResponse) -> Self {
        match res.tracks {
            Some(tracks) => TrackPage {
                items: tracks.items,
                total: tracks.total,
            },
            None => TrackPage {
                items: Vec::new(),
                total: 0,
            },
        }
    }
}

/// Deserializes a track list, leaving out entries that have no id.
fn playable_tracks<'de, D>(deserializer: D) -> Result<Vec<Track>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Vec<serde_json::Value>>::deserialize(deserializer)?.unwrap_or_default();

    raw.into_iter()
        .filter(Track::is_playable)
        .map(|value| serde_json::from_value::<Track>(value).map_err(D::Error::custom))
        .collect()
}

fn playable_track<'de, D>(deserializer: D) -> Result<Option<Track>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<serde_json::Value>::deserialize(deserializer)? {
        Some(value) if Track::is_playable(&value) => serde_json::from_value::<Track>(value)
            .map(Some)
            .map_err(D::Error::custom),
        _ => Ok(None),
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentUser {
    pub id: String,
    pub display_name: Option<String>,
    pub product: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Device {
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub is_active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DevicesResponse {
    #[serde(default)]
    pub devices: Vec<Device>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayRequest {
    pub uris: Vec<String>,
}

/// Snapshot of the remote player as reported by `GET /me/player`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaybackState {
    pub is_playing: bool,
    pub progress_ms: Option<u64>,
    #[serde(default, deserialize_with = "playable_track")]
    pub item: Option<Track>,
    pub device: Option<Device>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpotifyErrorResponse {
    pub error: SpotifyErrorDetails,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpotifyErrorDetails {
    pub status: u16,
    pub message: String,
    pub reason: Option<String>,
}

#[derive(Tabled)]
pub struct TrackTableRow {
    #[tabled(rename = "#")]
    pub number: usize,
    #[tabled(rename = "")]
    pub playing: String,
    pub title: String,
    pub artists: String,
    pub album: String,
    pub duration: String,
}
