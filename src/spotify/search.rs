use async_trait::async_trait;

use crate::{
    error::BrowseError,
    management::{Credential, PageRequest},
    types::{SearchResponse, TrackPage},
};

use super::{SpotifyClient, parse_spotify_error};

/// Paged track search against the remote catalog.
#[async_trait]
pub trait Catalog: Send + Sync {
    /// Fetches one page of tracks.
    ///
    /// # Arguments
    ///
    /// * `credential` - Bearer credential of the logged in user
    /// * `request` - Query, offset, limit and market of the page
    ///
    /// # Returns
    ///
    /// The page items with the total match count and whether more follow.
    /// Tracks without an id are left out.
    ///
    /// # Errors
    ///
    /// `BrowseError::SearchFailed` carrying the status and Spotify's message,
    /// or the transport error text when the request fails.
    ///
    /// # Example
    ///
    /// ```
    /// let page = client.search_tracks(&credential, &request).await?;
    /// println!("{} of {} tracks", page.items.len(), page.total);
    /// ```
    async fn search_tracks(
        &self,
        credential: &Credential,
        request: &PageRequest,
    ) -> Result<TrackPage, BrowseError>;
}

#[async_trait]
impl Catalog for SpotifyClient {
    async fn search_tracks(
        &self,
        credential: &Credential,
        request: &PageRequest,
    ) -> Result<TrackPage, BrowseError> {
        let limit = request.limit.to_string();
        let offset = request.offset.to_string();

        let response = self
            .http
            .get(self.endpoint("search"))
            .bearer_auth(credential.access_token())
            .query(&[
                ("q", request.query.trim()),
                ("type", "track"),
                ("limit", limit.as_str()),
                ("offset", offset.as_str()),
                ("market", request.market.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BrowseError::SearchFailed(format!(
                "API Error: {} {}",
                status.as_u16(),
                parse_spotify_error(&body)
            )));
        }

        let res = response.json::<SearchResponse>().await?;
        Ok(res.into())
    }
}
