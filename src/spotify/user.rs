use crate::{management::Credential, types::CurrentUser};

use super::SpotifyClient;

impl SpotifyClient {
    /// Retrieves the profile of the logged in user (`GET /me`).
    ///
    /// # Arguments
    ///
    /// * `credential` - Bearer credential of the logged in user
    ///
    /// # Returns
    ///
    /// The profile with display name and product tier.
    ///
    /// # Errors
    ///
    /// Any transport error or non-2xx status from reqwest.
    ///
    /// # Example
    ///
    /// ```
    /// let user = client.current_user(&credential).await?;
    /// success!("Logged in as {}", user.display_name.unwrap_or(user.id));
    /// ```
    pub async fn current_user(&self, credential: &Credential) -> Result<CurrentUser, reqwest::Error> {
        self.http
            .get(self.endpoint("me"))
            .bearer_auth(credential.access_token())
            .send()
            .await?
            .error_for_status()?
            .json::<CurrentUser>()
            .await
    }
}
