//! Library contents fetch against the user's self-hosted media server.
//!
//! Credentials are passed through, never stored. Validation failures are
//! raised before any network call; a rejected login is a hard failure
//! ([`Error::LoginFailed`]) so the caller can re-prompt, unlike per-item
//! catalog failures which are skipped.

use serde::Deserialize;

use crate::{
    catalog::CLIENT,
    error::{Error, Result},
    types::LibraryContents,
};

/// Credentials for the user's media server.
#[derive(Debug, Clone)]
pub struct Credentials {
    /// Base URL of the server (no trailing slash)
    pub server_url: String,

    /// Account username
    pub username: String,

    /// Account password
    pub password: String,
}

impl Credentials {
    /// Checks that all fields are present before any network call.
    pub fn validate(&self) -> Result<()> {
        if self.server_url.trim().is_empty() {
            return Err(Error::validation("server URL must not be empty"));
        }
        if self.username.trim().is_empty() {
            return Err(Error::validation("username must not be empty"));
        }
        if self.password.is_empty() {
            return Err(Error::validation("password must not be empty"));
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    user: LoginUser,
}

#[derive(Debug, Deserialize)]
struct LoginUser {
    token: String,
}

/// Client for the user's media server.
pub struct LibraryClient;

impl LibraryClient {
    /// Logs in and fetches the user's existing library contents.
    ///
    /// # Errors
    ///
    /// * [`Error::Validation`] - empty credentials, before any network call
    /// * [`Error::LoginFailed`] - any non-2xx response during login
    /// * [`Error::Http`] / [`Error::Network`] / [`Error::Json`] - failures
    ///   while fetching the contents after a successful login
    pub async fn fetch_contents(credentials: &Credentials) -> Result<LibraryContents> {
        credentials.validate()?;

        let login_url = format!("{}/login", credentials.server_url);
        let response = CLIENT
            .post(&login_url)
            .json(&serde_json::json!({
                "username": credentials.username,
                "password": credentials.password,
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Error::LoginFailed);
        }
        let login: LoginResponse = response.json().await?;

        let contents_url = format!("{}/api/series-contents", credentials.server_url);
        let response = CLIENT
            .get(&contents_url)
            .bearer_auth(&login.user.token)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Error::http(response.status().as_u16()));
        }

        Ok(response.json::<LibraryContents>().await?)
    }
}
