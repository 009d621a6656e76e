//! `reqwest`-backed identity client for native shells.
//!
//! Thin HTTP wrapper over the `/api/auth/*` endpoints. Status and body
//! mapping lives in `wire` so it stays testable without a server.

use std::time::Duration;

use super::types::{Credentials, IdentityError, Registration, UserProfile};
use super::{IdentityService, wire};
use crate::config::IdentityTimeouts;

// =============================================================================
// CLIENT
// =============================================================================

pub struct HttpIdentityClient {
    http: reqwest::Client,
    base_url: String,
}

impl HttpIdentityClient {
    /// Build a client for `base_url` with request/connect timeouts applied.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build.
    pub fn new(base_url: impl Into<String>, timeouts: IdentityTimeouts) -> Result<Self, IdentityError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeouts.request_secs))
            .connect_timeout(Duration::from_secs(timeouts.connect_secs))
            .build()
            .map_err(|e| IdentityError::HttpClientBuild(e.to_string()))?;
        Ok(Self { http, base_url: base_url.into() })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<String, IdentityError> {
        let response = request.send().await.map_err(map_reqwest_error)?;
        let status = response.status().as_u16();
        let text = response.text().await.map_err(map_reqwest_error)?;

        if !wire::is_success(status) {
            return Err(wire::error_for_status(status, &text));
        }
        Ok(text)
    }
}

#[async_trait::async_trait(?Send)]
impl IdentityService for HttpIdentityClient {
    async fn verify(&self, token: &str) -> Result<UserProfile, IdentityError> {
        let url = wire::endpoint(&self.base_url, wire::VERIFY_PATH);
        let text = self
            .send(self.http.get(url).header(reqwest::header::AUTHORIZATION, wire::bearer(token)))
            .await?;
        wire::parse_verify_body(&text)
    }

    async fn login(&self, credentials: &Credentials) -> Result<String, IdentityError> {
        let url = wire::endpoint(&self.base_url, wire::LOGIN_PATH);
        let text = self.send(self.http.post(url).json(credentials)).await?;
        wire::parse_token_body(&text)
    }

    async fn signup(&self, registration: &Registration) -> Result<String, IdentityError> {
        let url = wire::endpoint(&self.base_url, wire::SIGNUP_PATH);
        let text = self.send(self.http.post(url).json(registration)).await?;
        wire::parse_token_body(&text)
    }

    async fn logout(&self, token: &str) -> Result<(), IdentityError> {
        let url = wire::endpoint(&self.base_url, wire::LOGOUT_PATH);
        self.send(self.http.post(url).header(reqwest::header::AUTHORIZATION, wire::bearer(token)))
            .await?;
        Ok(())
    }
}

fn map_reqwest_error(err: reqwest::Error) -> IdentityError {
    if err.is_timeout() {
        IdentityError::Timeout
    } else if err.is_decode() {
        IdentityError::Decode(err.to_string())
    } else {
        IdentityError::Transport(err.to_string())
    }
}
