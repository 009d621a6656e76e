//! Identity API client for the browser.
//!
//! Client-side (hydrate): real HTTP calls via `gloo-net`.
//! Server-side (SSR): every call fails with a transport error, since the
//! session is only resolved in the browser.
//!
//! Every call runs under the configured request timeout; a fetch that outlives
//! it resolves to `IdentityError::Timeout`, which the verifier treats like any
//! other failure. The deadline uses the core's browser timer, so a build
//! without one (SSR) runs calls unbounded.
//!
//! ERROR HANDLING
//! ==============
//! Status and body mapping is shared with the native client through
//! `gamehub_session::identity::wire`, so a 401 means the same thing in both.

#![allow(clippy::unused_async)]

#[cfg(test)]
#[path = "api_test.rs"]
mod api_test;

use std::fmt;
use std::future::Future;
use std::time::Duration;

use gamehub_session::config::IdentityTimeouts;
use gamehub_session::identity::wire;
use gamehub_session::timer::{self, Sleeper};
use gamehub_session::{Credentials, IdentityError, IdentityService, Registration, UserProfile};

/// Same-origin (or `base_url`-prefixed) client for `/api/auth/*`.
#[derive(Clone)]
pub struct ApiIdentityService {
    base_url: String,
    request_timeout: Duration,
    sleeper: Option<Sleeper>,
}

impl fmt::Debug for ApiIdentityService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiIdentityService")
            .field("base_url", &self.base_url)
            .field("request_timeout", &self.request_timeout)
            .field("has_timer", &self.sleeper.is_some())
            .finish()
    }
}

impl ApiIdentityService {
    pub fn new(base_url: impl Into<String>, timeouts: IdentityTimeouts) -> Self {
        Self {
            base_url: base_url.into(),
            request_timeout: Duration::from_secs(timeouts.request_secs),
            sleeper: timer::default_sleeper(),
        }
    }

    /// Replace the deadline timer. `None` runs calls unbounded.
    #[must_use]
    pub fn with_sleeper(mut self, sleeper: Option<Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    fn url(&self, path: &str) -> String {
        wire::endpoint(&self.base_url, path)
    }

    /// Run `call` under the request timeout.
    async fn bounded<T>(&self, call: impl Future<Output = Result<T, IdentityError>>) -> Result<T, IdentityError> {
        let Some(sleeper) = self.sleeper.as_ref() else {
            return call.await;
        };
        timer::deadline(sleeper, self.request_timeout, call)
            .await
            .unwrap_or(Err(IdentityError::Timeout))
    }
}

#[cfg(not(feature = "hydrate"))]
fn server_unavailable() -> IdentityError {
    IdentityError::Transport("identity calls are not available on the server".to_owned())
}

#[cfg(feature = "hydrate")]
async fn read_body(request: gloo_net::http::Request) -> Result<String, IdentityError> {
    let resp = request.send().await.map_err(|e| IdentityError::Transport(e.to_string()))?;
    let status = resp.status();
    let text = resp.text().await.map_err(|e| IdentityError::Transport(e.to_string()))?;
    if !wire::is_success(status) {
        return Err(wire::error_for_status(status, &text));
    }
    Ok(text)
}

#[cfg(feature = "hydrate")]
fn with_json<T: serde::Serialize>(
    builder: gloo_net::http::RequestBuilder,
    body: &T,
) -> Result<gloo_net::http::Request, IdentityError> {
    builder.json(body).map_err(|e| IdentityError::Decode(e.to_string()))
}

#[cfg(feature = "hydrate")]
fn with_bearer(builder: gloo_net::http::RequestBuilder, token: &str) -> Result<gloo_net::http::Request, IdentityError> {
    builder
        .header("Authorization", &wire::bearer(token))
        .build()
        .map_err(|e| IdentityError::Transport(e.to_string()))
}

#[async_trait::async_trait(?Send)]
impl IdentityService for ApiIdentityService {
    async fn verify(&self, token: &str) -> Result<UserProfile, IdentityError> {
        let url = self.url(wire::VERIFY_PATH);
        #[cfg(feature = "hydrate")]
        let call = async { read_body(with_bearer(gloo_net::http::Request::get(&url), token)?).await };
        #[cfg(not(feature = "hydrate"))]
        let call = async {
            let _ = (&url, token);
            Err::<String, _>(server_unavailable())
        };
        wire::parse_verify_body(&self.bounded(call).await?)
    }

    async fn login(&self, credentials: &Credentials) -> Result<String, IdentityError> {
        let url = self.url(wire::LOGIN_PATH);
        #[cfg(feature = "hydrate")]
        let call = async { read_body(with_json(gloo_net::http::Request::post(&url), credentials)?).await };
        #[cfg(not(feature = "hydrate"))]
        let call = async {
            let _ = (&url, credentials);
            Err::<String, _>(server_unavailable())
        };
        wire::parse_token_body(&self.bounded(call).await?)
    }

    async fn signup(&self, registration: &Registration) -> Result<String, IdentityError> {
        let url = self.url(wire::SIGNUP_PATH);
        #[cfg(feature = "hydrate")]
        let call = async { read_body(with_json(gloo_net::http::Request::post(&url), registration)?).await };
        #[cfg(not(feature = "hydrate"))]
        let call = async {
            let _ = (&url, registration);
            Err::<String, _>(server_unavailable())
        };
        wire::parse_token_body(&self.bounded(call).await?)
    }

    async fn logout(&self, token: &str) -> Result<(), IdentityError> {
        let url = self.url(wire::LOGOUT_PATH);
        #[cfg(feature = "hydrate")]
        let call = async { read_body(with_bearer(gloo_net::http::Request::post(&url), token)?).await };
        #[cfg(not(feature = "hydrate"))]
        let call = async {
            let _ = (&url, token);
            Err::<String, _>(server_unavailable())
        };
        self.bounded(call).await?;
        Ok(())
    }
}
