//! `AuthSession`: the handle the view layer holds.
//!
//! SYSTEM CONTEXT
//! ==============
//! Bundles the store, the verifier and the identity service behind the five
//! operations views need: snapshot/subscribe to read, login/logout to act,
//! authorize to gate routes.
//!
//! ERROR HANDLING
//! ==============
//! Verification never returns an error; the resulting status is the signal.
//! Login and signup return a [`LoginError`] the view can turn into a message,
//! and a failed credential exchange leaves the store untouched.

use std::cell::Cell;
use std::rc::Rc;

use crate::authorize::{self, Decision, RouteRequirement};
use crate::config::SessionConfig;
use crate::identity::{Credentials, IdentityError, IdentityService, Registration, UserProfile};
use crate::storage::DurableStorage;
use crate::store::{SessionSnapshot, SessionStatus, SessionStore, Subscription};
use crate::verifier::SessionVerifier;

// =============================================================================
// ERROR
// =============================================================================

/// Why a login or signup attempt did not produce a session.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LoginError {
    /// The identity service refused the submitted credentials or details.
    #[error("invalid credentials: {message}")]
    InvalidCredentials { message: String },

    /// The identity service could not be reached or is failing.
    #[error("identity service unavailable: {0}")]
    Unavailable(IdentityError),

    /// Any other rejection (unexpected status, malformed reply).
    #[error("login rejected: {0}")]
    Rejected(IdentityError),

    /// A token was issued but verifying it failed; the session is anonymous.
    #[error("signed in but the session could not be verified")]
    VerificationFailed,
}

impl From<IdentityError> for LoginError {
    fn from(err: IdentityError) -> Self {
        match err {
            IdentityError::Unauthorized { message, .. } => Self::InvalidCredentials { message },
            IdentityError::Status { status: 400 | 409 | 422, message } => Self::InvalidCredentials {
                message: message.unwrap_or_else(|| "invalid credentials".to_owned()),
            },
            err if err.is_transient() => Self::Unavailable(err),
            err => Self::Rejected(err),
        }
    }
}

impl LoginError {
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidCredentials { .. } => "E_INVALID_CREDENTIALS",
            Self::Unavailable(_) => "E_UNAVAILABLE",
            Self::Rejected(_) => "E_REJECTED",
            Self::VerificationFailed => "E_VERIFICATION_FAILED",
        }
    }

    /// Short text suitable for the login form's error indicator.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::InvalidCredentials { message } => message.clone(),
            Self::Unavailable(_) => "Unable to reach the server. Please try again.".to_owned(),
            Self::Rejected(err) => err
                .server_message()
                .map_or_else(|| "Login failed. Please try again.".to_owned(), str::to_owned),
            Self::VerificationFailed => "Your session could not be verified. Please log in again.".to_owned(),
        }
    }
}

// =============================================================================
// SESSION
// =============================================================================

#[derive(Clone)]
pub struct AuthSession {
    store: SessionStore,
    verifier: SessionVerifier,
    identity: Rc<dyn IdentityService>,
    bootstrapped: Rc<Cell<bool>>,
}

impl AuthSession {
    /// Create the store (seeding it from `storage`) and wire the verifier.
    pub fn create(storage: Rc<dyn DurableStorage>, identity: Rc<dyn IdentityService>, config: &SessionConfig) -> Self {
        let store = SessionStore::create(storage, config.storage_keys.clone());
        let verifier = SessionVerifier::new(store.clone(), Rc::clone(&identity)).with_retry_policy(config.retry);
        Self { store, verifier, identity, bootstrapped: Rc::new(Cell::new(false)) }
    }

    #[must_use]
    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    #[must_use]
    pub fn get_snapshot(&self) -> SessionSnapshot {
        self.store.get_snapshot()
    }

    pub fn subscribe(&self, listener: impl Fn(&SessionSnapshot) + 'static) -> Subscription {
        self.store.subscribe(listener)
    }

    /// Decide how a route with `requirement` should react right now.
    #[must_use]
    pub fn authorize(&self, requirement: RouteRequirement) -> Decision {
        authorize::authorize(requirement, &self.store.get_snapshot())
    }

    /// Resolve the stored token once per application load. Later calls join
    /// a pass still in flight or report the settled status.
    pub async fn bootstrap(&self) -> SessionStatus {
        if self.bootstrapped.replace(true) && !self.verifier.is_verifying() {
            return self.store.status();
        }
        self.verifier.verify().await
    }

    /// Re-verify the current token on demand (e.g. after a profile edit).
    pub async fn refresh(&self) -> SessionStatus {
        self.verifier.verify().await
    }

    /// Exchange credentials for a token and verify it.
    ///
    /// # Errors
    ///
    /// Returns a [`LoginError`] if the credentials are refused (store left
    /// untouched) or the issued token fails verification.
    pub async fn login(&self, credentials: &Credentials) -> Result<UserProfile, LoginError> {
        let token = self.identity.login(credentials).await.map_err(|e| {
            tracing::info!(error = %e, "login rejected");
            LoginError::from(e)
        })?;
        tracing::info!(email = %credentials.email, "login accepted; verifying session");
        self.establish(token).await
    }

    /// Create an account, then sign in with the token it returns.
    ///
    /// # Errors
    ///
    /// Same contract as [`AuthSession::login`].
    pub async fn signup(&self, registration: &Registration) -> Result<UserProfile, LoginError> {
        let token = self.identity.signup(registration).await.map_err(|e| {
            tracing::info!(error = %e, "signup rejected");
            LoginError::from(e)
        })?;
        tracing::info!(username = %registration.username, "signup accepted; verifying session");
        self.establish(token).await
    }

    async fn establish(&self, token: String) -> Result<UserProfile, LoginError> {
        self.store.set_token(token);
        match self.verifier.verify_fresh().await {
            SessionStatus::Authenticated => self.store.get_snapshot().user.ok_or(LoginError::VerificationFailed),
            _ => Err(LoginError::VerificationFailed),
        }
    }

    /// Sign out locally, then tell the server on a best-effort basis.
    pub async fn logout(&self) {
        let Some(token) = self.logout_local() else {
            return;
        };
        if let Err(e) = self.identity.logout(&token).await {
            tracing::warn!(error = %e, "server-side logout failed; local session already cleared");
        }
    }

    /// Clear the local session synchronously. Returns the token that was
    /// held, if any.
    pub fn logout_local(&self) -> Option<String> {
        let token = self.store.token();
        self.verifier.invalidate();
        self.store.clear_token();
        self.store.set_anonymous();
        if token.is_some() {
            tracing::info!("signed out");
        }
        token
    }

    /// End the session handle's lifecycle. Outstanding passes are discarded.
    pub fn dispose(&self) {
        self.verifier.invalidate();
        self.store.dispose();
    }
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
