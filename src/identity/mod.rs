//! Identity service seam: the remote authority for tokens and profiles.
//!
//! DESIGN
//! ======
//! The core only sees [`IdentityService`]. `http` is the `reqwest`-backed
//! client for native shells; browser builds supply their own implementation
//! over the same `wire` helpers so both agree on paths, bodies and error
//! mapping.
//!
//! Futures are `?Send`: the whole core lives on one cooperative event loop.

#[cfg(feature = "native")]
pub mod http;
pub mod types;
pub mod wire;

pub use types::{Credentials, IdentityError, Registration, UserProfile};

/// Remote identity operations consumed by the verifier and the login flow.
#[async_trait::async_trait(?Send)]
pub trait IdentityService {
    /// Validate a bearer token and return the identity behind it.
    async fn verify(&self, token: &str) -> Result<UserProfile, IdentityError>;

    /// Exchange credentials for a fresh bearer token.
    async fn login(&self, credentials: &Credentials) -> Result<String, IdentityError>;

    /// Create an account and return a bearer token for it.
    async fn signup(&self, registration: &Registration) -> Result<String, IdentityError>;

    /// Best-effort server-side logout. Local logout never waits on this.
    async fn logout(&self, token: &str) -> Result<(), IdentityError>;
}
