//! Identity types: profiles, credentials and errors.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// =============================================================================
// ERROR
// =============================================================================

/// Errors produced by identity service calls.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdentityError {
    /// The request never produced a response (DNS, refused, reset, ...).
    #[error("identity request failed: {0}")]
    Transport(String),

    /// The request exceeded the client timeout.
    #[error("identity request timed out")]
    Timeout,

    /// The service rejected the credential (401/403).
    #[error("unauthorized ({status}): {message}")]
    Unauthorized { status: u16, message: String },

    /// The service answered with another non-success status.
    #[error("identity service error: status {status}")]
    Status { status: u16, message: Option<String> },

    /// The response body did not match the expected shape.
    #[error("identity response parse failed: {0}")]
    Decode(String),

    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),
}

impl IdentityError {
    /// Whether retrying the same request could plausibly succeed.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::Timeout | Self::Status { status: 429 | 500..=599, .. })
    }

    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Transport(_) => "E_TRANSPORT",
            Self::Timeout => "E_TIMEOUT",
            Self::Unauthorized { .. } => "E_UNAUTHORIZED",
            Self::Status { .. } => "E_STATUS",
            Self::Decode(_) => "E_DECODE",
            Self::HttpClientBuild(_) => "E_HTTP_CLIENT_BUILD",
        }
    }

    /// Server-provided message, if the error body carried one.
    #[must_use]
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::Unauthorized { message, .. } => Some(message.as_str()),
            Self::Status { message, .. } => message.as_deref(),
            _ => None,
        }
    }
}

// =============================================================================
// PROFILE
// =============================================================================

/// Resolved identity of the signed-in user.
///
/// Replaced wholesale on every verification pass; nothing outside the session
/// store mutates it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(alias = "_id")]
    pub id: String,
    pub username: String,
    #[serde(default)]
    pub full_name: String,
    pub email: String,
    #[serde(default, alias = "profilePicture")]
    pub profile_picture_ref: Option<String>,
    #[serde(default)]
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
    #[serde(default, alias = "lastActive")]
    pub last_active_at: Option<DateTime<Utc>>,
}

// =============================================================================
// REQUESTS
// =============================================================================

/// Email/password pair submitted at login.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self { email: email.into(), password: password.into() }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// New-account details submitted at signup.
#[derive(Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    pub username: String,
    pub full_name: String,
    pub email: String,
    pub password: String,
}

impl fmt::Debug for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration")
            .field("username", &self.username)
            .field("full_name", &self.full_name)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
#[path = "types_test.rs"]
mod tests;
