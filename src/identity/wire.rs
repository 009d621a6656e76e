//! Wire helpers shared by every HTTP identity client.
//!
//! Pure functions over status codes and response text so both the `reqwest`
//! client and the browser client map responses identically.

use serde::Deserialize;

use super::types::{IdentityError, UserProfile};

pub const VERIFY_PATH: &str = "/api/auth/verify";
pub const LOGIN_PATH: &str = "/api/auth/login";
pub const SIGNUP_PATH: &str = "/api/auth/signup";
pub const LOGOUT_PATH: &str = "/api/auth/logout";

/// Join a base URL and an endpoint path. An empty base yields a same-origin
/// relative URL.
#[must_use]
pub fn endpoint(base_url: &str, path: &str) -> String {
    format!("{}{path}", base_url.trim_end_matches('/'))
}

/// `Authorization` header value for a bearer token.
#[must_use]
pub fn bearer(token: &str) -> String {
    format!("Bearer {token}")
}

#[derive(Deserialize)]
#[serde(untagged)]
enum VerifyBody {
    Wrapped { user: UserProfile },
    Bare(UserProfile),
}

#[derive(Deserialize)]
struct TokenBody {
    token: String,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(alias = "error")]
    message: String,
}

/// Parse a successful verify body: `{ "user": {...} }` or a bare profile.
///
/// # Errors
///
/// Returns [`IdentityError::Decode`] if neither shape matches.
pub fn parse_verify_body(text: &str) -> Result<UserProfile, IdentityError> {
    let body: VerifyBody = serde_json::from_str(text).map_err(|e| IdentityError::Decode(e.to_string()))?;
    Ok(match body {
        VerifyBody::Wrapped { user } | VerifyBody::Bare(user) => user,
    })
}

/// Parse a successful login/signup body `{ "token": "..." }`.
///
/// # Errors
///
/// Returns [`IdentityError::Decode`] if the body has no non-empty token.
pub fn parse_token_body(text: &str) -> Result<String, IdentityError> {
    let body: TokenBody = serde_json::from_str(text).map_err(|e| IdentityError::Decode(e.to_string()))?;
    if body.token.is_empty() {
        return Err(IdentityError::Decode("empty token".to_owned()));
    }
    Ok(body.token)
}

/// Extract `{ "message": "..." }` (or `{ "error": "..." }`) from an error body.
#[must_use]
pub fn parse_error_message(text: &str) -> Option<String> {
    match serde_json::from_str::<ErrorBody>(text) {
        Ok(body) if !body.message.is_empty() => Some(body.message),
        _ => None,
    }
}

/// Map a non-success status and its body to an [`IdentityError`].
#[must_use]
pub fn error_for_status(status: u16, body: &str) -> IdentityError {
    let message = parse_error_message(body);
    match status {
        401 | 403 => IdentityError::Unauthorized {
            status,
            message: message.unwrap_or_else(|| "unauthorized".to_owned()),
        },
        _ => IdentityError::Status { status, message },
    }
}

#[must_use]
pub fn is_success(status: u16) -> bool {
    (200..300).contains(&status)
}

#[cfg(test)]
#[path = "wire_test.rs"]
mod tests;
