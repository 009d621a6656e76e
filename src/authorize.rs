//! Route authorizer: what a route should do given the current session.
//!
//! Pure decision table; the view layer owns navigation and rendering.
//!
//! | requirement            | unresolved/verifying | anonymous       | authenticated  | admin  |
//! |------------------------|----------------------|-----------------|----------------|--------|
//! | Public                 | Render               | Render          | Render         | Render |
//! | AuthenticatedOnly      | ShowLoading          | RedirectToLogin | Render         | Render |
//! | AuthenticatedAdminOnly | ShowLoading          | RedirectToLogin | RedirectToHome | Render |
//! | AnonymousOnly          | ShowLoading          | Render          | RedirectToHome | RedirectToHome |

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::store::{SessionSnapshot, SessionStatus};

pub const LOGIN_PATH: &str = "/login";
pub const HOME_PATH: &str = "/";

/// A route requirement name that none of the known policies accept.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown route requirement '{0}' (expected public, authenticated, admin or anonymous)")]
pub struct ParseRequirementError(pub String);

/// Access policy declared on a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteRequirement {
    Public,
    AuthenticatedOnly,
    AuthenticatedAdminOnly,
    AnonymousOnly,
}

impl FromStr for RouteRequirement {
    type Err = ParseRequirementError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "public" => Ok(Self::Public),
            "authenticated" | "authenticated_only" => Ok(Self::AuthenticatedOnly),
            "admin" | "authenticated_admin_only" => Ok(Self::AuthenticatedAdminOnly),
            "anonymous" | "anonymous_only" => Ok(Self::AnonymousOnly),
            other => Err(ParseRequirementError(other.to_owned())),
        }
    }
}

/// Outcome of authorizing a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    Render,
    ShowLoading,
    RedirectToLogin,
    RedirectToHome,
}

impl Decision {
    /// Navigation target for redirect decisions.
    #[must_use]
    pub fn redirect_path(self) -> Option<&'static str> {
        match self {
            Self::RedirectToLogin => Some(LOGIN_PATH),
            Self::RedirectToHome => Some(HOME_PATH),
            Self::Render | Self::ShowLoading => None,
        }
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Render => "render",
            Self::ShowLoading => "show_loading",
            Self::RedirectToLogin => "redirect_to_login",
            Self::RedirectToHome => "redirect_to_home",
        })
    }
}

/// Decide how a route with `requirement` should react to `snapshot`.
#[must_use]
pub fn authorize(requirement: RouteRequirement, snapshot: &SessionSnapshot) -> Decision {
    if requirement == RouteRequirement::Public {
        return Decision::Render;
    }

    match snapshot.status {
        SessionStatus::Unresolved | SessionStatus::Verifying => Decision::ShowLoading,
        SessionStatus::Anonymous => match requirement {
            RouteRequirement::AnonymousOnly | RouteRequirement::Public => Decision::Render,
            RouteRequirement::AuthenticatedOnly | RouteRequirement::AuthenticatedAdminOnly => {
                Decision::RedirectToLogin
            }
        },
        SessionStatus::Authenticated => match requirement {
            RouteRequirement::Public | RouteRequirement::AuthenticatedOnly => Decision::Render,
            RouteRequirement::AuthenticatedAdminOnly if snapshot.is_admin() => Decision::Render,
            RouteRequirement::AuthenticatedAdminOnly | RouteRequirement::AnonymousOnly => Decision::RedirectToHome,
        },
    }
}

#[cfg(test)]
#[path = "authorize_test.rs"]
mod tests;
