//! Auth-session state for the current browser user.
//!
//! SYSTEM CONTEXT
//! ==============
//! Used by route guards and user-aware components to coordinate login redirects
//! and identity-dependent rendering. The `AuthSession` from the core is the
//! source of truth; `AuthState` is its reactive mirror.

#[cfg(test)]
#[path = "auth_test.rs"]
mod auth_test;

use gamehub_session::{AuthSession, Decision, RouteRequirement, SessionSnapshot, UserProfile, authorize};
use leptos::prelude::*;

/// Context handle to the session facade. The facade is `!Send`, so it lives in
/// local arena storage and is reached through this `Copy` handle.
pub type SessionHandle = StoredValue<AuthSession, LocalStorage>;

/// Reactive copy of the latest session snapshot.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AuthState {
    pub snapshot: SessionSnapshot,
}

impl AuthState {
    pub fn from_snapshot(snapshot: &SessionSnapshot) -> Self {
        Self { snapshot: snapshot.clone() }
    }

    pub fn user(&self) -> Option<&UserProfile> {
        self.snapshot.user.as_ref()
    }

    /// True until the first verification pass settles.
    pub fn loading(&self) -> bool {
        !self.snapshot.status.is_settled()
    }

    pub fn is_admin(&self) -> bool {
        self.snapshot.is_admin()
    }

    pub fn decide(&self, requirement: RouteRequirement) -> Decision {
        authorize(requirement, &self.snapshot)
    }
}

/// Seed `auth` from `session` and keep it in sync for the app's lifetime.
pub fn install_session_mirror(session: &AuthSession, auth: RwSignal<AuthState>) {
    auth.set(AuthState::from_snapshot(&session.get_snapshot()));
    session
        .subscribe(move |snapshot| auth.set(AuthState::from_snapshot(snapshot)))
        .detach();
}
