//! Session store: the single source of truth for authentication state.
//!
//! SYSTEM CONTEXT
//! ==============
//! Created once per running client and handed (by clone) to the verifier,
//! the facade and the view layer. Route guards and user-aware components read
//! snapshots and subscribe to transitions.
//!
//! DESIGN
//! ======
//! Every transition builds the next [`SessionSnapshot`] off to the side and
//! swaps it in whole, so readers never see a half-applied update. Listeners
//! run after the swap with no internal borrow held; a listener may read the
//! store, subscribe, or trigger another transition.
//!
//! The durable token is a projection: written by `set_token`/`clear_token`,
//! read exactly once in [`SessionStore::create`]. Storage failures are logged
//! and never block the in-memory transition.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use serde::Serialize;

use crate::identity::UserProfile;
use crate::storage::{DurableStorage, StorageKeys};

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SessionError {
    /// `set_resolved` without a token would break the authenticated invariant.
    #[error("cannot resolve a session without a token")]
    MissingToken,
}

/// Lifecycle of the session record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    /// No verification pass has settled for the current token yet.
    #[default]
    Unresolved,
    /// A verification call is in flight.
    Verifying,
    /// Token and user are both present.
    Authenticated,
    /// Neither token nor user is present.
    Anonymous,
}

impl SessionStatus {
    /// `Authenticated` or `Anonymous`.
    #[must_use]
    pub fn is_settled(self) -> bool {
        matches!(self, Self::Authenticated | Self::Anonymous)
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Unresolved => "unresolved",
            Self::Verifying => "verifying",
            Self::Authenticated => "authenticated",
            Self::Anonymous => "anonymous",
        }
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable view of the session at one point in time.
#[derive(Clone, PartialEq, Eq, Default)]
pub struct SessionSnapshot {
    pub token: Option<String>,
    pub user: Option<UserProfile>,
    pub status: SessionStatus,
}

impl SessionSnapshot {
    #[must_use]
    pub fn anonymous() -> Self {
        Self { token: None, user: None, status: SessionStatus::Anonymous }
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.status == SessionStatus::Authenticated && self.user.is_some()
    }

    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.is_authenticated() && self.user.as_ref().is_some_and(|u| u.is_admin)
    }

    #[must_use]
    pub fn user_id(&self) -> Option<&str> {
        self.user.as_ref().map(|u| u.id.as_str())
    }
}

// Tokens stay out of logs.
impl fmt::Debug for SessionSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionSnapshot")
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("user", &self.user)
            .field("status", &self.status)
            .finish()
    }
}

// =============================================================================
// STORE
// =============================================================================

type Listener = Rc<dyn Fn(&SessionSnapshot)>;

struct StoreInner {
    storage: Rc<dyn DurableStorage>,
    keys: StorageKeys,
    snapshot: RefCell<SessionSnapshot>,
    /// Bumped on every applied transition.
    version: Cell<u64>,
    listeners: RefCell<Vec<(u64, Listener)>>,
    next_listener_id: Cell<u64>,
    disposed: Cell<bool>,
}

/// Cheap-to-clone handle to the process-wide session record.
#[derive(Clone)]
pub struct SessionStore {
    inner: Rc<StoreInner>,
}

impl fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionStore")
            .field("status", &self.status())
            .field("listeners", &self.listener_count())
            .field("disposed", &self.is_disposed())
            .finish_non_exhaustive()
    }
}

impl SessionStore {
    /// Create the store, seeding the token from durable storage.
    pub fn create(storage: Rc<dyn DurableStorage>, keys: StorageKeys) -> Self {
        let token = match storage.get(&keys.token_key) {
            Ok(token) => token.filter(|t| !t.is_empty()),
            Err(e) => {
                tracing::warn!(error = %e, "failed to read stored token; starting without one");
                None
            }
        };
        tracing::debug!(has_token = token.is_some(), "session store created");

        Self {
            inner: Rc::new(StoreInner {
                storage,
                keys,
                snapshot: RefCell::new(SessionSnapshot { token, user: None, status: SessionStatus::Unresolved }),
                version: Cell::new(0),
                listeners: RefCell::new(Vec::new()),
                next_listener_id: Cell::new(0),
                disposed: Cell::new(false),
            }),
        }
    }

    #[must_use]
    pub fn get_snapshot(&self) -> SessionSnapshot {
        self.inner.snapshot.borrow().clone()
    }

    #[must_use]
    pub fn status(&self) -> SessionStatus {
        self.inner.snapshot.borrow().status
    }

    #[must_use]
    pub fn token(&self) -> Option<String> {
        self.inner.snapshot.borrow().token.clone()
    }

    #[must_use]
    pub fn keys(&self) -> &StorageKeys {
        &self.inner.keys
    }

    /// Durable key for per-user cached data that logout sweeps away.
    #[must_use]
    pub fn session_scoped_key(&self, user_id: &str, name: &str) -> String {
        self.inner.keys.session_scoped_key(user_id, name)
    }

    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.inner.disposed.get()
    }

    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.inner.listeners.borrow().len()
    }

    // -------------------------------------------------------------------------
    // Operations
    // -------------------------------------------------------------------------

    /// Persist `token` and make it the current token.
    ///
    /// A token different from the current one invalidates the resolved user;
    /// status returns to `Unresolved` until the next verification pass. An
    /// empty token is ignored, matching how `create` reads one back.
    pub fn set_token(&self, token: impl Into<String>) {
        if self.ignore_when_disposed("set_token") {
            return;
        }
        let token = token.into();
        if token.is_empty() {
            tracing::warn!("empty token ignored");
            return;
        }
        if let Err(e) = self.inner.storage.set(&self.inner.keys.token_key, &token) {
            tracing::warn!(error = %e, "failed to persist token");
        }
        self.transition("set_token", move |s| {
            if s.token.as_ref() != Some(&token) {
                s.token = Some(token);
                s.user = None;
                s.status = SessionStatus::Unresolved;
            }
        });
    }

    /// Remove the durable token and sweep all session-scoped keys, for every
    /// user id, then drop the in-memory token.
    pub fn clear_token(&self) {
        if self.ignore_when_disposed("clear_token") {
            return;
        }
        let storage = &self.inner.storage;
        let keys = &self.inner.keys;

        if let Err(e) = storage.remove(&keys.token_key) {
            tracing::warn!(error = %e, "failed to remove stored token");
        }
        match storage.list_keys() {
            Ok(all) => {
                let mut swept = 0_usize;
                for key in all.iter().filter(|k| keys.is_session_scoped(k)) {
                    match storage.remove(key) {
                        Ok(()) => swept += 1,
                        Err(e) => tracing::warn!(%key, error = %e, "failed to remove session-scoped key"),
                    }
                }
                tracing::debug!(swept, "session-scoped storage swept");
            }
            Err(e) => tracing::warn!(error = %e, "failed to list storage keys for session sweep"),
        }

        // Without a token no identity can be held.
        self.transition("clear_token", |s| *s = SessionSnapshot::anonymous());
    }

    /// Record a verified identity.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::MissingToken`] if no token is held.
    pub fn set_resolved(&self, user: UserProfile) -> Result<(), SessionError> {
        if self.ignore_when_disposed("set_resolved") {
            return Ok(());
        }
        if self.inner.snapshot.borrow().token.is_none() {
            return Err(SessionError::MissingToken);
        }
        self.transition("set_resolved", move |s| {
            s.user = Some(user);
            s.status = SessionStatus::Authenticated;
        });
        Ok(())
    }

    /// Drop the in-memory identity and token. Durable storage is untouched.
    pub fn set_anonymous(&self) {
        if self.ignore_when_disposed("set_anonymous") {
            return;
        }
        self.transition("set_anonymous", |s| *s = SessionSnapshot::anonymous());
    }

    /// Publish that a verification call for the current token is in flight.
    pub(crate) fn mark_verifying(&self) {
        if self.ignore_when_disposed("mark_verifying") {
            return;
        }
        self.transition("mark_verifying", |s| {
            if s.token.is_some() {
                s.user = None;
                s.status = SessionStatus::Verifying;
            }
        });
    }

    // -------------------------------------------------------------------------
    // Observation
    // -------------------------------------------------------------------------

    /// Register `listener` to run after every transition that changes the
    /// snapshot. Dropping the returned [`Subscription`] unregisters it.
    pub fn subscribe(&self, listener: impl Fn(&SessionSnapshot) + 'static) -> Subscription {
        let id = self.inner.next_listener_id.get();
        self.inner.next_listener_id.set(id + 1);
        if !self.is_disposed() {
            self.inner.listeners.borrow_mut().push((id, Rc::new(listener)));
        }
        Subscription { store: Rc::downgrade(&self.inner), id, detached: false }
    }

    /// End the store's lifecycle: listeners are released and later
    /// transitions are ignored.
    pub fn dispose(&self) {
        if self.inner.disposed.replace(true) {
            return;
        }
        let released = std::mem::take(&mut *self.inner.listeners.borrow_mut());
        tracing::debug!(listeners = released.len(), "session store disposed");
        drop(released);
    }

    fn ignore_when_disposed(&self, op: &'static str) -> bool {
        let disposed = self.is_disposed();
        if disposed {
            tracing::debug!(op, "session store disposed; operation ignored");
        }
        disposed
    }

    fn transition(&self, op: &'static str, apply: impl FnOnce(&mut SessionSnapshot)) {
        let next = {
            let mut current = self.inner.snapshot.borrow_mut();
            let mut next = current.clone();
            apply(&mut next);
            if next == *current {
                return;
            }
            current.clone_from(&next);
            next
        };
        let version = self.inner.version.get() + 1;
        self.inner.version.set(version);
        tracing::debug!(op, status = %next.status, "session transition");
        self.notify(version, &next);
    }

    fn notify(&self, version: u64, snapshot: &SessionSnapshot) {
        let listeners: Vec<(u64, Listener)> = self
            .inner
            .listeners
            .borrow()
            .iter()
            .map(|(id, l)| (*id, Rc::clone(l)))
            .collect();

        for (id, listener) in listeners {
            // A listener that transitioned the store already delivered a newer snapshot.
            if self.inner.version.get() != version {
                break;
            }
            if self.inner.listeners.borrow().iter().any(|(lid, _)| *lid == id) {
                listener(snapshot);
            }
        }
    }
}

// =============================================================================
// SUBSCRIPTION
// =============================================================================

/// Registration handle returned by [`SessionStore::subscribe`].
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    store: Weak<StoreInner>,
    id: u64,
    detached: bool,
}

impl Subscription {
    /// Keep the listener registered until the store is disposed.
    pub fn detach(mut self) {
        self.detached = true;
    }

    /// Whether the store this subscription belongs to is still alive.
    #[must_use]
    pub fn is_live(&self) -> bool {
        self.store.upgrade().is_some_and(|inner| !inner.disposed.get())
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).field("detached", &self.detached).finish()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if self.detached {
            return;
        }
        let Some(inner) = self.store.upgrade() else {
            return;
        };
        let removed = {
            let mut listeners = inner.listeners.borrow_mut();
            listeners.iter().position(|(id, _)| *id == self.id).map(|idx| listeners.remove(idx))
        };
        drop(removed);
    }
}

#[cfg(test)]
#[path = "store_test.rs"]
mod tests;
