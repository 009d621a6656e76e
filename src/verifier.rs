//! Session verifier: resolves a stored token into a confirmed identity.
//!
//! ARCHITECTURE
//! ============
//! ```text
//! start ──no token──────────────────────────────► Anonymous
//!   │
//!   └─token─► Verifying ──verify ok──────────────► Authenticated
//!                  │
//!                  └──any error──► clear_token ──► Anonymous
//! ```
//!
//! A pass is a shared future: a second `verify()` while one is in flight
//! awaits the same outcome instead of calling the identity service again.
//! Each pass carries an epoch; login, signup and logout bump it, and a pass
//! whose epoch is stale drops its outcome instead of writing the store.
//!
//! TRADE-OFFS
//! ==========
//! With the default [`RetryPolicy`] every failure, transient or not, signs the
//! user out. A positive `max_retries` retries transport/timeout/5xx failures
//! with backoff first; a 401 is never retried. Backoff needs a [`Sleeper`];
//! a build without one does not retry at all.

use std::cell::RefCell;
use std::rc::Rc;

use futures::future::{FutureExt, LocalBoxFuture, Shared};

use crate::config::RetryPolicy;
use crate::identity::{IdentityError, IdentityService, UserProfile};
use crate::store::{SessionStatus, SessionStore};
use crate::timer::{self, Sleeper};

type Pass = Shared<LocalBoxFuture<'static, SessionStatus>>;

#[derive(Default)]
struct PassState {
    epoch: u64,
    in_flight: Option<Pass>,
}

#[derive(Clone)]
pub struct SessionVerifier {
    store: SessionStore,
    identity: Rc<dyn IdentityService>,
    retry: RetryPolicy,
    sleeper: Option<Sleeper>,
    passes: Rc<RefCell<PassState>>,
}

impl SessionVerifier {
    pub fn new(store: SessionStore, identity: Rc<dyn IdentityService>) -> Self {
        Self {
            store,
            identity,
            retry: RetryPolicy::default(),
            sleeper: timer::default_sleeper(),
            passes: Rc::new(RefCell::new(PassState::default())),
        }
    }

    /// Replace the backoff timer. `None` disables retries.
    #[must_use]
    pub fn with_sleeper(mut self, sleeper: Option<Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    #[must_use]
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    #[must_use]
    pub fn is_verifying(&self) -> bool {
        self.passes.borrow().in_flight.is_some()
    }

    /// Verify the current token, joining a pass already in flight.
    pub async fn verify(&self) -> SessionStatus {
        let joined = self.passes.borrow().in_flight.clone();
        match joined {
            Some(pass) => {
                tracing::debug!("joining in-flight verification pass");
                pass.await
            }
            None => self.start_pass().await,
        }
    }

    /// Start a new pass that reads the token as it is right now, superseding
    /// any pass in flight.
    pub async fn verify_fresh(&self) -> SessionStatus {
        self.start_pass().await
    }

    /// Drop interest in the pass in flight; its outcome will be discarded.
    pub fn invalidate(&self) {
        let mut passes = self.passes.borrow_mut();
        passes.epoch += 1;
        passes.in_flight = None;
    }

    fn start_pass(&self) -> Pass {
        let epoch = {
            let mut passes = self.passes.borrow_mut();
            passes.epoch += 1;
            passes.in_flight = None;
            passes.epoch
        };

        let Some(token) = self.store.token() else {
            tracing::debug!("no stored token; session is anonymous");
            self.store.set_anonymous();
            return futures::future::ready(self.store.status()).boxed_local().shared();
        };

        self.store.mark_verifying();
        let this = self.clone();
        let pass = async move { this.run_pass(epoch, token).await }.boxed_local().shared();
        self.passes.borrow_mut().in_flight = Some(pass.clone());
        pass
    }

    async fn run_pass(self, epoch: u64, token: String) -> SessionStatus {
        let outcome = self.verify_with_retry(&token).await;

        if !self.finish(epoch, &token) {
            tracing::debug!(epoch, "verification outcome superseded; discarded");
            return self.store.status();
        }

        match outcome {
            Ok(user) => {
                tracing::info!(user_id = %user.id, is_admin = user.is_admin, "session verified");
                if let Err(e) = self.store.set_resolved(user) {
                    tracing::warn!(error = %e, "verified identity could not be recorded");
                }
            }
            Err(err) => {
                tracing::warn!(error = %err, code = err.error_code(), "session verification failed; signing out");
                self.store.clear_token();
                self.store.set_anonymous();
            }
        }
        self.store.status()
    }

    /// Close the pass if it is still the current one for this token.
    fn finish(&self, epoch: u64, token: &str) -> bool {
        let mut passes = self.passes.borrow_mut();
        if passes.epoch != epoch {
            return false;
        }
        passes.in_flight = None;
        self.store.token().as_deref() == Some(token)
    }

    async fn verify_with_retry(&self, token: &str) -> Result<UserProfile, IdentityError> {
        let mut attempt = 0;
        loop {
            match self.identity.verify(token).await {
                Err(err) if err.is_transient() && attempt < self.retry.max_retries => {
                    let Some(sleep) = self.sleeper.as_ref() else {
                        tracing::warn!(error = %err, "no timer in this build; retry policy not applied");
                        return Err(err);
                    };
                    let delay = self.retry.delay_for_attempt(attempt);
                    tracing::warn!(error = %err, attempt = attempt + 1, ?delay, "transient verification failure; retrying");
                    sleep(delay).await;
                    attempt += 1;
                }
                result => return result,
            }
        }
    }
}

#[cfg(test)]
#[path = "verifier_test.rs"]
mod tests;
