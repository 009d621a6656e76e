//! Fakes shared by the unit tests.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

use chrono::{TimeZone, Utc};
use futures::channel::oneshot;

use crate::identity::{Credentials, IdentityError, IdentityService, Registration, UserProfile};
use crate::storage::{MemoryStorage, StorageKeys};
use crate::store::SessionStore;

pub(crate) fn profile(id: &str, is_admin: bool) -> UserProfile {
    UserProfile {
        id: id.to_owned(),
        username: format!("user-{id}"),
        full_name: format!("User {id}"),
        email: format!("{id}@example.com"),
        profile_picture_ref: None,
        is_admin,
        created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).single().unwrap_or_default(),
        last_active_at: None,
    }
}

pub(crate) fn store_with(storage: &MemoryStorage) -> SessionStore {
    SessionStore::create(Rc::new(storage.clone()), StorageKeys::default())
}

/// Scripted identity service. Unscripted calls fail with `Unauthorized`.
#[derive(Default)]
pub(crate) struct FakeIdentity {
    verify_results: RefCell<VecDeque<Result<UserProfile, IdentityError>>>,
    login_results: RefCell<VecDeque<Result<String, IdentityError>>>,
    logout_result: RefCell<Option<IdentityError>>,
    gate: RefCell<Option<oneshot::Receiver<()>>>,
    pub verified_tokens: RefCell<Vec<String>>,
    pub login_calls: Cell<usize>,
    pub logout_calls: Cell<usize>,
}

impl FakeIdentity {
    pub(crate) fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    pub(crate) fn push_verify(&self, result: Result<UserProfile, IdentityError>) {
        self.verify_results.borrow_mut().push_back(result);
    }

    pub(crate) fn push_login(&self, result: Result<String, IdentityError>) {
        self.login_results.borrow_mut().push_back(result);
    }

    pub(crate) fn fail_logout(&self, err: IdentityError) {
        *self.logout_result.borrow_mut() = Some(err);
    }

    /// Hold the next verify call until the returned sender fires.
    pub(crate) fn hold_next_verify(&self) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        *self.gate.borrow_mut() = Some(rx);
        tx
    }

    pub(crate) fn verify_calls(&self) -> usize {
        self.verified_tokens.borrow().len()
    }
}

fn unauthorized() -> IdentityError {
    IdentityError::Unauthorized { status: 401, message: "unscripted".to_owned() }
}

#[async_trait::async_trait(?Send)]
impl IdentityService for FakeIdentity {
    async fn verify(&self, token: &str) -> Result<UserProfile, IdentityError> {
        self.verified_tokens.borrow_mut().push(token.to_owned());
        let result = self.verify_results.borrow_mut().pop_front().unwrap_or_else(|| Err(unauthorized()));
        let gate = self.gate.borrow_mut().take();
        if let Some(gate) = gate {
            let _ = gate.await;
        }
        result
    }

    async fn login(&self, _credentials: &Credentials) -> Result<String, IdentityError> {
        self.login_calls.set(self.login_calls.get() + 1);
        self.login_results.borrow_mut().pop_front().unwrap_or_else(|| Err(unauthorized()))
    }

    async fn signup(&self, _registration: &Registration) -> Result<String, IdentityError> {
        self.login_calls.set(self.login_calls.get() + 1);
        self.login_results.borrow_mut().pop_front().unwrap_or_else(|| Err(unauthorized()))
    }

    async fn logout(&self, _token: &str) -> Result<(), IdentityError> {
        self.logout_calls.set(self.logout_calls.get() + 1);
        match self.logout_result.borrow().clone() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}
