use super::*;
use crate::storage::{DurableStorage, MemoryStorage};
use crate::test_support::{FakeIdentity, profile, store_with};

fn verifier_for(storage: &MemoryStorage, identity: &Rc<FakeIdentity>) -> (SessionStore, SessionVerifier) {
    let store = store_with(storage);
    let verifier = SessionVerifier::new(store.clone(), Rc::clone(identity) as Rc<dyn IdentityService>);
    (store, verifier)
}

// =============================================================================
// state machine
// =============================================================================

#[tokio::test]
async fn no_token_goes_straight_to_anonymous() {
    let identity = FakeIdentity::new();
    let (store, verifier) = verifier_for(&MemoryStorage::new(), &identity);

    assert_eq!(verifier.verify().await, SessionStatus::Anonymous);
    assert_eq!(store.status(), SessionStatus::Anonymous);
    assert_eq!(identity.verify_calls(), 0);
}

#[tokio::test]
async fn accepted_token_resolves_exact_profile() {
    let storage = MemoryStorage::with_entries([("token", "good")]);
    let identity = FakeIdentity::new();
    let expected = profile("u1", false);
    identity.push_verify(Ok(expected.clone()));
    let (store, verifier) = verifier_for(&storage, &identity);

    assert_eq!(verifier.verify().await, SessionStatus::Authenticated);
    let snap = store.get_snapshot();
    assert_eq!(snap.user, Some(expected));
    assert_eq!(snap.token.as_deref(), Some("good"));
    assert_eq!(*identity.verified_tokens.borrow(), vec!["good".to_owned()]);
    assert!(!verifier.is_verifying());
}

#[tokio::test]
async fn rejected_token_collapses_to_anonymous_for_every_failure_kind() {
    let failures = [
        IdentityError::Unauthorized { status: 401, message: "jwt expired".into() },
        IdentityError::Timeout,
        IdentityError::Decode("missing field `createdAt`".into()),
        IdentityError::Transport("connection refused".into()),
        IdentityError::Status { status: 502, message: None },
    ];
    for failure in failures {
        let storage = MemoryStorage::with_entries([("token", "bad"), ("session:u1:chat_history", "[]")]);
        let identity = FakeIdentity::new();
        identity.push_verify(Err(failure.clone()));
        let (store, verifier) = verifier_for(&storage, &identity);

        assert_eq!(verifier.verify().await, SessionStatus::Anonymous, "failure: {failure}");
        assert_eq!(store.get_snapshot(), crate::store::SessionSnapshot::anonymous());
        assert_eq!(storage.get("token").unwrap(), None, "failure: {failure}");
        assert!(!storage.contains("session:u1:chat_history"));
    }
}

#[tokio::test]
async fn verifying_is_visible_while_call_is_suspended() {
    let storage = MemoryStorage::with_entries([("token", "t")]);
    let identity = FakeIdentity::new();
    identity.push_verify(Ok(profile("u1", false)));
    let release = identity.hold_next_verify();
    let (store, verifier) = verifier_for(&storage, &identity);

    let (status, ()) = futures::join!(verifier.verify(), async {
        assert_eq!(store.status(), SessionStatus::Verifying);
        assert!(verifier.is_verifying());
        let _ = release.send(());
    });
    assert_eq!(status, SessionStatus::Authenticated);
}

// =============================================================================
// re-entrancy / sequencing
// =============================================================================

#[tokio::test]
async fn concurrent_verify_shares_one_pass() {
    let storage = MemoryStorage::with_entries([("token", "t")]);
    let identity = FakeIdentity::new();
    identity.push_verify(Ok(profile("u1", false)));
    let release = identity.hold_next_verify();
    let (_store, verifier) = verifier_for(&storage, &identity);

    let (first, second, ()) = futures::join!(verifier.verify(), verifier.verify(), async {
        let _ = release.send(());
    });

    assert_eq!(first, SessionStatus::Authenticated);
    assert_eq!(second, SessionStatus::Authenticated);
    assert_eq!(identity.verify_calls(), 1);
}

#[tokio::test]
async fn verify_fresh_reads_just_set_token() {
    let storage = MemoryStorage::with_entries([("token", "old")]);
    let identity = FakeIdentity::new();
    identity.push_verify(Ok(profile("u1", false)));
    let (store, verifier) = verifier_for(&storage, &identity);

    store.set_token("new");
    assert_eq!(verifier.verify_fresh().await, SessionStatus::Authenticated);
    assert_eq!(*identity.verified_tokens.borrow(), vec!["new".to_owned()]);
}

#[tokio::test]
async fn superseded_failure_does_not_clear_newer_token() {
    let storage = MemoryStorage::with_entries([("token", "old")]);
    let identity = FakeIdentity::new();
    identity.push_verify(Err(IdentityError::Unauthorized { status: 401, message: "expired".into() }));
    identity.push_verify(Ok(profile("u2", false)));
    let release = identity.hold_next_verify();
    let (store, verifier) = verifier_for(&storage, &identity);

    let (stale, fresh, ()) = futures::join!(
        verifier.verify(),
        async {
            store.set_token("new");
            verifier.verify_fresh().await
        },
        async {
            let _ = release.send(());
        }
    );

    assert_eq!(fresh, SessionStatus::Authenticated);
    assert_eq!(stale, SessionStatus::Authenticated);
    assert_eq!(store.token().as_deref(), Some("new"));
    assert_eq!(storage.get("token").unwrap().as_deref(), Some("new"));
    assert_eq!(store.get_snapshot().user_id(), Some("u2"));
}

// =============================================================================
// retry policy
// =============================================================================

fn fast_retry(max_retries: u32) -> RetryPolicy {
    RetryPolicy { max_retries, initial_delay_ms: 1, max_delay_ms: 2 }
}

#[tokio::test]
async fn transient_failure_is_retried_when_enabled() {
    let storage = MemoryStorage::with_entries([("token", "t")]);
    let identity = FakeIdentity::new();
    identity.push_verify(Err(IdentityError::Timeout));
    identity.push_verify(Ok(profile("u1", false)));
    let (store, verifier) = verifier_for(&storage, &identity);
    let verifier = verifier.with_retry_policy(fast_retry(2)).with_sleeper(Some(recording_sleeper().0));

    assert_eq!(verifier.verify().await, SessionStatus::Authenticated);
    assert_eq!(identity.verify_calls(), 2);
    assert!(store.get_snapshot().is_authenticated());
}

#[tokio::test]
async fn unauthorized_is_never_retried() {
    let storage = MemoryStorage::with_entries([("token", "t")]);
    let identity = FakeIdentity::new();
    identity.push_verify(Err(IdentityError::Unauthorized { status: 401, message: "revoked".into() }));
    identity.push_verify(Ok(profile("u1", false)));
    let (_store, verifier) = verifier_for(&storage, &identity);
    let verifier = verifier.with_retry_policy(fast_retry(3)).with_sleeper(Some(recording_sleeper().0));

    assert_eq!(verifier.verify().await, SessionStatus::Anonymous);
    assert_eq!(identity.verify_calls(), 1);
}

#[tokio::test]
async fn exhausted_retries_sign_out() {
    let storage = MemoryStorage::with_entries([("token", "t")]);
    let identity = FakeIdentity::new();
    for _ in 0..3 {
        identity.push_verify(Err(IdentityError::Transport("unreachable".into())));
    }
    let (_store, verifier) = verifier_for(&storage, &identity);
    let verifier = verifier.with_retry_policy(fast_retry(2)).with_sleeper(Some(recording_sleeper().0));

    assert_eq!(verifier.verify().await, SessionStatus::Anonymous);
    assert_eq!(identity.verify_calls(), 3);
    assert!(!storage.contains("token"));
}

#[tokio::test]
async fn default_policy_does_not_retry_transient_failure() {
    let storage = MemoryStorage::with_entries([("token", "t")]);
    let identity = FakeIdentity::new();
    identity.push_verify(Err(IdentityError::Timeout));
    identity.push_verify(Ok(profile("u1", false)));
    let (_store, verifier) = verifier_for(&storage, &identity);

    assert_eq!(verifier.verify().await, SessionStatus::Anonymous);
    assert_eq!(identity.verify_calls(), 1);
}

fn recording_sleeper() -> (crate::timer::Sleeper, Rc<std::cell::RefCell<Vec<std::time::Duration>>>) {
    let delays = Rc::new(std::cell::RefCell::new(Vec::new()));
    let log = Rc::clone(&delays);
    let sleeper: crate::timer::Sleeper = Rc::new(move |delay: std::time::Duration| {
        log.borrow_mut().push(delay);
        futures::FutureExt::boxed_local(futures::future::ready(()))
    });
    (sleeper, delays)
}

#[tokio::test]
async fn backoff_follows_the_policy_schedule() {
    let storage = MemoryStorage::with_entries([("token", "t")]);
    let identity = FakeIdentity::new();
    for _ in 0..3 {
        identity.push_verify(Err(IdentityError::Timeout));
    }
    let (sleeper, delays) = recording_sleeper();
    let (_store, verifier) = verifier_for(&storage, &identity);
    let verifier = verifier
        .with_retry_policy(RetryPolicy { max_retries: 2, initial_delay_ms: 300, max_delay_ms: 5_000 })
        .with_sleeper(Some(sleeper));

    assert_eq!(verifier.verify().await, SessionStatus::Anonymous);
    assert_eq!(identity.verify_calls(), 3);
    assert_eq!(
        *delays.borrow(),
        vec![std::time::Duration::from_millis(300), std::time::Duration::from_millis(600)]
    );
}

#[cfg(feature = "native")]
#[tokio::test]
async fn default_timer_actually_waits_between_attempts() {
    let storage = MemoryStorage::with_entries([("token", "t")]);
    let identity = FakeIdentity::new();
    identity.push_verify(Err(IdentityError::Timeout));
    identity.push_verify(Err(IdentityError::Timeout));
    identity.push_verify(Ok(profile("u1", false)));
    let (_store, verifier) = verifier_for(&storage, &identity);
    let verifier = verifier.with_retry_policy(RetryPolicy { max_retries: 2, initial_delay_ms: 20, max_delay_ms: 1_000 });

    let started = std::time::Instant::now();
    assert_eq!(verifier.verify().await, SessionStatus::Authenticated);
    assert!(started.elapsed() >= std::time::Duration::from_millis(60));
}

#[tokio::test]
async fn without_a_timer_the_retry_policy_is_not_applied() {
    let storage = MemoryStorage::with_entries([("token", "t")]);
    let identity = FakeIdentity::new();
    identity.push_verify(Err(IdentityError::Timeout));
    identity.push_verify(Ok(profile("u1", false)));
    let (_store, verifier) = verifier_for(&storage, &identity);
    let verifier = verifier.with_retry_policy(fast_retry(3)).with_sleeper(None);

    assert_eq!(verifier.verify().await, SessionStatus::Anonymous);
    assert_eq!(identity.verify_calls(), 1);
    assert!(!storage.contains("token"));
}

// =============================================================================
// dangling completions
// =============================================================================

#[tokio::test]
async fn completion_after_observer_is_gone_is_ignored_quietly() {
    let storage = MemoryStorage::with_entries([("token", "t")]);
    let identity = FakeIdentity::new();
    identity.push_verify(Ok(profile("u1", false)));
    let release = identity.hold_next_verify();
    let (store, verifier) = verifier_for(&storage, &identity);

    let observed = Rc::new(std::cell::Cell::new(0));
    let counter = Rc::clone(&observed);
    let subscription = store.subscribe(move |_| counter.set(counter.get() + 1));

    let (status, ()) = futures::join!(verifier.verify(), async move {
        drop(subscription);
        let _ = release.send(());
    });

    assert_eq!(status, SessionStatus::Authenticated);
    // Only the Verifying transition reached the observer.
    assert_eq!(observed.get(), 1);
}

#[tokio::test]
async fn completion_after_dispose_is_ignored_quietly() {
    let storage = MemoryStorage::with_entries([("token", "t")]);
    let identity = FakeIdentity::new();
    identity.push_verify(Err(IdentityError::Unauthorized { status: 401, message: "expired".into() }));
    let release = identity.hold_next_verify();
    let (store, verifier) = verifier_for(&storage, &identity);

    let (status, ()) = futures::join!(verifier.verify(), async {
        store.dispose();
        let _ = release.send(());
    });

    assert_eq!(status, SessionStatus::Verifying);
    assert!(storage.contains("token"));
}
