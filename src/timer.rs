//! Async delays for retry backoff and request deadlines.
//!
//! The core never picks a runtime itself. A [`Sleeper`] is a boxed delay
//! factory: `tokio::time::sleep` under the `native` feature,
//! `gloo_timers::future::sleep` under `browser`. A build with neither has no
//! timer, and callers must treat that as "no backoff, no deadline".

use std::future::Future;
use std::rc::Rc;
use std::time::Duration;

use futures::future::{Either, LocalBoxFuture};
#[cfg(any(feature = "native", feature = "browser"))]
use futures::future::FutureExt;

/// Produces a future that completes after the given delay.
pub type Sleeper = Rc<dyn Fn(Duration) -> LocalBoxFuture<'static, ()>>;

/// The runtime timer compiled into this build, if any.
#[cfg(feature = "native")]
#[must_use]
pub fn default_sleeper() -> Option<Sleeper> {
    Some(Rc::new(|delay| tokio::time::sleep(delay).boxed_local()))
}

/// The runtime timer compiled into this build, if any.
#[cfg(all(feature = "browser", not(feature = "native")))]
#[must_use]
pub fn default_sleeper() -> Option<Sleeper> {
    Some(Rc::new(|delay| gloo_timers::future::sleep(delay).boxed_local()))
}

/// The runtime timer compiled into this build, if any.
#[cfg(not(any(feature = "native", feature = "browser")))]
#[must_use]
pub fn default_sleeper() -> Option<Sleeper> {
    None
}

/// Race `fut` against `limit`. Returns `None` when the deadline fires first;
/// the losing future is dropped.
pub async fn deadline<F: Future>(sleeper: &Sleeper, limit: Duration, fut: F) -> Option<F::Output> {
    let fut = std::pin::pin!(fut);
    match futures::future::select(fut, sleeper(limit)).await {
        Either::Left((output, _)) => Some(output),
        Either::Right(((), _)) => None,
    }
}

#[cfg(test)]
#[path = "timer_test.rs"]
mod tests;
