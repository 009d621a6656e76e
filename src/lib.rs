//! # gamehub-session
//!
//! Client-side session and route-authorization core for the GameHub web app
//! and its native shells.
//!
//! SYSTEM CONTEXT
//! ==============
//! The view layer never touches tokens or identity calls directly. It holds an
//! [`AuthSession`] handle, reads [`SessionSnapshot`]s, subscribes to changes,
//! and asks [`authorize`] what to do before rendering a route.
//!
//! DESIGN
//! ======
//! - `store` owns the session record and its durable token projection.
//! - `verifier` turns a stored token into a confirmed identity, once per pass.
//! - `authorize` is a pure decision table over a snapshot.
//! - `identity` and `storage` are the two collaborator seams; `timer` supplies
//!   the runtime's delay for backoff and request deadlines.
//!
//! Everything runs on one cooperative event loop (`Rc`/`RefCell`, `?Send`
//! futures), so the same code drives a browser build and a current-thread
//! tokio runtime.

pub mod authorize;
pub mod config;
#[cfg(feature = "native")]
pub mod file_storage;
pub mod identity;
pub mod session;
pub mod storage;
pub mod store;
pub mod timer;
pub mod verifier;

#[cfg(test)]
pub(crate) mod test_support;

pub use authorize::{Decision, ParseRequirementError, RouteRequirement, authorize};
pub use config::{ConfigError, RetryPolicy, SessionConfig};
pub use identity::{Credentials, IdentityError, IdentityService, Registration, UserProfile};
pub use session::{AuthSession, LoginError};
pub use storage::{DurableStorage, MemoryStorage, StorageError, StorageKeys};
pub use store::{SessionError, SessionSnapshot, SessionStatus, SessionStore, Subscription};
pub use timer::Sleeper;
pub use verifier::SessionVerifier;
