//! Shared client-side state modules.
//!
//! DESIGN
//! ======
//! Only `auth` lives here today: the reactive mirror of the core session.

pub mod auth;
