//! Networking modules.
//!
//! SYSTEM CONTEXT
//! ==============
//! `api` implements the core's `IdentityService` over the browser fetch API.

pub mod api;
