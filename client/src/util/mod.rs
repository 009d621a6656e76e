//! Utility helpers shared across client UI modules.
//!
//! SYSTEM CONTEXT
//! ==============
//! Utility modules isolate browser concerns from page logic to improve reuse
//! and testability.

pub mod auth;
pub mod storage;
