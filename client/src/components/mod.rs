//! Reusable UI component modules.
//!
//! SYSTEM CONTEXT
//! ==============
//! Components read the session mirror and the session handle from Leptos
//! context providers.

pub mod nav_bar;
