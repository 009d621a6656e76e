//! # client
//!
//! Leptos + WASM frontend for GameHub's account flows.
//!
//! The session core (`gamehub-session`) owns tokens, verification and route
//! decisions. This crate mirrors the session into reactive state, guards routes
//! with the authorizer, and supplies the browser collaborators: `localStorage`
//! for the token and `gloo-net` for the identity API.

pub mod app;
pub mod components;
pub mod net;
pub mod pages;
pub mod state;
pub mod util;

/// WASM entry point: hydrate the server-rendered shell.
#[cfg(feature = "hydrate")]
#[wasm_bindgen::prelude::wasm_bindgen]
pub fn hydrate() {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Info);
    leptos::mount::hydrate_body(app::App);
}
