//! Shared auth UI helpers.
//!
//! SYSTEM CONTEXT
//! ==============
//! Every route applies the same authorizer-driven behavior: wait while the
//! session resolves, redirect when the requirement is not met, render
//! otherwise.

#[cfg(test)]
#[path = "auth_test.rs"]
mod auth_test;

use gamehub_session::{Decision, RouteRequirement};
use leptos::prelude::*;
use leptos_router::NavigateOptions;
use leptos_router::hooks::use_navigate;

use crate::state::auth::AuthState;

/// Navigation target for `requirement` under `state`, if any.
pub fn guard_redirect(requirement: RouteRequirement, state: &AuthState) -> Option<&'static str> {
    state.decide(requirement).redirect_path()
}

/// Redirect whenever the authorizer says this route should not render.
pub fn install_route_guard<F>(requirement: RouteRequirement, auth: RwSignal<AuthState>, navigate: F)
where
    F: Fn(&str, NavigateOptions) + Clone + 'static,
{
    Effect::new(move || {
        let target = auth.with(|state| guard_redirect(requirement, state));
        if let Some(path) = target {
            navigate(path, NavigateOptions { replace: true, ..NavigateOptions::default() });
        }
    });
}

/// Wraps a route's view in the authorizer decision for `requirement`.
#[component]
pub fn RouteGuard(requirement: RouteRequirement, children: ChildrenFn) -> impl IntoView {
    let auth = expect_context::<RwSignal<AuthState>>();
    install_route_guard(requirement, auth, use_navigate());

    let decision = Memo::new(move |_| auth.with(|state| state.decide(requirement)));

    move || match decision.get() {
        Decision::Render => children().into_any(),
        Decision::ShowLoading => view! { <p class="route-guard__loading">"Checking your session..."</p> }.into_any(),
        Decision::RedirectToLogin | Decision::RedirectToHome => ().into_any(),
    }
}
