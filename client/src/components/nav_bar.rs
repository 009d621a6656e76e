//! Top navigation bar with session-aware links.

#[cfg(test)]
#[path = "nav_bar_test.rs"]
mod nav_bar_test;

use leptos::prelude::*;

use crate::state::auth::{AuthState, SessionHandle};

/// Label shown for the signed-in user: full name, falling back to username.
pub(crate) fn display_name(state: &AuthState) -> Option<String> {
    state.user().map(|u| {
        if u.full_name.trim().is_empty() { u.username.clone() } else { u.full_name.clone() }
    })
}

#[component]
pub fn NavBar() -> impl IntoView {
    let auth = expect_context::<RwSignal<AuthState>>();
    let session = expect_context::<SessionHandle>();

    let on_logout = move |_| {
        let session = session.get_value();
        leptos::task::spawn_local(async move {
            session.logout().await;
        });
    };

    view! {
        <nav class="nav-bar">
            <a class="nav-bar__brand" href="/">"GameHub"</a>
            <Show
                when=move || auth.with(|s| s.user().is_some())
                fallback=move || {
                    view! {
                        <Show when=move || !auth.with(AuthState::loading)>
                            <a class="nav-bar__link" href="/login">"Log in"</a>
                            <a class="nav-bar__link" href="/signup">"Sign up"</a>
                        </Show>
                    }
                }
            >
                <a class="nav-bar__link" href="/profile">
                    {move || auth.with(display_name).unwrap_or_default()}
                </a>
                <Show when=move || auth.with(AuthState::is_admin)>
                    <a class="nav-bar__link" href="/admin">"Admin"</a>
                </Show>
                <button class="nav-bar__button" on:click=on_logout>"Log out"</button>
            </Show>
        </nav>
    }
}
