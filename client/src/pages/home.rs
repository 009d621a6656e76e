//! Public landing page.

use leptos::prelude::*;

use crate::components::nav_bar::display_name;
use crate::state::auth::AuthState;

#[component]
pub fn HomePage() -> impl IntoView {
    let auth = expect_context::<RwSignal<AuthState>>();

    let greeting = move || {
        auth.with(|state| match display_name(state) {
            Some(name) => format!("Welcome back, {name}."),
            None if state.loading() => "Checking your session...".to_owned(),
            None => "Welcome to GameHub.".to_owned(),
        })
    };

    view! {
        <div class="home-page">
            <h1>"GameHub"</h1>
            <p class="home-page__greeting">{greeting}</p>
        </div>
    }
}
