//! Profile page for the signed-in user.

#[cfg(test)]
#[path = "profile_test.rs"]
mod profile_test;

use gamehub_session::{RouteRequirement, UserProfile};
use leptos::prelude::*;

use crate::state::auth::{AuthState, SessionHandle};
use crate::util::auth::RouteGuard;

/// `(label, value)` rows rendered on the profile card.
pub(crate) fn profile_rows(user: &UserProfile) -> Vec<(&'static str, String)> {
    let mut rows = vec![
        ("Username", user.username.clone()),
        ("Name", user.full_name.clone()),
        ("Email", user.email.clone()),
        ("Member since", user.created_at.format("%Y-%m-%d").to_string()),
    ];
    if let Some(last) = user.last_active_at {
        rows.push(("Last active", last.format("%Y-%m-%d %H:%M UTC").to_string()));
    }
    if user.is_admin {
        rows.push(("Role", "Administrator".to_owned()));
    }
    rows
}

#[component]
pub fn ProfilePage() -> impl IntoView {
    view! {
        <RouteGuard requirement=RouteRequirement::AuthenticatedOnly>
            <ProfileCard/>
        </RouteGuard>
    }
}

#[component]
fn ProfileCard() -> impl IntoView {
    let auth = expect_context::<RwSignal<AuthState>>();
    let session = expect_context::<SessionHandle>();
    let refreshing = RwSignal::new(false);

    let on_refresh = move |_| {
        if refreshing.get() {
            return;
        }
        refreshing.set(true);
        let session = session.get_value();
        leptos::task::spawn_local(async move {
            session.refresh().await;
            refreshing.set(false);
        });
    };

    let rows = move || auth.with(|state| state.user().map(profile_rows).unwrap_or_default());

    view! {
        <div class="profile-page">
            <h1>"Your profile"</h1>
            <dl class="profile-page__rows">
                <For
                    each=rows
                    key=|row| row.clone()
                    children=|(label, value)| view! {
                        <dt>{label}</dt>
                        <dd>{value}</dd>
                    }
                />
            </dl>
            <button class="btn" on:click=on_refresh disabled=move || refreshing.get()>
                "Refresh"
            </button>
        </div>
    }
}
