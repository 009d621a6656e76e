//! Admin-only page.

use gamehub_session::RouteRequirement;
use leptos::prelude::*;

use crate::components::nav_bar::display_name;
use crate::state::auth::AuthState;
use crate::util::auth::RouteGuard;

#[component]
pub fn AdminPage() -> impl IntoView {
    let auth = expect_context::<RwSignal<AuthState>>();

    view! {
        <RouteGuard requirement=RouteRequirement::AuthenticatedAdminOnly>
            <div class="admin-page">
                <h1>"Administration"</h1>
                <p>"Signed in as " {move || auth.with(display_name).unwrap_or_default()}</p>
            </div>
        </RouteGuard>
    }
}
