//! Login page: email + password against the identity service.

#[cfg(test)]
#[path = "login_test.rs"]
mod login_test;

use gamehub_session::{Credentials, RouteRequirement};
use leptos::prelude::*;

use crate::state::auth::SessionHandle;
use crate::util::auth::RouteGuard;

const MISSING_FIELDS: &str = "Enter your email and password.";

/// Trim the email and require both fields.
pub(crate) fn validate_login_input(email: &str, password: &str) -> Result<(String, String), &'static str> {
    let email = email.trim();
    if email.is_empty() || password.is_empty() {
        return Err(MISSING_FIELDS);
    }
    Ok((email.to_owned(), password.to_owned()))
}

/// Anonymous-only route. Once the session resolves to a user, the guard
/// sends them home.
#[component]
pub fn LoginPage() -> impl IntoView {
    // Owned here so form state survives the guard's loading swap.
    let email = RwSignal::new(String::new());
    let password = RwSignal::new(String::new());
    let info = RwSignal::new(String::new());
    let busy = RwSignal::new(false);

    view! {
        <RouteGuard requirement=RouteRequirement::AnonymousOnly>
            <LoginForm email password info busy/>
        </RouteGuard>
    }
}

#[component]
fn LoginForm(
    email: RwSignal<String>,
    password: RwSignal<String>,
    info: RwSignal<String>,
    busy: RwSignal<bool>,
) -> impl IntoView {
    let session = expect_context::<SessionHandle>();

    let on_submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        if busy.get() {
            return;
        }
        let (email_value, password_value) = match validate_login_input(&email.get(), &password.get()) {
            Ok(values) => values,
            Err(msg) => {
                info.set(msg.to_owned());
                return;
            }
        };
        busy.set(true);
        info.set("Signing in...".to_owned());

        let session = session.get_value();
        leptos::task::spawn_local(async move {
            match session.login(&Credentials::new(email_value, password_value)).await {
                Ok(_) => {
                    password.set(String::new());
                    info.set(String::new());
                }
                Err(e) => info.set(e.user_message()),
            }
            busy.set(false);
        });
    };

    view! {
        <div class="login-page">
            <div class="login-card">
                <h1>"GameHub"</h1>
                <p class="login-card__subtitle">"Sign in to continue"</p>
                <form class="login-form" on:submit=on_submit>
                    <input
                        class="login-input"
                        type="email"
                        placeholder="you@example.com"
                        prop:value=move || email.get()
                        on:input=move |ev| email.set(event_target_value(&ev))
                    />
                    <input
                        class="login-input"
                        type="password"
                        placeholder="Password"
                        prop:value=move || password.get()
                        on:input=move |ev| password.set(event_target_value(&ev))
                    />
                    <button class="login-button" type="submit" disabled=move || busy.get()>
                        "Log In"
                    </button>
                </form>
                <Show when=move || !info.get().is_empty()>
                    <p class="login-message">{move || info.get()}</p>
                </Show>
                <p class="login-card__footer">
                    "No account? "
                    <a href="/signup">"Sign up"</a>
                </p>
            </div>
        </div>
    }
}
