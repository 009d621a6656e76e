//! Signup page: create an account and land signed in.

#[cfg(test)]
#[path = "signup_test.rs"]
mod signup_test;

use gamehub_session::{Registration, RouteRequirement};
use leptos::prelude::*;

use crate::state::auth::SessionHandle;
use crate::util::auth::RouteGuard;

const MIN_PASSWORD_LEN: usize = 6;

/// Check the form locally before calling the identity service.
pub(crate) fn validate_signup_input(
    username: &str,
    full_name: &str,
    email: &str,
    password: &str,
) -> Result<Registration, &'static str> {
    let (username, full_name, email) = (username.trim(), full_name.trim(), email.trim());
    if username.is_empty() || full_name.is_empty() || email.is_empty() || password.is_empty() {
        return Err("Fill in every field.");
    }
    if !email.contains('@') {
        return Err("Enter a valid email address.");
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err("Password must be at least 6 characters.");
    }
    Ok(Registration {
        username: username.to_owned(),
        full_name: full_name.to_owned(),
        email: email.to_owned(),
        password: password.to_owned(),
    })
}

#[derive(Clone, Copy)]
struct SignupFields {
    username: RwSignal<String>,
    full_name: RwSignal<String>,
    email: RwSignal<String>,
    password: RwSignal<String>,
    info: RwSignal<String>,
    busy: RwSignal<bool>,
}

#[component]
pub fn SignupPage() -> impl IntoView {
    let fields = SignupFields {
        username: RwSignal::new(String::new()),
        full_name: RwSignal::new(String::new()),
        email: RwSignal::new(String::new()),
        password: RwSignal::new(String::new()),
        info: RwSignal::new(String::new()),
        busy: RwSignal::new(false),
    };

    view! {
        <RouteGuard requirement=RouteRequirement::AnonymousOnly>
            <SignupForm fields/>
        </RouteGuard>
    }
}

#[component]
fn SignupForm(fields: SignupFields) -> impl IntoView {
    let session = expect_context::<SessionHandle>();
    let SignupFields { username, full_name, email, password, info, busy } = fields;

    let on_submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        if busy.get() {
            return;
        }
        let registration =
            match validate_signup_input(&username.get(), &full_name.get(), &email.get(), &password.get()) {
                Ok(registration) => registration,
                Err(msg) => {
                    info.set(msg.to_owned());
                    return;
                }
            };
        busy.set(true);
        info.set("Creating your account...".to_owned());

        let session = session.get_value();
        leptos::task::spawn_local(async move {
            match session.signup(&registration).await {
                Ok(_) => {
                    password.set(String::new());
                    info.set(String::new());
                }
                Err(e) => info.set(e.user_message()),
            }
            busy.set(false);
        });
    };

    let field = move |kind: &'static str, placeholder: &'static str, signal: RwSignal<String>| {
        view! {
            <input
                class="login-input"
                type=kind
                placeholder=placeholder
                prop:value=move || signal.get()
                on:input=move |ev| signal.set(event_target_value(&ev))
            />
        }
    };

    view! {
        <div class="login-page">
            <div class="login-card">
                <h1>"GameHub"</h1>
                <p class="login-card__subtitle">"Create an account"</p>
                <form class="login-form" on:submit=on_submit>
                    {field("text", "Username", username)}
                    {field("text", "Full name", full_name)}
                    {field("email", "you@example.com", email)}
                    {field("password", "Password", password)}
                    <button class="login-button" type="submit" disabled=move || busy.get()>
                        "Sign Up"
                    </button>
                </form>
                <Show when=move || !info.get().is_empty()>
                    <p class="login-message">{move || info.get()}</p>
                </Show>
                <p class="login-card__footer">
                    "Already have an account? "
                    <a href="/login">"Log in"</a>
                </p>
            </div>
        </div>
    }
}
