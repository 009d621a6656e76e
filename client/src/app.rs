//! Root application component with routing and context providers.

use std::rc::Rc;

use gamehub_session::{AuthSession, DurableStorage, MemoryStorage, SessionConfig};
use leptos::prelude::*;
use leptos_meta::{MetaTags, Stylesheet, Title, provide_meta_context};
use leptos_router::{
    StaticSegment,
    components::{Route, Router, Routes},
};

use crate::components::nav_bar::NavBar;
use crate::net::api::ApiIdentityService;
use crate::pages::{admin::AdminPage, home::HomePage, login::LoginPage, profile::ProfilePage, signup::SignupPage};
use crate::state::auth::{AuthState, SessionHandle, install_session_mirror};
use crate::util::storage::BrowserStorage;

/// HTML shell rendered on the server for SSR + hydration.
pub fn shell(options: LeptosOptions) -> impl IntoView {
    view! {
        <!DOCTYPE html>
        <html lang="en">
            <head>
                <meta charset="utf-8"/>
                <meta name="viewport" content="width=device-width, initial-scale=1"/>
                <AutoReload options=options.clone()/>
                <HydrationScripts options/>
                <MetaTags/>
            </head>
            <body>
                <App/>
            </body>
        </html>
    }
}

/// Browser builds talk to the identity API on the same origin.
fn client_config() -> SessionConfig {
    SessionConfig { api_base_url: String::new(), ..SessionConfig::default() }
}

fn durable_storage() -> Rc<dyn DurableStorage> {
    if BrowserStorage::is_available() {
        Rc::new(BrowserStorage::new())
    } else {
        Rc::new(MemoryStorage::new())
    }
}

fn build_session() -> AuthSession {
    let config = client_config();
    let identity = Rc::new(ApiIdentityService::new(config.api_base_url.clone(), config.timeouts));
    AuthSession::create(durable_storage(), identity, &config)
}

/// Root application component.
///
/// Creates the one session for this page load, mirrors it into `AuthState`
/// and resolves the stored token once on the client.
#[component]
pub fn App() -> impl IntoView {
    provide_meta_context();

    let session = build_session();
    let auth = RwSignal::new(AuthState::default());
    install_session_mirror(&session, auth);

    let handle: SessionHandle = StoredValue::new_local(session);
    provide_context(auth);
    provide_context(handle);

    #[cfg(feature = "hydrate")]
    leptos::task::spawn_local(async move {
        let status = handle.get_value().bootstrap().await;
        log::info!("session resolved: {status}");
    });

    view! {
        <Stylesheet id="leptos" href="/pkg/gamehub.css"/>
        <Title text="GameHub"/>

        <Router>
            <NavBar/>
            <Routes fallback=|| "Page not found.".into_view()>
                <Route path=StaticSegment("") view=HomePage/>
                <Route path=StaticSegment("login") view=LoginPage/>
                <Route path=StaticSegment("signup") view=SignupPage/>
                <Route path=StaticSegment("profile") view=ProfilePage/>
                <Route path=StaticSegment("admin") view=AdminPage/>
            </Routes>
        </Router>
    }
}
