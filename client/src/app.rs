//! Application-wide context objects.
//!
//! SYSTEM CONTEXT
//! ==============
//! The root component calls `provide_app_context` once. Screens read the auth
//! signal, the filter store and the backend handles back out with the `use_*`
//! hooks. Everything here lives for the whole application session.

#[cfg(test)]
#[path = "app_test.rs"]
mod app_test;

use std::rc::Rc;

use leptos::prelude::*;

use crate::net::identity::IdentityProvider;
use crate::net::store::SchoolStore;
use crate::state::auth::{AuthRedirects, AuthState, SessionMirror};
use crate::state::filters::FilterStore;
use crate::util::subscribers::Subscription;

/// Shared state handed to every screen. `Copy`, like the signals it holds.
#[derive(Clone, Copy)]
pub struct AppContext {
    pub auth: RwSignal<AuthState>,
    pub filters: FilterStore,
    session: StoredValue<SessionMirror, LocalStorage>,
    schools: StoredValue<Rc<dyn SchoolStore>, LocalStorage>,
    _auth_watch: StoredValue<Subscription, LocalStorage>,
}

impl AppContext {
    /// Build the context under the current reactive owner. The auth signal
    /// tracks every session-mirror replacement; nothing is fetched yet.
    pub fn new(
        provider: Rc<dyn IdentityProvider>,
        schools: Rc<dyn SchoolStore>,
        redirects: AuthRedirects,
        navigate: Rc<dyn Fn(&str)>,
    ) -> Self {
        let mirror = SessionMirror::new(provider, redirects, navigate);
        let auth = RwSignal::new(mirror.snapshot());
        let watch = mirror.watch(move |state| auth.set(state.clone()));
        Self {
            auth,
            filters: FilterStore::new(),
            session: StoredValue::new_local(mirror),
            schools: StoredValue::new_local(schools),
            _auth_watch: StoredValue::new_local(watch),
        }
    }

    pub fn session(&self) -> SessionMirror {
        self.session.get_value()
    }

    pub fn schools(&self) -> Rc<dyn SchoolStore> {
        self.schools.get_value()
    }
}

/// Build and provide the context, start the session check, and tear the
/// provider subscription down with the owner.
pub fn provide_app_context_with(
    provider: Rc<dyn IdentityProvider>,
    schools: Rc<dyn SchoolStore>,
    redirects: AuthRedirects,
    navigate: Rc<dyn Fn(&str)>,
) -> AppContext {
    let ctx = AppContext::new(provider, schools, redirects, navigate);
    provide_context(ctx);
    provide_context(ctx.auth);
    provide_context(ctx.filters);

    let mirror = ctx.session();
    leptos::task::spawn_local(async move { mirror.initialize().await });

    let session = ctx.session;
    on_cleanup(move || {
        session.try_with_value(SessionMirror::teardown);
    });
    ctx
}

/// Browser wiring: HTTP adapters from build-time config and router
/// navigation. Must run inside the `<Router>`.
///
/// # Errors
///
/// Missing or malformed backend configuration.
#[cfg(feature = "hydrate")]
pub fn provide_app_context() -> Result<AppContext, crate::config::ConfigError> {
    use crate::config::ClientConfig;
    use crate::net::auth_api::HttpIdentityProvider;
    use crate::net::identity::AccessTokenSource;
    use crate::net::rest::HttpSchoolStore;

    let config = ClientConfig::from_build_env()?;
    let navigate = leptos_router::hooks::use_navigate();
    let navigate: Rc<dyn Fn(&str)> =
        Rc::new(move |path: &str| navigate(path, leptos_router::NavigateOptions::default()));
    let identity = Rc::new(HttpIdentityProvider::new(config.clone()));
    let schools = HttpSchoolStore::new(config.clone(), Rc::clone(&identity) as Rc<dyn AccessTokenSource>);
    Ok(provide_app_context_with(
        identity,
        Rc::new(schools),
        AuthRedirects::from(&config),
        navigate,
    ))
}

pub fn use_app() -> AppContext {
    expect_context::<AppContext>()
}

pub fn use_auth() -> RwSignal<AuthState> {
    expect_context::<RwSignal<AuthState>>()
}

pub fn use_filters() -> FilterStore {
    expect_context::<FilterStore>()
}

/// Send signed-out visitors of an owner-only screen to `/login`.
pub fn use_require_auth() {
    crate::util::auth::install_unauth_redirect(use_auth(), leptos_router::hooks::use_navigate());
}
