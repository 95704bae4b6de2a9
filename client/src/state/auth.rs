//! Auth-session state for the current browser user.
//!
//! SYSTEM CONTEXT
//! ==============
//! `SessionMirror` keeps a local copy of the identity provider's session as
//! an app-level `User`. It never decides who is signed in: every action is
//! delegated to the provider and the mirror only records what comes back.
//!
//! ORDERING
//! ========
//! Provider notifications and manual action results both replace the user
//! wholesale; whichever lands last wins. A manual `login` and the provider's
//! `SignedIn` notification carry the same user, so arrival order does not
//! change the end state.
//!
//! ERROR HANDLING
//! ==============
//! Failures are logged and returned unchanged to the caller. The user value
//! is left as it was and `loading` is cleared. Nothing is retried.

#[cfg(test)]
#[path = "auth_test.rs"]
mod auth_test;

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::config::ClientConfig;
use crate::error::BackendError;
use crate::net::identity::IdentityProvider;
use crate::net::types::{Role, Session, SessionChange, SignUpMetadata, SocialProvider, User};
use crate::util::subscribers::{Subscribers, Subscription};

pub const HOME_PATH: &str = "/";

/// Authentication state tracking the current user and loading status.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthState {
    pub user: Option<User>,
    pub loading: bool,
}

impl Default for AuthState {
    /// Starts loading: nothing is known until the first session check.
    fn default() -> Self {
        Self { user: None, loading: true }
    }
}

/// Map an optional provider session to the app user.
pub fn user_from_session(session: Option<&Session>) -> Option<User> {
    session.map(|s| s.user.to_user())
}

/// Redirect targets handed to the provider.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthRedirects {
    pub password_reset: String,
    pub oauth_callback: String,
}

impl From<&ClientConfig> for AuthRedirects {
    fn from(config: &ClientConfig) -> Self {
        Self { password_reset: config.password_reset_redirect(), oauth_callback: config.oauth_callback_redirect() }
    }
}

/// Local mirror of the provider session. Cheap to clone; clones share state.
#[derive(Clone)]
pub struct SessionMirror {
    provider: Rc<dyn IdentityProvider>,
    redirects: Rc<AuthRedirects>,
    navigate: Rc<dyn Fn(&str)>,
    state: Rc<RefCell<AuthState>>,
    watchers: Subscribers<AuthState>,
    provider_subscription: Rc<RefCell<Option<Subscription>>>,
    /// Bumped on every provider notification.
    generation: Rc<Cell<u64>>,
}

impl SessionMirror {
    pub fn new(provider: Rc<dyn IdentityProvider>, redirects: AuthRedirects, navigate: Rc<dyn Fn(&str)>) -> Self {
        Self {
            provider,
            redirects: Rc::new(redirects),
            navigate,
            state: Rc::new(RefCell::new(AuthState::default())),
            watchers: Subscribers::new(),
            provider_subscription: Rc::new(RefCell::new(None)),
            generation: Rc::new(Cell::new(0)),
        }
    }

    pub fn snapshot(&self) -> AuthState {
        self.state.borrow().clone()
    }

    pub fn user(&self) -> Option<User> {
        self.state.borrow().user.clone()
    }

    /// Observe every state replacement until the guard drops.
    pub fn watch<F>(&self, handler: F) -> Subscription
    where
        F: Fn(&AuthState) + 'static,
    {
        self.watchers.subscribe(handler)
    }

    fn replace(&self, next: AuthState) {
        *self.state.borrow_mut() = next.clone();
        self.watchers.emit(&next);
    }

    fn set_user(&self, user: Option<User>) {
        self.replace(AuthState { user, loading: false });
    }

    fn set_loading(&self, loading: bool) {
        let user = self.state.borrow().user.clone();
        self.replace(AuthState { user, loading });
    }

    /// Subscribe to provider session changes, then resolve the current
    /// session once. Calling it again replaces the earlier subscription.
    ///
    /// A notification delivered while the session fetch is in flight is
    /// newer than the fetch result, so the result is then discarded.
    pub async fn initialize(&self) {
        let state = Rc::clone(&self.state);
        let watchers = self.watchers.clone();
        let generation = Rc::clone(&self.generation);
        let subscription = self.provider.on_auth_state_change(Box::new(move |change: &SessionChange| {
            generation.set(generation.get().wrapping_add(1));
            let next = AuthState { user: user_from_session(change.session.as_ref()), loading: false };
            *state.borrow_mut() = next.clone();
            watchers.emit(&next);
        }));
        *self.provider_subscription.borrow_mut() = Some(subscription);

        let started = self.generation.get();
        let user = match self.provider.get_session().await {
            Ok(session) => user_from_session(session.as_ref()),
            Err(e) => {
                leptos::logging::error!("Authentication error: {e}");
                None
            }
        };
        if self.generation.get() == started {
            self.set_user(user);
        } else {
            self.set_loading(false);
        }
    }

    /// Stop reacting to provider session changes.
    pub fn teardown(&self) {
        self.provider_subscription.borrow_mut().take();
    }

    pub fn is_subscribed(&self) -> bool {
        self.provider_subscription.borrow().is_some()
    }

    /// # Errors
    ///
    /// The provider's error; the current user is kept.
    pub async fn login(&self, email: &str, password: &str) -> Result<(), BackendError> {
        self.set_loading(true);
        match self.provider.sign_in_with_password(email, password).await {
            Ok(session) => {
                self.set_user(Some(session.user.to_user()));
                Ok(())
            }
            Err(e) => self.fail("Login error", e),
        }
    }

    /// Create an account with role `user`. The returned user is mirrored even
    /// when the provider still requires email confirmation.
    ///
    /// # Errors
    ///
    /// The provider's error; the current user is kept.
    pub async fn register(&self, email: &str, password: &str, name: &str) -> Result<(), BackendError> {
        self.set_loading(true);
        let metadata = SignUpMetadata { full_name: name.to_owned(), role: Role::User };
        match self.provider.sign_up(email, password, &metadata).await {
            Ok(user) => {
                self.set_user(user.map(|u| u.to_user()));
                Ok(())
            }
            Err(e) => self.fail("Registration error", e),
        }
    }

    /// # Errors
    ///
    /// The provider's error; the user stays signed in locally.
    pub async fn logout(&self) -> Result<(), BackendError> {
        self.set_loading(true);
        match self.provider.sign_out().await {
            Ok(()) => {
                self.set_user(None);
                (self.navigate)(HOME_PATH);
                Ok(())
            }
            Err(e) => self.fail("Logout error", e),
        }
    }

    /// Send a password-reset email. Does not touch the user.
    ///
    /// # Errors
    ///
    /// The provider's error.
    pub async fn forgot_password(&self, email: &str) -> Result<(), BackendError> {
        self.set_loading(true);
        match self.provider.reset_password_for_email(email, &self.redirects.password_reset).await {
            Ok(()) => {
                self.set_loading(false);
                Ok(())
            }
            Err(e) => self.fail("Forgot password error", e),
        }
    }

    /// Start an OAuth redirect. Returns before authentication completes; the
    /// resulting session arrives through the provider subscription.
    ///
    /// # Errors
    ///
    /// The provider's error.
    pub async fn social_login(&self, provider: SocialProvider) -> Result<(), BackendError> {
        self.set_loading(true);
        match self.provider.sign_in_with_oauth(provider, &self.redirects.oauth_callback).await {
            Ok(()) => {
                self.set_loading(false);
                Ok(())
            }
            Err(e) => self.fail(&format!("{} login error", provider.as_str()), e),
        }
    }

    fn fail(&self, context: &str, e: BackendError) -> Result<(), BackendError> {
        leptos::logging::error!("{context}: {e}");
        self.set_loading(false);
        Err(e)
    }
}
