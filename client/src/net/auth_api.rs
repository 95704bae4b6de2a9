//! Browser adapter for the hosted auth service.
//!
//! Client-side (hydrate): real HTTP calls via `gloo-net`, session persisted in
//! `localStorage`, OAuth via full-page redirect.
//! Elsewhere: no session and `BackendError::Unavailable` for every action.
//!
//! SESSION CHANGES
//! ===============
//! Sign-in, sign-up (when it yields a session), sign-out, token refresh and a
//! consumed OAuth callback fragment are announced to subscribers after local
//! storage has been updated.

#![allow(clippy::unused_async)]

#[cfg(test)]
#[path = "auth_api_test.rs"]
mod auth_api_test;

use async_trait::async_trait;
#[cfg(any(test, feature = "hydrate"))]
use serde_json::{Value, json};

use super::identity::{AccessTokenSource, IdentityProvider};
#[cfg(any(test, feature = "hydrate"))]
use super::types::AuthEvent;
use super::types::{ProviderUser, Session, SessionChange, SignUpMetadata, SocialProvider};
use crate::config::ClientConfig;
use crate::error::BackendError;
use crate::util::subscribers::{Subscribers, Subscription};

pub const SESSION_STORAGE_KEY: &str = "bjj_directory_session";

/// Seconds before expiry at which a stored session is refreshed.
#[cfg(any(test, feature = "hydrate"))]
const EXPIRY_MARGIN_SECS: i64 = 30;

#[cfg(any(test, feature = "hydrate"))]
fn password_token_endpoint(base: &str) -> String {
    format!("{base}/auth/v1/token?grant_type=password")
}

#[cfg(any(test, feature = "hydrate"))]
fn refresh_token_endpoint(base: &str) -> String {
    format!("{base}/auth/v1/token?grant_type=refresh_token")
}

#[cfg(any(test, feature = "hydrate"))]
fn signup_endpoint(base: &str) -> String {
    format!("{base}/auth/v1/signup")
}

#[cfg(any(test, feature = "hydrate"))]
fn logout_endpoint(base: &str) -> String {
    format!("{base}/auth/v1/logout")
}

#[cfg(any(test, feature = "hydrate"))]
fn user_endpoint(base: &str) -> String {
    format!("{base}/auth/v1/user")
}

#[cfg(any(test, feature = "hydrate"))]
fn recover_endpoint(base: &str, redirect_to: &str) -> String {
    format!("{base}/auth/v1/recover?redirect_to={}", urlencoding::encode(redirect_to))
}

#[cfg(any(test, feature = "hydrate"))]
fn authorize_url(base: &str, provider: SocialProvider, redirect_to: &str) -> String {
    format!(
        "{base}/auth/v1/authorize?provider={}&redirect_to={}",
        provider.as_str(),
        urlencoding::encode(redirect_to)
    )
}

#[cfg(any(test, feature = "hydrate"))]
fn signup_body(email: &str, password: &str, metadata: &SignUpMetadata) -> Value {
    json!({ "email": email, "password": password, "data": metadata })
}

/// The signup response is either a full session (auto-confirm) or the bare
/// user record (confirmation pending).
#[cfg(any(test, feature = "hydrate"))]
fn signup_outcome(body: Value) -> Result<(Option<ProviderUser>, Option<Session>), BackendError> {
    if body.get("access_token").is_some() {
        let session: Session = serde_json::from_value(body).map_err(|e| BackendError::Decode(e.to_string()))?;
        return Ok((Some(session.user.clone()), Some(session)));
    }
    let user_value = body.get("user").cloned().unwrap_or(body);
    if user_value.get("id").is_none() {
        return Ok((None, None));
    }
    let user = serde_json::from_value(user_value).map_err(|e| BackendError::Decode(e.to_string()))?;
    Ok((Some(user), None))
}

#[cfg(any(test, feature = "hydrate"))]
fn session_needs_refresh(session: &Session, now_secs: i64) -> bool {
    session.expires_at.is_some_and(|exp| exp - EXPIRY_MARGIN_SECS <= now_secs)
}

/// What to do with the persisted session before handing out its token.
#[cfg(any(test, feature = "hydrate"))]
#[derive(Debug, PartialEq, Eq)]
enum StoredSessionAction {
    Absent,
    Current,
    Refresh(String),
    /// Expiring with no refresh token to renew it.
    Expired,
}

#[cfg(any(test, feature = "hydrate"))]
fn stored_session_action(stored: Option<&Session>, now_secs: i64) -> StoredSessionAction {
    match stored {
        None => StoredSessionAction::Absent,
        Some(s) if !session_needs_refresh(s, now_secs) => StoredSessionAction::Current,
        Some(s) => match &s.refresh_token {
            Some(token) => StoredSessionAction::Refresh(token.clone()),
            None => StoredSessionAction::Expired,
        },
    }
}

/// Settle the server-side logout call. A token the server rejects or no
/// longer knows means the remote session is already gone.
#[cfg(any(test, feature = "hydrate"))]
fn remote_logout_result(result: Result<(), BackendError>) -> Result<(), BackendError> {
    match result {
        Ok(()) => Ok(()),
        Err(BackendError::Auth(m) | BackendError::Forbidden(m) | BackendError::NotFound(m)) => {
            leptos::logging::warn!("logout: token already invalid: {m}");
            Ok(())
        }
        Err(e) => Err(e),
    }
}

#[cfg(feature = "hydrate")]
#[allow(clippy::cast_possible_truncation)]
fn now_secs() -> i64 {
    (js_sys::Date::now() / 1000.0) as i64
}

/// Tokens handed back in the URL fragment after an OAuth or recovery redirect.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CallbackTokens {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_at: Option<i64>,
    /// `type` parameter, e.g. `recovery` for password-reset links.
    pub kind: Option<String>,
}

impl CallbackTokens {
    #[cfg(any(test, feature = "hydrate"))]
    fn event(&self) -> AuthEvent {
        if self.kind.as_deref() == Some("recovery") { AuthEvent::PasswordRecovery } else { AuthEvent::SignedIn }
    }
}

/// Parse `#access_token=...&refresh_token=...` from a redirect URL fragment.
pub fn parse_callback_fragment(fragment: &str) -> Option<CallbackTokens> {
    let fragment = fragment.strip_prefix('#').unwrap_or(fragment);
    let mut access_token = None;
    let mut refresh_token = None;
    let mut expires_at = None;
    let mut kind = None;
    for pair in fragment.split('&') {
        let Some((key, raw)) = pair.split_once('=') else {
            continue;
        };
        let value = urlencoding::decode(raw).map(std::borrow::Cow::into_owned).unwrap_or_else(|_| raw.to_owned());
        match key {
            "access_token" => access_token = Some(value),
            "refresh_token" => refresh_token = Some(value),
            "expires_at" => expires_at = value.parse::<i64>().ok(),
            "type" => kind = Some(value),
            _ => {}
        }
    }
    Some(CallbackTokens { access_token: access_token.filter(|t| !t.is_empty())?, refresh_token, expires_at, kind })
}

/// Access token of the persisted session as stored, without refreshing.
#[cfg(feature = "hydrate")]
fn stored_access_token() -> Option<String> {
    crate::util::storage::load_json::<Session>(SESSION_STORAGE_KEY).map(|s| s.access_token)
}

/// Identity provider backed by the hosted auth REST API.
pub struct HttpIdentityProvider {
    config: ClientConfig,
    changes: Subscribers<SessionChange>,
}

impl HttpIdentityProvider {
    pub fn new(config: ClientConfig) -> Self {
        Self { config, changes: Subscribers::new() }
    }

    #[cfg(feature = "hydrate")]
    fn store_and_announce(&self, event: AuthEvent, session: Option<Session>) {
        match &session {
            Some(s) => crate::util::storage::save_json(SESSION_STORAGE_KEY, s),
            None => crate::util::storage::remove(SESSION_STORAGE_KEY),
        }
        self.changes.emit(&SessionChange { event, session });
    }

    #[cfg(feature = "hydrate")]
    async fn fetch_user(&self, access_token: &str) -> Result<ProviderUser, BackendError> {
        let base = &self.config.backend_url;
        let req = super::http::with_auth_headers(
            gloo_net::http::Request::get(&user_endpoint(base)),
            &self.config.anon_key,
            Some(access_token),
        )
        .build();
        super::http::decode(super::http::execute(req).await?).await
    }

    #[cfg(feature = "hydrate")]
    async fn refresh(&self, refresh_token: &str) -> Result<Session, BackendError> {
        let base = &self.config.backend_url;
        let req = super::http::with_auth_headers(
            gloo_net::http::Request::post(&refresh_token_endpoint(base)),
            &self.config.anon_key,
            None,
        )
        .json(&json!({ "refresh_token": refresh_token }));
        super::http::decode(super::http::execute(req).await?).await
    }

    /// The persisted session, renewed when it is about to expire. A session
    /// that cannot be renewed is dropped and announced as `SignedOut`.
    #[cfg(feature = "hydrate")]
    async fn current_session(&self) -> Option<Session> {
        let stored = crate::util::storage::load_json::<Session>(SESSION_STORAGE_KEY);
        match stored_session_action(stored.as_ref(), now_secs()) {
            StoredSessionAction::Absent => None,
            StoredSessionAction::Current => stored,
            StoredSessionAction::Expired => {
                self.store_and_announce(AuthEvent::SignedOut, None);
                None
            }
            StoredSessionAction::Refresh(refresh_token) => match self.refresh(&refresh_token).await {
                Ok(session) => {
                    self.store_and_announce(AuthEvent::TokenRefreshed, Some(session.clone()));
                    Some(session)
                }
                Err(e) => {
                    leptos::logging::warn!("session refresh failed: {e}");
                    self.store_and_announce(AuthEvent::SignedOut, None);
                    None
                }
            },
        }
    }

    /// Consume an OAuth/recovery callback fragment from the current URL.
    #[cfg(feature = "hydrate")]
    async fn consume_callback(&self) -> Result<Option<Session>, BackendError> {
        let Some(window) = web_sys::window() else {
            return Ok(None);
        };
        let hash = window.location().hash().unwrap_or_default();
        let Some(tokens) = parse_callback_fragment(&hash) else {
            return Ok(None);
        };

        // Drop the tokens from the address bar before anything else can read them.
        if let Ok(history) = window.history() {
            let path = window.location().pathname().unwrap_or_default();
            let search = window.location().search().unwrap_or_default();
            let _ = history.replace_state_with_url(&wasm_bindgen::JsValue::NULL, "", Some(&format!("{path}{search}")));
        }

        let user = self.fetch_user(&tokens.access_token).await?;
        let session = Session {
            access_token: tokens.access_token.clone(),
            refresh_token: tokens.refresh_token.clone(),
            expires_at: tokens.expires_at,
            user,
        };
        self.store_and_announce(tokens.event(), Some(session.clone()));
        Ok(Some(session))
    }
}

#[async_trait(?Send)]
impl IdentityProvider for HttpIdentityProvider {
    async fn get_session(&self) -> Result<Option<Session>, BackendError> {
        #[cfg(feature = "hydrate")]
        {
            if let Some(session) = self.consume_callback().await? {
                return Ok(Some(session));
            }
            Ok(self.current_session().await)
        }
        #[cfg(not(feature = "hydrate"))]
        {
            Ok(None)
        }
    }

    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<Session, BackendError> {
        #[cfg(feature = "hydrate")]
        {
            let req = super::http::with_auth_headers(
                gloo_net::http::Request::post(&password_token_endpoint(&self.config.backend_url)),
                &self.config.anon_key,
                None,
            )
            .json(&json!({ "email": email, "password": password }));
            let session: Session = super::http::decode(super::http::execute(req).await?).await?;
            self.store_and_announce(AuthEvent::SignedIn, Some(session.clone()));
            Ok(session)
        }
        #[cfg(not(feature = "hydrate"))]
        {
            let _ = (email, password, &self.config);
            Err(BackendError::Unavailable)
        }
    }

    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        metadata: &SignUpMetadata,
    ) -> Result<Option<ProviderUser>, BackendError> {
        #[cfg(feature = "hydrate")]
        {
            let req = super::http::with_auth_headers(
                gloo_net::http::Request::post(&signup_endpoint(&self.config.backend_url)),
                &self.config.anon_key,
                None,
            )
            .json(&signup_body(email, password, metadata));
            let body: Value = super::http::decode(super::http::execute(req).await?).await?;
            let (user, session) = signup_outcome(body)?;
            if let Some(session) = session {
                self.store_and_announce(AuthEvent::SignedIn, Some(session));
            }
            Ok(user)
        }
        #[cfg(not(feature = "hydrate"))]
        {
            let _ = (email, password, metadata);
            Err(BackendError::Unavailable)
        }
    }

    async fn sign_out(&self) -> Result<(), BackendError> {
        #[cfg(feature = "hydrate")]
        {
            if let Some(token) = stored_access_token() {
                let req = super::http::with_auth_headers(
                    gloo_net::http::Request::post(&logout_endpoint(&self.config.backend_url)),
                    &self.config.anon_key,
                    Some(&token),
                )
                .build();
                remote_logout_result(super::http::execute(req).await.map(drop))?;
            }
            self.store_and_announce(AuthEvent::SignedOut, None);
            Ok(())
        }
        #[cfg(not(feature = "hydrate"))]
        {
            Err(BackendError::Unavailable)
        }
    }

    async fn reset_password_for_email(&self, email: &str, redirect_to: &str) -> Result<(), BackendError> {
        #[cfg(feature = "hydrate")]
        {
            let req = super::http::with_auth_headers(
                gloo_net::http::Request::post(&recover_endpoint(&self.config.backend_url, redirect_to)),
                &self.config.anon_key,
                None,
            )
            .json(&json!({ "email": email }));
            super::http::execute(req).await?;
            Ok(())
        }
        #[cfg(not(feature = "hydrate"))]
        {
            let _ = (email, redirect_to);
            Err(BackendError::Unavailable)
        }
    }

    async fn sign_in_with_oauth(&self, provider: SocialProvider, redirect_to: &str) -> Result<(), BackendError> {
        #[cfg(feature = "hydrate")]
        {
            let url = authorize_url(&self.config.backend_url, provider, redirect_to);
            let window = web_sys::window().ok_or(BackendError::Unavailable)?;
            window
                .location()
                .set_href(&url)
                .map_err(|_| BackendError::Network(format!("could not redirect to {} sign-in", provider.as_str())))
        }
        #[cfg(not(feature = "hydrate"))]
        {
            let _ = (provider, redirect_to);
            Err(BackendError::Unavailable)
        }
    }

    fn on_auth_state_change(&self, handler: Box<dyn Fn(&SessionChange)>) -> Subscription {
        self.changes.subscribe(move |change| handler(change))
    }
}

#[async_trait(?Send)]
impl AccessTokenSource for HttpIdentityProvider {
    async fn access_token(&self) -> Result<Option<String>, BackendError> {
        #[cfg(feature = "hydrate")]
        {
            Ok(self.current_session().await.map(|s| s.access_token))
        }
        #[cfg(not(feature = "hydrate"))]
        {
            Ok(None)
        }
    }
}
