//! Identity-provider contract consumed by the session mirror.
//!
//! SYSTEM CONTEXT
//! ==============
//! Authentication is delegated entirely to the hosted provider. The browser
//! adapter lives in `auth_api`; tests substitute in-memory fakes.
//!
//! Session-change handlers may fire at any time relative to in-flight calls
//! (for example an OAuth redirect completing, or a token refresh) and stay
//! registered until the returned [`Subscription`] is dropped.

use async_trait::async_trait;

use super::types::{ProviderUser, Session, SessionChange, SignUpMetadata, SocialProvider};
use crate::error::BackendError;
use crate::util::subscribers::Subscription;

#[async_trait(?Send)]
pub trait IdentityProvider {
    /// Current session, if one exists.
    async fn get_session(&self) -> Result<Option<Session>, BackendError>;

    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<Session, BackendError>;

    /// Create an account. The returned user may still await email
    /// confirmation, in which case no session exists yet.
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        metadata: &SignUpMetadata,
    ) -> Result<Option<ProviderUser>, BackendError>;

    async fn sign_out(&self) -> Result<(), BackendError>;

    async fn reset_password_for_email(&self, email: &str, redirect_to: &str) -> Result<(), BackendError>;

    /// Start a redirect-based OAuth flow. Resolves once the redirect has been
    /// initiated; the resulting session arrives later as a session change.
    async fn sign_in_with_oauth(&self, provider: SocialProvider, redirect_to: &str) -> Result<(), BackendError>;

    fn on_auth_state_change(&self, handler: Box<dyn Fn(&SessionChange)>) -> Subscription;
}

/// Source of a bearer token for data-store requests.
#[async_trait(?Send)]
pub trait AccessTokenSource {
    /// Access token of the current session, refreshed first when it is about
    /// to expire. `None` when nobody is signed in.
    async fn access_token(&self) -> Result<Option<String>, BackendError>;
}
