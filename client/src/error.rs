//! Backend error taxonomy.
//!
//! ERROR HANDLING
//! ==============
//! Every failure originates in the hosted backend (identity provider or
//! data store) or the transport to it. Variants keep the provider's message so
//! screens can render it verbatim in their inline error panels.

#[cfg(test)]
#[path = "error_test.rs"]
mod error_test;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BackendError {
    /// Credentials rejected or session invalid.
    #[error("{0}")]
    Auth(String),
    /// Row-ownership or policy rejection.
    #[error("{0}")]
    Forbidden(String),
    /// No row matched (including rows owned by someone else).
    #[error("{0}")]
    NotFound(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("unexpected response: {0}")]
    Decode(String),
    #[error("backend error ({status}): {message}")]
    Backend { status: u16, message: String },
    #[error("not signed in")]
    NotAuthenticated,
    #[error("not available outside the browser")]
    Unavailable,
}

impl BackendError {
    /// Classify a non-success HTTP status with the provider's message.
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        match status {
            400 | 401 | 422 => Self::Auth(message),
            403 => Self::Forbidden(message),
            404 => Self::NotFound(message),
            _ => Self::Backend { status, message },
        }
    }

    /// Provider-facing message without the variant prefix.
    pub fn message(&self) -> String {
        match self {
            Self::Auth(m) | Self::Forbidden(m) | Self::NotFound(m) | Self::Network(m) | Self::Decode(m) => m.clone(),
            Self::Backend { message, .. } => message.clone(),
            Self::NotAuthenticated | Self::Unavailable => self.to_string(),
        }
    }

    /// The provider's message, or `fallback` when the provider gave none.
    pub fn message_or(&self, fallback: &str) -> String {
        let message = self.message();
        if message.trim().is_empty() { fallback.to_owned() } else { message }
    }
}

/// Pull the human-readable message out of a backend error body.
///
/// The auth service uses `error_description`/`msg`, the REST layer `message`.
pub fn error_body_message(body: &serde_json::Value) -> Option<String> {
    ["error_description", "msg", "message", "error"]
        .iter()
        .find_map(|key| body.get(*key).and_then(serde_json::Value::as_str))
        .map(str::to_owned)
}
