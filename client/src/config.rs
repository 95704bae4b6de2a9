//! Client configuration for the hosted backend.
//!
//! Browser builds bake values in at compile time (`option_env!`); tests and
//! native callers go through [`ClientConfig::from_lookup`].

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

pub const BACKEND_URL_VAR: &str = "BJJ_BACKEND_URL";
pub const ANON_KEY_VAR: &str = "BJJ_BACKEND_ANON_KEY";
pub const SITE_ORIGIN_VAR: &str = "BJJ_SITE_ORIGIN";
pub const DEFAULT_SITE_ORIGIN: &str = "http://localhost:3000";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required setting: {var}")]
    Missing { var: &'static str },
    #[error("invalid {var}: {reason}")]
    Invalid { var: &'static str, reason: String },
}

/// Where the backend lives and where the site itself is served from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL of the hosted backend, without trailing slash.
    pub backend_url: String,
    /// Public (anonymous) API key sent with every request.
    pub anon_key: String,
    /// Origin of this site; used to build auth redirect targets.
    pub site_origin: String,
}

impl ClientConfig {
    /// Build config from a key lookup.
    ///
    /// Required:
    /// - `BJJ_BACKEND_URL` (must start with `http://` or `https://`)
    /// - `BJJ_BACKEND_ANON_KEY`
    ///
    /// Optional:
    /// - `BJJ_SITE_ORIGIN`: default `http://localhost:3000`
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let backend_url = required(&lookup, BACKEND_URL_VAR)?;
        if !(backend_url.starts_with("http://") || backend_url.starts_with("https://")) {
            return Err(ConfigError::Invalid { var: BACKEND_URL_VAR, reason: "expected an http(s) URL".to_owned() });
        }
        let anon_key = required(&lookup, ANON_KEY_VAR)?;
        let site_origin = lookup(SITE_ORIGIN_VAR)
            .map(|v| v.trim().to_owned())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_SITE_ORIGIN.to_owned());

        Ok(Self {
            backend_url: backend_url.trim_end_matches('/').to_owned(),
            anon_key,
            site_origin: site_origin.trim_end_matches('/').to_owned(),
        })
    }

    /// Build config from values captured at compile time.
    ///
    /// In the browser a missing site origin falls back to
    /// `window.location.origin` instead of the localhost default.
    pub fn from_build_env() -> Result<Self, ConfigError> {
        let backend_url = option_env!("BJJ_BACKEND_URL");
        let anon_key = option_env!("BJJ_BACKEND_ANON_KEY");
        let site_origin = option_env!("BJJ_SITE_ORIGIN").map(str::to_owned).or_else(browser_origin);
        Self::from_lookup(|key| match key {
            BACKEND_URL_VAR => backend_url.map(str::to_owned),
            ANON_KEY_VAR => anon_key.map(str::to_owned),
            SITE_ORIGIN_VAR => site_origin.clone(),
            _ => None,
        })
    }

    /// Landing page for password-reset emails.
    pub fn password_reset_redirect(&self) -> String {
        format!("{}/reset-password", self.site_origin)
    }

    /// Landing page for OAuth provider redirects.
    pub fn oauth_callback_redirect(&self) -> String {
        format!("{}/auth/callback", self.site_origin)
    }
}

fn required<F>(lookup: &F, var: &'static str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(var)
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
        .ok_or(ConfigError::Missing { var })
}

fn browser_origin() -> Option<String> {
    #[cfg(feature = "hydrate")]
    {
        web_sys::window().and_then(|w| w.location().origin().ok())
    }
    #[cfg(not(feature = "hydrate"))]
    {
        None
    }
}
