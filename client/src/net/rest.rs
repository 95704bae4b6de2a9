//! Browser adapter for the hosted REST data API (`/rest/v1/schools`).
//!
//! Client-side (hydrate): `gloo-net` requests authenticated with the current
//! session token, which the token source renews before it expires.
//! Elsewhere: `BackendError::Unavailable`.
//!
//! Mutations ask for `Prefer: return=representation` so the affected rows come
//! back; an owner-scoped delete that matched nothing returns `[]`, which is how
//! callers learn the row was not theirs.

#![allow(clippy::unused_async)]

#[cfg(test)]
#[path = "rest_test.rs"]
mod rest_test;

use std::rc::Rc;

use async_trait::async_trait;
use serde::Serialize;

use super::identity::AccessTokenSource;
use super::store::SchoolStore;
use super::types::{School, SchoolDraft};
use crate::config::ClientConfig;
use crate::error::BackendError;

#[cfg(any(test, feature = "hydrate"))]
const SUMMARY_COLUMNS: &str = "id,name,city,state";

#[cfg(any(test, feature = "hydrate"))]
fn schools_url(base: &str, query: &str) -> String {
    format!("{base}/rest/v1/schools?{query}")
}

#[cfg(any(test, feature = "hydrate"))]
fn owner_filter(owner_id: &str) -> String {
    format!("owner_id=eq.{}", urlencoding::encode(owner_id))
}

#[cfg(any(test, feature = "hydrate"))]
fn owned_row_filter(id: &str, owner_id: &str) -> String {
    format!("id=eq.{}&{}", urlencoding::encode(id), owner_filter(owner_id))
}

#[cfg(any(test, feature = "hydrate"))]
fn owned_list_query(owner_id: &str) -> String {
    format!("select=*&{}&order=name.asc", owner_filter(owner_id))
}

#[cfg(any(test, feature = "hydrate"))]
fn owned_summaries_query(owner_id: &str, limit: usize) -> String {
    format!("select={SUMMARY_COLUMNS}&{}&limit={limit}", owner_filter(owner_id))
}

#[cfg(any(test, feature = "hydrate"))]
fn owned_fetch_query(id: &str, owner_id: &str) -> String {
    format!("select=*&{}", owned_row_filter(id, owner_id))
}

/// Row payload for insert/update: the draft stamped with its owner.
#[derive(Debug, Serialize)]
struct OwnedSchoolPayload<'a> {
    #[serde(flatten)]
    draft: &'a SchoolDraft,
    owner_id: &'a str,
}

/// School store backed by the hosted REST API.
pub struct HttpSchoolStore {
    config: ClientConfig,
    tokens: Rc<dyn AccessTokenSource>,
}

impl HttpSchoolStore {
    pub fn new(config: ClientConfig, tokens: Rc<dyn AccessTokenSource>) -> Self {
        Self { config, tokens }
    }

    #[cfg(feature = "hydrate")]
    async fn request(
        &self,
        method: gloo_net::http::Method,
        query: &str,
    ) -> Result<gloo_net::http::RequestBuilder, BackendError> {
        let token = self.tokens.access_token().await?.ok_or(BackendError::NotAuthenticated)?;
        let url = schools_url(&self.config.backend_url, query);
        let builder = gloo_net::http::RequestBuilder::new(&url).method(method);
        Ok(super::http::with_auth_headers(builder, &self.config.anon_key, Some(&token)))
    }

    #[cfg(feature = "hydrate")]
    async fn fetch_rows(&self, query: &str) -> Result<Vec<School>, BackendError> {
        let req = self.request(gloo_net::http::Method::GET, query).await?.build();
        super::http::decode(super::http::execute(req).await?).await
    }

    #[cfg(feature = "hydrate")]
    async fn mutate_rows(
        &self,
        method: gloo_net::http::Method,
        query: &str,
        payload: Option<&OwnedSchoolPayload<'_>>,
    ) -> Result<Vec<School>, BackendError> {
        let builder = self.request(method, query).await?.header("Prefer", "return=representation");
        let req = match payload {
            Some(body) => builder.json(body),
            None => builder.build(),
        };
        super::http::decode(super::http::execute(req).await?).await
    }
}

#[async_trait(?Send)]
impl SchoolStore for HttpSchoolStore {
    async fn list_owned(&self, owner_id: &str) -> Result<Vec<School>, BackendError> {
        #[cfg(feature = "hydrate")]
        {
            self.fetch_rows(&owned_list_query(owner_id)).await
        }
        #[cfg(not(feature = "hydrate"))]
        {
            let _ = (owner_id, &self.config, &self.tokens);
            Err(BackendError::Unavailable)
        }
    }

    async fn list_owned_summaries(&self, owner_id: &str, limit: usize) -> Result<Vec<School>, BackendError> {
        #[cfg(feature = "hydrate")]
        {
            self.fetch_rows(&owned_summaries_query(owner_id, limit)).await
        }
        #[cfg(not(feature = "hydrate"))]
        {
            let _ = (owner_id, limit);
            Err(BackendError::Unavailable)
        }
    }

    async fn fetch_owned(&self, id: &str, owner_id: &str) -> Result<Option<School>, BackendError> {
        #[cfg(feature = "hydrate")]
        {
            Ok(self.fetch_rows(&owned_fetch_query(id, owner_id)).await?.into_iter().next())
        }
        #[cfg(not(feature = "hydrate"))]
        {
            let _ = (id, owner_id);
            Err(BackendError::Unavailable)
        }
    }

    async fn insert(&self, draft: &SchoolDraft, owner_id: &str) -> Result<School, BackendError> {
        let payload = OwnedSchoolPayload { draft, owner_id };
        #[cfg(feature = "hydrate")]
        {
            self.mutate_rows(gloo_net::http::Method::POST, "select=*", Some(&payload))
                .await?
                .into_iter()
                .next()
                .ok_or_else(|| BackendError::Decode("insert returned no row".to_owned()))
        }
        #[cfg(not(feature = "hydrate"))]
        {
            let _ = payload;
            Err(BackendError::Unavailable)
        }
    }

    async fn update_owned(&self, id: &str, draft: &SchoolDraft, owner_id: &str) -> Result<usize, BackendError> {
        let payload = OwnedSchoolPayload { draft, owner_id };
        #[cfg(feature = "hydrate")]
        {
            let rows = self
                .mutate_rows(gloo_net::http::Method::PATCH, &owned_row_filter(id, owner_id), Some(&payload))
                .await?;
            Ok(rows.len())
        }
        #[cfg(not(feature = "hydrate"))]
        {
            let _ = (id, payload);
            Err(BackendError::Unavailable)
        }
    }

    async fn delete_owned(&self, id: &str, owner_id: &str) -> Result<usize, BackendError> {
        #[cfg(feature = "hydrate")]
        {
            let rows = self
                .mutate_rows(gloo_net::http::Method::DELETE, &owned_row_filter(id, owner_id), None)
                .await?;
            Ok(rows.len())
        }
        #[cfg(not(feature = "hydrate"))]
        {
            let _ = (id, owner_id);
            Err(BackendError::Unavailable)
        }
    }
}
