//! School data-store contract.
//!
//! Every operation carries the owner id so the row-ownership predicate
//! (`owner_id = current user`) is part of the request itself; the backend's
//! row-level security enforces it again server-side. Mutations report how
//! many rows they touched so callers can tell "not yours" from success.

use async_trait::async_trait;

use super::types::{School, SchoolDraft};
use crate::error::BackendError;

#[async_trait(?Send)]
pub trait SchoolStore {
    /// All schools owned by `owner_id`, ordered by name.
    async fn list_owned(&self, owner_id: &str) -> Result<Vec<School>, BackendError>;

    /// Up to `limit` owned schools with only `id, name, city, state` filled.
    async fn list_owned_summaries(&self, owner_id: &str, limit: usize) -> Result<Vec<School>, BackendError>;

    async fn fetch_owned(&self, id: &str, owner_id: &str) -> Result<Option<School>, BackendError>;

    async fn insert(&self, draft: &SchoolDraft, owner_id: &str) -> Result<School, BackendError>;

    /// Returns the number of rows updated.
    async fn update_owned(&self, id: &str, draft: &SchoolDraft, owner_id: &str) -> Result<usize, BackendError>;

    /// Returns the number of rows deleted.
    async fn delete_owned(&self, id: &str, owner_id: &str) -> Result<usize, BackendError>;
}
