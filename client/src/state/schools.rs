//! Owner school-list state for the "My Schools" screen.
//!
//! DESIGN
//! ======
//! The list is fetched once per user and searched locally; deletes go to the
//! store with the ownership predicate attached and only touch the local list
//! when the store confirms a row was actually removed.

#[cfg(test)]
#[path = "schools_test.rs"]
mod schools_test;

use crate::error::BackendError;
use crate::net::store::SchoolStore;
use crate::net::types::{School, User};
use crate::state::filters::school_matches_query;

pub const LOAD_FAILED: &str = "Failed to load schools";
pub const DELETE_CONFIRM_PROMPT: &str = "Are you sure you want to delete this school? This action cannot be undone.";

/// Case-insensitive substring search over name, city and state.
pub fn filter_schools<'a>(schools: &'a [School], query: &str) -> Vec<&'a School> {
    schools.iter().filter(|s| school_matches_query(s, query)).collect()
}

/// Alert text for a failed delete.
pub fn delete_failure_message(err: &BackendError) -> String {
    format!("Failed to delete school: {}", err.message())
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct OwnedSchoolsState {
    pub items: Vec<School>,
    pub query: String,
    pub loading: bool,
    pub error: Option<String>,
}

impl OwnedSchoolsState {
    /// Schools matching the current search box.
    pub fn visible(&self) -> Vec<&School> {
        filter_schools(&self.items, &self.query)
    }

    /// Fetch `user`'s schools ordered by name. Does nothing when signed out.
    pub async fn load(&mut self, store: &dyn SchoolStore, user: Option<&User>) {
        let Some(user) = user else {
            return;
        };
        self.loading = true;
        match store.list_owned(&user.id).await {
            Ok(items) => {
                self.items = items;
                self.error = None;
            }
            Err(e) => {
                leptos::logging::error!("Error fetching schools: {e}");
                self.error = Some(e.message_or(LOAD_FAILED));
            }
        }
        self.loading = false;
    }

    /// Delete `id` if `user` owns it.
    ///
    /// # Errors
    ///
    /// `NotAuthenticated` without a user, `NotFound` when the store removed
    /// nothing, or the store's error. The list is untouched in every error case.
    pub async fn delete(&mut self, store: &dyn SchoolStore, user: Option<&User>, id: &str) -> Result<(), BackendError> {
        let user = user.ok_or(BackendError::NotAuthenticated)?;
        let removed = match store.delete_owned(id, &user.id).await {
            Ok(n) => n,
            Err(e) => {
                leptos::logging::error!("Error deleting school: {e}");
                return Err(e);
            }
        };
        if removed == 0 {
            leptos::logging::warn!("delete of school {id} matched no rows owned by {}", user.id);
            return Err(BackendError::NotFound("School not found or not owned by you".to_owned()));
        }
        self.items.retain(|s| s.id != id);
        Ok(())
    }
}
