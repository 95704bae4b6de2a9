//! Create/edit form state for a single school.

#[cfg(test)]
#[path = "school_form_test.rs"]
mod school_form_test;

use crate::net::store::SchoolStore;
use crate::net::types::{School, SchoolDraft, User};

pub const LOAD_FAILED: &str = "Failed to load school data";
pub const SAVE_FAILED: &str = "Failed to save school";
pub const LOGIN_REQUIRED: &str = "You must be logged in to perform this action";
pub const NAME_REQUIRED: &str = "School name is required";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Edit(String),
}

#[derive(Clone, Debug, PartialEq)]
pub struct SchoolFormState {
    pub mode: FormMode,
    pub draft: SchoolDraft,
    pub loading: bool,
    pub error: Option<String>,
    pub success: bool,
    has_initial: bool,
}

impl SchoolFormState {
    pub fn create() -> Self {
        Self::with_mode(FormMode::Create, None)
    }

    /// Edit form. `initial` pre-fills the draft and skips the fetch.
    pub fn edit(id: impl Into<String>, initial: Option<&School>) -> Self {
        Self::with_mode(FormMode::Edit(id.into()), initial)
    }

    fn with_mode(mode: FormMode, initial: Option<&School>) -> Self {
        Self {
            mode,
            draft: initial.map(SchoolDraft::from).unwrap_or_default(),
            loading: false,
            error: None,
            success: false,
            has_initial: initial.is_some(),
        }
    }

    pub fn is_edit(&self) -> bool {
        matches!(self.mode, FormMode::Edit(_))
    }

    pub fn needs_fetch(&self) -> bool {
        self.is_edit() && !self.has_initial
    }

    /// Pull the school being edited into the draft. Only `user`'s rows are
    /// visible; a missing row is reported as a load failure.
    pub async fn load(&mut self, store: &dyn SchoolStore, user: Option<&User>) {
        let (FormMode::Edit(id), Some(user)) = (&self.mode, user) else {
            return;
        };
        self.loading = true;
        match store.fetch_owned(id, &user.id).await {
            Ok(Some(school)) => {
                self.draft = SchoolDraft::from(&school);
                self.has_initial = true;
                self.error = None;
            }
            Ok(None) => {
                leptos::logging::warn!("school {id} not found for {}", user.id);
                self.error = Some(LOAD_FAILED.to_owned());
            }
            Err(e) => {
                leptos::logging::error!("Error fetching school: {e}");
                self.error = Some(e.message_or(LOAD_FAILED));
            }
        }
        self.loading = false;
    }

    /// Validate and persist the draft. Returns true on success.
    pub async fn submit(&mut self, store: &dyn SchoolStore, user: Option<&User>) -> bool {
        self.error = None;
        self.success = false;
        let Some(user) = user else {
            self.error = Some(LOGIN_REQUIRED.to_owned());
            return false;
        };
        if self.draft.name.trim().is_empty() {
            self.error = Some(NAME_REQUIRED.to_owned());
            return false;
        }

        self.loading = true;
        let result = match &self.mode {
            FormMode::Edit(id) => match store.update_owned(id, &self.draft, &user.id).await {
                Ok(0) => Err(None),
                Ok(_) => Ok(()),
                Err(e) => Err(Some(e)),
            },
            FormMode::Create => store.insert(&self.draft, &user.id).await.map(|_| ()).map_err(Some),
        };
        self.loading = false;

        match result {
            Ok(()) => {
                self.success = true;
                true
            }
            Err(e) => {
                let message = e.map_or_else(|| SAVE_FAILED.to_owned(), |e| e.message_or(SAVE_FAILED));
                leptos::logging::error!("Error saving school: {message}");
                self.error = Some(message);
                false
            }
        }
    }
}
