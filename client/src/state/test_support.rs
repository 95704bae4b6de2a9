//! In-memory backend fakes shared by the state tests.

use std::cell::RefCell;

use async_trait::async_trait;

use serde_json::json;

use crate::error::BackendError;
use crate::net::identity::IdentityProvider;
use crate::net::store::SchoolStore;
use crate::net::types::{
    AuthEvent, ProviderUser, Role, School, SchoolDraft, Session, SessionChange, SignUpMetadata, SocialProvider, User,
};
use crate::util::subscribers::{Subscribers, Subscription};

// =============================================================
// School store
// =============================================================

#[derive(Default)]
pub(crate) struct MemoryStore {
    pub rows: RefCell<Vec<School>>,
    pub fail_next: RefCell<Option<BackendError>>,
    pub next_id: RefCell<u32>,
}

impl MemoryStore {
    pub fn with_rows(rows: Vec<School>) -> Self {
        Self { rows: RefCell::new(rows), ..Self::default() }
    }

    pub fn failing(&self, err: BackendError) {
        *self.fail_next.borrow_mut() = Some(err);
    }

    fn check(&self) -> Result<(), BackendError> {
        match self.fail_next.borrow_mut().take() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    fn owned_by(row: &School, owner_id: &str) -> bool {
        row.owner_id.as_deref() == Some(owner_id)
    }
}

#[async_trait(?Send)]
impl SchoolStore for MemoryStore {
    async fn list_owned(&self, owner_id: &str) -> Result<Vec<School>, BackendError> {
        self.check()?;
        let mut rows: Vec<School> =
            self.rows.borrow().iter().filter(|r| Self::owned_by(r, owner_id)).cloned().collect();
        rows.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(rows)
    }

    async fn list_owned_summaries(&self, owner_id: &str, limit: usize) -> Result<Vec<School>, BackendError> {
        self.check()?;
        Ok(self
            .rows
            .borrow()
            .iter()
            .filter(|r| Self::owned_by(r, owner_id))
            .take(limit)
            .map(|r| School {
                id: r.id.clone(),
                name: r.name.clone(),
                city: r.city.clone(),
                state: r.state.clone(),
                ..School::default()
            })
            .collect())
    }

    async fn fetch_owned(&self, id: &str, owner_id: &str) -> Result<Option<School>, BackendError> {
        self.check()?;
        Ok(self.rows.borrow().iter().find(|r| r.id == id && Self::owned_by(r, owner_id)).cloned())
    }

    async fn insert(&self, draft: &SchoolDraft, owner_id: &str) -> Result<School, BackendError> {
        self.check()?;
        let id = {
            let mut next = self.next_id.borrow_mut();
            *next += 1;
            format!("new-{next}")
        };
        let row = School { id, owner_id: Some(owner_id.to_owned()), name: draft.name.clone(), ..School::default() };
        self.rows.borrow_mut().push(row.clone());
        Ok(row)
    }

    async fn update_owned(&self, id: &str, draft: &SchoolDraft, owner_id: &str) -> Result<usize, BackendError> {
        self.check()?;
        let mut rows = self.rows.borrow_mut();
        let mut n = 0;
        for row in rows.iter_mut().filter(|r| r.id == id && Self::owned_by(r, owner_id)) {
            row.name.clone_from(&draft.name);
            row.city = Some(draft.city.clone());
            n += 1;
        }
        Ok(n)
    }

    async fn delete_owned(&self, id: &str, owner_id: &str) -> Result<usize, BackendError> {
        self.check()?;
        let mut rows = self.rows.borrow_mut();
        let before = rows.len();
        rows.retain(|r| !(r.id == id && Self::owned_by(r, owner_id)));
        Ok(before - rows.len())
    }
}

pub(crate) fn school(id: &str, owner: &str, name: &str, city: &str, state: &str) -> School {
    School {
        id: id.to_owned(),
        owner_id: Some(owner.to_owned()),
        name: name.to_owned(),
        city: Some(city.to_owned()),
        state: Some(state.to_owned()),
        ..School::default()
    }
}

pub(crate) fn owner(id: &str) -> User {
    User { id: id.to_owned(), email: format!("{id}@example.com"), name: id.to_owned(), role: Role::SchoolOwner }
}

// =============================================================
// Fake provider
// =============================================================

#[derive(Default)]
pub(crate) struct FakeProvider {
    pub current: RefCell<Option<Session>>,
    pub fail_next: RefCell<Option<BackendError>>,
    pub calls: RefCell<Vec<String>>,
    pub changes: Subscribers<SessionChange>,
    /// Delivered from inside `get_session`, after the stored session is read.
    pub change_during_fetch: RefCell<Option<SessionChange>>,
}

impl FakeProvider {
    pub fn failing(&self, err: BackendError) {
        *self.fail_next.borrow_mut() = Some(err);
    }

    fn check(&self, call: String) -> Result<(), BackendError> {
        self.calls.borrow_mut().push(call);
        match self.fail_next.borrow_mut().take() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    pub fn push(&self, event: AuthEvent, session: Option<Session>) {
        self.changes.emit(&SessionChange { event, session });
    }
}

#[async_trait(?Send)]
impl IdentityProvider for FakeProvider {
    async fn get_session(&self) -> Result<Option<Session>, BackendError> {
        self.check("get_session".to_owned())?;
        let current = self.current.borrow().clone();
        if let Some(change) = self.change_during_fetch.borrow_mut().take() {
            self.changes.emit(&change);
        }
        Ok(current)
    }

    async fn sign_in_with_password(&self, email: &str, _password: &str) -> Result<Session, BackendError> {
        self.check(format!("sign_in:{email}"))?;
        Ok(session("u-login", email, "Logged In", "user"))
    }

    async fn sign_up(
        &self,
        email: &str,
        _password: &str,
        metadata: &SignUpMetadata,
    ) -> Result<Option<ProviderUser>, BackendError> {
        self.check(format!("sign_up:{email}:{}:{}", metadata.full_name, metadata.role.as_str()))?;
        Ok(Some(provider_user("u-new", email, &metadata.full_name, metadata.role.as_str())))
    }

    async fn sign_out(&self) -> Result<(), BackendError> {
        self.check("sign_out".to_owned())
    }

    async fn reset_password_for_email(&self, email: &str, redirect_to: &str) -> Result<(), BackendError> {
        self.check(format!("reset:{email}:{redirect_to}"))
    }

    async fn sign_in_with_oauth(&self, provider: SocialProvider, redirect_to: &str) -> Result<(), BackendError> {
        self.check(format!("oauth:{}:{redirect_to}", provider.as_str()))
    }

    fn on_auth_state_change(&self, handler: Box<dyn Fn(&SessionChange)>) -> Subscription {
        self.changes.subscribe(move |c| handler(c))
    }
}

pub(crate) fn provider_user(id: &str, email: &str, name: &str, role: &str) -> ProviderUser {
    serde_json::from_value(json!({
        "id": id,
        "email": email,
        "user_metadata": { "full_name": name, "role": role }
    }))
    .expect("provider user json")
}

pub(crate) fn session(id: &str, email: &str, name: &str, role: &str) -> Session {
    Session {
        access_token: format!("token-{id}"),
        refresh_token: None,
        expires_at: None,
        user: provider_user(id, email, name, role),
    }
}
