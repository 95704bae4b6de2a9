use super::*;
use leptos::prelude::*;
use crate::net::types::AuthEvent;
use crate::state::test_support::{FakeProvider, MemoryStore, school, session};
use futures::executor::block_on;

fn redirects() -> AuthRedirects {
    AuthRedirects {
        password_reset: "https://bjj.example/reset-password".to_owned(),
        oauth_callback: "https://bjj.example/auth/callback".to_owned(),
    }
}

fn context(provider: &Rc<FakeProvider>, store: MemoryStore) -> AppContext {
    AppContext::new(
        Rc::clone(provider) as Rc<dyn IdentityProvider>,
        Rc::new(store),
        redirects(),
        Rc::new(|_: &str| {}),
    )
}

#[test]
fn auth_signal_starts_loading() {
    let owner = Owner::new();
    owner.with(|| {
        let ctx = context(&Rc::new(FakeProvider::default()), MemoryStore::default());
        let state = ctx.auth.get_untracked();
        assert!(state.loading);
        assert!(state.user.is_none());
    });
}

#[test]
fn auth_signal_follows_session_mirror() {
    let owner = Owner::new();
    owner.with(|| {
        let provider = Rc::new(FakeProvider::default());
        *provider.current.borrow_mut() = Some(session("u1", "alice@example.com", "Alice", "school_owner"));
        let ctx = context(&provider, MemoryStore::default());

        block_on(ctx.session().initialize());
        let state = ctx.auth.get_untracked();
        assert!(!state.loading);
        assert_eq!(state.user.map(|u| u.id).as_deref(), Some("u1"));

        provider.push(AuthEvent::SignedOut, None);
        assert!(ctx.auth.get_untracked().user.is_none());
    });
}

#[test]
fn session_handles_share_state() {
    let owner = Owner::new();
    owner.with(|| {
        let provider = Rc::new(FakeProvider::default());
        let ctx = context(&provider, MemoryStore::default());
        block_on(ctx.session().login("bob@example.com", "pw")).unwrap();
        assert_eq!(ctx.session().user().map(|u| u.email).as_deref(), Some("bob@example.com"));
    });
}

#[test]
fn school_store_is_reachable() {
    let owner = Owner::new();
    owner.with(|| {
        let provider = Rc::new(FakeProvider::default());
        let ctx = context(&provider, MemoryStore::with_rows(vec![school("s1", "u1", "Alpha BJJ", "Austin", "TX")]));
        let rows = block_on(ctx.schools().list_owned("u1")).unwrap();
        assert_eq!(rows.len(), 1);
    });
}

#[test]
fn filters_start_at_defaults() {
    let owner = Owner::new();
    owner.with(|| {
        let ctx = context(&Rc::new(FakeProvider::default()), MemoryStore::default());
        assert_eq!(ctx.filters.active_filter_count(), 0);
    });
}
