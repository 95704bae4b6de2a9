//! # bjj-directory
//!
//! Leptos + WASM client state for the BJJ academy directory.
//!
//! School owners manage academy listings and end users browse and search
//! schools. Authentication, storage and row-level authorization live in a
//! hosted backend; this crate holds the client-side state that views bind to:
//! the auth session mirror, the search filter store, and the owner-facing
//! school list, dashboard and form models.
//!
//! ARCHITECTURE
//! ============
//! `net` defines the consumed backend contracts (`IdentityProvider`,
//! `SchoolStore`) plus browser adapters, `state` holds the per-screen models,
//! and `app` wires them into explicit Leptos context objects.

pub mod app;
pub mod config;
pub mod error;
pub mod net;
pub mod state;
pub mod util;

/// Browser entry point: route panics and `log` output to the devtools console.
#[cfg(feature = "hydrate")]
#[wasm_bindgen::prelude::wasm_bindgen]
pub fn init_browser() {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Debug);
}
