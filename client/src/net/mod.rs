//! Networking modules for the hosted backend.
//!
//! SYSTEM CONTEXT
//! ==============
//! `identity` and `store` are the consumed contracts; `auth_api` and `rest`
//! implement them over HTTP in the browser; `types` defines the wire schema.

pub mod auth_api;
mod http;
pub mod identity;
pub mod rest;
pub mod store;
pub mod types;
