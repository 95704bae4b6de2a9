//! Per-screen client state.
//!
//! SYSTEM CONTEXT
//! ==============
//! `auth` mirrors the identity provider session, `filters` holds the directory
//! search filters, and `schools`, `dashboard` and `school_form` back the
//! owner-facing screens. Each model fails in isolation and surfaces its own
//! inline error.

pub mod auth;
pub mod dashboard;
pub mod filters;
pub mod school_form;
pub mod schools;

#[cfg(test)]
pub(crate) mod test_support;
