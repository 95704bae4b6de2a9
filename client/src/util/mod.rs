//! Utility helpers shared across client state modules.
//!
//! SYSTEM CONTEXT
//! ==============
//! Utility modules isolate browser storage and listener bookkeeping from the
//! state models so both can be exercised in native tests.

pub mod auth;
pub mod storage;
pub mod subscribers;
