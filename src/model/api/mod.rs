//! API-compatible types.
//!
//! The types in this module are serialised in an API-friendly way, e.g.:
//!
//! - IDs are serialised as hex strings or plain integers.
//! - Field names follow the public JSON interface rather than storage.

pub mod answer;
pub mod auth;
pub mod credentials;
pub mod pagination;
pub mod question;
pub mod survey;
