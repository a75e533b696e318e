//! DB-compatible (e.g. de/serialisable) types.
//!
//! The types in this module are serialised in an DB-friendly way, e.g.:
//!
//! - Account and answer IDs are MongoDB object IDs.
//! - Survey dates are ISO-8601 strings, so range filters compare them correctly.

pub mod account;
pub mod admin;
pub mod answer;
pub mod question;
pub mod survey;
pub mod user;
