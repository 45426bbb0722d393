//! API-compatible types.
//!
//! The types in this module are serialised in an API-friendly way, e.g.:
//!
//! - IDs are serialised as hex strings.
//! - Datetimes are serialised as RFC 3339 strings.
//! - Field names are camelCase.
//!
//! Request bodies are deserialised leniently (missing fields become `None`)
//! and checked explicitly, so that bad input is reported as a validation
//! error rather than a parse failure.

pub mod group;
pub mod id;
pub mod member;
pub mod questionnaire;
pub mod recommendation;
pub mod round;
pub mod vote;
