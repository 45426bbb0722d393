//! DB-compatible (e.g. de/serialisable) types.
//!
//! The types in this module are serialised in an DB-friendly way, e.g.:
//!
//! - IDs and datetimes are serialised in MongoDB's own format.
//!
//! Each document type comes as a `...Core` holding the data, aliased as
//! `New...` for insertion, plus a wrapper carrying the `_id` once stored.

pub mod group;
pub mod member;
pub mod questionnaire;
pub mod round;
pub mod vote;
