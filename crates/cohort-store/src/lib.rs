//! # cohort-store
//!
//! Local storage for the Cohort collaboration modules, backed by SQLite.
//!
//! The crate exposes a synchronous [`Database`] handle that wraps a
//! `rusqlite::Connection` and provides typed repository helpers for every
//! domain model: get-by-id, list-by-predicate, append, update-by-id.
//! Mutable records carry a `revision` counter bumped on every update.

pub mod courses;
pub mod database;
pub mod groups;
pub mod invitations;
pub mod messages;
pub mod migrations;
pub mod models;
pub mod notes;
pub mod study_groups;
pub mod users;
pub mod voice;

mod error;

pub use database::Database;
pub use error::StoreError;
pub use models::*;
