//! # cohort-shared
//!
//! Types shared by every crate in the workspace: id newtypes, the enums
//! that cross the store/media/client boundaries, and named tunables.

pub mod constants;
pub mod types;

pub use types::*;
