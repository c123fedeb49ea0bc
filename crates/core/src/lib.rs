//! Core library for taskboard
//!
//! This crate contains the core business logic, including:
//! - Task and user record stores
//! - Filtering, sorting and pagination
//! - JSON file persistence

pub mod error;
pub mod persistence;
pub mod query;
pub mod task;
pub mod timestamp;
pub mod user;

pub use error::Error;
pub type Result<T> = std::result::Result<T, Error>;

/// Next free id given the highest id handed out so far and the current records.
pub(crate) fn next_id(last_issued: u64, ids: impl Iterator<Item = u64>) -> u64 {
    ids.fold(last_issued, u64::max) + 1
}
