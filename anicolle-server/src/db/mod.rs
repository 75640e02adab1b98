//! Query functions for anicolle-server
//!
//! Each submodule owns the SQL for one table family. Functions take a pool
//! for single statements and a `&mut SqliteConnection` when they must join
//! the caller's transaction.

pub mod blogs;
pub mod comments;
pub mod likes;
pub mod sessions;
pub mod tags;
pub mod users;

use anicolle_common::Error;

/// Map a unique-constraint failure to `Error::Conflict`
pub(crate) fn conflict_on_unique(err: sqlx::Error, what: &str) -> Error {
    match err.as_database_error() {
        Some(db_err) if db_err.is_unique_violation() => {
            Error::Conflict(format!("{} is already taken", what))
        }
        _ => Error::Database(err),
    }
}
