//! # AniColle Common Library
//!
//! Shared code for the AniColle microblog service:
//! - Configuration and root folder resolution
//! - Database initialization and row models
//! - Password hashing
//! - Tag normalization and comment thread assembly
//! - Page arithmetic used by every listing endpoint

pub mod config;
pub mod db;
pub mod error;
pub mod pagination;
pub mod password;
pub mod tags;
pub mod thread;

pub use error::{Error, Result};
