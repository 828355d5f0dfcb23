//! Request handlers.
//!
//! Each submodule provides async handler functions for a single resource.
//! Handlers delegate to the corresponding repository in `signoff_db` and
//! map errors via [`AppError`](crate::error::AppError).

pub mod auth;
pub mod email;
pub mod knowledge_share;
pub mod signoffs;
pub mod tallies;
pub mod users;
pub mod vds;
