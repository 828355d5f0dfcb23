//! Row models and DTOs.
//!
//! Each submodule contains a `FromRow` entity struct matching the database
//! row and the `Create*` / `Save*` DTOs its repository accepts.

pub mod knowledge_share;
pub mod signoff;
pub mod user;
pub mod vds;
