//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&PgPool` as the first argument.

pub mod knowledge_share_repo;
pub mod signoff_repo;
pub mod tally_repo;
pub mod user_repo;
pub mod vds_repo;

pub use knowledge_share_repo::KnowledgeShareRepo;
pub use signoff_repo::SignOffRepo;
pub use tally_repo::{DefectRepo, TestCaseRepo};
pub use user_repo::UserRepo;
pub use vds_repo::VdsRepo;
