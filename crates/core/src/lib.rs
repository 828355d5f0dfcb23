//! Domain types and pure business rules for QA sign-off tracking.
//!
//! Nothing in this crate performs I/O; the database, HTTP and mail layers
//! all build on the types defined here.

pub mod error;
pub mod notification;
pub mod signoff;
pub mod tally;
pub mod types;
pub mod upload;
pub mod validation;
