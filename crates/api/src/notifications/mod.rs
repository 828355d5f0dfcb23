//! Sign-off completion email.
//!
//! [`notify_completion`] runs after a sign-off write commits with status
//! `Complete`. It never fails: every problem is folded into a
//! [`NotificationOutcome`] that the handler turns into an advisory.

pub mod completion;
pub mod signoff_email;

pub use completion::notify_completion;
pub use signoff_email::{signoff_subject, SignOffReport};
