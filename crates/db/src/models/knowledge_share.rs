//! Knowledge-share items: a subject, a description and an optional document.

use serde::Serialize;
use signoff_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// A row from the `knowledge_shares` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct KnowledgeShare {
    pub id: DbId,
    pub subject: String,
    pub description: String,
    /// Stored file name under the upload directory.
    pub document: Option<String>,
    pub user_id: DbId,
    pub created_at: Timestamp,
}

/// List entry joined with its author's display name.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct KnowledgeShareWithAuthor {
    pub id: DbId,
    pub subject: String,
    pub description: String,
    pub document: Option<String>,
    pub user_id: DbId,
    pub author_name: String,
    pub created_at: Timestamp,
}

#[derive(Debug)]
pub struct CreateKnowledgeShare {
    pub subject: String,
    pub description: String,
    pub document: Option<String>,
    pub user_id: DbId,
}
