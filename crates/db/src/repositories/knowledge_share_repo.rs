//! Repository for the `knowledge_shares` table.

use signoff_core::types::DbId;
use sqlx::PgPool;

use crate::models::knowledge_share::{
    CreateKnowledgeShare, KnowledgeShare, KnowledgeShareWithAuthor,
};

const COLUMNS: &str = "id, subject, description, document, user_id, created_at";

pub struct KnowledgeShareRepo;

impl KnowledgeShareRepo {
    pub async fn create(
        pool: &PgPool,
        input: &CreateKnowledgeShare,
    ) -> Result<KnowledgeShare, sqlx::Error> {
        let query = format!(
            "INSERT INTO knowledge_shares (subject, description, document, user_id)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, KnowledgeShare>(&query)
            .bind(&input.subject)
            .bind(&input.description)
            .bind(&input.document)
            .bind(input.user_id)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<KnowledgeShare>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM knowledge_shares WHERE id = $1");
        sqlx::query_as::<_, KnowledgeShare>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// All items, newest first, with the author's full name.
    pub async fn list_with_author(
        pool: &PgPool,
    ) -> Result<Vec<KnowledgeShareWithAuthor>, sqlx::Error> {
        sqlx::query_as::<_, KnowledgeShareWithAuthor>(
            "SELECT ks.id, ks.subject, ks.description, ks.document, ks.user_id,
                    CONCAT(u.first_name, ' ', u.last_name) AS author_name,
                    ks.created_at
             FROM knowledge_shares ks
             JOIN users u ON u.id = ks.user_id
             ORDER BY ks.created_at DESC, ks.id DESC",
        )
        .fetch_all(pool)
        .await
    }
}
