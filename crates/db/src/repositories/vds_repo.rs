//! Repository for the `vds` reference table.

use signoff_core::types::DbId;
use sqlx::PgPool;

use crate::models::vds::Vds;

pub struct VdsRepo;

impl VdsRepo {
    /// List all VDS entries alphabetically.
    pub async fn list(pool: &PgPool) -> Result<Vec<Vds>, sqlx::Error> {
        sqlx::query_as::<_, Vds>("SELECT id, name FROM vds ORDER BY name")
            .fetch_all(pool)
            .await
    }

    pub async fn find_name(pool: &PgPool, id: DbId) -> Result<Option<String>, sqlx::Error> {
        sqlx::query_scalar::<_, String>("SELECT name FROM vds WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
    }
}
