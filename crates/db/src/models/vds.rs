use serde::Serialize;
use signoff_core::types::DbId;
use sqlx::FromRow;

/// A row from the `vds` reference table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Vds {
    pub id: DbId,
    pub name: String,
}
