//! Repository for the `sign_offs` table and its tally rows.

use signoff_core::tally::{DefectRow, TestCaseRow};
use signoff_core::types::DbId;
use sqlx::postgres::PgArguments;
use sqlx::query::QueryAs;
use sqlx::{PgConnection, PgPool, Postgres};

use super::tally_repo::{DefectRepo, TestCaseRepo};
use crate::models::signoff::{SaveSignOff, SignOff, SignOffDetail};

const COLUMNS: &str = "id, project_name, vds_id, user_id, status, observations, caveats, \
                       jira_link, application, cm_number, project_details, qa, start_date, \
                       end_date, actual_start_date, actual_end_date, prod_rel_dt, rag_status, \
                       out_of_scope, evidences, comments, task_type, sign_off_type, \
                       defect_filter_link, created_at, updated_at";

/// Writable columns in bind order ($1..$23), shared by insert and update.
const WRITE_COLUMNS: &str = "project_name, vds_id, user_id, status, observations, caveats, \
                             jira_link, application, cm_number, project_details, qa, start_date, \
                             end_date, actual_start_date, actual_end_date, prod_rel_dt, \
                             rag_status, out_of_scope, evidences, comments, task_type, \
                             sign_off_type, defect_filter_link";

const WRITE_COLUMN_COUNT: usize = 23;

pub struct SignOffRepo;

impl SignOffRepo {
    /// Insert a sign-off and its tally rows in one transaction.
    pub async fn create(pool: &PgPool, input: &SaveSignOff) -> Result<DbId, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let placeholders = (1..=WRITE_COLUMN_COUNT)
            .map(|i| format!("${i}"))
            .collect::<Vec<_>>()
            .join(", ");
        let query = format!(
            "INSERT INTO sign_offs ({WRITE_COLUMNS}) VALUES ({placeholders}) RETURNING id"
        );
        let (id,): (DbId,) = bind_fields(sqlx::query_as(&query), input)
            .fetch_one(&mut *tx)
            .await?;

        insert_tallies(&mut *tx, id, &input.test_cases, &input.defects).await?;
        tx.commit().await?;

        tracing::debug!(
            sign_off_id = id,
            test_cases = input.test_cases.len(),
            defects = input.defects.len(),
            "Sign-off created"
        );
        Ok(id)
    }

    /// Update a sign-off and replace its tally rows in one transaction.
    ///
    /// Returns `false` (and writes nothing) if no row with `id` exists.
    pub async fn update(pool: &PgPool, id: DbId, input: &SaveSignOff) -> Result<bool, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let assignments = WRITE_COLUMNS
            .split(',')
            .map(str::trim)
            .enumerate()
            .map(|(i, column)| format!("{column} = ${}", i + 1))
            .collect::<Vec<_>>()
            .join(", ");
        let query = format!(
            "UPDATE sign_offs SET {assignments}, updated_at = NOW() WHERE id = ${} RETURNING id",
            WRITE_COLUMN_COUNT + 1
        );
        let updated: Option<(DbId,)> = bind_fields(sqlx::query_as(&query), input)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;

        if updated.is_none() {
            tx.rollback().await?;
            return Ok(false);
        }

        sqlx::query("DELETE FROM test_cases WHERE sign_off_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM defects WHERE sign_off_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        insert_tallies(&mut *tx, id, &input.test_cases, &input.defects).await?;
        tx.commit().await?;

        tracing::debug!(sign_off_id = id, "Sign-off updated");
        Ok(true)
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<SignOff>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM sign_offs WHERE id = $1");
        sqlx::query_as::<_, SignOff>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// A sign-off together with its test-case and defect rows.
    pub async fn find_detail(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<SignOffDetail>, sqlx::Error> {
        let Some(signoff) = Self::find_by_id(pool, id).await? else {
            return Ok(None);
        };

        let test_cases = TestCaseRepo::list_by_sign_off(pool, id).await?;
        let defects = DefectRepo::list_by_sign_off(pool, id).await?;

        Ok(Some(SignOffDetail {
            signoff,
            test_cases,
            defects,
        }))
    }

    /// List sign-offs newest first, optionally filtered by a case-insensitive
    /// substring of the project name.
    pub async fn list(pool: &PgPool, search: Option<&str>) -> Result<Vec<SignOff>, sqlx::Error> {
        let pattern = format!("%{}%", escape_like(search.unwrap_or_default().trim()));
        let query = format!(
            "SELECT {COLUMNS} FROM sign_offs
             WHERE project_name ILIKE $1 ESCAPE '\\'
             ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, SignOff>(&query)
            .bind(pattern)
            .fetch_all(pool)
            .await
    }
}

fn bind_fields<'q, O>(
    query: QueryAs<'q, Postgres, O, PgArguments>,
    input: &'q SaveSignOff,
) -> QueryAs<'q, Postgres, O, PgArguments> {
    query
        .bind(&input.project_name)
        .bind(input.vds_id)
        .bind(input.user_id)
        .bind(&input.status)
        .bind(&input.observations)
        .bind(&input.caveats)
        .bind(&input.jira_link)
        .bind(&input.application)
        .bind(&input.cm_number)
        .bind(&input.project_details)
        .bind(&input.qa)
        .bind(input.start_date)
        .bind(input.end_date)
        .bind(input.actual_start_date)
        .bind(input.actual_end_date)
        .bind(input.prod_rel_dt)
        .bind(&input.rag_status)
        .bind(&input.out_of_scope)
        .bind(&input.evidences)
        .bind(&input.comments)
        .bind(&input.task_type)
        .bind(&input.sign_off_type)
        .bind(&input.defect_filter_link)
}

async fn insert_tallies(
    conn: &mut PgConnection,
    sign_off_id: DbId,
    test_cases: &[TestCaseRow],
    defects: &[DefectRow],
) -> Result<(), sqlx::Error> {
    for row in test_cases {
        sqlx::query(
            "INSERT INTO test_cases (sign_off_id, test_type, passed, failed, non_executed, total)
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(sign_off_id)
        .bind(row.test_type)
        .bind(row.passed)
        .bind(row.failed)
        .bind(row.non_executed)
        .bind(row.total)
        .execute(&mut *conn)
        .await?;
    }

    for row in defects {
        sqlx::query(
            "INSERT INTO defects (sign_off_id, defect_type, resolved, deferred, total)
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(sign_off_id)
        .bind(row.defect_type)
        .bind(row.resolved)
        .bind(row.deferred)
        .bind(row.total)
        .execute(&mut *conn)
        .await?;
    }

    Ok(())
}

/// Escape `LIKE` metacharacters so user input only ever matches literally.
fn escape_like(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn like_metacharacters_are_escaped() {
        assert_eq!(escape_like("100%_done\\"), "100\\%\\_done\\\\");
        assert_eq!(escape_like("Apollo"), "Apollo");
    }

    #[test]
    fn write_column_count_matches_column_list() {
        assert_eq!(WRITE_COLUMNS.split(',').count(), WRITE_COLUMN_COUNT);
    }
}
