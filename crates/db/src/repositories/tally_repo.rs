//! Repositories for the `test_cases` and `defects` tally tables.
//!
//! Form-driven writes go through [`SignOffRepo`](super::SignOffRepo) inside
//! its transaction; these cover reads and one-off row inserts.

use signoff_core::types::DbId;
use sqlx::PgPool;

use crate::models::signoff::{CreateDefect, CreateTestCase, Defect, TestCase};

const TEST_CASE_COLUMNS: &str =
    "id, sign_off_id, test_type, passed, failed, non_executed, total, created_at";

const DEFECT_COLUMNS: &str =
    "id, sign_off_id, defect_type, resolved, deferred, total, defect_filter_link, created_at";

pub struct TestCaseRepo;

impl TestCaseRepo {
    pub async fn create(pool: &PgPool, input: &CreateTestCase) -> Result<TestCase, sqlx::Error> {
        let query = format!(
            "INSERT INTO test_cases (sign_off_id, test_type, passed, failed, non_executed, total)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {TEST_CASE_COLUMNS}"
        );
        sqlx::query_as::<_, TestCase>(&query)
            .bind(input.sign_off_id)
            .bind(&input.test_type)
            .bind(input.passed)
            .bind(input.failed)
            .bind(input.non_executed)
            .bind(input.total)
            .fetch_one(pool)
            .await
    }

    pub async fn list_by_sign_off(
        pool: &PgPool,
        sign_off_id: DbId,
    ) -> Result<Vec<TestCase>, sqlx::Error> {
        let query = format!(
            "SELECT {TEST_CASE_COLUMNS} FROM test_cases WHERE sign_off_id = $1 ORDER BY id"
        );
        sqlx::query_as::<_, TestCase>(&query)
            .bind(sign_off_id)
            .fetch_all(pool)
            .await
    }
}

pub struct DefectRepo;

impl DefectRepo {
    pub async fn create(pool: &PgPool, input: &CreateDefect) -> Result<Defect, sqlx::Error> {
        let query = format!(
            "INSERT INTO defects (sign_off_id, defect_type, resolved, deferred, total, defect_filter_link)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {DEFECT_COLUMNS}"
        );
        sqlx::query_as::<_, Defect>(&query)
            .bind(input.sign_off_id)
            .bind(&input.defect_type)
            .bind(input.resolved)
            .bind(input.deferred)
            .bind(input.total)
            .bind(&input.defect_filter_link)
            .fetch_one(pool)
            .await
    }

    pub async fn list_by_sign_off(
        pool: &PgPool,
        sign_off_id: DbId,
    ) -> Result<Vec<Defect>, sqlx::Error> {
        let query =
            format!("SELECT {DEFECT_COLUMNS} FROM defects WHERE sign_off_id = $1 ORDER BY id");
        sqlx::query_as::<_, Defect>(&query)
            .bind(sign_off_id)
            .fetch_all(pool)
            .await
    }
}
