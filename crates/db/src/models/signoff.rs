//! Sign-off request model, its tally rows and DTOs.

use serde::Serialize;
use signoff_core::tally::{DefectRow, DefectSummary, TestCaseRow, TestCaseSummary};
use signoff_core::types::{Date, DbId, Timestamp};
use sqlx::FromRow;

/// A row from the `sign_offs` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct SignOff {
    pub id: DbId,
    pub project_name: String,
    pub vds_id: Option<DbId>,
    pub user_id: DbId,
    pub status: Option<String>,
    pub observations: Option<String>,
    pub caveats: Option<String>,
    pub jira_link: Option<String>,
    pub application: Option<String>,
    pub cm_number: Option<String>,
    pub project_details: Option<String>,
    pub qa: Option<String>,
    pub start_date: Option<Date>,
    pub end_date: Option<Date>,
    pub actual_start_date: Option<Date>,
    pub actual_end_date: Option<Date>,
    pub prod_rel_dt: Option<Date>,
    pub rag_status: Option<String>,
    pub out_of_scope: Option<String>,
    pub evidences: Option<String>,
    pub comments: Option<String>,
    pub task_type: Option<String>,
    pub sign_off_type: Option<String>,
    pub defect_filter_link: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A row from the `test_cases` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TestCase {
    pub id: DbId,
    pub sign_off_id: DbId,
    pub test_type: String,
    pub passed: i32,
    pub failed: i32,
    pub non_executed: i32,
    pub total: i32,
    pub created_at: Timestamp,
}

/// A row from the `defects` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Defect {
    pub id: DbId,
    pub sign_off_id: DbId,
    pub defect_type: String,
    pub resolved: i32,
    pub deferred: i32,
    pub total: i32,
    pub defect_filter_link: Option<String>,
    pub created_at: Timestamp,
}

/// A sign-off with its tallies, as returned by the detail endpoint and
/// rendered into the completion email.
#[derive(Debug, Clone, Serialize)]
pub struct SignOffDetail {
    pub signoff: SignOff,
    pub test_cases: Vec<TestCase>,
    pub defects: Vec<Defect>,
}

impl SignOffDetail {
    pub fn test_case_summary(&self) -> TestCaseSummary {
        TestCaseSummary::from_rows(
            self.test_cases
                .iter()
                .map(|t| (t.test_type.as_str(), t.passed, t.failed, t.non_executed)),
        )
    }

    pub fn defect_summary(&self) -> DefectSummary {
        DefectSummary::from_rows(
            self.defects
                .iter()
                .map(|d| (d.defect_type.as_str(), d.resolved, d.deferred)),
        )
    }
}

/// Everything written by a sign-off create or update.
///
/// Dates are already parsed and blank strings already normalised to `None`;
/// the tally rows replace whatever the record had before.
#[derive(Debug, Clone, Default)]
pub struct SaveSignOff {
    pub project_name: String,
    pub vds_id: Option<DbId>,
    pub user_id: DbId,
    pub status: Option<String>,
    pub observations: Option<String>,
    pub caveats: Option<String>,
    pub jira_link: Option<String>,
    pub application: Option<String>,
    pub cm_number: Option<String>,
    pub project_details: Option<String>,
    pub qa: Option<String>,
    pub start_date: Option<Date>,
    pub end_date: Option<Date>,
    pub actual_start_date: Option<Date>,
    pub actual_end_date: Option<Date>,
    pub prod_rel_dt: Option<Date>,
    pub rag_status: Option<String>,
    pub out_of_scope: Option<String>,
    pub evidences: Option<String>,
    pub comments: Option<String>,
    pub task_type: Option<String>,
    pub sign_off_type: Option<String>,
    pub defect_filter_link: Option<String>,
    pub test_cases: Vec<TestCaseRow>,
    pub defects: Vec<DefectRow>,
}

/// DTO for adding a single test-case row outside the sign-off form.
#[derive(Debug, Clone)]
pub struct CreateTestCase {
    pub sign_off_id: DbId,
    pub test_type: String,
    pub passed: i32,
    pub failed: i32,
    pub non_executed: i32,
    pub total: i32,
}

/// DTO for adding a single defect row outside the sign-off form.
#[derive(Debug, Clone)]
pub struct CreateDefect {
    pub sign_off_id: DbId,
    pub defect_type: String,
    pub resolved: i32,
    pub deferred: i32,
    pub total: i32,
    pub defect_filter_link: Option<String>,
}
