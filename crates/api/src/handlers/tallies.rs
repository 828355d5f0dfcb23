//! Handlers for single tally rows (`/test-cases`, `/defects`).

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use signoff_core::types::DbId;
use signoff_core::validation::validate;
use signoff_db::models::signoff::{CreateDefect, CreateTestCase};
use signoff_db::repositories::{DefectRepo, TestCaseRepo};
use validator::Validate;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

/// Request body for `POST /test-cases`.
#[derive(Debug, Deserialize, Validate)]
pub struct TestCaseRequest {
    pub sign_off_id: DbId,
    #[validate(length(min = 1, message = "is required"))]
    pub test_type: String,
    #[validate(range(min = 0, message = "must not be negative"))]
    #[serde(default)]
    pub passed: i32,
    #[validate(range(min = 0, message = "must not be negative"))]
    #[serde(default)]
    pub failed: i32,
    #[validate(range(min = 0, message = "must not be negative"))]
    #[serde(default, alias = "non-executed")]
    pub non_executed: i32,
    /// Derived from the three counts when omitted.
    pub total: Option<i32>,
}

impl TestCaseRequest {
    fn into_create(self) -> CreateTestCase {
        CreateTestCase {
            total: self
                .total
                .unwrap_or(self.passed + self.failed + self.non_executed),
            sign_off_id: self.sign_off_id,
            test_type: self.test_type,
            passed: self.passed,
            failed: self.failed,
            non_executed: self.non_executed,
        }
    }
}

/// Request body for `POST /defects`.
#[derive(Debug, Deserialize, Validate)]
pub struct DefectRequest {
    pub sign_off_id: DbId,
    #[validate(length(min = 1, message = "is required"))]
    pub defect_type: String,
    #[validate(range(min = 0, message = "must not be negative"))]
    #[serde(default)]
    pub resolved: i32,
    #[validate(range(min = 0, message = "must not be negative"))]
    #[serde(default, alias = "deffered")]
    pub deferred: i32,
    /// Derived from the two counts when omitted.
    pub total: Option<i32>,
    pub defect_filter_link: Option<String>,
}

impl DefectRequest {
    fn into_create(self) -> CreateDefect {
        CreateDefect {
            total: self.total.unwrap_or(self.resolved + self.deferred),
            sign_off_id: self.sign_off_id,
            defect_type: self.defect_type,
            resolved: self.resolved,
            deferred: self.deferred,
            defect_filter_link: self.defect_filter_link,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CreatedId {
    pub id: DbId,
}

/// POST /api/v1/test-cases
pub async fn create_test_case(
    _auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<TestCaseRequest>,
) -> AppResult<Json<CreatedId>> {
    validate(&input)?;
    let row = TestCaseRepo::create(&state.pool, &input.into_create()).await?;
    Ok(Json(CreatedId { id: row.id }))
}

/// POST /api/v1/defects
pub async fn create_defect(
    _auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<DefectRequest>,
) -> AppResult<Json<CreatedId>> {
    validate(&input)?;
    let row = DefectRepo::create(&state.pool, &input.into_create()).await?;
    Ok(Json(CreatedId { id: row.id }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn omitted_totals_are_derived() {
        let tc: TestCaseRequest = serde_json::from_str(
            r#"{"sign_off_id": 1, "test_type": "RIAST", "passed": 5, "failed": 2, "non-executed": 1}"#,
        )
        .unwrap();
        assert_eq!(tc.into_create().total, 8);

        let defect: DefectRequest = serde_json::from_str(
            r#"{"sign_off_id": 1, "defect_type": "Defects", "resolved": 3, "deferred": 4}"#,
        )
        .unwrap();
        assert_eq!(defect.into_create().total, 7);
    }

    #[test]
    fn explicit_total_is_kept() {
        let defect: DefectRequest = serde_json::from_str(
            r#"{"sign_off_id": 1, "defect_type": "Defects", "resolved": 3, "deferred": 4, "total": 10}"#,
        )
        .unwrap();
        assert_eq!(defect.into_create().total, 10);
    }

    #[test]
    fn negative_counts_are_rejected() {
        let tc: TestCaseRequest = serde_json::from_str(
            r#"{"sign_off_id": 1, "test_type": "RIAST", "passed": -1}"#,
        )
        .unwrap();
        assert!(validate(&tc).is_err());
    }
}
