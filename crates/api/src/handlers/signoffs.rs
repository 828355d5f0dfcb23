//! Handlers for the `/signoffs` resource.
//!
//! Writes commit first; the completion email runs afterwards and can only
//! change the response message, never the status code.

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use signoff_core::error::CoreError;
use signoff_core::notification::{write_message, NotificationOutcome, SignOffWrite};
use signoff_core::signoff::{is_complete, non_blank, parse_form_date};
use signoff_core::tally::{DefectForm, TestCaseForm};
use signoff_core::types::DbId;
use signoff_core::validation::validate;
use signoff_db::models::signoff::{SaveSignOff, SignOff, SignOffDetail};
use signoff_db::repositories::SignOffRepo;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::notifications::notify_completion;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Query parameters for `GET /signoffs`.
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    /// Case-insensitive substring of the project name.
    pub search: Option<String>,
}

/// Body of `POST /signoffs` and `PUT /signoffs/{id}`, shaped like the entry form.
///
/// Dates arrive as strings; blank strings mean "not set".
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default)]
pub struct SignOffInput {
    #[validate(length(min = 1, message = "is required"))]
    pub project_name: String,
    pub vds_id: Option<DbId>,
    pub status: Option<String>,
    pub observations: Option<String>,
    pub caveats: Option<String>,
    pub jira_link: Option<String>,
    pub application: Option<String>,
    pub cm_number: Option<String>,
    pub project_details: Option<String>,
    pub qa: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub actual_start_date: Option<String>,
    pub actual_end_date: Option<String>,
    pub prod_rel_dt: Option<String>,
    pub rag_status: Option<String>,
    #[serde(alias = "outOfScope")]
    pub out_of_scope: Option<String>,
    pub evidences: Option<String>,
    pub comments: Option<String>,
    #[serde(alias = "tasktype")]
    pub task_type: Option<String>,
    #[serde(alias = "SignOffType")]
    pub sign_off_type: Option<String>,
    pub defect_filter_link: Option<String>,
    #[serde(alias = "testCases")]
    pub test_cases: Option<TestCaseForm>,
    pub defects: Option<DefectForm>,
}

impl SignOffInput {
    /// Normalise the form into the values written to the database.
    pub fn into_save(self, user_id: DbId) -> Result<SaveSignOff, CoreError> {
        let text = |v: Option<String>| non_blank(v.as_deref()).map(str::to_string);

        Ok(SaveSignOff {
            start_date: parse_form_date("start_date", self.start_date.as_deref())?,
            end_date: parse_form_date("end_date", self.end_date.as_deref())?,
            actual_start_date: parse_form_date(
                "actual_start_date",
                self.actual_start_date.as_deref(),
            )?,
            actual_end_date: parse_form_date("actual_end_date", self.actual_end_date.as_deref())?,
            prod_rel_dt: parse_form_date("prod_rel_dt", self.prod_rel_dt.as_deref())?,
            test_cases: self.test_cases.map(|f| f.rows()).unwrap_or_default(),
            defects: self.defects.map(|f| f.rows()).unwrap_or_default(),
            project_name: self.project_name.trim().to_string(),
            vds_id: self.vds_id,
            user_id,
            status: text(self.status),
            observations: text(self.observations),
            caveats: text(self.caveats),
            jira_link: text(self.jira_link),
            application: text(self.application),
            cm_number: text(self.cm_number),
            project_details: text(self.project_details),
            qa: text(self.qa),
            rag_status: text(self.rag_status),
            out_of_scope: text(self.out_of_scope),
            evidences: text(self.evidences),
            comments: text(self.comments),
            task_type: text(self.task_type),
            sign_off_type: text(self.sign_off_type),
            defect_filter_link: text(self.defect_filter_link),
        })
    }
}

/// Response to a sign-off write.
#[derive(Debug, Serialize)]
pub struct SignOffWriteResponse {
    pub id: DbId,
    pub message: String,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/v1/signoffs?search=
pub async fn list(
    _auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> AppResult<Json<Vec<SignOff>>> {
    let signoffs = SignOffRepo::list(&state.pool, params.search.as_deref()).await?;
    Ok(Json(signoffs))
}

/// GET /api/v1/signoffs/{id}
pub async fn get_by_id(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<SignOffDetail>> {
    let detail = SignOffRepo::find_detail(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "SignOff",
            id,
        }))?;
    Ok(Json(detail))
}

/// POST /api/v1/signoffs
pub async fn create(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<SignOffInput>,
) -> AppResult<Json<SignOffWriteResponse>> {
    validate(&input)?;
    let save = input.into_save(auth.user_id)?;

    let id = SignOffRepo::create(&state.pool, &save).await?;
    tracing::info!(
        sign_off_id = id,
        user_id = auth.user_id,
        status = ?save.status,
        "Sign-off created"
    );

    let notification = notify_if_complete(&state, id, &save).await;

    Ok(Json(SignOffWriteResponse {
        id,
        message: write_message(SignOffWrite::Created, notification),
    }))
}

/// PUT /api/v1/signoffs/{id}
pub async fn update(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<SignOffInput>,
) -> AppResult<Json<SignOffWriteResponse>> {
    validate(&input)?;
    let save = input.into_save(auth.user_id)?;

    if !SignOffRepo::update(&state.pool, id, &save).await? {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "SignOff",
            id,
        }));
    }
    tracing::info!(
        sign_off_id = id,
        user_id = auth.user_id,
        status = ?save.status,
        "Sign-off updated"
    );

    let notification = notify_if_complete(&state, id, &save).await;

    Ok(Json(SignOffWriteResponse {
        id,
        message: write_message(SignOffWrite::Updated, notification),
    }))
}

/// Send the completion email when the written status is `Complete`.
async fn notify_if_complete(
    state: &AppState,
    id: DbId,
    save: &SaveSignOff,
) -> Option<NotificationOutcome> {
    if !is_complete(save.status.as_deref()) {
        return None;
    }
    Some(notify_completion(state, id, save.user_id).await)
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use chrono::NaiveDate;
    use signoff_core::tally::{DefectRow, TestCaseRow};

    use super::*;

    fn input(json: &str) -> SignOffInput {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn blank_text_and_dates_become_none() {
        let save = input(
            r#"{"project_name": " Apollo ", "caveats": "  ", "start_date": "",
                "end_date": "2024-04-30", "status": "In Progress"}"#,
        )
        .into_save(9)
        .unwrap();

        assert_eq!(save.project_name, "Apollo");
        assert_eq!(save.user_id, 9);
        assert_eq!(save.caveats, None);
        assert_eq!(save.start_date, None);
        assert_eq!(save.end_date, NaiveDate::from_ymd_opt(2024, 4, 30));
        assert_eq!(save.status.as_deref(), Some("In Progress"));
        assert!(save.test_cases.is_empty());
        assert!(save.defects.is_empty());
    }

    #[test]
    fn form_aliases_are_accepted() {
        let save = input(
            r#"{"project_name": "Apollo", "tasktype": "Regression",
                "SignOffType": "Full", "outOfScope": "Mobile"}"#,
        )
        .into_save(1)
        .unwrap();
        assert_eq!(save.task_type.as_deref(), Some("Regression"));
        assert_eq!(save.sign_off_type.as_deref(), Some("Full"));
        assert_eq!(save.out_of_scope.as_deref(), Some("Mobile"));
    }

    #[test]
    fn tallies_become_rows() {
        let save = input(
            r#"{"project_name": "Apollo",
                "test_cases": {"passed": {"riast": 10, "riasp": 8}},
                "defects": {"enhancements": {"resolved": 2, "deferred": 1}}}"#,
        )
        .into_save(1)
        .unwrap();

        assert_eq!(
            save.test_cases,
            vec![
                TestCaseRow::new("RIAST", 10, 0, 0),
                TestCaseRow::new("RIASP", 8, 0, 0)
            ]
        );
        assert_eq!(save.defects, vec![DefectRow::new("Enhancements", 2, 1)]);
    }

    #[test]
    fn bad_date_is_a_validation_error() {
        let err = input(r#"{"project_name": "Apollo", "prod_rel_dt": "31/12/2024"}"#)
            .into_save(1)
            .unwrap_err();
        assert_matches!(err, CoreError::Validation(msg) if msg.contains("prod_rel_dt"));
    }

    #[test]
    fn missing_project_name_fails_validation() {
        let err = validate(&input("{}")).unwrap_err();
        assert_matches!(err, CoreError::Validation(msg) if msg.contains("project_name"));
    }
}
