//! Sign-off request status, RAG rating and form-field normalisation.
//!
//! The entry form submits free-text status strings and may send empty
//! strings for dates it has not filled in. These helpers turn that raw
//! input into the values stored in `sign_offs`.

use chrono::{DateTime, NaiveDate};

use crate::error::CoreError;
use crate::types::Date;

/// Status written when the user presses "Submit". Triggers the completion email.
pub const STATUS_COMPLETE: &str = "Complete";

/// Status written when the user presses "Save" on an unfinished request.
pub const STATUS_IN_PROGRESS: &str = "In Progress";

/// Placeholder rendered in reports for missing values.
pub const NOT_AVAILABLE: &str = "N/A";

/// Returns `true` if the given status marks the sign-off as submitted.
pub fn is_complete(status: Option<&str>) -> bool {
    status == Some(STATUS_COMPLETE)
}

/// Red/Amber/Green delivery confidence rating.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RagStatus {
    Red,
    Amber,
    Green,
}

impl RagStatus {
    /// Parse the upper-case form value (`RED`, `AMBER`, `GREEN`).
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "RED" => Some(Self::Red),
            "AMBER" => Some(Self::Amber),
            "GREEN" => Some(Self::Green),
            _ => None,
        }
    }

    /// Inline CSS for the coloured badge in the sign-off report.
    pub fn badge_style(self) -> &'static str {
        match self {
            Self::Red => "background-color: #ffebee; color: #c62828; padding: 4px 8px; border-radius: 4px;",
            Self::Amber => "background-color: #fff8e1; color: #f57c00; padding: 4px 8px; border-radius: 4px;",
            Self::Green => "background-color: #e8f5e8; color: #2e7d32; padding: 4px 8px; border-radius: 4px;",
        }
    }
}

/// Normalise an optional date field from the entry form.
///
/// `None` and blank strings become `None`. Otherwise the value must be a
/// `YYYY-MM-DD` date or an RFC 3339 timestamp (whose date part is kept);
/// anything else is a validation error naming the field.
pub fn parse_form_date(field: &str, raw: Option<&str>) -> Result<Option<Date>, CoreError> {
    let Some(value) = raw.map(str::trim).filter(|v| !v.is_empty()) else {
        return Ok(None);
    };

    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Ok(Some(date));
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Ok(Some(ts.date_naive()));
    }

    Err(CoreError::Validation(format!(
        "{field} must be a date in YYYY-MM-DD format, got '{value}'"
    )))
}

/// Collapse blank optional text to `None`.
pub fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}
