//! Bridging `validator` derive results into [`CoreError`].

use validator::{Validate, ValidationErrors};

use crate::error::CoreError;

/// Run `Validate` on `input`, flattening any failures into a single
/// [`CoreError::Validation`] message.
pub fn validate<T: Validate>(input: &T) -> Result<(), CoreError> {
    input
        .validate()
        .map_err(|errors| CoreError::Validation(describe(&errors)))
}

/// Render field errors as `field: message` pairs sorted by field name.
fn describe(errors: &ValidationErrors) -> String {
    let mut parts: Vec<String> = errors
        .field_errors()
        .iter()
        .map(|(field, errs)| {
            let detail = errs
                .first()
                .and_then(|e| e.message.as_ref().map(|m| m.to_string()))
                .unwrap_or_else(|| "is invalid".to_string());
            format!("{field}: {detail}")
        })
        .collect();
    parts.sort();
    parts.join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Validate)]
    struct Probe {
        #[validate(email(message = "must be a valid email address"))]
        email: String,
        #[validate(length(min = 1, message = "is required"))]
        name: String,
    }

    #[test]
    fn valid_input_passes() {
        let probe = Probe {
            email: "qa@example.com".into(),
            name: "QA".into(),
        };
        assert!(validate(&probe).is_ok());
    }

    #[test]
    fn failures_are_flattened_and_sorted() {
        let probe = Probe {
            email: "nope".into(),
            name: String::new(),
        };
        let err = validate(&probe).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Validation failed: email: must be a valid email address; name: is required"
        );
    }
}
