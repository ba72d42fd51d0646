mod gemini;
pub mod prompt;

pub use gemini::{GeminiExtractor, GEMINI_BASE_URL, GEMINI_MODEL};

use crate::components::calendar::models::{EventFields, ValidationError};
use crate::utils::time::parse_date;
use async_trait::async_trait;
use chrono::NaiveDate;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::error;

/// Why an extraction failed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RelayError {
    /// Nothing to extract from; raised before any network call
    #[error("No event description was given")]
    MissingInput,

    /// The model could not be reached or answered with an error; worth retrying
    #[error("Model service failed: {0}")]
    Service(String),

    /// The model answered with something that is not a usable event object
    #[error("Model response could not be understood: {0}")]
    Malformed(String),

    /// The model left required fields out
    #[error("Model response is missing {}", .missing.join(", "))]
    Incomplete { missing: Vec<String> },
}

impl RelayError {
    /// Only service failures may succeed when resubmitted unchanged
    pub fn is_retryable(&self) -> bool {
        matches!(self, RelayError::Service(_))
    }
}

/// Converts free text into event fields via an external model
#[async_trait]
pub trait Extractor: Send + Sync + 'static {
    /// One attempt; `today` anchors relative expressions such as "tomorrow"
    async fn extract(&self, user_text: &str, today: NaiveDate) -> Result<EventFields, RelayError>;
}

/// Trimmed user text, or MissingInput when there is none
pub fn require_input(user_text: &str) -> Result<&str, RelayError> {
    let text = user_text.trim();
    if text.is_empty() {
        return Err(RelayError::MissingInput);
    }
    Ok(text)
}

/// Validate the model's JSON answer against the required-fields contract
pub fn parse_extraction(response: &str) -> Result<EventFields, RelayError> {
    let object = parse_json_object(response)?;

    let mut missing = Vec::new();
    let mut values = Vec::with_capacity(prompt::REQUIRED_FIELDS.len());
    for field in prompt::REQUIRED_FIELDS {
        match object.get(field) {
            Some(Value::String(s)) if !s.trim().is_empty() => values.push(s.trim().to_string()),
            None | Some(Value::Null) | Some(Value::String(_)) => missing.push(field.to_string()),
            Some(other) => {
                return Err(RelayError::Malformed(format!(
                    "{} should be a string, got {}",
                    field, other
                )))
            }
        }
    }

    if !missing.is_empty() {
        return Err(RelayError::Incomplete { missing });
    }

    let [title, start, end]: [String; 3] = values
        .try_into()
        .map_err(|_| RelayError::Malformed("unexpected field count".to_string()))?;

    let start_date = parse_model_date("startDate", &start)?;
    let end_date = parse_model_date("endDate", &end)?;

    let description = match object.get("description") {
        Some(Value::String(s)) => s.trim().to_string(),
        _ => String::new(),
    };

    let fields = EventFields::new(title, start_date, end_date, description);
    fields.validate().map_err(|e| match e {
        ValidationError::EndBeforeStart { .. } => RelayError::Malformed(e.to_string()),
        ValidationError::EmptyTitle => RelayError::Incomplete {
            missing: vec!["title".to_string()],
        },
    })?;

    Ok(fields)
}

fn parse_model_date(field: &str, value: &str) -> Result<NaiveDate, RelayError> {
    parse_date(value).ok_or_else(|| {
        RelayError::Malformed(format!("{} is not a YYYY-MM-DD date: {}", field, value))
    })
}

/// Parse the response as a JSON object, tolerating code fences or prose around it
fn parse_json_object(response: &str) -> Result<Map<String, Value>, RelayError> {
    let trimmed = response.trim();

    let value = match serde_json::from_str::<Value>(trimmed) {
        Ok(value) => value,
        Err(first_err) => {
            // Try the outermost {...} span
            let span = trimmed
                .find('{')
                .zip(trimmed.rfind('}'))
                .filter(|(start, end)| start < end)
                .map(|(start, end)| &trimmed[start..=end]);

            match span.map(serde_json::from_str::<Value>) {
                Some(Ok(value)) => value,
                _ => {
                    error!("Could not extract valid JSON from model response: {}", response);
                    return Err(RelayError::Malformed(first_err.to_string()));
                }
            }
        }
    };

    match value {
        Value::Object(object) => Ok(object),
        other => Err(RelayError::Malformed(format!(
            "expected a JSON object, got {}",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_parse_complete_response() {
        let fields =
            parse_extraction(r#"{"title":"Dentist","startDate":"2024-07-01","endDate":"2024-07-01"}"#)
                .unwrap();

        assert_eq!(fields.title, "Dentist");
        assert_eq!(fields.start_date, date(2024, 7, 1));
        assert_eq!(fields.end_date, date(2024, 7, 1));
        assert_eq!(fields.description, "");
    }

    #[test]
    fn test_parse_keeps_description() {
        let fields = parse_extraction(
            r#"{"title":"Lunch","startDate":"2024-06-18","endDate":"2024-06-18","description":"with Alice at noon"}"#,
        )
        .unwrap();
        assert_eq!(fields.description, "with Alice at noon");
    }

    #[test]
    fn test_parse_fenced_response() {
        let response = "Here you go:\n```json\n{\"title\":\"Trip\",\"startDate\":\"2024-06-10\",\"endDate\":\"2024-06-12\"}\n```";
        let fields = parse_extraction(response).unwrap();
        assert_eq!(fields.title, "Trip");
        assert_eq!(fields.end_date, date(2024, 6, 12));
    }

    #[test]
    fn test_missing_start_date_is_incomplete() {
        let err = parse_extraction(r#"{"title":"Dentist","endDate":"2024-07-01"}"#).unwrap_err();
        assert_eq!(
            err,
            RelayError::Incomplete {
                missing: vec!["startDate".to_string()]
            }
        );
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_empty_fields_are_incomplete() {
        let err =
            parse_extraction(r#"{"title":"  ","startDate":"","endDate":null}"#).unwrap_err();
        assert_eq!(
            err,
            RelayError::Incomplete {
                missing: vec![
                    "title".to_string(),
                    "startDate".to_string(),
                    "endDate".to_string()
                ]
            }
        );
    }

    #[test]
    fn test_malformed_responses() {
        assert!(matches!(
            parse_extraction("I could not find an event."),
            Err(RelayError::Malformed(_))
        ));
        assert!(matches!(
            parse_extraction(r#"["title"]"#),
            Err(RelayError::Malformed(_))
        ));
        assert!(matches!(
            parse_extraction(r#"{"title":"Trip","startDate":"next week","endDate":"2024-06-12"}"#),
            Err(RelayError::Malformed(_))
        ));
        assert!(matches!(
            parse_extraction(r#"{"title":42,"startDate":"2024-06-10","endDate":"2024-06-12"}"#),
            Err(RelayError::Malformed(_))
        ));
    }

    #[test]
    fn test_end_before_start_is_rejected() {
        assert!(matches!(
            parse_extraction(r#"{"title":"Trip","startDate":"2024-06-12","endDate":"2024-06-10"}"#),
            Err(RelayError::Malformed(_))
        ));
    }

    #[test]
    fn test_require_input() {
        assert_eq!(require_input("  lunch tomorrow \n"), Ok("lunch tomorrow"));
        assert_eq!(require_input(" \t "), Err(RelayError::MissingInput));
    }

    #[test]
    fn test_only_service_errors_are_retryable() {
        assert!(RelayError::Service("timeout".to_string()).is_retryable());
        assert!(!RelayError::MissingInput.is_retryable());
        assert!(!RelayError::Malformed("x".to_string()).is_retryable());
    }
}
