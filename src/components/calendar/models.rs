use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Identifier of a stored event
pub type EventId = u64;

/// A calendar entry with a title and an inclusive date range
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: EventId,
    pub title: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default)]
    pub description: String,
}

impl Event {
    /// Attach an id to validated fields
    pub fn from_fields(id: EventId, fields: EventFields) -> Self {
        Self {
            id,
            title: fields.title,
            start_date: fields.start_date,
            end_date: fields.end_date,
            description: fields.description,
        }
    }

    /// The id-less part of the event
    pub fn fields(&self) -> EventFields {
        EventFields {
            title: self.title.clone(),
            start_date: self.start_date,
            end_date: self.end_date,
            description: self.description.clone(),
        }
    }

    /// Check the record invariants
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_parts(&self.title, self.start_date, self.end_date)
    }
}

/// Every field of an event except its id; updates replace all of them at once
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventFields {
    pub title: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default)]
    pub description: String,
}

impl EventFields {
    pub fn new(
        title: impl Into<String>,
        start_date: NaiveDate,
        end_date: NaiveDate,
        description: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            start_date,
            end_date,
            description: description.into(),
        }
    }

    /// Reject an empty title or an end date before the start date
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_parts(&self.title, self.start_date, self.end_date)
    }
}

/// Input for creating an event; the store assigns an id when none is given
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewEvent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<EventId>,
    #[serde(flatten)]
    pub fields: EventFields,
}

impl From<EventFields> for NewEvent {
    fn from(fields: EventFields) -> Self {
        Self { id: None, fields }
    }
}

/// Ways an event can break its invariants
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("title must not be empty")]
    EmptyTitle,

    #[error("end date {end} is before start date {start}")]
    EndBeforeStart { start: NaiveDate, end: NaiveDate },
}

fn validate_parts(title: &str, start: NaiveDate, end: NaiveDate) -> Result<(), ValidationError> {
    if title.trim().is_empty() {
        return Err(ValidationError::EmptyTitle);
    }
    if end < start {
        return Err(ValidationError::EndBeforeStart { start, end });
    }
    Ok(())
}
