use crate::utils::time::format_date;
use chrono::{Datelike, NaiveDate};
use serde_json::{json, Value};

/// Field names the model must fill in
pub const REQUIRED_FIELDS: [&str; 3] = ["title", "startDate", "endDate"];

const SYSTEM_PROMPT_TEMPLATE: &str = "You turn a user's free-text description of a plan or appointment into a single calendar entry.

Today's date is {today} ({weekday}). Resolve every relative expression (\"tomorrow\", \"next Tuesday\", \"in two weeks\", \"this weekend\") against today's date.

Rules:
1.  \"title\": a short display title for the event, in the same language the user wrote in. Leave out dates and times.
2.  \"startDate\" and \"endDate\": calendar dates in YYYY-MM-DD format. Use the same date for both when the event lasts a single day. \"endDate\" is never before \"startDate\".
3.  If the year is omitted, use the next occurrence of that date on or after today.
4.  If no date is given at all, use today's date.
5.  \"description\": any remaining details from the message (people, place, times of day, notes). Use an empty string if there are none.

Reply with the JSON object only.";

/// System instruction with today's date filled in
pub fn system_instruction(today: NaiveDate) -> String {
    SYSTEM_PROMPT_TEMPLATE
        .replace("{today}", &format_date(today))
        .replace("{weekday}", &today.weekday().to_string())
}

/// Response schema in the OpenAPI subset Gemini accepts for `responseSchema`
pub fn response_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "title": { "type": "STRING" },
            "startDate": { "type": "STRING", "description": "YYYY-MM-DD" },
            "endDate": { "type": "STRING", "description": "YYYY-MM-DD" },
            "description": { "type": "STRING" }
        },
        "required": REQUIRED_FIELDS,
        "propertyOrdering": ["title", "startDate", "endDate", "description"]
    })
}
