use crate::components::calendar::models::{EventId, ValidationError};
use crate::components::prompt_relay::RelayError;
use miette::Diagnostic;
use thiserror::Error;

/// Main error type for the application
#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    #[error("Environment error: {0}")]
    #[diagnostic(
        code(promptcal::environment),
        help("set the variable in the environment or in a .env file")
    )]
    Environment(String),

    #[error("Configuration error: {0}")]
    #[diagnostic(code(promptcal::config))]
    Config(String),

    #[error("Storage error: {0}")]
    #[diagnostic(code(promptcal::storage))]
    Storage(String),

    #[error("Serialization error: {0}")]
    #[diagnostic(code(promptcal::serialization))]
    Serialization(String),

    #[error("Invalid event: {0}")]
    #[diagnostic(code(promptcal::validation))]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    #[diagnostic(code(promptcal::relay))]
    Relay(#[from] RelayError),

    #[error("An extraction is already in progress")]
    #[diagnostic(code(promptcal::busy))]
    Busy,

    #[error("Event {0} not found")]
    #[diagnostic(code(promptcal::not_found))]
    NotFound(EventId),

    #[error("Event {0} already exists")]
    #[diagnostic(code(promptcal::duplicate_id))]
    DuplicateId(EventId),

    #[error("Event id {0} leaves no room for further ids")]
    #[diagnostic(code(promptcal::id_out_of_range))]
    IdOutOfRange(EventId),

    #[error(transparent)]
    #[diagnostic(code(promptcal::io))]
    Io(#[from] std::io::Error),

    #[error("Other error: {0}")]
    #[diagnostic(code(promptcal::other))]
    Other(String),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Config(err.to_string())
    }
}

/// Type alias for Result with our Error type
pub type AppResult<T> = Result<T, Error>;

/// Helper to create environment errors
pub fn env_error(var: &str) -> Error {
    Error::Environment(format!("Missing environment variable: {}", var))
}

/// Helper to create configuration errors
pub fn config_error(message: &str) -> Error {
    Error::Config(message.to_string())
}

/// Helper to create storage errors
pub fn storage_error(message: &str) -> Error {
    Error::Storage(message.to_string())
}
