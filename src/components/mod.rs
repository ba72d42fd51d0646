pub mod calendar;
pub mod event_store;
pub mod prompt_relay;
