pub mod grid;
pub mod matcher;
pub mod models;

pub use grid::{build_month, Cell, DayCell, GridOptions, MonthView, WeekStart};
pub use matcher::matches;
pub use models::{Event, EventFields, EventId, NewEvent, ValidationError};
