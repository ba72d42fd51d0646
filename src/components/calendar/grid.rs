use super::matcher::{matches, overlaps};
use super::models::Event;
use crate::error::{config_error, Error};
use crate::utils::time::YearMonth;
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Which weekday occupies the first grid column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeekStart {
    #[default]
    Sunday,
    Monday,
}

impl WeekStart {
    /// Column index (0-based) of a date's weekday
    pub fn column_of(&self, date: NaiveDate) -> u32 {
        match self {
            WeekStart::Sunday => date.weekday().num_days_from_sunday(),
            WeekStart::Monday => date.weekday().num_days_from_monday(),
        }
    }
}

impl FromStr for WeekStart {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sunday" | "sun" => Ok(WeekStart::Sunday),
            "monday" | "mon" => Ok(WeekStart::Monday),
            other => Err(config_error(&format!("Unknown week start: {}", other))),
        }
    }
}

/// Layout options for the month grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GridOptions {
    /// Pad the final week with blanks so the grid is a whole number of weeks
    pub pad_trailing_week: bool,
    /// First day of the week
    pub week_start: WeekStart,
}

/// A day bound to a date, with the events that cover it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayCell {
    pub day: u32,
    pub date: NaiveDate,
    pub is_today: bool,
    pub events: Vec<Event>,
}

/// One position in the month grid
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Cell {
    Blank,
    Day(DayCell),
}

impl Cell {
    pub fn as_day(&self) -> Option<&DayCell> {
        match self {
            Cell::Day(day) => Some(day),
            Cell::Blank => None,
        }
    }

    pub fn is_blank(&self) -> bool {
        matches!(self, Cell::Blank)
    }
}

/// A rendered month ready for display
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthView {
    pub year: i32,
    pub month: u32,
    pub label: String,
    pub cells: Vec<Cell>,
}

impl MonthView {
    pub fn new(month: YearMonth, cells: Vec<Cell>) -> Self {
        Self {
            year: month.year(),
            month: month.month(),
            label: month.label(),
            cells,
        }
    }
}

/// Build the ordered cells of a month: leading blanks, one cell per day, optional trailing blanks
pub fn build_month(
    month: YearMonth,
    today: NaiveDate,
    events: &[Event],
    options: &GridOptions,
) -> Vec<Cell> {
    let first = month.first_day();
    let last = month.last_day();
    let leading = options.week_start.column_of(first) as usize;
    let days = month.days_in_month();

    // Only events touching this month can land in a cell
    let in_month: Vec<&Event> = events
        .iter()
        .filter(|event| overlaps(first, last, event))
        .collect();

    let mut cells = Vec::with_capacity(leading + days as usize + 6);
    cells.resize(leading, Cell::Blank);

    for (day, date) in (1..=days).filter_map(|day| month.day(day).map(|date| (day, date))) {
        let events = in_month
            .iter()
            .filter(|event| matches(date, event))
            .map(|event| (*event).clone())
            .collect();

        cells.push(Cell::Day(DayCell {
            day,
            date,
            is_today: date == today,
            events,
        }));
    }

    if options.pad_trailing_week {
        let trailing = (7 - cells.len() % 7) % 7;
        cells.resize(cells.len() + trailing, Cell::Blank);
    }

    cells
}
