use async_trait::async_trait;
use chrono::NaiveDate;
use promptcal::components::calendar::{Cell, EventFields, GridOptions, NewEvent, WeekStart};
use promptcal::components::event_store::InMemoryStorage;
use promptcal::components::prompt_relay::{Extractor, RelayError};
use promptcal::config::{Config, StorageConfig};
use promptcal::controller::CalendarController;
use promptcal::error::Error;
use promptcal::utils::time::YearMonth;
use std::collections::HashMap;
use std::sync::Arc;

/// Extractor that must never be reached
struct UnreachableExtractor;

#[async_trait]
impl Extractor for UnreachableExtractor {
    async fn extract(&self, _user_text: &str, _today: NaiveDate) -> Result<EventFields, RelayError> {
        Err(RelayError::Service("unexpected call".to_string()))
    }
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

async fn controller(today: NaiveDate) -> CalendarController {
    CalendarController::load(
        Arc::new(InMemoryStorage::new()),
        Arc::new(UnreachableExtractor),
        GridOptions::default(),
        today,
    )
    .await
}

/// Smoke test to verify that the config can be built from a minimal environment
#[test]
fn test_config_loads() {
    let vars: HashMap<&str, &str> = [
        ("GEMINI_API_KEY", "test_key"),
        ("STORAGE_BACKEND", "memory"),
        ("CALENDAR_CONFIG", "/nonexistent/calendar.toml"),
    ]
    .into_iter()
    .collect();

    let config = Config::from_lookup(|key| vars.get(key).map(|v| v.to_string())).unwrap();

    assert_eq!(config.gemini_api_key, "test_key");
    assert_eq!(config.storage, StorageConfig::Memory);
    assert_eq!(config.grid.week_start, WeekStart::Sunday);
}

/// Without a credential startup must stop
#[test]
fn test_config_requires_api_key() {
    let err = Config::from_lookup(|_| None).unwrap_err();
    assert!(matches!(err, Error::Environment(_)));
}

/// A fresh controller starts empty on the current month
#[tokio::test]
async fn test_controller_starts_on_current_month() {
    let today = date(2024, 6, 11);
    let controller = controller(today).await;

    assert!(controller.events().await.is_empty());
    assert!(!controller.is_busy());
    assert_eq!(
        controller.displayed_month().await,
        YearMonth::new(2024, 6).unwrap()
    );

    let view = controller.view(today).await;
    assert_eq!((view.year, view.month), (2024, 6));
    assert_eq!(view.label, "June 2024");

    // June 2024 starts on a Saturday
    assert_eq!(view.cells.iter().take_while(|c| c.is_blank()).count(), 6);
    let today_cells: Vec<_> = view
        .cells
        .iter()
        .filter_map(Cell::as_day)
        .filter(|d| d.is_today)
        .collect();
    assert_eq!(today_cells.len(), 1);
    assert_eq!(today_cells[0].day, 11);
}

/// Navigation wraps across year boundaries and returns to today
#[tokio::test]
async fn test_navigation() {
    let today = date(2024, 12, 20);
    let controller = controller(today).await;

    let next = controller.next_month(today).await;
    assert_eq!((next.year, next.month), (2025, 1));

    controller.prev_month(today).await;
    let prev = controller.prev_month(today).await;
    assert_eq!((prev.year, prev.month), (2024, 11));

    let shown = controller
        .show_month(YearMonth::new(2023, 2).unwrap(), today)
        .await;
    assert_eq!((shown.year, shown.month), (2023, 2));
    assert_eq!(controller.view(today).await, shown);

    let back = controller.show_today(today).await;
    assert_eq!((back.year, back.month), (2024, 12));
}

/// Viewing another month leaves the display where it was
#[tokio::test]
async fn test_view_month_does_not_navigate() {
    let today = date(2024, 6, 11);
    let controller = controller(today).await;

    let july = controller
        .view_month(YearMonth::new(2024, 7).unwrap(), today)
        .await;
    assert_eq!(july.month, 7);
    assert!(july
        .cells
        .iter()
        .filter_map(Cell::as_day)
        .all(|d| !d.is_today));
    assert_eq!(controller.displayed_month().await.month(), 6);
}

/// Manual entries show up in the rendered grid
#[tokio::test]
async fn test_manual_event_renders() {
    let today = date(2024, 6, 1);
    let controller = controller(today).await;

    let event = controller
        .create_event(NewEvent::from(EventFields::new(
            "Trip",
            date(2024, 6, 10),
            date(2024, 6, 12),
            "",
        )))
        .await
        .unwrap();

    let view = controller.view(today).await;
    let days_with_trip: Vec<u32> = view
        .cells
        .iter()
        .filter_map(Cell::as_day)
        .filter(|d| d.events.iter().any(|e| e.id == event.id))
        .map(|d| d.day)
        .collect();

    assert_eq!(days_with_trip, vec![10, 11, 12]);

    // Rendering twice gives the same cells
    assert_eq!(controller.view(today).await, view);
}

/// Empty prompts are rejected before the extractor runs
#[tokio::test]
async fn test_empty_prompt_is_rejected() {
    let today = date(2024, 6, 11);
    let controller = controller(today).await;

    let err = controller.submit_prompt("   ", today).await.unwrap_err();
    assert!(matches!(err, Error::Relay(RelayError::MissingInput)));
    assert!(!controller.is_busy());
    assert!(controller.events().await.is_empty());
}
