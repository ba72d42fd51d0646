use crate::components::calendar::grid::{build_month, GridOptions, MonthView};
use crate::components::calendar::models::{Event, EventFields, EventId, NewEvent};
use crate::components::event_store::{EventStorage, EventStore};
use crate::components::prompt_relay::{require_input, Extractor};
use crate::error::{AppResult, Error};
use crate::utils::time::YearMonth;
use chrono::NaiveDate;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};

/// Clears the busy flag when dropped, on success and failure alike
struct BusyGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> BusyGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> AppResult<Self> {
        if flag.swap(true, Ordering::SeqCst) {
            return Err(Error::Busy);
        }
        Ok(Self { flag })
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}

/// Owns the calendar state: the event store, the displayed month and the extraction busy flag
pub struct CalendarController {
    store: RwLock<EventStore>,
    displayed: RwLock<YearMonth>,
    extractor: Arc<dyn Extractor>,
    options: GridOptions,
    busy: AtomicBool,
}

impl CalendarController {
    /// Load the store and start on the month containing `today`
    pub async fn load(
        storage: Arc<dyn EventStorage>,
        extractor: Arc<dyn Extractor>,
        options: GridOptions,
        today: NaiveDate,
    ) -> Self {
        let store = EventStore::load(storage).await;
        Self {
            store: RwLock::new(store),
            displayed: RwLock::new(YearMonth::containing(today)),
            extractor,
            options,
            busy: AtomicBool::new(false),
        }
    }

    pub fn options(&self) -> &GridOptions {
        &self.options
    }

    /// True while an extraction is in flight
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::SeqCst)
    }

    /// Run the relay without storing anything
    pub async fn extract(&self, user_text: &str, today: NaiveDate) -> AppResult<EventFields> {
        let text = require_input(user_text)?;
        let _guard = BusyGuard::acquire(&self.busy)?;

        match self.extractor.extract(text, today).await {
            Ok(fields) => Ok(fields),
            Err(e) => {
                warn!("Extraction failed (retryable: {}): {}", e.is_retryable(), e);
                Err(e.into())
            }
        }
    }

    /// Extract an event from free text and add it to the store
    pub async fn submit_prompt(&self, user_text: &str, today: NaiveDate) -> AppResult<Event> {
        let text = require_input(user_text)?;
        let _guard = BusyGuard::acquire(&self.busy)?;

        let fields = match self.extractor.extract(text, today).await {
            Ok(fields) => fields,
            Err(e) => {
                warn!("Extraction failed (retryable: {}): {}", e.is_retryable(), e);
                return Err(e.into());
            }
        };

        let event = self.store.write().await.add(fields.into()).await?;
        info!("Created event {} from prompt", event.id);
        Ok(event)
    }

    /// Snapshot of all events in insertion order
    pub async fn events(&self) -> Vec<Event> {
        self.store.read().await.list().to_vec()
    }

    pub async fn event(&self, id: EventId) -> Option<Event> {
        self.store.read().await.get(id).cloned()
    }

    /// Add an event entered by hand
    pub async fn create_event(&self, new_event: NewEvent) -> AppResult<Event> {
        self.store.write().await.add(new_event).await
    }

    /// Replace an event's fields; NotFound if it does not exist
    pub async fn update_event(&self, id: EventId, fields: EventFields) -> AppResult<Event> {
        self.store
            .write()
            .await
            .update(id, fields)
            .await?
            .ok_or(Error::NotFound(id))
    }

    /// Delete an event; NotFound if it does not exist
    pub async fn delete_event(&self, id: EventId) -> AppResult<Event> {
        self.store
            .write()
            .await
            .remove(id)
            .await?
            .ok_or(Error::NotFound(id))
    }

    pub async fn displayed_month(&self) -> YearMonth {
        *self.displayed.read().await
    }

    /// Render the displayed month
    pub async fn view(&self, today: NaiveDate) -> MonthView {
        let month = self.displayed_month().await;
        self.view_month(month, today).await
    }

    /// Render any month without changing the displayed one
    pub async fn view_month(&self, month: YearMonth, today: NaiveDate) -> MonthView {
        let store = self.store.read().await;
        let cells = build_month(month, today, store.list(), &self.options);
        MonthView::new(month, cells)
    }

    pub async fn next_month(&self, today: NaiveDate) -> MonthView {
        let month = {
            let mut displayed = self.displayed.write().await;
            *displayed = displayed.next();
            *displayed
        };
        self.view_month(month, today).await
    }

    pub async fn prev_month(&self, today: NaiveDate) -> MonthView {
        let month = {
            let mut displayed = self.displayed.write().await;
            *displayed = displayed.prev();
            *displayed
        };
        self.view_month(month, today).await
    }

    pub async fn show_month(&self, month: YearMonth, today: NaiveDate) -> MonthView {
        *self.displayed.write().await = month;
        self.view_month(month, today).await
    }

    /// Jump back to the month containing `today`
    pub async fn show_today(&self, today: NaiveDate) -> MonthView {
        self.show_month(YearMonth::containing(today), today).await
    }
}
