mod redis_storage;
pub mod storage;

pub use redis_storage::RedisStorage;
pub use storage::{EventStorage, FileStorage, InMemoryStorage};

use crate::components::calendar::models::{Event, EventFields, EventId, NewEvent};
use crate::error::{AppResult, Error};
use serde_json::Value;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{info, warn};

/// Ordered collection of events mirrored wholesale to durable storage on every mutation.
///
/// Not safe for concurrent writers on its own; callers serialize access.
pub struct EventStore {
    storage: Arc<dyn EventStorage>,
    events: Vec<Event>,
    next_id: EventId,
}

impl EventStore {
    /// Load the collection from storage, falling back to an empty one if it is unavailable or corrupt
    pub async fn load(storage: Arc<dyn EventStorage>) -> Self {
        let events = match storage.load().await {
            Ok(Some(raw)) => decode_snapshot(&raw),
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!(
                    "Failed to load events from {} storage, starting empty: {}",
                    storage.name(),
                    e
                );
                Vec::new()
            }
        };

        info!("Loaded {} events from {} storage", events.len(), storage.name());

        let next_id = next_id_after(&events);
        Self {
            storage,
            events,
            next_id,
        }
    }

    /// All events in insertion order
    pub fn list(&self) -> &[Event] {
        &self.events
    }

    pub fn get(&self, id: EventId) -> Option<&Event> {
        self.events.iter().find(|e| e.id == id)
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Append a new event, assigning a fresh id when none is given.
    ///
    /// `EventId::MAX` is never accepted, explicit or generated.
    pub async fn add(&mut self, new_event: NewEvent) -> AppResult<Event> {
        new_event.fields.validate()?;

        let id = match new_event.id {
            Some(id) if self.get(id).is_some() => return Err(Error::DuplicateId(id)),
            Some(id) => id,
            None => self.next_id,
        };

        // The counter must stay above every id, so the last id is never handed out
        let after = id.checked_add(1).ok_or(Error::IdOutOfRange(id))?;

        let event = Event::from_fields(id, new_event.fields);
        let mut events = self.events.clone();
        events.push(event.clone());
        self.commit(events).await?;

        self.next_id = self.next_id.max(after);
        info!("Added event {} ({})", event.id, event.title);
        Ok(event)
    }

    /// Replace every field of the event with `id`; None if there is no such event
    pub async fn update(&mut self, id: EventId, fields: EventFields) -> AppResult<Option<Event>> {
        fields.validate()?;

        let Some(index) = self.events.iter().position(|e| e.id == id) else {
            return Ok(None);
        };

        let event = Event::from_fields(id, fields);
        let mut events = self.events.clone();
        events[index] = event.clone();
        self.commit(events).await?;

        info!("Updated event {}", id);
        Ok(Some(event))
    }

    /// Delete the event with `id`; None if there is no such event
    pub async fn remove(&mut self, id: EventId) -> AppResult<Option<Event>> {
        let Some(index) = self.events.iter().position(|e| e.id == id) else {
            return Ok(None);
        };

        let mut events = self.events.clone();
        let removed = events.remove(index);
        self.commit(events).await?;

        info!("Removed event {}", id);
        Ok(Some(removed))
    }

    /// Persist the full collection, then make it current
    async fn commit(&mut self, events: Vec<Event>) -> AppResult<()> {
        let snapshot = serde_json::to_string(&events)?;
        self.storage.save(&snapshot).await?;
        self.events = events;
        Ok(())
    }
}

/// Decode a stored snapshot, dropping records that no longer satisfy the event invariants
fn decode_snapshot(raw: &str) -> Vec<Event> {
    let records: Vec<Value> = match serde_json::from_str(raw) {
        Ok(records) => records,
        Err(e) => {
            warn!("Stored events are not a JSON array, starting empty: {}", e);
            return Vec::new();
        }
    };

    let mut seen = HashSet::new();
    let mut events = Vec::with_capacity(records.len());

    for (index, record) in records.into_iter().enumerate() {
        let event: Event = match serde_json::from_value(record) {
            Ok(event) => event,
            Err(e) => {
                warn!("Skipping stored event #{}: {}", index, e);
                continue;
            }
        };

        if let Err(e) = event.validate() {
            warn!("Skipping stored event {}: {}", event.id, e);
            continue;
        }

        if !seen.insert(event.id) {
            warn!("Skipping stored event with duplicate id {}", event.id);
            continue;
        }

        events.push(event);
    }

    events
}

fn next_id_after(events: &[Event]) -> EventId {
    events
        .iter()
        .map(|e| e.id.saturating_add(1))
        .max()
        .unwrap_or(1)
        .max(1)
}
