pub mod handlers;

use axum::{
    routing::{get, post},
    Router,
};
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};
use tracing::info;

use crate::controller::CalendarController;
use handlers::{
    calendar_handler, create_event_handler, delete_event_handler, get_event_handler,
    health_handler, list_events_handler, month_handler, next_month_handler, prev_month_handler,
    prompt_event_handler, schedule_handler, today_handler, update_event_handler,
};

#[derive(Clone)]
pub struct AppState {
    /// Shared calendar state
    pub controller: Arc<CalendarController>,
}

impl AppState {
    pub fn new(controller: Arc<CalendarController>) -> Self {
        Self { controller }
    }
}

/// Build the HTTP router, serving front-end files from `static_dir` for any other path
pub fn router(state: AppState, static_dir: Option<PathBuf>) -> Router {
    let api = Router::new()
        .route("/health", get(health_handler))
        .route("/api/schedule", post(schedule_handler))
        .route("/api/generate", post(schedule_handler))
        .route("/api/events/prompt", post(prompt_event_handler))
        .route(
            "/api/events",
            get(list_events_handler).post(create_event_handler),
        )
        .route(
            "/api/events/{id}",
            get(get_event_handler)
                .put(update_event_handler)
                .delete(delete_event_handler),
        )
        .route("/api/calendar", get(calendar_handler))
        .route("/api/calendar/{year}/{month}", get(month_handler))
        .route("/api/calendar/next", post(next_month_handler))
        .route("/api/calendar/prev", post(prev_month_handler))
        .route("/api/calendar/today", post(today_handler));

    let app = match static_dir {
        Some(dir) => {
            info!("Serving static files from {}", dir.display());
            api.fallback_service(ServeDir::new(dir))
        }
        None => api,
    };

    app.layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
