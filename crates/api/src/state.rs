use std::sync::Arc;

use studio_events::EventBus;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    pub pool: studio_db::DbPool,
    pub config: Arc<ServerConfig>,
    /// Domain events are published here after their transaction commits.
    pub event_bus: Arc<EventBus>,
}
