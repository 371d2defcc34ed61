//! Route definitions for the `/episodes` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::episode;
use crate::state::AppState;

/// Routes mounted at `/episodes`.
///
/// ```text
/// GET    /{id}            -> get_episode (with work items)
/// POST   /{id}/cancel     -> cancel_episode (producer)
/// GET    /{id}/activity   -> episode_activity
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{id}", get(episode::get_episode))
        .route("/{id}/cancel", post(episode::cancel_episode))
        .route("/{id}/activity", get(episode::episode_activity))
}
