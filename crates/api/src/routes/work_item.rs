//! Route definitions for the `/work-items` resource.

use axum::routing::{get, patch, post};
use axum::Router;

use crate::handlers::work_item;
use crate::state::AppState;

/// Routes mounted at `/work-items`.
///
/// ```text
/// GET    /                 -> list_work_items (?department&status&episode_id&mine)
/// GET    /{id}             -> get_work_item
/// PATCH  /{id}/details     -> update_details
/// POST   /{id}/accept      -> accept
/// POST   /{id}/submit      -> submit
/// POST   /{id}/approve     -> approve
/// POST   /{id}/reject      -> reject
/// POST   /{id}/complete    -> complete
/// POST   /{id}/resume      -> resume
/// GET    /{id}/reviews     -> list_reviews
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(work_item::list_work_items))
        .route("/{id}", get(work_item::get_work_item))
        .route("/{id}/details", patch(work_item::update_details))
        .route("/{id}/accept", post(work_item::accept))
        .route("/{id}/submit", post(work_item::submit))
        .route("/{id}/approve", post(work_item::approve))
        .route("/{id}/reject", post(work_item::reject))
        .route("/{id}/complete", post(work_item::complete))
        .route("/{id}/resume", post(work_item::resume))
        .route("/{id}/reviews", get(work_item::list_reviews))
}
