//! Route definitions for the `/holidays` resource.

use axum::routing::{delete, get};
use axum::Router;

use crate::handlers::holiday;
use crate::state::AppState;

/// Routes mounted at `/holidays`.
///
/// ```text
/// GET    /        -> list_holidays (?year)
/// POST   /        -> create_holiday (hr)
/// DELETE /{id}    -> delete_holiday (hr)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(holiday::list_holidays).post(holiday::create_holiday),
        )
        .route("/{id}", delete(holiday::delete_holiday))
}
