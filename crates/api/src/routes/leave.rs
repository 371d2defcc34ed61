//! Route definitions for the `/leave-requests` and `/leave-balance` resources.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::leave;
use crate::state::AppState;

/// Routes mounted at `/leave-requests`.
///
/// ```text
/// GET    /                -> list_leave_requests (hr, ?status&employee_id)
/// POST   /                -> create_leave_request (self)
/// GET    /mine            -> my_leave_requests
/// POST   /{id}/approve    -> approve_leave_request (hr)
/// POST   /{id}/reject     -> reject_leave_request (hr)
/// POST   /{id}/cancel     -> cancel_leave_request (owner)
/// ```
pub fn requests_router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(leave::list_leave_requests).post(leave::create_leave_request),
        )
        .route("/mine", get(leave::my_leave_requests))
        .route("/{id}/approve", post(leave::approve_leave_request))
        .route("/{id}/reject", post(leave::reject_leave_request))
        .route("/{id}/cancel", post(leave::cancel_leave_request))
}

/// Routes mounted at `/leave-balance`.
///
/// ```text
/// GET    /me              -> my_leave_balance (?year)
/// ```
pub fn balance_router() -> Router<AppState> {
    Router::new().route("/me", get(leave::my_leave_balance))
}
