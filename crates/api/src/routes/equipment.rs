//! Route definitions for the `/equipment` and `/equipment-loans` resources.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::equipment;
use crate::state::AppState;

/// Routes mounted at `/equipment`.
///
/// ```text
/// GET    /        -> list_equipment
/// POST   /        -> create_equipment (inventory)
/// GET    /{id}    -> get_equipment
/// PUT    /{id}    -> update_equipment (inventory)
/// ```
pub fn equipment_router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(equipment::list_equipment).post(equipment::create_equipment),
        )
        .route(
            "/{id}",
            get(equipment::get_equipment).put(equipment::update_equipment),
        )
}

/// Routes mounted at `/equipment-loans`.
///
/// ```text
/// GET    /                -> list_loans (?status)
/// POST   /                -> create_loan
/// GET    /mine            -> my_loans
/// GET    /overdue         -> overdue_loans (inventory)
/// POST   /{id}/approve    -> approve_loan (inventory)
/// POST   /{id}/reject     -> reject_loan (inventory)
/// POST   /{id}/return     -> return_loan (inventory)
/// POST   /{id}/cancel     -> cancel_loan (borrower)
/// ```
pub fn loans_router() -> Router<AppState> {
    Router::new()
        .route("/", get(equipment::list_loans).post(equipment::create_loan))
        .route("/mine", get(equipment::my_loans))
        .route("/overdue", get(equipment::overdue_loans))
        .route("/{id}/approve", post(equipment::approve_loan))
        .route("/{id}/reject", post(equipment::reject_loan))
        .route("/{id}/return", post(equipment::return_loan))
        .route("/{id}/cancel", post(equipment::cancel_loan))
}
