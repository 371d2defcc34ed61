//! Route definitions for the `/employees` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::employee;
use crate::state::AppState;

/// Routes mounted at `/employees`. HR only.
///
/// ```text
/// GET    /        -> list_employees
/// POST   /        -> create_employee
/// GET    /{id}    -> get_employee
/// PUT    /{id}    -> update_employee
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(employee::list_employees).post(employee::create_employee),
        )
        .route(
            "/{id}",
            get(employee::get_employee).put(employee::update_employee),
        )
}
