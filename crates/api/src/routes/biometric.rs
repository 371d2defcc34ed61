//! Route definitions for the `/biometric` resource.

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::biometric;
use crate::state::AppState;

/// Routes mounted at `/biometric`. HR only.
///
/// ```text
/// GET    /machines              -> list_machines
/// POST   /machines              -> create_machine
/// PUT    /machines/{id}         -> update_machine
/// POST   /machines/{id}/sync    -> sync_now
/// GET    /machines/{id}/logs    -> list_logs
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/machines",
            get(biometric::list_machines).post(biometric::create_machine),
        )
        .route("/machines/{id}", put(biometric::update_machine))
        .route("/machines/{id}/sync", post(biometric::sync_now))
        .route("/machines/{id}/logs", get(biometric::list_logs))
}
