//! Route definitions for the `/attendance` resource.

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::attendance;
use crate::state::AppState;

/// Routes mounted at `/attendance`.
///
/// ```text
/// POST   /check-in    -> check_in (self)
/// POST   /check-out   -> check_out (self)
/// GET    /me          -> my_attendance (?from&to)
/// GET    /summary     -> attendance_summary (?employee_id&year&month)
/// GET    /            -> list_attendance (hr, ?employee_id&from&to)
/// PUT    /{id}        -> correct_attendance (hr)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(attendance::list_attendance))
        .route("/check-in", post(attendance::check_in))
        .route("/check-out", post(attendance::check_out))
        .route("/me", get(attendance::my_attendance))
        .route("/summary", get(attendance::attendance_summary))
        .route("/{id}", put(attendance::correct_attendance))
}
