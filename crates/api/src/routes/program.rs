//! Route definitions for the `/programs` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::program;
use crate::state::AppState;

/// Routes mounted at `/programs`.
///
/// ```text
/// GET    /                -> list_programs
/// POST   /                -> create_program (producer)
/// GET    /{id}            -> get_program
/// PUT    /{id}            -> update_program (producer)
/// GET    /{id}/episodes   -> list_episodes
/// POST   /{id}/episodes   -> create_episode (producer, starts the pipeline)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(program::list_programs).post(program::create_program))
        .route(
            "/{id}",
            get(program::get_program).put(program::update_program),
        )
        .route(
            "/{id}/episodes",
            get(program::list_episodes).post(program::create_episode),
        )
}
