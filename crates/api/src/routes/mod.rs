pub mod admin;
pub mod attendance;
pub mod auth;
pub mod biometric;
pub mod employee;
pub mod episode;
pub mod equipment;
pub mod health;
pub mod holiday;
pub mod leave;
pub mod notification;
pub mod program;
pub mod work_item;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/login | /auth/refresh | /auth/logout | /auth/me
///
/// /admin/users                             list, create (admin only)
/// /admin/users/{id}                        get, update, deactivate
/// /admin/users/{id}/reset-password         reset password
/// /admin/roles                             list roles
///
/// /programs                                list, create (producer)
/// /programs/{id}                           get, update
/// /programs/{id}/episodes                  list, create (starts the pipeline)
///
/// /episodes/{id}                           get with work items
/// /episodes/{id}/cancel                    cancel (producer)
/// /episodes/{id}/activity                  event log
///
/// /work-items                              list (?department&status&episode_id&mine)
/// /work-items/{id}                         get
/// /work-items/{id}/details                 merge details (PATCH)
/// /work-items/{id}/{action}                accept, submit, approve, reject,
///                                          complete, resume
/// /work-items/{id}/reviews                 review history
///
/// /notifications                           list
/// /notifications/unread-count              count
/// /notifications/read-all                  mark all read
/// /notifications/{id}/read                 mark one read
///
/// /equipment                               list, create (inventory)
/// /equipment/{id}                          get, update
/// /equipment-loans                         list, request
/// /equipment-loans/mine                    own loans
/// /equipment-loans/{id}/{action}           approve, reject, return, cancel
///
/// /employees                               list, create (hr)
/// /employees/{id}                          get, update
/// /holidays                                list, create (hr)
/// /holidays/{id}                           delete (hr)
///
/// /attendance/check-in | /check-out        self service
/// /attendance/me                           own records
/// /attendance/summary                      monthly summary
/// /attendance                              list (hr)
/// /attendance/{id}                         correct (hr)
///
/// /leave-requests                          list (hr), request (self)
/// /leave-requests/mine                     own requests
/// /leave-requests/{id}/{action}            approve, reject (hr), cancel (owner)
/// /leave-balance/me                        own annual balance
///
/// /biometric/machines                      list, register (hr)
/// /biometric/machines/{id}                 update
/// /biometric/machines/{id}/sync            manual sync
/// /biometric/machines/{id}/logs            raw punches
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/admin", admin::router())
        // Production pipeline.
        .nest("/programs", program::router())
        .nest("/episodes", episode::router())
        .nest("/work-items", work_item::router())
        .nest("/notifications", notification::router())
        // Inventory.
        .nest("/equipment", equipment::equipment_router())
        .nest("/equipment-loans", equipment::loans_router())
        // HR.
        .nest("/employees", employee::router())
        .nest("/holidays", holiday::router())
        .nest("/attendance", attendance::router())
        .nest("/leave-requests", leave::requests_router())
        .nest("/leave-balance", leave::balance_router())
        .nest("/biometric", biometric::router())
}
