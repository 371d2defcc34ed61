//! Request handlers, one module per resource.

pub mod admin;
pub mod attendance;
pub mod auth;
pub mod biometric;
pub mod employee;
pub mod episode;
pub mod equipment;
pub mod holiday;
pub mod leave;
pub mod notification;
pub mod program;
pub mod work_item;
