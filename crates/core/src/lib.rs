//! Pure domain rules for the studio operations platform.
//!
//! Nothing in this crate performs I/O: the database, HTTP and worker layers
//! call into these modules to decide what a state change means before they
//! persist it.

mod macros;

pub mod attendance;
pub mod calendar;
pub mod department;
pub mod employee;
pub mod equipment;
pub mod error;
pub mod leave;
pub mod notification;
pub mod roles;
pub mod types;
pub mod work_details;
pub mod workflow;
