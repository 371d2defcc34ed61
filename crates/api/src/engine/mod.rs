//! Transactional domain operations shared by several handlers.
//!
//! - [`pipeline`] -- episode creation/cancellation and every work item
//!   action, including department handoffs.
//! - [`notify`] -- helpers turning notification content into rows.

pub mod notify;
pub mod pipeline;
