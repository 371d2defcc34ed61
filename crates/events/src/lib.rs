//! Studio domain events.
//!
//! - [`EventBus`]: in-process publish/subscribe hub backed by
//!   `tokio::sync::broadcast`.
//! - [`PlatformEvent`]: the event envelope published after a state change
//!   commits.
//! - [`EventPersistence`]: background task that writes every event to the
//!   `events` table, which backs the episode activity log.

pub mod bus;
pub mod names;
pub mod persistence;

pub use bus::{EventBus, PlatformEvent};
pub use persistence::EventPersistence;
