//! Studio background worker.
//!
//! Pulls punches from the biometric machines and runs the periodic
//! housekeeping jobs. The API reuses [`jobs::attendance_sync::sync_machine`]
//! for manual syncs.

pub mod cli;
pub mod config;
pub mod device;
pub mod jobs;
pub mod scheduler;
