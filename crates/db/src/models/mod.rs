//! Row structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - `Deserialize` create / update DTOs where the entity is user-editable
//!
//! Status columns are plain `String`s here; the `studio_core` enums give
//! them meaning.

pub mod attendance;
pub mod biometric;
pub mod employee;
pub mod episode;
pub mod equipment;
pub mod event;
pub mod holiday;
pub mod leave;
pub mod notification;
pub mod program;
pub mod role;
pub mod session;
pub mod user;
pub mod work_item;
