//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async query methods.
//! Reads take `&PgPool`; writes that must share a transaction take
//! `&mut PgConnection` (pass `&mut *tx`).

pub mod attendance_repo;
pub mod biometric_repo;
pub mod employee_repo;
pub mod episode_repo;
pub mod equipment_repo;
pub mod event_repo;
pub mod holiday_repo;
pub mod leave_repo;
pub mod notification_repo;
pub mod program_repo;
pub mod role_repo;
pub mod session_repo;
pub mod user_repo;
pub mod work_item_repo;

pub use attendance_repo::AttendanceRepo;
pub use biometric_repo::{AttendanceLogRepo, BiometricMachineRepo};
pub use employee_repo::EmployeeRepo;
pub use episode_repo::EpisodeRepo;
pub use equipment_repo::{EquipmentLoanRepo, EquipmentRepo};
pub use event_repo::EventRepo;
pub use holiday_repo::HolidayRepo;
pub use leave_repo::LeaveRepo;
pub use notification_repo::NotificationRepo;
pub use program_repo::ProgramRepo;
pub use role_repo::RoleRepo;
pub use session_repo::SessionRepo;
pub use user_repo::UserRepo;
pub use work_item_repo::{WorkItemRepo, WorkReviewRepo};
