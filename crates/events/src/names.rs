//! Event type names. Workflow events are sourced on the episode so its
//! activity log reads as a single timeline.

pub const EPISODE_CREATED: &str = "episode.created";
pub const EPISODE_CANCELLED: &str = "episode.cancelled";

pub const WORK_ACCEPTED: &str = "work.accepted";
pub const WORK_SUBMITTED: &str = "work.submitted";
pub const WORK_APPROVED: &str = "work.approved";
pub const WORK_REJECTED: &str = "work.rejected";
pub const WORK_COMPLETED: &str = "work.completed";
pub const WORK_REOPENED: &str = "work.reopened";
pub const WORK_RESUMED: &str = "work.resumed";
pub const WORK_CANCELLED: &str = "work.cancelled";

pub const LOAN_APPROVED: &str = "loan.approved";
pub const LOAN_RETURNED: &str = "loan.returned";

pub const LEAVE_APPROVED: &str = "leave.approved";

/// Source entity kinds.
pub const ENTITY_EPISODE: &str = "episode";
pub const ENTITY_EQUIPMENT_LOAN: &str = "equipment_loan";
pub const ENTITY_LEAVE_REQUEST: &str = "leave_request";
