//! Leave request rules: types, status machine, date range and quota checks.

use chrono::NaiveDate;

use crate::define_str_enum;
use crate::error::CoreError;

/// Annual leave days granted to a new employee per calendar year.
pub const DEFAULT_ANNUAL_QUOTA: i32 = 12;

/// Longest single leave request, in calendar days.
pub const MAX_LEAVE_SPAN_DAYS: i64 = 90;

/// How far in the past a leave request may start (e.g. sick leave filed late).
pub const MAX_BACKDATE_DAYS: i64 = 7;

define_str_enum! {
    LeaveType {
        Annual = "annual",
        Sick = "sick",
        Maternity = "maternity",
        Marriage = "marriage",
        Bereavement = "bereavement",
        Unpaid = "unpaid",
    }
}

impl LeaveType {
    /// Only annual leave is deducted from the yearly quota.
    pub fn counts_against_quota(self) -> bool {
        self == LeaveType::Annual
    }
}

define_str_enum! {
    LeaveStatus {
        Pending = "pending",
        Approved = "approved",
        Rejected = "rejected",
        Cancelled = "cancelled",
        Expired = "expired",
    }
}

define_str_enum! {
    LeaveAction {
        Approve = "approve",
        Reject = "reject",
        Cancel = "cancel",
        Expire = "expire",
    }
}

/// Every leave action is only legal on a pending request.
pub fn leave_transition(from: LeaveStatus, action: LeaveAction) -> Result<LeaveStatus, CoreError> {
    if from != LeaveStatus::Pending {
        return Err(CoreError::invalid_transition(
            "leave request",
            from.as_str(),
            action.as_str(),
        ));
    }
    Ok(match action {
        LeaveAction::Approve => LeaveStatus::Approved,
        LeaveAction::Reject => LeaveStatus::Rejected,
        LeaveAction::Cancel => LeaveStatus::Cancelled,
        LeaveAction::Expire => LeaveStatus::Expired,
    })
}

/// Validate the requested date range relative to `today`.
pub fn validate_leave_range(
    start: NaiveDate,
    end: NaiveDate,
    today: NaiveDate,
) -> Result<(), CoreError> {
    if end < start {
        return Err(CoreError::Validation(format!(
            "Leave end date {end} is before start date {start}"
        )));
    }
    if (today - start).num_days() > MAX_BACKDATE_DAYS {
        return Err(CoreError::Validation(format!(
            "Leave cannot start more than {MAX_BACKDATE_DAYS} days in the past"
        )));
    }
    if (end - start).num_days() + 1 > MAX_LEAVE_SPAN_DAYS {
        return Err(CoreError::Validation(format!(
            "A single leave request cannot span more than {MAX_LEAVE_SPAN_DAYS} days"
        )));
    }
    Ok(())
}

/// Ensure `requested` days fit in the remaining quota.
///
/// Returns the days left after the request.
pub fn check_quota(quota: i32, used: i32, requested: i32) -> Result<i32, CoreError> {
    let remaining = quota - used;
    if requested > remaining {
        return Err(CoreError::Conflict(format!(
            "Insufficient annual leave: {remaining} day(s) remaining, {requested} requested"
        )));
    }
    Ok(remaining - requested)
}

/// Whether a pending request has gone unreviewed for too long.
///
/// A request filed ahead of time expires once its first day has passed.
/// A backdated one (`start` before `filed_on`) started in the past on
/// purpose, so it gets [`MAX_BACKDATE_DAYS`] from filing instead.
pub fn should_expire(
    status: LeaveStatus,
    start: NaiveDate,
    filed_on: NaiveDate,
    today: NaiveDate,
) -> bool {
    if status != LeaveStatus::Pending {
        return false;
    }
    if start >= filed_on {
        start < today
    } else {
        (today - filed_on).num_days() > MAX_BACKDATE_DAYS
    }
}
