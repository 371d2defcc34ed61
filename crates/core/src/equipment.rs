//! Equipment inventory and loan rules.
//!
//! Loans reserve a quantity of one equipment item. Stock is only taken when
//! a loan is approved and only given back when an approved loan is returned,
//! so `available_quantity` never counts pending requests.

use chrono::NaiveDate;

use crate::define_str_enum;
use crate::error::CoreError;

define_str_enum! {
    /// Lifecycle status of an equipment loan.
    LoanStatus {
        Pending = "pending",
        Approved = "approved",
        Rejected = "rejected",
        Returned = "returned",
        Cancelled = "cancelled",
    }
}

define_str_enum! {
    LoanAction {
        Approve = "approve",
        Reject = "reject",
        Return = "return",
        Cancel = "cancel",
    }
}

define_str_enum! {
    /// Physical condition recorded on an equipment item or a returned loan.
    EquipmentCondition {
        Good = "good",
        NeedsRepair = "needs_repair",
        Broken = "broken",
    }
}

/// Compute the loan status reached by applying `action` in `from`.
pub fn loan_transition(from: LoanStatus, action: LoanAction) -> Result<LoanStatus, CoreError> {
    let to = match (action, from) {
        (LoanAction::Approve, LoanStatus::Pending) => LoanStatus::Approved,
        (LoanAction::Reject, LoanStatus::Pending) => LoanStatus::Rejected,
        (LoanAction::Cancel, LoanStatus::Pending) => LoanStatus::Cancelled,
        (LoanAction::Return, LoanStatus::Approved) => LoanStatus::Returned,
        (action, from) => {
            return Err(CoreError::invalid_transition(
                "equipment loan",
                from.as_str(),
                action.as_str(),
            ))
        }
    };
    Ok(to)
}

/// Validate a new loan request.
pub fn validate_loan_request(
    quantity: i32,
    loan_date: NaiveDate,
    due_date: NaiveDate,
) -> Result<(), CoreError> {
    if quantity < 1 {
        return Err(CoreError::Validation(
            "Loan quantity must be at least 1".to_string(),
        ));
    }
    if due_date < loan_date {
        return Err(CoreError::Validation(format!(
            "Due date {due_date} is before loan date {loan_date}"
        )));
    }
    Ok(())
}

/// Validate the stock counters of an equipment item.
pub fn validate_stock(total_quantity: i32, available_quantity: i32) -> Result<(), CoreError> {
    if total_quantity < 0 {
        return Err(CoreError::Validation(
            "Total quantity cannot be negative".to_string(),
        ));
    }
    if available_quantity < 0 || available_quantity > total_quantity {
        return Err(CoreError::Validation(format!(
            "Available quantity must be between 0 and {total_quantity}"
        )));
    }
    Ok(())
}

/// Ensure `requested` units can be taken from `available`.
///
/// Returns the remaining available quantity.
pub fn check_availability(available: i32, requested: i32) -> Result<i32, CoreError> {
    if requested > available {
        return Err(CoreError::Conflict(format!(
            "Only {available} unit(s) available, {requested} requested"
        )));
    }
    Ok(available - requested)
}

/// Available quantity after `returned` units come back, capped at `total`.
pub fn restock(available: i32, total: i32, returned: i32) -> i32 {
    (available + returned).min(total)
}

/// An approved loan past its due date that has not been returned.
pub fn is_overdue(status: LoanStatus, due_date: NaiveDate, today: NaiveDate) -> bool {
    status == LoanStatus::Approved && today > due_date
}
