//! In-app notification kinds and message builders.
//!
//! Notification rows are inserted by the same transaction that performs the
//! state change, so the text is built here from plain values rather than
//! loaded entities.

use chrono::NaiveDate;

use crate::department::Department;

pub const KIND_WORK_ASSIGNED: &str = "work_assigned";
pub const KIND_WORK_SUBMITTED: &str = "work_submitted";
pub const KIND_WORK_APPROVED: &str = "work_approved";
pub const KIND_WORK_REVISION: &str = "work_revision";
pub const KIND_QC_REJECTED: &str = "qc_rejected";
pub const KIND_EPISODE_COMPLETED: &str = "episode_completed";
pub const KIND_LOAN_REQUESTED: &str = "loan_requested";
pub const KIND_LOAN_APPROVED: &str = "loan_approved";
pub const KIND_LOAN_REJECTED: &str = "loan_rejected";
pub const KIND_LEAVE_REQUESTED: &str = "leave_requested";
pub const KIND_LEAVE_APPROVED: &str = "leave_approved";
pub const KIND_LEAVE_REJECTED: &str = "leave_rejected";
pub const KIND_LEAVE_EXPIRED: &str = "leave_expired";

/// Entity type names stored alongside a notification for deep-linking.
pub const ENTITY_WORK_ITEM: &str = "work_item";
pub const ENTITY_EPISODE: &str = "episode";
pub const ENTITY_EQUIPMENT_LOAN: &str = "equipment_loan";
pub const ENTITY_LEAVE_REQUEST: &str = "leave_request";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationContent {
    pub kind: &'static str,
    pub title: String,
    pub message: String,
}

fn content(kind: &'static str, title: impl Into<String>, message: impl Into<String>) -> NotificationContent {
    NotificationContent {
        kind,
        title: title.into(),
        message: message.into(),
    }
}

/// Identifies an episode in human-readable messages.
pub struct EpisodeLabel<'a> {
    pub program_name: &'a str,
    pub episode_number: i32,
    pub title: &'a str,
}

impl std::fmt::Display for EpisodeLabel<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} episode {} \"{}\"",
            self.program_name, self.episode_number, self.title
        )
    }
}

pub fn work_assigned(department: Department, episode: &EpisodeLabel<'_>) -> NotificationContent {
    content(
        KIND_WORK_ASSIGNED,
        format!("New {department} work"),
        format!("{episode} is ready for the {department} department."),
    )
}

pub fn work_submitted(department: Department, episode: &EpisodeLabel<'_>) -> NotificationContent {
    content(
        KIND_WORK_SUBMITTED,
        format!("{department} work awaiting review"),
        format!("{department} work for {episode} was submitted for your review."),
    )
}

pub fn work_approved(department: Department, episode: &EpisodeLabel<'_>) -> NotificationContent {
    content(
        KIND_WORK_APPROVED,
        format!("{department} work approved"),
        format!("Your {department} work for {episode} was approved."),
    )
}

pub fn work_revision(
    department: Department,
    episode: &EpisodeLabel<'_>,
    notes: Option<&str>,
) -> NotificationContent {
    let mut message = format!("Your {department} work for {episode} needs revision.");
    if let Some(notes) = notes.filter(|n| !n.trim().is_empty()) {
        message.push_str(" Notes: ");
        message.push_str(notes);
    }
    content(KIND_WORK_REVISION, format!("{department} revision requested"), message)
}

pub fn qc_rejected(episode: &EpisodeLabel<'_>, notes: Option<&str>) -> NotificationContent {
    let mut message = format!("Quality control rejected the edit of {episode}.");
    if let Some(notes) = notes.filter(|n| !n.trim().is_empty()) {
        message.push_str(" Notes: ");
        message.push_str(notes);
    }
    content(KIND_QC_REJECTED, "Edit returned by quality control", message)
}

pub fn episode_completed(episode: &EpisodeLabel<'_>) -> NotificationContent {
    content(
        KIND_EPISODE_COMPLETED,
        "Episode completed",
        format!("{episode} has finished every workflow step."),
    )
}

pub fn loan_requested(equipment_name: &str, quantity: i32, requester: &str) -> NotificationContent {
    content(
        KIND_LOAN_REQUESTED,
        "Equipment loan request",
        format!("{requester} requested {quantity} x {equipment_name}."),
    )
}

pub fn loan_decided(equipment_name: &str, quantity: i32, approved: bool) -> NotificationContent {
    if approved {
        content(
            KIND_LOAN_APPROVED,
            "Equipment loan approved",
            format!("Your loan of {quantity} x {equipment_name} was approved."),
        )
    } else {
        content(
            KIND_LOAN_REJECTED,
            "Equipment loan rejected",
            format!("Your loan of {quantity} x {equipment_name} was rejected."),
        )
    }
}

pub fn leave_requested(
    employee_name: &str,
    leave_type: &str,
    start: NaiveDate,
    end: NaiveDate,
) -> NotificationContent {
    content(
        KIND_LEAVE_REQUESTED,
        "Leave request",
        format!("{employee_name} requested {leave_type} leave from {start} to {end}."),
    )
}

pub fn leave_decided(start: NaiveDate, end: NaiveDate, approved: bool) -> NotificationContent {
    if approved {
        content(
            KIND_LEAVE_APPROVED,
            "Leave approved",
            format!("Your leave from {start} to {end} was approved."),
        )
    } else {
        content(
            KIND_LEAVE_REJECTED,
            "Leave rejected",
            format!("Your leave from {start} to {end} was rejected."),
        )
    }
}

pub fn leave_expired(start: NaiveDate, end: NaiveDate) -> NotificationContent {
    content(
        KIND_LEAVE_EXPIRED,
        "Leave request expired",
        format!("Your leave request from {start} to {end} was not reviewed before it started and has expired."),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn label() -> EpisodeLabel<'static> {
        EpisodeLabel {
            program_name: "Morning Talk",
            episode_number: 12,
            title: "Harvest",
        }
    }

    #[test]
    fn assigned_message_names_episode_and_department() {
        let c = work_assigned(Department::Sound, &label());
        assert_eq!(c.kind, KIND_WORK_ASSIGNED);
        assert!(c.message.contains("Morning Talk episode 12 \"Harvest\""));
        assert!(c.message.contains("sound"));
    }

    #[test]
    fn revision_includes_notes_when_present() {
        let c = work_revision(Department::Creative, &label(), Some("Tighten the intro"));
        assert!(c.message.ends_with("Notes: Tighten the intro"));
        let c = work_revision(Department::Creative, &label(), Some("  "));
        assert!(!c.message.contains("Notes"));
    }

    #[test]
    fn loan_decision_kind_follows_outcome() {
        assert_eq!(loan_decided("Tripod", 2, true).kind, KIND_LOAN_APPROVED);
        assert_eq!(loan_decided("Tripod", 2, false).kind, KIND_LOAN_REJECTED);
    }

    #[test]
    fn leave_messages_include_dates() {
        let start = NaiveDate::from_ymd_opt(2026, 10, 20).unwrap();
        let end = NaiveDate::from_ymd_opt(2026, 10, 22).unwrap();
        let c = leave_requested("Sari", "annual", start, end);
        assert!(c.message.contains("2026-10-20"));
        assert!(c.message.contains("2026-10-22"));
        assert_eq!(leave_expired(start, end).kind, KIND_LEAVE_EXPIRED);
    }
}
