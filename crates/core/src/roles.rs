//! Well-known role name constants.
//!
//! These must match the seed data in `20260301000001_create_roles_and_users.sql`.

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_PRODUCER: &str = "producer";
pub const ROLE_CREATIVE: &str = "creative";
pub const ROLE_PRODUCTION: &str = "production";
pub const ROLE_SOUND_ENGINEER: &str = "sound_engineer";
pub const ROLE_EDITOR: &str = "editor";
pub const ROLE_QUALITY_CONTROL: &str = "quality_control";
pub const ROLE_BROADCASTING: &str = "broadcasting";
pub const ROLE_PROMOTION: &str = "promotion";
pub const ROLE_INVENTORY: &str = "inventory";
pub const ROLE_HR: &str = "hr";
pub const ROLE_EMPLOYEE: &str = "employee";

/// Roles that manage programs and episodes.
pub const PROGRAM_MANAGER_ROLES: &[&str] = &[ROLE_PRODUCER];

/// Roles that approve, reject and close equipment loans.
pub const LOAN_APPROVER_ROLES: &[&str] = &[ROLE_INVENTORY];

/// Roles that administer employees, attendance, holidays and leave.
pub const HR_ROLES: &[&str] = &[ROLE_HR];

/// Every role seeded in the database.
pub const ALL_ROLES: &[&str] = &[
    ROLE_ADMIN,
    ROLE_PRODUCER,
    ROLE_CREATIVE,
    ROLE_PRODUCTION,
    ROLE_SOUND_ENGINEER,
    ROLE_EDITOR,
    ROLE_QUALITY_CONTROL,
    ROLE_BROADCASTING,
    ROLE_PROMOTION,
    ROLE_INVENTORY,
    ROLE_HR,
    ROLE_EMPLOYEE,
];

/// Whether `role` is one of `allowed`. Admins pass every check.
pub fn has_any_role(role: &str, allowed: &[&str]) -> bool {
    role == ROLE_ADMIN || allowed.contains(&role)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_passes_every_check() {
        assert!(has_any_role(ROLE_ADMIN, HR_ROLES));
        assert!(has_any_role(ROLE_ADMIN, &[]));
    }

    #[test]
    fn listed_role_passes() {
        assert!(has_any_role(ROLE_HR, HR_ROLES));
        assert!(has_any_role(ROLE_INVENTORY, LOAN_APPROVER_ROLES));
    }

    #[test]
    fn unlisted_role_fails() {
        assert!(!has_any_role(ROLE_EDITOR, HR_ROLES));
        assert!(!has_any_role("", PROGRAM_MANAGER_ROLES));
    }

    #[test]
    fn all_roles_are_unique() {
        let mut sorted = ALL_ROLES.to_vec();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(sorted.len(), ALL_ROLES.len());
    }
}
