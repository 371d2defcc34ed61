//! Production departments and their position in the episode pipeline.
//!
//! The pipeline is strictly linear:
//!
//! ```text
//! Creative -> Production -> Sound -> Editing -> QualityControl -> Broadcasting -> Promotion
//! ```
//!
//! An episode's `workflow_step` is the [`Department::step`] of the department
//! currently owning it, or [`WORKFLOW_STEP_DONE`] once promotion completes.

use serde::{Deserialize, Serialize};

use crate::roles::{
    ROLE_BROADCASTING, ROLE_CREATIVE, ROLE_EDITOR, ROLE_PRODUCER, ROLE_PRODUCTION,
    ROLE_PROMOTION, ROLE_QUALITY_CONTROL, ROLE_SOUND_ENGINEER,
};

/// Workflow step recorded on an episode once every department is done.
pub const WORKFLOW_STEP_DONE: i16 = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Department {
    Creative,
    Production,
    Sound,
    Editing,
    QualityControl,
    Broadcasting,
    Promotion,
}

/// All departments in pipeline order.
pub const PIPELINE: [Department; 7] = [
    Department::Creative,
    Department::Production,
    Department::Sound,
    Department::Editing,
    Department::QualityControl,
    Department::Broadcasting,
    Department::Promotion,
];

impl Department {
    /// The department every new episode starts in.
    pub fn first() -> Self {
        Department::Creative
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Department::Creative => "creative",
            Department::Production => "production",
            Department::Sound => "sound",
            Department::Editing => "editing",
            Department::QualityControl => "quality_control",
            Department::Broadcasting => "broadcasting",
            Department::Promotion => "promotion",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        PIPELINE.iter().copied().find(|d| d.as_str() == value)
    }

    /// 1-based position in the pipeline.
    pub fn step(self) -> i16 {
        match self {
            Department::Creative => 1,
            Department::Production => 2,
            Department::Sound => 3,
            Department::Editing => 4,
            Department::QualityControl => 5,
            Department::Broadcasting => 6,
            Department::Promotion => 7,
        }
    }

    pub fn from_step(step: i16) -> Option<Self> {
        PIPELINE.iter().copied().find(|d| d.step() == step)
    }

    /// The department that receives the episode after this one.
    pub fn next(self) -> Option<Self> {
        Self::from_step(self.step() + 1)
    }

    /// Role whose members accept and carry out this department's work.
    pub fn worker_role(self) -> &'static str {
        match self {
            Department::Creative => ROLE_CREATIVE,
            Department::Production => ROLE_PRODUCTION,
            Department::Sound => ROLE_SOUND_ENGINEER,
            Department::Editing => ROLE_EDITOR,
            Department::QualityControl => ROLE_QUALITY_CONTROL,
            Department::Broadcasting => ROLE_BROADCASTING,
            Department::Promotion => ROLE_PROMOTION,
        }
    }

    /// The department a role works in, if it is a department role.
    pub fn for_role(role: &str) -> Option<Self> {
        PIPELINE.iter().copied().find(|d| d.worker_role() == role)
    }

    /// Roles that must approve a submission before it counts as complete.
    ///
    /// Empty for departments that complete their work directly.
    pub fn reviewer_roles(self) -> &'static [&'static str] {
        match self {
            Department::Creative => &[ROLE_PRODUCER],
            _ => &[],
        }
    }

    pub fn requires_review(self) -> bool {
        !self.reviewer_roles().is_empty()
    }
}

impl std::fmt::Display for Department {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pipeline_steps_are_sequential() {
        for (idx, dept) in PIPELINE.iter().enumerate() {
            assert_eq!(dept.step(), idx as i16 + 1);
        }
    }

    #[test]
    fn roles_map_back_to_departments() {
        for dept in PIPELINE {
            assert_eq!(Department::for_role(dept.worker_role()), Some(dept));
        }
        assert_eq!(Department::for_role(ROLE_SOUND_ENGINEER), Some(Department::Sound));
        assert_eq!(Department::for_role(ROLE_PRODUCER), None);
        assert_eq!(Department::for_role("hr"), None);
    }

    #[test]
    fn next_walks_the_pipeline() {
        assert_eq!(Department::Creative.next(), Some(Department::Production));
        assert_eq!(Department::Editing.next(), Some(Department::QualityControl));
        assert_eq!(
            Department::QualityControl.next(),
            Some(Department::Broadcasting)
        );
        assert_eq!(Department::Promotion.next(), None);
    }

    #[test]
    fn parse_round_trips_every_department() {
        for dept in PIPELINE {
            assert_eq!(Department::parse(dept.as_str()), Some(dept));
        }
        assert_eq!(Department::parse("catering"), None);
    }

    #[test]
    fn serde_uses_the_same_names_as_as_str() {
        let json = serde_json::to_string(&Department::QualityControl).unwrap();
        assert_eq!(json, "\"quality_control\"");
    }

    #[test]
    fn from_step_rejects_out_of_range() {
        assert_eq!(Department::from_step(0), None);
        assert_eq!(Department::from_step(WORKFLOW_STEP_DONE), None);
    }

    #[test]
    fn only_creative_requires_review() {
        assert!(Department::Creative.requires_review());
        assert!(PIPELINE[1..].iter().all(|d| !d.requires_review()));
    }
}
