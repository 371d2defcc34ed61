//! Department-specific detail payloads carried by work items.
//!
//! Details are stored as a JSON object on the work item and edited
//! incrementally while the work is in progress. Before a work item may be
//! submitted or completed, its payload is parsed into the department's typed
//! struct and checked for the fields that department must deliver.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::department::Department;
use crate::error::CoreError;
use crate::types::{DbId, Timestamp};
use crate::workflow::QcDecision;

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CreativeDetails {
    pub script: Option<String>,
    pub synopsis: Option<String>,
    /// Production budget in whole currency units.
    pub budget: Option<i64>,
    pub shooting_date: Option<NaiveDate>,
    pub location: Option<String>,
    pub talents: Vec<String>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ProductionDetails {
    pub shooting_date: Option<NaiveDate>,
    pub location: Option<String>,
    pub footage_path: Option<String>,
    pub equipment_loan_ids: Vec<DbId>,
    pub notes: Option<String>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SoundDetails {
    pub audio_path: Option<String>,
    pub mix_notes: Option<String>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct EditingDetails {
    pub master_file_path: Option<String>,
    pub duration_secs: Option<i64>,
    pub notes: Option<String>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct QcDetails {
    pub decision: Option<QcDecision>,
    pub notes: Option<String>,
    pub checklist: BTreeMap<String, bool>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BroadcastingDetails {
    pub channel: Option<String>,
    pub air_at: Option<Timestamp>,
    pub broadcast_url: Option<String>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PromotionDetails {
    pub platforms: Vec<String>,
    pub links: Vec<String>,
}

fn parse<T: for<'de> Deserialize<'de>>(department: Department, details: &Value) -> Result<T, CoreError> {
    serde_json::from_value(details.clone()).map_err(|e| {
        CoreError::Validation(format!("Invalid {department} details: {e}"))
    })
}

fn non_empty(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|v| !v.trim().is_empty())
}

/// Collects every missing field so users see all problems at once.
struct Missing {
    department: Department,
    fields: Vec<&'static str>,
}

impl Missing {
    fn new(department: Department) -> Self {
        Self {
            department,
            fields: Vec::new(),
        }
    }

    fn require(&mut self, ok: bool, field: &'static str) {
        if !ok {
            self.fields.push(field);
        }
    }

    fn finish(self) -> Result<(), CoreError> {
        if self.fields.is_empty() {
            Ok(())
        } else {
            Err(CoreError::Validation(format!(
                "{} work is incomplete; missing or invalid: {}",
                self.department,
                self.fields.join(", ")
            )))
        }
    }
}

/// Check that `details` contains everything `department` must deliver
/// before its work item can be submitted or completed.
pub fn validate_for_completion(department: Department, details: &Value) -> Result<(), CoreError> {
    let mut missing = Missing::new(department);

    match department {
        Department::Creative => {
            let d: CreativeDetails = parse(department, details)?;
            missing.require(non_empty(&d.script), "script");
            missing.require(d.budget.is_some_and(|b| b > 0), "budget");
            missing.require(d.shooting_date.is_some(), "shooting_date");
        }
        Department::Production => {
            let d: ProductionDetails = parse(department, details)?;
            missing.require(non_empty(&d.footage_path), "footage_path");
        }
        Department::Sound => {
            let d: SoundDetails = parse(department, details)?;
            missing.require(non_empty(&d.audio_path), "audio_path");
        }
        Department::Editing => {
            let d: EditingDetails = parse(department, details)?;
            missing.require(non_empty(&d.master_file_path), "master_file_path");
            missing.require(d.duration_secs.is_some_and(|s| s > 0), "duration_secs");
        }
        Department::QualityControl => {
            let d: QcDetails = parse(department, details)?;
            missing.require(d.decision.is_some(), "decision");
            if d.decision == Some(QcDecision::Rejected) {
                missing.require(non_empty(&d.notes), "notes");
            }
        }
        Department::Broadcasting => {
            let d: BroadcastingDetails = parse(department, details)?;
            missing.require(non_empty(&d.channel), "channel");
            missing.require(d.air_at.is_some(), "air_at");
        }
        Department::Promotion => {
            let d: PromotionDetails = parse(department, details)?;
            missing.require(d.links.iter().any(|l| !l.trim().is_empty()), "links");
        }
    }

    missing.finish()
}

/// Read the QC decision from a quality-control detail payload.
pub fn qc_decision(details: &Value) -> Result<Option<QcDecision>, CoreError> {
    let d: QcDetails = parse(Department::QualityControl, details)?;
    Ok(d.decision)
}

/// Shallow-merge `patch` into `existing`.
///
/// Keys in `patch` overwrite keys in `existing`; a `null` value removes the
/// key. Both values must be JSON objects (a non-object `existing` is treated
/// as empty).
pub fn merge_details(existing: &Value, patch: &Value) -> Result<Value, CoreError> {
    let patch = patch.as_object().ok_or_else(|| {
        CoreError::Validation("Details must be a JSON object".to_string())
    })?;

    let mut merged: Map<String, Value> = existing.as_object().cloned().unwrap_or_default();
    for (key, value) in patch {
        if value.is_null() {
            merged.remove(key);
        } else {
            merged.insert(key.clone(), value.clone());
        }
    }
    Ok(Value::Object(merged))
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use serde_json::json;

    use super::*;

    #[test]
    fn creative_requires_script_budget_and_schedule() {
        let err = validate_for_completion(Department::Creative, &json!({})).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("script"));
        assert!(msg.contains("budget"));
        assert!(msg.contains("shooting_date"));
    }

    #[test]
    fn creative_with_everything_passes() {
        let details = json!({
            "script": "INT. STUDIO - DAY",
            "budget": 15_000_000,
            "shooting_date": "2026-11-02",
            "talents": ["Host A"]
        });
        assert!(validate_for_completion(Department::Creative, &details).is_ok());
    }

    #[test]
    fn creative_zero_budget_is_invalid() {
        let details = json!({
            "script": "draft",
            "budget": 0,
            "shooting_date": "2026-11-02"
        });
        let err = validate_for_completion(Department::Creative, &details).unwrap_err();
        assert!(err.to_string().contains("budget"));
        assert!(!err.to_string().contains("script"));
    }

    #[test]
    fn blank_script_counts_as_missing() {
        let details = json!({ "script": "   ", "budget": 1, "shooting_date": "2026-11-02" });
        assert!(validate_for_completion(Department::Creative, &details).is_err());
    }

    #[test]
    fn wrongly_typed_field_is_a_validation_error() {
        let details = json!({ "budget": "a lot" });
        assert_matches!(
            validate_for_completion(Department::Creative, &details),
            Err(CoreError::Validation(_))
        );
    }

    #[test]
    fn editing_requires_positive_duration() {
        let details = json!({ "master_file_path": "/media/ep1.mxf", "duration_secs": 0 });
        let err = validate_for_completion(Department::Editing, &details).unwrap_err();
        assert!(err.to_string().contains("duration_secs"));
    }

    #[test]
    fn qc_rejection_needs_notes() {
        let details = json!({ "decision": "rejected" });
        let err = validate_for_completion(Department::QualityControl, &details).unwrap_err();
        assert!(err.to_string().contains("notes"));

        let details = json!({ "decision": "rejected", "notes": "audio drops at 12:30" });
        assert!(validate_for_completion(Department::QualityControl, &details).is_ok());
    }

    #[test]
    fn qc_approval_without_notes_passes() {
        let details = json!({ "decision": "approved", "checklist": { "audio": true } });
        assert!(validate_for_completion(Department::QualityControl, &details).is_ok());
        assert_eq!(qc_decision(&details).unwrap(), Some(QcDecision::Approved));
    }

    #[test]
    fn unknown_qc_decision_is_invalid() {
        let details = json!({ "decision": "maybe" });
        assert!(qc_decision(&details).is_err());
    }

    #[test]
    fn broadcasting_requires_channel_and_air_time() {
        let details = json!({ "channel": "TV One" });
        let err = validate_for_completion(Department::Broadcasting, &details).unwrap_err();
        assert!(err.to_string().contains("air_at"));

        let details = json!({ "channel": "TV One", "air_at": "2026-11-10T12:00:00Z" });
        assert!(validate_for_completion(Department::Broadcasting, &details).is_ok());
    }

    #[test]
    fn promotion_requires_a_link() {
        let details = json!({ "platforms": ["instagram"], "links": [""] });
        assert!(validate_for_completion(Department::Promotion, &details).is_err());

        let details = json!({ "links": ["https://instagram.com/p/abc"] });
        assert!(validate_for_completion(Department::Promotion, &details).is_ok());
    }

    #[test]
    fn merge_overwrites_and_removes_keys() {
        let existing = json!({ "script": "v1", "location": "Studio 2" });
        let patch = json!({ "script": "v2", "location": null, "budget": 100 });
        let merged = merge_details(&existing, &patch).unwrap();
        assert_eq!(merged, json!({ "script": "v2", "budget": 100 }));
    }

    #[test]
    fn merge_into_non_object_starts_empty() {
        let merged = merge_details(&Value::Null, &json!({ "a": 1 })).unwrap();
        assert_eq!(merged, json!({ "a": 1 }));
    }

    #[test]
    fn merge_rejects_non_object_patch() {
        assert_matches!(
            merge_details(&json!({}), &json!([1, 2])),
            Err(CoreError::Validation(_))
        );
    }
}
