use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::models::domain::{DecisionKind, IntroductionStatus};

/// Request to add a person to the caller's roster
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreatePersonRequest {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    #[validate(range(min = 0, max = 150))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferences: Option<Map<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub personality: Option<Map<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Partial update of a person; absent fields are left untouched
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdatePersonRequest {
    #[validate(length(min = 1, message = "Name cannot be empty"))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[validate(range(min = 0, max = 150))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferences: Option<Map<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub personality: Option<Map<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
}

/// Request to record an accept/decline verdict
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_decision_pair"))]
pub struct CreateDecisionRequest {
    pub person_id: Uuid,
    pub candidate_id: Uuid,
    pub decision: DecisionKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decline_reason: Option<String>,
}

fn validate_decision_pair(req: &CreateDecisionRequest) -> Result<(), ValidationError> {
    if req.person_id == req.candidate_id {
        let mut err = ValidationError::new("same_person");
        err.message = Some("candidate_id must differ from person_id".into());
        return Err(err);
    }
    Ok(())
}

/// Request to record an introduction between two people
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_introduction_pair"))]
pub struct CreateIntroductionRequest {
    pub person_a_id: Uuid,
    pub person_b_id: Uuid,
    #[serde(default)]
    pub status: IntroductionStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

fn validate_introduction_pair(req: &CreateIntroductionRequest) -> Result<(), ValidationError> {
    if req.person_a_id == req.person_b_id {
        let mut err = ValidationError::new("same_person");
        err.message = Some("person_a_id and person_b_id must differ".into());
        return Err(err);
    }
    Ok(())
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateIntroductionRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<IntroductionStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Query string of `GET /api/matches/{personId}`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MatchesQuery {
    pub limit: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_name_rejected() {
        let req: CreatePersonRequest = serde_json::from_str(r#"{"name": ""}"#).unwrap();
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_unknown_decision_rejected_at_parse() {
        let parsed = serde_json::from_value::<CreateDecisionRequest>(serde_json::json!({
            "person_id": Uuid::new_v4(),
            "candidate_id": Uuid::new_v4(),
            "decision": "maybe",
        }));
        assert!(parsed.is_err());
    }

    #[test]
    fn test_decision_on_self_rejected() {
        let id = Uuid::new_v4();
        let req = CreateDecisionRequest {
            person_id: id,
            candidate_id: id,
            decision: DecisionKind::Accepted,
            decline_reason: None,
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_introduction_defaults_to_pending() {
        let req: CreateIntroductionRequest = serde_json::from_value(serde_json::json!({
            "person_a_id": Uuid::new_v4(),
            "person_b_id": Uuid::new_v4(),
        }))
        .unwrap();
        assert_eq!(req.status, IntroductionStatus::Pending);
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_update_serializes_only_present_fields() {
        let req = UpdatePersonRequest {
            location: Some("NYC".to_string()),
            ..Default::default()
        };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json, serde_json::json!({"location": "NYC"}));
    }
}
