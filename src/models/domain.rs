use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashSet;
use uuid::Uuid;

/// Person on a matchmaker's roster
///
/// `notes`, `preferences` and `personality` are private to the owning
/// matchmaker and never leave the service through match results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Person {
    pub id: Uuid,
    pub matchmaker_id: Uuid,
    pub name: String,
    #[serde(default)]
    pub age: Option<i32>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub preferences: Option<Map<String, Value>>,
    #[serde(default)]
    pub personality: Option<Map<String, Value>>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default = "default_true")]
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn default_true() -> bool { true }

/// Person as shown to other matchmakers: private fields are not part of the type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublicPerson {
    pub id: Uuid,
    pub matchmaker_id: Uuid,
    pub name: String,
    pub age: Option<i32>,
    pub location: Option<String>,
    pub gender: Option<String>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Person> for PublicPerson {
    fn from(person: Person) -> Self {
        Self {
            id: person.id,
            matchmaker_id: person.matchmaker_id,
            name: person.name,
            age: person.age,
            location: person.location,
            gender: person.gender,
            active: person.active,
            created_at: person.created_at,
            updated_at: person.updated_at,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DecisionKind {
    Accepted,
    Declined,
}

/// A matchmaker's verdict on a candidate for one of their people
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decision {
    pub id: Uuid,
    pub matchmaker_id: Uuid,
    pub person_id: Uuid,
    pub candidate_id: Uuid,
    pub decision: DecisionKind,
    #[serde(default)]
    pub decline_reason: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IntroductionStatus {
    #[default]
    Pending,
    Accepted,
    Declined,
    Dating,
    Ended,
}

/// Two people who have been introduced. The pairing is symmetric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Introduction {
    pub id: Uuid,
    pub matchmaker_id: Uuid,
    pub person_a_id: Uuid,
    pub person_b_id: Uuid,
    #[serde(default)]
    pub status: IntroductionStatus,
    #[serde(default)]
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Introduction {
    /// The other side of the introduction, if `person_id` is part of it
    pub fn counterpart(&self, person_id: Uuid) -> Option<Uuid> {
        if self.person_a_id == person_id {
            Some(self.person_b_id)
        } else if self.person_b_id == person_id {
            Some(self.person_a_id)
        } else {
            None
        }
    }
}

/// Rationale behind a decline, used as a soft scoring signal
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeclineReason {
    pub candidate_id: Uuid,
    pub reason: String,
}

/// One ranked candidate returned by the selector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResponse {
    pub person: PublicPerson,
    pub compatibility_score: f64,
    pub match_explanation: String,
    pub is_cross_matchmaker: bool,
}

/// Inputs to the selector beyond the subject and pool
#[derive(Debug, Clone)]
pub struct SelectOptions {
    pub exclude_ids: HashSet<Uuid>,
    pub decline_reasons: Vec<DeclineReason>,
    pub limit: usize,
}

impl Default for SelectOptions {
    fn default() -> Self {
        Self {
            exclude_ids: HashSet::new(),
            decline_reasons: Vec::new(),
            limit: 3,
        }
    }
}

/// Scoring weights
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoringWeights {
    pub location: f64,
    pub age: f64,
    pub preference: f64,
    pub personality: f64,
    pub decline_penalty: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            location: 0.35,
            age: 0.30,
            preference: 0.20,
            personality: 0.15,
            decline_penalty: 0.10,
        }
    }
}
