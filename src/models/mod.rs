// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{
    Decision, DecisionKind, DeclineReason, Introduction, IntroductionStatus, MatchResponse, Person,
    PublicPerson, ScoringWeights, SelectOptions,
};
pub use requests::{
    CreateDecisionRequest, CreateIntroductionRequest, CreatePersonRequest, MatchesQuery,
    UpdateIntroductionRequest, UpdatePersonRequest,
};
pub use responses::{ErrorResponse, HealthResponse, WelcomeResponse};
