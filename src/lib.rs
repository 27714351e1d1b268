//! Matchmaker API - roster management and candidate matching for matchmakers
//!
//! This library provides the HTTP service and the candidate selector used by it.
//! The selector is a pure function over already-fetched data; everything that
//! touches the hosted database lives in `services`.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use core::{build_exclusion_set, extract_decline_reasons, Matcher};
pub use models::{DeclineReason, MatchResponse, Person, PublicPerson, ScoringWeights, SelectOptions};
