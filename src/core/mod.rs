// Core algorithm exports
pub mod filters;
pub mod matcher;
pub mod scoring;

pub use filters::{build_exclusion_set, extract_decline_reasons, is_eligible};
pub use matcher::Matcher;
pub use scoring::{build_explanation, calculate_compatibility};
