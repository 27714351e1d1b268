use std::collections::HashSet;
use uuid::Uuid;

use crate::core::{
    filters::is_eligible,
    scoring::{build_explanation, calculate_compatibility},
};
use crate::models::{MatchResponse, Person, PublicPerson, ScoringWeights, SelectOptions};

/// Candidate selector - ranks the active population for one subject
///
/// # Pipeline Stages
/// 1. Eligibility: active, not the subject, not decided or introduced
/// 2. Compatibility scoring with decline-signal penalty
/// 3. Ranking by score, ties broken by candidate id
/// 4. Truncation and privacy projection
///
/// Pure and stateless between calls; callers fetch every input beforehand.
#[derive(Debug, Clone)]
pub struct Matcher {
    weights: ScoringWeights,
}

impl Matcher {
    pub fn new(weights: ScoringWeights) -> Self {
        Self { weights }
    }

    pub fn with_default_weights() -> Self {
        Self {
            weights: ScoringWeights::default(),
        }
    }

    pub fn weights(&self) -> &ScoringWeights {
        &self.weights
    }

    /// Select the best candidates for `subject` out of `pool`
    ///
    /// # Arguments
    /// * `subject` - The person matches are sought for
    /// * `pool` - Active people across all matchmakers
    /// * `requesting_matchmaker_id` - The caller, used for the cross-matchmaker flag
    /// * `options` - Exclusions, decline signals and the result limit
    ///
    /// # Returns
    /// At most `options.limit` candidates, best first, with private fields removed
    pub fn select_matches(
        &self,
        subject: &Person,
        pool: &[Person],
        requesting_matchmaker_id: Uuid,
        options: &SelectOptions,
    ) -> Vec<MatchResponse> {
        if options.limit == 0 {
            return Vec::new();
        }

        // Declined profiles are excluded below but still inform scoring
        let declined_ids: HashSet<Uuid> = options
            .decline_reasons
            .iter()
            .map(|d| d.candidate_id)
            .collect();
        let declined_profiles: Vec<&Person> = pool
            .iter()
            .filter(|p| declined_ids.contains(&p.id))
            .collect();

        let mut seen: HashSet<Uuid> = HashSet::with_capacity(pool.len());
        let mut scored: Vec<(&Person, f64, Vec<String>)> = pool
            .iter()
            // Stage 1: Eligibility, first occurrence of each id only
            .filter(|candidate| is_eligible(candidate, subject, &options.exclude_ids))
            .filter(|candidate| seen.insert(candidate.id))
            // Stage 2: Scoring
            .map(|candidate| {
                let (score, reasons) =
                    calculate_compatibility(subject, candidate, &declined_profiles, &self.weights);
                (candidate, score, reasons)
            })
            .collect();

        // Stage 3: Sort by score (descending) and then by id (ascending)
        scored.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.0.id.cmp(&b.0.id))
        });

        // Stage 4: Limit and project
        scored.truncate(options.limit);

        scored
            .into_iter()
            .map(|(candidate, score, reasons)| MatchResponse {
                is_cross_matchmaker: candidate.matchmaker_id != requesting_matchmaker_id,
                person: PublicPerson::from(candidate.clone()),
                compatibility_score: score,
                match_explanation: build_explanation(&reasons),
            })
            .collect()
    }
}

impl Default for Matcher {
    fn default() -> Self {
        Self::with_default_weights()
    }
}
