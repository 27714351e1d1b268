use serde_json::{Map, Value};

use crate::models::{Person, ScoringWeights};

/// Component score used when a signal cannot be computed
const NEUTRAL: f64 = 0.5;

/// Age gap (years) at which the age score bottoms out
const AGE_GAP_SPAN: f64 = 10.0;

/// Age gap (years) within which a candidate resembles a declined profile
const DECLINE_AGE_TOLERANCE: u32 = 3;

/// Floor keeping every surfaced candidate strictly positive
pub const MIN_SCORE: f64 = 1.0;
pub const MAX_SCORE: f64 = 100.0;

/// Explanation used when no positive signal was found
pub const FALLBACK_EXPLANATION: &str = "Active candidate with no strong signals yet";

/// Calculate a compatibility score (1-100) and the reasons behind it
///
/// Scoring formula:
/// score = (
///     location_score * 0.35 +      # Same location
///     age_score * 0.30 +           # Inside preferred range, or close in age
///     preference_score * 0.20 +    # Matches stated gender preference
///     personality_score * 0.15     # Shared personality traits
/// ) * 100 - decline_penalty * 100  # Resembles a declined profile
///
/// Unknown signals contribute a neutral 0.5.
pub fn calculate_compatibility(
    subject: &Person,
    candidate: &Person,
    declined_profiles: &[&Person],
    weights: &ScoringWeights,
) -> (f64, Vec<String>) {
    let mut reasons = Vec::new();

    let location_score = calculate_location_score(subject, candidate, &mut reasons);
    let age_score = calculate_age_score(subject, candidate, &mut reasons);
    let preference_score = calculate_preference_score(subject, candidate, &mut reasons);
    let personality_score = calculate_personality_score(
        subject.personality.as_ref(),
        candidate.personality.as_ref(),
        &mut reasons,
    );

    let mut total_score = (location_score * weights.location
        + age_score * weights.age
        + preference_score * weights.preference
        + personality_score * weights.personality)
        * 100.0;

    if declined_profiles.iter().any(|declined| resembles(candidate, declined)) {
        total_score -= weights.decline_penalty * 100.0;
    }

    let clamped = total_score.clamp(MIN_SCORE, MAX_SCORE);
    ((clamped * 10.0).round() / 10.0, reasons)
}

/// Join reasons into the human-readable explanation
pub fn build_explanation(reasons: &[String]) -> String {
    if reasons.is_empty() {
        FALLBACK_EXPLANATION.to_string()
    } else {
        reasons.join("; ")
    }
}

fn normalize(value: &str) -> String {
    value.trim().to_lowercase()
}

/// Calculate location score (0-1)
#[inline]
fn calculate_location_score(subject: &Person, candidate: &Person, reasons: &mut Vec<String>) -> f64 {
    match (subject.location.as_deref(), candidate.location.as_deref()) {
        (Some(a), Some(b)) if !a.trim().is_empty() && !b.trim().is_empty() => {
            if normalize(a) == normalize(b) {
                reasons.push(format!("Both based in {}", b.trim()));
                1.0
            } else {
                0.0
            }
        }
        _ => NEUTRAL,
    }
}

/// Read an integer bound from a free-form preferences map
fn preference_bound(preferences: Option<&Map<String, Value>>, key: &str) -> Option<i64> {
    preferences?.get(key)?.as_i64()
}

/// Calculate age score (0-1)
/// A stated range on the subject wins; otherwise closer ages score higher
#[inline]
fn calculate_age_score(subject: &Person, candidate: &Person, reasons: &mut Vec<String>) -> f64 {
    let Some(candidate_age) = candidate.age else {
        return NEUTRAL;
    };

    let prefs = subject.preferences.as_ref();
    let min_age = preference_bound(prefs, "min_age");
    let max_age = preference_bound(prefs, "max_age");

    if min_age.is_some() || max_age.is_some() {
        let age = i64::from(candidate_age);
        let in_range = min_age.map_or(true, |min| age >= min) && max_age.map_or(true, |max| age <= max);
        if in_range {
            reasons.push(format!("Age {} is within the preferred range", candidate_age));
            return 1.0;
        }
        return 0.0;
    }

    let Some(subject_age) = subject.age else {
        return NEUTRAL;
    };

    let gap = f64::from(subject_age.abs_diff(candidate_age));
    let score = 1.0 - gap.min(AGE_GAP_SPAN) / AGE_GAP_SPAN;
    if gap <= 5.0 {
        reasons.push(format!("Close in age ({} and {})", subject_age, candidate_age));
    }
    score
}

/// Genders the subject is looking for, from `gender` or `genders`
fn preferred_genders(preferences: Option<&Map<String, Value>>) -> Vec<String> {
    let Some(prefs) = preferences else {
        return Vec::new();
    };

    let mut genders = Vec::new();
    if let Some(gender) = prefs.get("gender").and_then(Value::as_str) {
        genders.push(normalize(gender));
    }
    if let Some(list) = prefs.get("genders").and_then(Value::as_array) {
        genders.extend(list.iter().filter_map(Value::as_str).map(normalize));
    }
    genders
}

/// Calculate preference score (0-1) against the subject's stated gender preference
#[inline]
fn calculate_preference_score(subject: &Person, candidate: &Person, reasons: &mut Vec<String>) -> f64 {
    let wanted = preferred_genders(subject.preferences.as_ref());
    let Some(gender) = candidate.gender.as_deref() else {
        return NEUTRAL;
    };
    if wanted.is_empty() {
        return NEUTRAL;
    }

    if wanted.contains(&normalize(gender)) {
        reasons.push("Matches stated gender preference".to_string());
        1.0
    } else {
        0.0
    }
}

/// Calculate personality score (0-1)
/// Fraction of trait keys on which both maps agree, over all keys seen
#[inline]
fn calculate_personality_score(
    subject: Option<&Map<String, Value>>,
    candidate: Option<&Map<String, Value>>,
    reasons: &mut Vec<String>,
) -> f64 {
    let (Some(a), Some(b)) = (subject, candidate) else {
        return NEUTRAL;
    };

    let union = a.keys().chain(b.keys().filter(|k| !a.contains_key(*k))).count();
    if union == 0 {
        return NEUTRAL;
    }

    let shared = a
        .iter()
        .filter(|(key, value)| b.get(*key) == Some(*value))
        .count();

    // Personality is private to its matchmaker; only say that there is overlap
    if shared > 0 {
        reasons.push("Compatible personality".to_string());
    }

    shared as f64 / union as f64
}

/// Whether a candidate shares the known traits of a previously declined profile
fn resembles(candidate: &Person, declined: &Person) -> bool {
    let same_gender = match (candidate.gender.as_deref(), declined.gender.as_deref()) {
        (Some(a), Some(b)) => normalize(a) == normalize(b),
        _ => false,
    };
    let same_location = match (candidate.location.as_deref(), declined.location.as_deref()) {
        (Some(a), Some(b)) => normalize(a) == normalize(b),
        _ => false,
    };
    let similar_age = match (candidate.age, declined.age) {
        (Some(a), Some(b)) => a.abs_diff(b) <= DECLINE_AGE_TOLERANCE,
        _ => true,
    };

    same_gender && same_location && similar_age
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::json;
    use uuid::Uuid;

    fn create_test_person(age: Option<i32>, location: Option<&str>, gender: Option<&str>) -> Person {
        Person {
            id: Uuid::new_v4(),
            matchmaker_id: Uuid::new_v4(),
            name: "Test Person".to_string(),
            age,
            location: location.map(str::to_string),
            gender: gender.map(str::to_string),
            preferences: None,
            personality: None,
            notes: None,
            active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn as_map(value: Value) -> Option<Map<String, Value>> {
        value.as_object().cloned()
    }

    #[test]
    fn test_no_signals_scores_neutral_and_positive() {
        let subject = create_test_person(None, None, None);
        let candidate = create_test_person(None, None, None);

        let (score, reasons) = calculate_compatibility(&subject, &candidate, &[], &ScoringWeights::default());

        assert_eq!(score, 50.0);
        assert!(reasons.is_empty());
        assert_eq!(build_explanation(&reasons), FALLBACK_EXPLANATION);
    }

    #[test]
    fn test_location_match_is_case_insensitive() {
        let subject = create_test_person(Some(30), Some("nyc "), Some("male"));
        let near = create_test_person(Some(30), Some("NYC"), Some("female"));
        let far = create_test_person(Some(30), Some("SF"), Some("female"));
        let weights = ScoringWeights::default();

        let (near_score, reasons) = calculate_compatibility(&subject, &near, &[], &weights);
        let (far_score, _) = calculate_compatibility(&subject, &far, &[], &weights);

        assert!(near_score > far_score);
        assert!(reasons.iter().any(|r| r == "Both based in NYC"));
    }

    #[test]
    fn test_age_score_by_gap() {
        let subject = create_test_person(Some(30), None, None);
        let mut reasons = Vec::new();

        let same = calculate_age_score(&subject, &create_test_person(Some(30), None, None), &mut reasons);
        let five = calculate_age_score(&subject, &create_test_person(Some(35), None, None), &mut reasons);
        let twenty = calculate_age_score(&subject, &create_test_person(Some(50), None, None), &mut reasons);

        assert_eq!(same, 1.0);
        assert!((five - 0.5).abs() < 1e-9);
        assert_eq!(twenty, 0.0);
    }

    #[test]
    fn test_age_range_preference_wins() {
        let mut subject = create_test_person(Some(30), None, None);
        subject.preferences = as_map(json!({"min_age": 40, "max_age": 50}));
        let mut reasons = Vec::new();

        let inside = calculate_age_score(&subject, &create_test_person(Some(45), None, None), &mut reasons);
        let outside = calculate_age_score(&subject, &create_test_person(Some(31), None, None), &mut reasons);

        assert_eq!(inside, 1.0);
        assert_eq!(outside, 0.0);
    }

    #[test]
    fn test_gender_preference() {
        let mut subject = create_test_person(None, None, Some("male"));
        subject.preferences = as_map(json!({"genders": ["Female", "non-binary"]}));
        let mut reasons = Vec::new();

        let wanted = calculate_preference_score(&subject, &create_test_person(None, None, Some("female")), &mut reasons);
        let other = calculate_preference_score(&subject, &create_test_person(None, None, Some("male")), &mut reasons);
        let unknown = calculate_preference_score(&subject, &create_test_person(None, None, None), &mut reasons);

        assert_eq!(wanted, 1.0);
        assert_eq!(other, 0.0);
        assert_eq!(unknown, NEUTRAL);
    }

    #[test]
    fn test_personality_overlap() {
        let a = as_map(json!({"type": "extrovert", "humor": "dry"}));
        let b = as_map(json!({"type": "extrovert", "humor": "slapstick", "pets": "cats"}));
        let mut reasons = Vec::new();

        let score = calculate_personality_score(a.as_ref(), b.as_ref(), &mut reasons);

        assert!((score - 1.0 / 3.0).abs() < 1e-9);
        assert_eq!(reasons, vec!["Compatible personality".to_string()]);
    }

    #[test]
    fn test_resembling_declined_profile_is_penalized() {
        let subject = create_test_person(Some(30), Some("NYC"), Some("male"));
        let declined = create_test_person(Some(28), Some("NYC"), Some("female"));
        let lookalike = create_test_person(Some(29), Some("NYC"), Some("female"));
        let weights = ScoringWeights::default();

        let (plain, _) = calculate_compatibility(&subject, &lookalike, &[], &weights);
        let (penalized, _) = calculate_compatibility(&subject, &lookalike, &[&declined], &weights);

        assert!((plain - penalized - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_extreme_ages_do_not_overflow() {
        let subject = create_test_person(Some(i32::MAX), Some("NYC"), Some("female"));
        let candidate = create_test_person(Some(i32::MIN), Some("NYC"), Some("female"));
        let declined = create_test_person(Some(i32::MAX), Some("NYC"), Some("female"));
        let mut reasons = Vec::new();

        assert_eq!(calculate_age_score(&subject, &candidate, &mut reasons), 0.0);
        assert!(!resembles(&candidate, &declined));
        assert!(resembles(&subject, &declined));

        let (score, _) = calculate_compatibility(&subject, &candidate, &[&declined], &ScoringWeights::default());
        assert!((MIN_SCORE..=MAX_SCORE).contains(&score));
    }

    #[test]
    fn test_personality_reason_does_not_reveal_traits() {
        let a = as_map(json!({"type": "introvert", "humor": "dry", "pets": "cats"}));
        let b = as_map(json!({"type": "introvert", "humor": "dry", "pets": "cats"}));
        let mut reasons = Vec::new();

        calculate_personality_score(a.as_ref(), b.as_ref(), &mut reasons);

        assert_eq!(reasons, vec!["Compatible personality".to_string()]);
        assert!(reasons.iter().all(|r| !r.contains("introvert") && !r.contains('3')));
    }

    #[test]
    fn test_score_never_below_floor() {
        let mut subject = create_test_person(Some(30), Some("NYC"), Some("male"));
        subject.preferences = as_map(json!({"gender": "female", "min_age": 60}));
        let candidate = create_test_person(Some(20), Some("SF"), Some("male"));
        let weights = ScoringWeights {
            personality: 0.0,
            decline_penalty: 1.0,
            ..ScoringWeights::default()
        };

        let (score, _) = calculate_compatibility(&subject, &candidate, &[], &weights);

        assert_eq!(score, MIN_SCORE);
    }
}
