use std::collections::HashSet;
use uuid::Uuid;

use crate::models::{Decision, DecisionKind, DeclineReason, Introduction, Person};

/// Build the set of candidates that must never be suggested for `person_id`
///
/// Every decided candidate (accepted or declined) and everyone already
/// introduced to the person, in either slot of the introduction.
pub fn build_exclusion_set(
    person_id: Uuid,
    decisions: &[Decision],
    introductions: &[Introduction],
) -> HashSet<Uuid> {
    let decided = decisions
        .iter()
        .filter(|d| d.person_id == person_id)
        .map(|d| d.candidate_id);

    let introduced = introductions
        .iter()
        .filter_map(|intro| intro.counterpart(person_id));

    decided.chain(introduced).collect()
}

/// One entry per declined candidate, carrying the trimmed rationale
///
/// A decline without text still yields an entry with an empty reason: the
/// declined profile is a scoring signal on its own.
pub fn extract_decline_reasons(decisions: &[Decision]) -> Vec<DeclineReason> {
    decisions
        .iter()
        .filter(|d| d.decision == DecisionKind::Declined)
        .map(|d| DeclineReason {
            candidate_id: d.candidate_id,
            reason: d.decline_reason.as_deref().map(str::trim).unwrap_or_default().to_string(),
        })
        .collect()
}

/// Check whether a pool entry may be surfaced for `subject`
#[inline]
pub fn is_eligible(candidate: &Person, subject: &Person, exclude_ids: &HashSet<Uuid>) -> bool {
    // Skip if not active
    if !candidate.active {
        return false;
    }

    if candidate.id == subject.id {
        return false;
    }

    !exclude_ids.contains(&candidate.id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn create_test_person(id: Uuid, active: bool) -> Person {
        Person {
            id,
            matchmaker_id: Uuid::new_v4(),
            name: "Test Person".to_string(),
            age: Some(30),
            location: Some("NYC".to_string()),
            gender: Some("female".to_string()),
            preferences: None,
            personality: None,
            notes: None,
            active,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn create_decision(person_id: Uuid, candidate_id: Uuid, decision: DecisionKind, reason: Option<&str>) -> Decision {
        Decision {
            id: Uuid::new_v4(),
            matchmaker_id: Uuid::new_v4(),
            person_id,
            candidate_id,
            decision,
            decline_reason: reason.map(str::to_string),
            created_at: Utc::now(),
        }
    }

    fn create_introduction(a: Uuid, b: Uuid) -> Introduction {
        Introduction {
            id: Uuid::new_v4(),
            matchmaker_id: Uuid::new_v4(),
            person_a_id: a,
            person_b_id: b,
            status: Default::default(),
            notes: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_exclusion_covers_both_decision_kinds() {
        let subject = Uuid::new_v4();
        let accepted = Uuid::new_v4();
        let declined = Uuid::new_v4();
        let decisions = vec![
            create_decision(subject, accepted, DecisionKind::Accepted, None),
            create_decision(subject, declined, DecisionKind::Declined, Some("too far")),
        ];

        let excluded = build_exclusion_set(subject, &decisions, &[]);

        assert_eq!(excluded.len(), 2);
        assert!(excluded.contains(&accepted));
        assert!(excluded.contains(&declined));
    }

    #[test]
    fn test_exclusion_covers_both_introduction_slots() {
        let subject = Uuid::new_v4();
        let in_slot_b = Uuid::new_v4();
        let in_slot_a = Uuid::new_v4();
        let unrelated = create_introduction(Uuid::new_v4(), Uuid::new_v4());
        let introductions = vec![
            create_introduction(subject, in_slot_b),
            create_introduction(in_slot_a, subject),
            unrelated.clone(),
        ];

        let excluded = build_exclusion_set(subject, &[], &introductions);

        assert!(excluded.contains(&in_slot_b));
        assert!(excluded.contains(&in_slot_a));
        assert!(!excluded.contains(&unrelated.person_a_id));
        assert!(!excluded.contains(&subject));
    }

    #[test]
    fn test_decisions_for_other_people_ignored() {
        let subject = Uuid::new_v4();
        let decisions = vec![create_decision(Uuid::new_v4(), Uuid::new_v4(), DecisionKind::Declined, None)];

        assert!(build_exclusion_set(subject, &decisions, &[]).is_empty());
    }

    #[test]
    fn test_decline_reasons_cover_every_decline() {
        let subject = Uuid::new_v4();
        let with_reason = Uuid::new_v4();
        let blank = Uuid::new_v4();
        let silent = Uuid::new_v4();
        let decisions = vec![
            create_decision(subject, with_reason, DecisionKind::Declined, Some(" too many tattoos ")),
            create_decision(subject, blank, DecisionKind::Declined, Some("   ")),
            create_decision(subject, silent, DecisionKind::Declined, None),
            create_decision(subject, Uuid::new_v4(), DecisionKind::Accepted, Some("great fit")),
        ];

        let reasons = extract_decline_reasons(&decisions);

        assert_eq!(
            reasons,
            vec![
                DeclineReason { candidate_id: with_reason, reason: "too many tattoos".to_string() },
                DeclineReason { candidate_id: blank, reason: String::new() },
                DeclineReason { candidate_id: silent, reason: String::new() },
            ]
        );
    }

    #[test]
    fn test_eligibility() {
        let subject = create_test_person(Uuid::new_v4(), true);
        let candidate = create_test_person(Uuid::new_v4(), true);
        let inactive = create_test_person(Uuid::new_v4(), false);
        let mut excluded = HashSet::new();

        assert!(is_eligible(&candidate, &subject, &excluded));
        assert!(!is_eligible(&subject, &subject, &excluded));
        assert!(!is_eligible(&inactive, &subject, &excluded));

        excluded.insert(candidate.id);
        assert!(!is_eligible(&candidate, &subject, &excluded));
    }
}
