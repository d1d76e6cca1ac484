//! Fallback chain resolving an observer slot into a candidate set.
//!
//! Levels are tried in order and the first non-empty one wins:
//!
//! 1. same day and slot, different person, subject not used yet
//! 2. same day and slot, different person
//! 3. same day and slot
//! 4. same day, any slot
//!
//! A day without any class resolves to [`Resolution::NoClass`].

use super::catalog::SlotCatalog;
use super::types::{CandidateSlot, MatchLevel, ObserverSlot};
use super::usage::UsageTracker;

/// Outcome of running the chain for one observer slot
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution<'a> {
    Candidates {
        level: MatchLevel,
        candidates: Vec<&'a CandidateSlot>,
    },
    /// The day has no classes at all
    NoClass,
    /// The day has classes, but the chain stopped before reaching one
    NoEligible,
}

#[derive(Debug, Clone, Copy)]
pub struct RelaxationMatcher {
    max_level: MatchLevel,
    subject_uniqueness: bool,
}

impl Default for RelaxationMatcher {
    fn default() -> Self {
        RelaxationMatcher {
            max_level: MatchLevel::AnySlot,
            subject_uniqueness: true,
        }
    }
}

impl RelaxationMatcher {
    pub fn new(max_level: MatchLevel, subject_uniqueness: bool) -> Self {
        RelaxationMatcher {
            max_level,
            subject_uniqueness,
        }
    }

    pub fn resolve<'a>(
        &self,
        observer: &ObserverSlot,
        catalog: &'a SlotCatalog,
        usage: &UsageTracker,
    ) -> Resolution<'a> {
        if !catalog.has_day(&observer.day) {
            return Resolution::NoClass;
        }

        let in_slot = catalog.candidates_for(&observer.day, &observer.time_slot);

        for level in MatchLevel::CHAIN {
            if level > self.max_level {
                break;
            }

            let candidates: Vec<&CandidateSlot> = match level {
                MatchLevel::Strict => in_slot
                    .iter()
                    .copied()
                    .filter(|c| c.emp_id != observer.emp_id)
                    .filter(|c| !self.subject_uniqueness || !usage.is_subject_used(&c.subject))
                    .collect(),
                MatchLevel::SubjectRepeat => in_slot
                    .iter()
                    .copied()
                    .filter(|c| c.emp_id != observer.emp_id)
                    .collect(),
                MatchLevel::IdentityClash => in_slot.clone(),
                MatchLevel::AnySlot => catalog.candidates_on(&observer.day),
            };

            if !candidates.is_empty() {
                return Resolution::Candidates { level, candidates };
            }
        }

        Resolution::NoEligible
    }
}

/// Whether `candidate` satisfies the predicate of `level` for `observer`
pub fn satisfies_level(
    level: MatchLevel,
    observer: &ObserverSlot,
    candidate: &CandidateSlot,
    usage: &UsageTracker,
) -> bool {
    let same_day = candidate.day == observer.day;
    let same_slot = same_day && candidate.time_slot == observer.time_slot;
    let distinct = candidate.emp_id != observer.emp_id;
    match level {
        MatchLevel::Strict => same_slot && distinct && !usage.is_subject_used(&candidate.subject),
        MatchLevel::SubjectRepeat => same_slot && distinct,
        MatchLevel::IdentityClash => same_slot,
        MatchLevel::AnySlot => same_day,
    }
}
