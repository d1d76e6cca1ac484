use std::collections::HashMap;

use super::types::CandidateSlot;

/// Candidate classes indexed by (day, time slot) and by day.
///
/// Keys are the day and slot strings as normalized by the parser; lookups
/// are exact matches.
#[derive(Debug, Clone, Default)]
pub struct SlotCatalog {
    candidates: Vec<CandidateSlot>,
    by_slot: HashMap<(String, String), Vec<usize>>,
    by_day: HashMap<String, Vec<usize>>,
}

impl SlotCatalog {
    pub fn new(candidates: Vec<CandidateSlot>) -> Self {
        let mut by_slot: HashMap<(String, String), Vec<usize>> = HashMap::new();
        let mut by_day: HashMap<String, Vec<usize>> = HashMap::new();

        for (idx, candidate) in candidates.iter().enumerate() {
            by_slot
                .entry((candidate.day.clone(), candidate.time_slot.clone()))
                .or_default()
                .push(idx);
            by_day.entry(candidate.day.clone()).or_default().push(idx);
        }

        SlotCatalog {
            candidates,
            by_slot,
            by_day,
        }
    }

    /// Classes running in exactly this slot, in table order
    pub fn candidates_for(&self, day: &str, time_slot: &str) -> Vec<&CandidateSlot> {
        self.by_slot
            .get(&(day.to_string(), time_slot.to_string()))
            .map(|indices| self.resolve(indices))
            .unwrap_or_default()
    }

    /// Every class on the day regardless of time slot, in table order
    pub fn candidates_on(&self, day: &str) -> Vec<&CandidateSlot> {
        self.by_day
            .get(day)
            .map(|indices| self.resolve(indices))
            .unwrap_or_default()
    }

    pub fn has_day(&self, day: &str) -> bool {
        self.by_day.contains_key(day)
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    fn resolve(&self, indices: &[usize]) -> Vec<&CandidateSlot> {
        indices.iter().map(|&idx| &self.candidates[idx]).collect()
    }
}
