use std::collections::HashSet;

use tracing::debug;

/// Result of asking the tracker for a rotation pool
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rotation {
    /// Some eligible observers had not been picked yet
    Continue,
    /// Every eligible observer had been picked; the window was restarted
    Reset,
}

/// Duplicate-avoidance state for one generation run
#[derive(Debug, Clone, Default)]
pub struct UsageTracker {
    used_subjects: HashSet<String>,
    used_observers: HashSet<String>,
    resets: u32,
}

impl UsageTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_subject_used(&self, subject: &str) -> bool {
        self.used_subjects.contains(subject)
    }

    pub fn record_subject(&mut self, subject: &str) {
        self.used_subjects.insert(subject.to_string());
    }

    pub fn used_subject_count(&self) -> usize {
        self.used_subjects.len()
    }

    /// Clears subjects at a day boundary when uniqueness is scoped per day
    pub fn reset_subjects(&mut self) {
        self.used_subjects.clear();
    }

    pub fn is_observer_used(&self, emp_id: &str) -> bool {
        self.used_observers.contains(emp_id)
    }

    pub fn record_observer(&mut self, emp_id: &str) {
        self.used_observers.insert(emp_id.to_string());
    }

    /// Starts a new rotation window without touching subjects
    pub fn reset_observers(&mut self) {
        self.used_observers.clear();
    }

    /// Restricts `eligible` to observers not yet picked in this window.
    ///
    /// When all of them have been picked the window is cleared and the whole
    /// eligible list is returned along with [`Rotation::Reset`].
    pub fn rotation_pool<'a, T, F>(
        &mut self,
        eligible: &'a [T],
        emp_id: F,
    ) -> (Vec<&'a T>, Rotation)
    where
        F: Fn(&T) -> &str,
    {
        let fresh: Vec<&T> = eligible
            .iter()
            .filter(|e| !self.used_observers.contains(emp_id(e)))
            .collect();

        if !fresh.is_empty() || eligible.is_empty() {
            return (fresh, Rotation::Continue);
        }

        debug!(
            used = self.used_observers.len(),
            "observer rotation exhausted, starting a new window"
        );
        self.used_observers.clear();
        self.resets += 1;
        (eligible.iter().collect(), Rotation::Reset)
    }

    pub fn rotation_resets(&self) -> u32 {
        self.resets
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subjects_accumulate_until_reset() {
        let mut tracker = UsageTracker::new();
        tracker.record_subject("Math");
        tracker.record_subject("Math");
        tracker.record_subject("Physics");
        assert!(tracker.is_subject_used("Math"));
        assert_eq!(tracker.used_subject_count(), 2);

        tracker.reset_subjects();
        assert!(!tracker.is_subject_used("Math"));
    }

    #[test]
    fn test_rotation_excludes_used_observers() {
        let mut tracker = UsageTracker::new();
        let peers = vec!["1".to_string(), "2".to_string(), "3".to_string()];
        tracker.record_observer("2");

        let (pool, rotation) = tracker.rotation_pool(&peers, |p| p.as_str());
        assert_eq!(pool, vec![&peers[0], &peers[2]]);
        assert_eq!(rotation, Rotation::Continue);
    }

    #[test]
    fn test_rotation_resets_when_exhausted() {
        let mut tracker = UsageTracker::new();
        let peers = vec!["1".to_string(), "2".to_string()];
        tracker.record_observer("1");
        tracker.record_observer("2");
        tracker.record_observer("9");

        let (pool, rotation) = tracker.rotation_pool(&peers, |p| p.as_str());
        assert_eq!(pool.len(), 2);
        assert_eq!(rotation, Rotation::Reset);
        assert_eq!(tracker.rotation_resets(), 1);
        // The whole window is cleared, not just the eligible observers
        assert!(!tracker.is_observer_used("9"));
    }

    #[test]
    fn test_empty_pool_is_not_a_reset() {
        let mut tracker = UsageTracker::new();
        let peers: Vec<String> = Vec::new();
        let (pool, rotation) = tracker.rotation_pool(&peers, |p| p.as_str());
        assert!(pool.is_empty());
        assert_eq!(rotation, Rotation::Continue);
        assert_eq!(tracker.rotation_resets(), 0);
    }
}
