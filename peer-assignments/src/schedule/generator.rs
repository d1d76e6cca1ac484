//! Drives a generation run.
//!
//! # Algorithm
//!
//! 1. Build the slot catalog once from the candidate table.
//! 2. Split the observer table into scopes: the whole week in table order, or
//!    one scope per day in ascending weekday order.
//! 3. Seed a generator per scope from the ISO week (and day).
//! 4. Resolve every observer slot (or slot group, in peer-for-class mode)
//!    through the fallback chain, pick with the seeded generator and update
//!    the usage tracker.
//!
//! Changing the processing order changes the picks, so every ordering here
//! is derived from table order, never from hash iteration.

use std::collections::{HashMap, HashSet};

use rand::Rng;
use tracing::{debug, info, warn};

use super::catalog::SlotCatalog;
use super::relaxation::{RelaxationMatcher, Resolution};
use super::seed::{SeedSource, WeekScope};
use super::selection::SelectionPolicy;
use super::types::{
    Assignment, CandidateSlot, Day, MatchLevel, ObserverSlot, Outcome, ScopeSchedule,
};
use super::usage::{Rotation, UsageTracker};
use crate::config::{GeneratorConfig, MatchMode, RunScope};
use crate::error::{AssignError, AssignResult};

/// A scope of a per-day batch that could not be generated
#[derive(Debug)]
pub struct ScopeFailure {
    pub label: String,
    pub day: Option<Day>,
    pub error: AssignError,
}

/// Everything produced by one run
#[derive(Debug)]
pub struct GenerationReport {
    pub week: WeekScope,
    pub scopes: Vec<ScopeSchedule>,
    pub failures: Vec<ScopeFailure>,
}

impl GenerationReport {
    pub fn assignments(&self) -> impl Iterator<Item = &Assignment> {
        self.scopes.iter().flat_map(|s| s.assignments.iter())
    }

    pub fn assignment_count(&self) -> usize {
        self.scopes.iter().map(|s| s.assignments.len()).sum()
    }

    pub fn matched_count(&self) -> usize {
        self.scopes.iter().map(|s| s.matched_count()).sum()
    }
}

/// Assignment generator configured for one kind of run
#[derive(Debug, Clone)]
pub struct Generator {
    config: GeneratorConfig,
    matcher: RelaxationMatcher,
    policy: SelectionPolicy,
}

impl Generator {
    pub fn new(config: GeneratorConfig) -> AssignResult<Self> {
        config.validate()?;
        let matcher = RelaxationMatcher::new(config.max_level(), config.subject_uniqueness);
        let policy = SelectionPolicy::new(config.max_alternatives);
        Ok(Generator {
            config,
            matcher,
            policy,
        })
    }

    /// Generates assignments for the configured week.
    ///
    /// A week run fails as a whole on empty input. A per-day run records
    /// empty days in [`GenerationReport::failures`] and carries on.
    pub fn generate(
        &self,
        observers: &[ObserverSlot],
        candidates: Vec<CandidateSlot>,
    ) -> AssignResult<GenerationReport> {
        let week = self.config.week_scope()?;
        let seeds = SeedSource::new(week);
        let catalog = SlotCatalog::new(candidates);

        info!(
            week = %week,
            observers = observers.len(),
            candidates = catalog.len(),
            mode = ?self.config.mode,
            "generating assignments"
        );

        let mut report = GenerationReport {
            week,
            scopes: Vec::new(),
            failures: Vec::new(),
        };

        match self.config.run_scope {
            RunScope::Week => {
                let scope = self.run_scope(
                    &seeds,
                    None,
                    observers.iter().collect(),
                    &catalog,
                    &mut UsageTracker::new(),
                )?;
                report.scopes.push(scope);
            }
            RunScope::Day => {
                let by_day = group_by_day(observers)?;
                let selected = self.config.selected_days()?;
                let mut days: Vec<Day> = if selected.is_empty() {
                    by_day.keys().copied().collect()
                } else {
                    selected
                };
                days.sort();

                let mut usage = UsageTracker::new();
                for day in days {
                    if self.config.subject_scope == RunScope::Day {
                        usage.reset_subjects();
                    }
                    usage.reset_observers();

                    let day_observers = by_day.get(&day).cloned().unwrap_or_default();
                    match self.run_scope(&seeds, Some(day), day_observers, &catalog, &mut usage) {
                        Ok(scope) => report.scopes.push(scope),
                        Err(error) if error.is_scope_local() => {
                            warn!(day = %day, error = %error, "skipping day");
                            report.failures.push(ScopeFailure {
                                label: seeds.label(Some(day)),
                                day: Some(day),
                                error,
                            });
                        }
                        Err(error) => return Err(error),
                    }
                }
            }
        }

        info!(
            assignments = report.assignment_count(),
            matched = report.matched_count(),
            failed_scopes = report.failures.len(),
            "generation finished"
        );
        Ok(report)
    }

    fn run_scope(
        &self,
        seeds: &SeedSource,
        day: Option<Day>,
        observers: Vec<&ObserverSlot>,
        catalog: &SlotCatalog,
        usage: &mut UsageTracker,
    ) -> AssignResult<ScopeSchedule> {
        let label = seeds.label(day);
        if catalog.is_empty() {
            return Err(AssignError::empty_input(label, "the candidate table has no busy slots"));
        }
        if observers.is_empty() {
            return Err(AssignError::empty_input(label, "no free observer slots"));
        }

        let mut rng = seeds.rng(day);
        let resets_before = usage.rotation_resets();

        let assignments = match self.config.mode {
            MatchMode::ClassForObserver => observers
                .iter()
                .map(|observer| self.assign_class(observer, catalog, usage, &mut rng))
                .collect(),
            MatchMode::PeerForClass => self.assign_peers(&observers, catalog, usage, &mut rng),
        };

        let scope = ScopeSchedule {
            label,
            day,
            assignments,
            rotation_resets: usage.rotation_resets() - resets_before,
        };
        debug!(
            scope = %scope.label,
            assignments = scope.assignments.len(),
            matched = scope.matched_count(),
            "scope generated"
        );
        Ok(scope)
    }

    /// Resolves one observer slot into a class to visit
    fn assign_class<R: Rng>(
        &self,
        observer: &ObserverSlot,
        catalog: &SlotCatalog,
        usage: &mut UsageTracker,
        rng: &mut R,
    ) -> Assignment {
        let unmatched = |outcome| Assignment {
            day: observer.day.clone(),
            time_slot: observer.time_slot.clone(),
            observer: Some(observer.clone()),
            class: None,
            alternatives: Vec::new(),
            outcome,
        };

        let (level, candidates) = match self.matcher.resolve(observer, catalog, usage) {
            Resolution::Candidates { level, candidates } => (level, candidates),
            Resolution::NoClass => return unmatched(Outcome::NoClass),
            Resolution::NoEligible => return unmatched(Outcome::NoEligible),
        };

        let Some(selection) = self.policy.select(
            &candidates,
            &candidates,
            |c| c.emp_id.as_str(),
            |c| c.faculty_name.as_str(),
            rng,
        ) else {
            return unmatched(Outcome::NoEligible);
        };

        usage.record_subject(&selection.chosen.subject);
        if level > MatchLevel::Strict {
            debug!(
                observer = %observer.emp_id,
                day = %observer.day,
                slot = %observer.time_slot,
                level = level.label(),
                "relaxed constraints to find a class"
            );
        }

        Assignment {
            day: observer.day.clone(),
            time_slot: observer.time_slot.clone(),
            observer: Some(observer.clone()),
            class: Some(selection.chosen.clone()),
            alternatives: selection.alternatives,
            outcome: Outcome::Matched(level),
        }
    }

    /// Picks a class per (day, slot) group and sends one of the group's peers
    fn assign_peers<R: Rng>(
        &self,
        observers: &[&ObserverSlot],
        catalog: &SlotCatalog,
        usage: &mut UsageTracker,
        rng: &mut R,
    ) -> Vec<Assignment> {
        let mut assignments = Vec::new();

        for ((day, time_slot), group) in group_by_slot(observers) {
            let classes = catalog.candidates_for(&day, &time_slot);

            let fresh: Vec<&CandidateSlot> = if self.config.subject_uniqueness {
                classes
                    .iter()
                    .copied()
                    .filter(|c| !usage.is_subject_used(&c.subject))
                    .collect()
            } else {
                classes.clone()
            };
            let (level, pool) = if fresh.is_empty() {
                (MatchLevel::SubjectRepeat, classes)
            } else {
                (MatchLevel::Strict, fresh)
            };

            let Some(class) = self.policy.pick(&pool, rng) else {
                assignments.push(Assignment {
                    day,
                    time_slot,
                    observer: None,
                    class: None,
                    alternatives: Vec::new(),
                    outcome: Outcome::NoClass,
                });
                continue;
            };
            usage.record_subject(&class.subject);

            let mut seen = HashSet::new();
            let eligible: Vec<&ObserverSlot> = group
                .iter()
                .copied()
                .filter(|peer| peer.emp_id != class.emp_id)
                .filter(|peer| seen.insert(peer.emp_id.as_str()))
                .collect();

            let pool: Vec<&ObserverSlot> = if self.config.observer_rotation {
                let (pool, rotation) = usage.rotation_pool(&eligible, |p| p.emp_id.as_str());
                if rotation == Rotation::Reset {
                    info!(
                        day = %day,
                        slot = %time_slot,
                        "every eligible peer already assigned, rotation restarted"
                    );
                }
                pool.into_iter().copied().collect()
            } else {
                eligible.clone()
            };

            let selection = self.policy.select(
                &pool,
                &eligible,
                |p| p.emp_id.as_str(),
                |p| p.name.as_str(),
                rng,
            );

            let assignment = match selection {
                Some(selection) => {
                    usage.record_observer(&selection.chosen.emp_id);
                    Assignment {
                        day,
                        time_slot,
                        observer: Some(selection.chosen.clone()),
                        class: Some(class.clone()),
                        alternatives: selection.alternatives,
                        outcome: Outcome::Matched(level),
                    }
                }
                None => Assignment {
                    day,
                    time_slot,
                    observer: None,
                    class: Some(class.clone()),
                    alternatives: Vec::new(),
                    outcome: Outcome::NoEligible,
                },
            };
            assignments.push(assignment);
        }

        assignments
    }
}

/// Groups observer slots by parsed day, keeping table order inside each day
fn group_by_day(observers: &[ObserverSlot]) -> AssignResult<HashMap<Day, Vec<&ObserverSlot>>> {
    let mut by_day: HashMap<Day, Vec<&ObserverSlot>> = HashMap::new();
    for observer in observers {
        let day: Day = observer.day.parse()?;
        by_day.entry(day).or_default().push(observer);
    }
    Ok(by_day)
}

/// Groups observer slots by (day, slot) in order of first appearance
fn group_by_slot<'a>(
    observers: &[&'a ObserverSlot],
) -> Vec<((String, String), Vec<&'a ObserverSlot>)> {
    let mut groups: Vec<((String, String), Vec<&'a ObserverSlot>)> = Vec::new();
    let mut index: HashMap<(String, String), usize> = HashMap::new();

    for &observer in observers {
        let key = (observer.day.clone(), observer.time_slot.clone());
        match index.get(&key) {
            Some(&idx) => groups[idx].1.push(observer),
            None => {
                index.insert(key.clone(), groups.len());
                groups.push((key, vec![observer]));
            }
        }
    }

    groups
}
