pub mod types;
pub mod slot_utils;
pub mod seed;
pub mod catalog;
pub mod usage;
pub mod relaxation;
pub mod selection;
pub mod builder;
pub mod generator;

pub use types::{Assignment, CandidateSlot, Day, MatchLevel, ObserverSlot, Outcome, ScopeSchedule};
pub use slot_utils::{mail_slot, TimeConvention};
pub use seed::{SeedSource, WeekScope};
pub use catalog::SlotCatalog;
pub use usage::{Rotation, UsageTracker};
pub use relaxation::{RelaxationMatcher, Resolution};
pub use selection::{render_alternatives, Selection, SelectionPolicy};
pub use builder::{build_record, AssignmentBuilder, AssignmentRecord};
pub use generator::{GenerationReport, Generator, ScopeFailure};
