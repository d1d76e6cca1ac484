use std::fmt;
use std::str::FromStr;

use chrono::Weekday;
use serde::{Deserialize, Serialize};

use crate::error::AssignError;

/// Weekday of a slot, ordered Monday first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Day {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl Day {
    pub const ALL: [Day; 7] = [
        Day::Monday,
        Day::Tuesday,
        Day::Wednesday,
        Day::Thursday,
        Day::Friday,
        Day::Saturday,
        Day::Sunday,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Day::Monday => "Monday",
            Day::Tuesday => "Tuesday",
            Day::Wednesday => "Wednesday",
            Day::Thursday => "Thursday",
            Day::Friday => "Friday",
            Day::Saturday => "Saturday",
            Day::Sunday => "Sunday",
        }
    }

    pub fn weekday(self) -> Weekday {
        match self {
            Day::Monday => Weekday::Mon,
            Day::Tuesday => Weekday::Tue,
            Day::Wednesday => Weekday::Wed,
            Day::Thursday => Weekday::Thu,
            Day::Friday => Weekday::Fri,
            Day::Saturday => Weekday::Sat,
            Day::Sunday => Weekday::Sun,
        }
    }
}

impl fmt::Display for Day {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Day {
    type Err = AssignError;

    /// Accepts full names and three-letter abbreviations, any case
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        Day::ALL
            .iter()
            .copied()
            .find(|day| {
                let name = day.name().to_lowercase();
                lower == name || (lower.len() == 3 && name.starts_with(&lower))
            })
            .ok_or_else(|| AssignError::InvalidDay(s.to_string()))
    }
}

/// A person free to observe a class in the given slot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObserverSlot {
    pub day: String,
    pub time_slot: String,
    pub emp_id: String,
    pub name: String,
    pub email: Option<String>,
}

/// A class being taught in the given slot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateSlot {
    pub day: String,
    pub time_slot: String,
    pub emp_id: String,
    pub faculty_name: String,
    pub subject: String,
    pub building: Option<String>,
    pub room: Option<String>,
    pub semester: Option<String>,
}

/// Step of the fallback chain that produced a candidate set.
///
/// Each level drops one constraint of the previous one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MatchLevel {
    /// Same slot, different person, unused subject
    Strict = 1,
    /// Same slot, different person
    SubjectRepeat = 2,
    /// Same slot
    IdentityClash = 3,
    /// Same day
    AnySlot = 4,
}

impl MatchLevel {
    pub const CHAIN: [MatchLevel; 4] = [
        MatchLevel::Strict,
        MatchLevel::SubjectRepeat,
        MatchLevel::IdentityClash,
        MatchLevel::AnySlot,
    ];

    pub fn number(self) -> u8 {
        self as u8
    }

    pub fn from_number(n: u8) -> Option<Self> {
        MatchLevel::CHAIN.iter().copied().find(|l| l.number() == n)
    }

    pub fn label(self) -> &'static str {
        match self {
            MatchLevel::Strict => "L1 strict",
            MatchLevel::SubjectRepeat => "L2 subject repeat",
            MatchLevel::IdentityClash => "L3 identity clash",
            MatchLevel::AnySlot => "L4 any slot",
        }
    }

    /// Whether candidates at this level must differ from the observer
    pub fn requires_distinct_identity(self) -> bool {
        self <= MatchLevel::SubjectRepeat
    }
}

/// How a slot was resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Outcome {
    Matched(MatchLevel),
    /// No class to visit at all
    NoClass,
    /// Classes exist but none passed the enabled constraints
    NoEligible,
}

impl Outcome {
    pub fn is_matched(&self) -> bool {
        matches!(self, Outcome::Matched(_))
    }

    pub fn level(&self) -> Option<MatchLevel> {
        match self {
            Outcome::Matched(level) => Some(*level),
            _ => None,
        }
    }
}

/// One row of a generated schedule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    pub day: String,
    pub time_slot: String,
    pub observer: Option<ObserverSlot>,
    pub class: Option<CandidateSlot>,
    pub alternatives: Vec<String>,
    pub outcome: Outcome,
}

/// Assignments produced for one scope (a day, or the whole week)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScopeSchedule {
    pub label: String,
    pub day: Option<Day>,
    pub assignments: Vec<Assignment>,
    /// Number of times observer rotation was exhausted and restarted
    pub rotation_resets: u32,
}

impl ScopeSchedule {
    pub fn matched_count(&self) -> usize {
        self.assignments.iter().filter(|a| a.outcome.is_matched()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_day_parsing_is_case_insensitive() {
        assert_eq!("monday".parse::<Day>().unwrap(), Day::Monday);
        assert_eq!(" TUESDAY ".parse::<Day>().unwrap(), Day::Tuesday);
        assert_eq!("Sat".parse::<Day>().unwrap(), Day::Saturday);
    }

    #[test]
    fn test_day_parsing_rejects_unknown_values() {
        let err = "Funday".parse::<Day>().unwrap_err();
        assert!(matches!(err, AssignError::InvalidDay(ref v) if v == "Funday"));
        assert!("Mo".parse::<Day>().is_err());
    }

    #[test]
    fn test_days_order_monday_first() {
        let mut days = vec![Day::Friday, Day::Monday, Day::Wednesday];
        days.sort();
        assert_eq!(days, vec![Day::Monday, Day::Wednesday, Day::Friday]);
    }

    #[test]
    fn test_match_level_identity_rule() {
        assert!(MatchLevel::Strict.requires_distinct_identity());
        assert!(MatchLevel::SubjectRepeat.requires_distinct_identity());
        assert!(!MatchLevel::IdentityClash.requires_distinct_identity());
        assert!(!MatchLevel::AnySlot.requires_distinct_identity());
        assert_eq!(MatchLevel::from_number(3), Some(MatchLevel::IdentityClash));
        assert_eq!(MatchLevel::from_number(5), None);
    }
}
