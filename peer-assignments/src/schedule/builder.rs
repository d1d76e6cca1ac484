use serde::{Deserialize, Serialize};

use super::seed::WeekScope;
use super::selection::render_alternatives;
use super::slot_utils::{mail_slot, TimeConvention};
use super::types::{Assignment, Day, Outcome, ScopeSchedule};

/// Subject shown when there is no class to visit
pub const NO_CLASS: &str = "No Class";
/// Subject shown when classes exist but none could be assigned
pub const NO_SUBJECT: &str = "No Subject Available";
/// Faculty shown for unmatched rows
pub const NO_FACULTY: &str = "NA";
/// Observer shown when nobody could be sent
pub const NO_OBSERVER: &str = "None";

const DATE_FORMAT: &str = "%d-%m-%Y";

/// One row of the output table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentRecord {
    #[serde(rename = "Week Start Date")]
    pub week_start: String,
    #[serde(rename = "Week End Date")]
    pub week_end: String,
    #[serde(rename = "Day")]
    pub day: String,
    #[serde(rename = "Date")]
    pub date: String,
    #[serde(rename = "Time Slot")]
    pub time_slot: String,
    #[serde(rename = "Mail Slot")]
    pub mail_slot: String,
    #[serde(rename = "Observer ID")]
    pub observer_id: String,
    #[serde(rename = "Observer Name")]
    pub observer_name: String,
    #[serde(rename = "Observer Email")]
    pub observer_email: String,
    #[serde(rename = "Faculty ID")]
    pub faculty_id: String,
    #[serde(rename = "Faculty Name")]
    pub faculty_name: String,
    #[serde(rename = "Subject")]
    pub subject: String,
    #[serde(rename = "Building")]
    pub building: String,
    #[serde(rename = "Room No.")]
    pub room: String,
    #[serde(rename = "Sem")]
    pub semester: String,
    #[serde(rename = "Alternative Faculty")]
    pub alternatives: String,
    #[serde(rename = "Match Level")]
    pub match_level: String,
}

impl AssignmentRecord {
    pub fn is_unmatched(&self) -> bool {
        self.subject == NO_CLASS || self.subject == NO_SUBJECT || self.observer_name == NO_OBSERVER
    }
}

fn outcome_label(outcome: &Outcome) -> String {
    match outcome {
        Outcome::Matched(level) => level.label().to_string(),
        Outcome::NoClass => "no class".to_string(),
        Outcome::NoEligible => "no eligible candidate".to_string(),
    }
}

/// Builds the output record for one assignment.
///
/// `day` is set for per-day runs and fills the Date column.
pub fn build_record(
    assignment: &Assignment,
    week: WeekScope,
    day: Option<Day>,
    convention: TimeConvention,
) -> AssignmentRecord {
    let (observer_id, observer_name, observer_email) = match &assignment.observer {
        Some(observer) => (
            observer.emp_id.clone(),
            observer.name.clone(),
            observer.email.clone().unwrap_or_default(),
        ),
        None => (String::new(), NO_OBSERVER.to_string(), String::new()),
    };

    let (faculty_id, faculty_name, subject, building, room, semester) = match &assignment.class {
        Some(class) => (
            class.emp_id.clone(),
            class.faculty_name.clone(),
            class.subject.clone(),
            class.building.clone().unwrap_or_default(),
            class.room.clone().unwrap_or_default(),
            class.semester.clone().unwrap_or_default(),
        ),
        None => {
            let subject = match assignment.outcome {
                Outcome::NoClass => NO_CLASS,
                _ => NO_SUBJECT,
            };
            (
                String::new(),
                NO_FACULTY.to_string(),
                subject.to_string(),
                String::new(),
                String::new(),
                String::new(),
            )
        }
    };

    AssignmentRecord {
        week_start: week.start_date().format(DATE_FORMAT).to_string(),
        week_end: week.end_date().format(DATE_FORMAT).to_string(),
        day: assignment.day.clone(),
        date: day
            .map(|d| week.date_of(d).format(DATE_FORMAT).to_string())
            .unwrap_or_default(),
        time_slot: assignment.time_slot.clone(),
        mail_slot: mail_slot(&assignment.time_slot, convention).unwrap_or_default(),
        observer_id,
        observer_name,
        observer_email,
        faculty_id,
        faculty_name,
        subject,
        building,
        room,
        semester,
        alternatives: render_alternatives(&assignment.alternatives),
        match_level: outcome_label(&assignment.outcome),
    }
}

/// Accumulates output records across scopes
#[derive(Debug, Clone)]
pub struct AssignmentBuilder {
    week: WeekScope,
    convention: TimeConvention,
    records: Vec<AssignmentRecord>,
}

impl AssignmentBuilder {
    pub fn new(week: WeekScope, convention: TimeConvention) -> Self {
        AssignmentBuilder {
            week,
            convention,
            records: Vec::new(),
        }
    }

    pub fn push(&mut self, assignment: &Assignment, day: Option<Day>) {
        self.records
            .push(build_record(assignment, self.week, day, self.convention));
    }

    pub fn push_scope(&mut self, scope: &ScopeSchedule) {
        for assignment in &scope.assignments {
            self.push(assignment, scope.day);
        }
    }

    pub fn finish(self) -> Vec<AssignmentRecord> {
        self.records
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::types::{CandidateSlot, MatchLevel, ObserverSlot};

    fn week() -> WeekScope {
        WeekScope::new(2026, 43).unwrap()
    }

    fn observer() -> ObserverSlot {
        ObserverSlot {
            day: "Tuesday".to_string(),
            time_slot: "09:00-10:00".to_string(),
            emp_id: "1".to_string(),
            name: "Asha".to_string(),
            email: Some("asha@example.edu".to_string()),
        }
    }

    fn class() -> CandidateSlot {
        CandidateSlot {
            day: "Tuesday".to_string(),
            time_slot: "09:00-10:00".to_string(),
            emp_id: "2".to_string(),
            faculty_name: "Ben".to_string(),
            subject: "Math".to_string(),
            building: Some("A".to_string()),
            room: Some("101".to_string()),
            semester: None,
        }
    }

    #[test]
    fn test_matched_record_copies_class_fields() {
        let assignment = Assignment {
            day: "Tuesday".to_string(),
            time_slot: "09:00-10:00".to_string(),
            observer: Some(observer()),
            class: Some(class()),
            alternatives: vec!["Chen".to_string(), "Dara".to_string()],
            outcome: Outcome::Matched(MatchLevel::Strict),
        };
        let record = build_record(&assignment, week(), Some(Day::Tuesday), TimeConvention::Clock24);

        assert_eq!(record.week_start, "19-10-2026");
        assert_eq!(record.week_end, "23-10-2026");
        assert_eq!(record.date, "20-10-2026");
        assert_eq!(record.mail_slot, "09:00");
        assert_eq!(record.observer_email, "asha@example.edu");
        assert_eq!(record.faculty_name, "Ben");
        assert_eq!(record.subject, "Math");
        assert_eq!(record.room, "101");
        assert_eq!(record.semester, "");
        assert_eq!(record.alternatives, "Chen, Dara");
        assert_eq!(record.match_level, "L1 strict");
        assert!(!record.is_unmatched());
    }

    #[test]
    fn test_no_class_record_uses_sentinels() {
        let assignment = Assignment {
            day: "Tuesday".to_string(),
            time_slot: "09:00-10:00".to_string(),
            observer: Some(observer()),
            class: None,
            alternatives: Vec::new(),
            outcome: Outcome::NoClass,
        };
        let record = build_record(&assignment, week(), None, TimeConvention::Clock24);

        assert_eq!(record.subject, NO_CLASS);
        assert_eq!(record.faculty_name, NO_FACULTY);
        assert_eq!(record.alternatives, "None");
        assert_eq!(record.date, "");
        assert!(record.is_unmatched());
    }

    #[test]
    fn test_no_eligible_record_keeps_distinct_sentinel() {
        let assignment = Assignment {
            day: "Tuesday".to_string(),
            time_slot: "09:00-10:00".to_string(),
            observer: Some(observer()),
            class: None,
            alternatives: Vec::new(),
            outcome: Outcome::NoEligible,
        };
        let record = build_record(&assignment, week(), None, TimeConvention::Clock24);
        assert_eq!(record.subject, NO_SUBJECT);
        assert_eq!(record.match_level, "no eligible candidate");
    }

    #[test]
    fn test_peer_without_observer_renders_none() {
        let assignment = Assignment {
            day: "Tuesday".to_string(),
            time_slot: "09:00-10:00".to_string(),
            observer: None,
            class: Some(class()),
            alternatives: Vec::new(),
            outcome: Outcome::NoEligible,
        };
        let record = build_record(&assignment, week(), None, TimeConvention::Clock24);
        assert_eq!(record.observer_name, NO_OBSERVER);
        assert_eq!(record.subject, "Math");
        assert!(record.is_unmatched());
    }

    #[test]
    fn test_builder_accumulates_in_order() {
        let scope = ScopeSchedule {
            label: "2026-W43-Tuesday".to_string(),
            day: Some(Day::Tuesday),
            assignments: vec![
                Assignment {
                    day: "Tuesday".to_string(),
                    time_slot: "09:00-10:00".to_string(),
                    observer: Some(observer()),
                    class: Some(class()),
                    alternatives: Vec::new(),
                    outcome: Outcome::Matched(MatchLevel::Strict),
                },
                Assignment {
                    day: "Tuesday".to_string(),
                    time_slot: "10:00-11:00".to_string(),
                    observer: Some(observer()),
                    class: None,
                    alternatives: Vec::new(),
                    outcome: Outcome::NoClass,
                },
            ],
            rotation_resets: 0,
        };

        let mut builder = AssignmentBuilder::new(week(), TimeConvention::Clock24);
        builder.push_scope(&scope);
        let records = builder.finish();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].time_slot, "09:00-10:00");
        assert_eq!(records[1].subject, NO_CLASS);
        assert_eq!(records[1].date, "20-10-2026");
    }
}
