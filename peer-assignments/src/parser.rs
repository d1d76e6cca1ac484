use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, StringRecord, Trim};
use tracing::{debug, info};

use crate::error::{AssignError, AssignResult};
use crate::schedule::slot_utils::{canonical_slot, TimeConvention};
use crate::schedule::types::{CandidateSlot, Day, ObserverSlot};

/// Sheet holding the observers' availability
pub const OBSERVER_SHEET: &str = "Peerslots";
/// Sheet holding the classes being taught
pub const CANDIDATE_SHEET: &str = "Busy_fac";

/// Both tables after header normalization and status filtering
#[derive(Debug, Clone, Default)]
pub struct InputTables {
    pub observers: Vec<ObserverSlot>,
    pub candidates: Vec<CandidateSlot>,
}

/// Where the two tables come from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSource {
    Files { observers: PathBuf, candidates: PathBuf },
    /// Directory holding one CSV export per sheet
    Dir(PathBuf),
}

impl InputSource {
    pub fn load(&self, convention: TimeConvention) -> AssignResult<InputTables> {
        match self {
            InputSource::Files {
                observers,
                candidates,
            } => load_tables(observers, candidates, convention),
            InputSource::Dir(dir) => load_tables_from_dir(dir, convention),
        }
    }
}

/// Finds a column by any of its accepted names, ignoring case and padding
fn find_column(headers: &StringRecord, aliases: &[&str]) -> Option<usize> {
    headers.iter().position(|h| {
        let h = h.trim().to_lowercase();
        aliases.iter().any(|alias| h == alias.to_lowercase())
    })
}

fn require_column(headers: &StringRecord, aliases: &[&str], table: &str) -> AssignResult<usize> {
    find_column(headers, aliases).ok_or_else(|| {
        AssignError::Configuration(format!(
            "{} table has no {:?} column (found: {})",
            table,
            aliases[0],
            headers.iter().collect::<Vec<_>>().join(", ")
        ))
    })
}

fn cell(record: &StringRecord, col: usize) -> String {
    record.get(col).unwrap_or("").trim().to_string()
}

fn optional_cell(record: &StringRecord, col: Option<usize>) -> Option<String> {
    col.map(|c| cell(record, c)).filter(|v| !v.is_empty())
}

/// The slot in its canonical spelling, or a configuration error naming the row
fn normalize_time_slot(
    time_slot: &str,
    convention: TimeConvention,
    table: &str,
    record: &StringRecord,
) -> AssignResult<String> {
    if let Some(slot) = canonical_slot(time_slot, convention) {
        return Ok(slot);
    }
    let line = record.position().map(|p| p.line()).unwrap_or(0);
    Err(AssignError::Configuration(format!(
        "{} line {}: time slot {:?} does not follow the {:?} convention (expected e.g. {:?})",
        table,
        line,
        time_slot,
        convention,
        convention.example()
    )))
}

/// Full weekday name when the cell names one; other values are kept as written
fn normalize_day(day: String) -> String {
    match day.parse::<Day>() {
        Ok(parsed) => parsed.name().to_string(),
        Err(_) => day,
    }
}

fn open_table(path: &Path, table: &str) -> AssignResult<File> {
    if !path.exists() {
        return Err(AssignError::Configuration(format!(
            "required table {} not found at {}",
            table,
            path.display()
        )));
    }
    Ok(File::open(path)?)
}

/// Reads the observer table, keeping only rows whose status is "free"
pub fn read_observer_slots<R: Read>(
    reader: R,
    convention: TimeConvention,
) -> AssignResult<Vec<ObserverSlot>> {
    let table = OBSERVER_SHEET;
    let mut reader = ReaderBuilder::new()
        .flexible(true)
        .trim(Trim::All)
        .from_reader(reader);
    let headers = reader.headers()?.clone();

    let day_col = require_column(&headers, &["Day"], table)?;
    let slot_col = require_column(&headers, &["Time Slot"], table)?;
    let id_col = require_column(&headers, &["Emp ID"], table)?;
    let name_col = require_column(&headers, &["Peer Name", "Faculty Name", "Name"], table)?;
    let status_col = require_column(&headers, &["Status"], table)?;
    let email_col = find_column(&headers, &["Email", "Email ID", "Mail"]);

    let mut observers = Vec::new();
    let mut skipped = 0usize;

    for result in reader.records() {
        let record = result?;

        if !cell(&record, status_col).eq_ignore_ascii_case("free") {
            continue;
        }

        let day = cell(&record, day_col);
        let time_slot = cell(&record, slot_col);
        let emp_id = cell(&record, id_col);

        // Skip if essential fields are missing
        if day.is_empty() || time_slot.is_empty() || emp_id.is_empty() {
            skipped += 1;
            continue;
        }
        let day = normalize_day(day);
        let time_slot = normalize_time_slot(&time_slot, convention, table, &record)?;

        observers.push(ObserverSlot {
            day,
            time_slot,
            emp_id,
            name: cell(&record, name_col),
            email: optional_cell(&record, email_col),
        });
    }

    if skipped > 0 {
        debug!(table, skipped, "skipped incomplete rows");
    }
    Ok(observers)
}

/// Reads the candidate table; when it has a Status column only "busy" rows are kept
pub fn read_candidate_slots<R: Read>(
    reader: R,
    convention: TimeConvention,
) -> AssignResult<Vec<CandidateSlot>> {
    let table = CANDIDATE_SHEET;
    let mut reader = ReaderBuilder::new()
        .flexible(true)
        .trim(Trim::All)
        .from_reader(reader);
    let headers = reader.headers()?.clone();

    let day_col = require_column(&headers, &["Day"], table)?;
    let slot_col = require_column(&headers, &["Time Slot"], table)?;
    let id_col = require_column(&headers, &["Emp ID"], table)?;
    let name_col = require_column(&headers, &["Faculty Name", "Name"], table)?;
    let subject_col = require_column(&headers, &["Subject", "Class"], table)?;
    let building_col = find_column(&headers, &["Building"]);
    let room_col = find_column(&headers, &["Room No.", "Room No", "Room"]);
    let sem_col = find_column(&headers, &["Sem", "Semester"]);
    let status_col = find_column(&headers, &["Status"]);

    let mut candidates = Vec::new();
    let mut skipped = 0usize;

    for result in reader.records() {
        let record = result?;

        if let Some(col) = status_col {
            if !cell(&record, col).eq_ignore_ascii_case("busy") {
                continue;
            }
        }

        let day = cell(&record, day_col);
        let time_slot = cell(&record, slot_col);
        let emp_id = cell(&record, id_col);
        let subject = cell(&record, subject_col);

        if day.is_empty() || time_slot.is_empty() || emp_id.is_empty() || subject.is_empty() {
            skipped += 1;
            continue;
        }
        let day = normalize_day(day);
        let time_slot = normalize_time_slot(&time_slot, convention, table, &record)?;

        candidates.push(CandidateSlot {
            day,
            time_slot,
            emp_id,
            faculty_name: cell(&record, name_col),
            subject,
            building: optional_cell(&record, building_col),
            room: optional_cell(&record, room_col),
            semester: optional_cell(&record, sem_col),
        });
    }

    if skipped > 0 {
        debug!(table, skipped, "skipped incomplete rows");
    }
    Ok(candidates)
}

/// Loads both tables from their CSV exports
pub fn load_tables<P: AsRef<Path>, Q: AsRef<Path>>(
    observers_path: P,
    candidates_path: Q,
    convention: TimeConvention,
) -> AssignResult<InputTables> {
    let observers_file = open_table(observers_path.as_ref(), OBSERVER_SHEET)?;
    let candidates_file = open_table(candidates_path.as_ref(), CANDIDATE_SHEET)?;

    let observers = read_observer_slots(observers_file, convention)?;
    let candidates = read_candidate_slots(candidates_file, convention)?;

    info!(
        free_observer_slots = observers.len(),
        busy_candidate_slots = candidates.len(),
        "loaded input tables"
    );
    Ok(InputTables {
        observers,
        candidates,
    })
}

/// Loads `Peerslots.csv` and `Busy_fac.csv` from one directory
pub fn load_tables_from_dir<P: AsRef<Path>>(
    dir: P,
    convention: TimeConvention,
) -> AssignResult<InputTables> {
    let dir = dir.as_ref();
    load_tables(
        dir.join(format!("{}.csv", OBSERVER_SHEET)),
        dir.join(format!("{}.csv", CANDIDATE_SHEET)),
        convention,
    )
}
