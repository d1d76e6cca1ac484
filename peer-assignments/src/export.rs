use std::fs::File;
use std::io::Write;
use std::path::Path;

use csv::WriterBuilder;
use tracing::info;

use crate::error::AssignResult;
use crate::schedule::AssignmentRecord;

/// Writes the output table as CSV with a header row
pub fn write_records<W: Write>(writer: W, records: &[AssignmentRecord]) -> AssignResult<()> {
    let mut wtr = WriterBuilder::new().has_headers(true).from_writer(writer);
    for record in records {
        wtr.serialize(record)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Renders the output table into an in-memory CSV document
pub fn records_to_csv(records: &[AssignmentRecord]) -> AssignResult<Vec<u8>> {
    let mut buffer = Vec::new();
    write_records(&mut buffer, records)?;
    Ok(buffer)
}

/// Exports the output table to a CSV file, replacing any previous export
pub fn export_csv(records: &[AssignmentRecord], csv_path: &Path) -> AssignResult<()> {
    let file = File::create(csv_path)?;
    write_records(file, records)?;
    info!(path = %csv_path.display(), rows = records.len(), "wrote assignment table");
    Ok(())
}

/// Exports the output table as a JSON array
pub fn export_json(records: &[AssignmentRecord], json_path: &Path) -> AssignResult<()> {
    let file = File::create(json_path)?;
    serde_json::to_writer_pretty(file, records)?;
    info!(path = %json_path.display(), rows = records.len(), "wrote assignment json");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(subject: &str) -> AssignmentRecord {
        AssignmentRecord {
            week_start: "19-10-2026".to_string(),
            week_end: "23-10-2026".to_string(),
            day: "Monday".to_string(),
            date: String::new(),
            time_slot: "10:00-11:00".to_string(),
            mail_slot: "10:00".to_string(),
            observer_id: "1".to_string(),
            observer_name: "Asha".to_string(),
            observer_email: String::new(),
            faculty_id: "2".to_string(),
            faculty_name: "Ben".to_string(),
            subject: subject.to_string(),
            building: String::new(),
            room: String::new(),
            semester: String::new(),
            alternatives: "Chen, Dara".to_string(),
            match_level: "L1 strict".to_string(),
        }
    }

    #[test]
    fn test_csv_uses_table_column_names() {
        let csv = String::from_utf8(records_to_csv(&[record("Math")]).unwrap()).unwrap();
        let mut lines = csv.lines();
        let header = lines.next().unwrap();
        assert!(header.starts_with("Week Start Date,Week End Date,Day,Date,Time Slot,Mail Slot"));
        assert!(header.ends_with("Alternative Faculty,Match Level"));
        // Alternatives contain a comma and must be quoted
        assert!(lines.next().unwrap().contains("\"Chen, Dara\""));
    }

    #[test]
    fn test_csv_reads_back_into_records() {
        let records = vec![record("Math"), record("Physics")];
        let csv = records_to_csv(&records).unwrap();
        let mut reader = csv::Reader::from_reader(csv.as_slice());
        let parsed: Vec<AssignmentRecord> = reader.deserialize().collect::<Result<_, _>>().unwrap();
        assert_eq!(parsed, records);
    }
}
