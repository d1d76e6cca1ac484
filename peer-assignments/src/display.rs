use crate::schedule::{AssignmentRecord, GenerationReport};

/// Formats an observer or faculty name with their employee id
pub fn format_person(emp_id: &str, name: &str) -> String {
    if emp_id.is_empty() {
        name.to_string()
    } else {
        format!("{} ({})", name, emp_id)
    }
}

/// Header line shown above every report, e.g. "Allocation Week 2026-W43: 19-10-2026 to 23-10-2026"
pub fn week_banner(report: &GenerationReport) -> String {
    format!(
        "Allocation Week {}: {} to {}",
        report.week,
        report.week.start_date().format("%d-%m-%Y"),
        report.week.end_date().format("%d-%m-%Y")
    )
}

/// Prints the generated table grouped by day, in table order
pub fn print_report(report: &GenerationReport, records: &[AssignmentRecord]) {
    println!("\n=== {} ===", week_banner(report));
    println!(
        "Total assignments: {} ({} matched)",
        records.len(),
        records.iter().filter(|r| !r.is_unmatched()).count()
    );

    for failure in &report.failures {
        println!("⚠️  {} skipped: {}", failure.label, failure.error);
    }

    let resets: u32 = report.scopes.iter().map(|s| s.rotation_resets).sum();
    if resets > 0 {
        println!("Observer rotation restarted {} time(s)", resets);
    }

    let mut current_day: Option<&str> = None;
    for record in records {
        if current_day != Some(record.day.as_str()) {
            if record.date.is_empty() {
                println!("\n--- {} ---", record.day);
            } else {
                println!("\n--- {} ({}) ---", record.day, record.date);
            }
            current_day = Some(record.day.as_str());
        }

        let observer = format_person(&record.observer_id, &record.observer_name);
        if record.is_unmatched() && record.faculty_id.is_empty() {
            println!("  {} {} -> [{}]", record.time_slot, observer, record.subject);
        } else {
            println!(
                "  {} {} -> {} by {} [{}] (alternatives: {})",
                record.time_slot,
                observer,
                record.subject,
                format_person(&record.faculty_id, &record.faculty_name),
                record.match_level,
                record.alternatives
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_person() {
        assert_eq!(format_person("7", "Dara"), "Dara (7)");
        assert_eq!(format_person("", "None"), "None");
    }
}
