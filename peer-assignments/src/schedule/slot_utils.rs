use serde::{Deserialize, Serialize};

/// Convention used to read time-slot strings like "10:00-11:00".
///
/// Every slot of both tables is checked against one convention at load time,
/// there is no per-row guessing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TimeConvention {
    /// "HH:MM-HH:MM", hours 0-23, no AM/PM markers
    #[default]
    Clock24,
    /// "H:MM AM-H:MM PM", hours 1-12, both ends carry AM or PM
    Meridiem,
}

impl TimeConvention {
    pub fn example(self) -> &'static str {
        match self {
            TimeConvention::Clock24 => "10:00-11:00",
            TimeConvention::Meridiem => "10:00 AM-11:00 AM",
        }
    }
}

/// Parses a time string (HH:MM) to minutes since midnight
pub fn parse_time_to_minutes(time_str: &str) -> Option<u32> {
    let parts: Vec<&str> = time_str.split(':').collect();
    if parts.len() != 2 {
        return None;
    }
    let all_digits = |p: &&str| !p.is_empty() && p.chars().all(|c| c.is_ascii_digit());
    if parts[1].len() != 2 || !parts.iter().all(all_digits) {
        return None;
    }
    let hours: u32 = parts[0].parse().ok()?;
    let minutes: u32 = parts[1].parse().ok()?;
    if hours >= 24 || minutes >= 60 {
        return None;
    }
    Some(hours * 60 + minutes)
}

/// Formats minutes since midnight to time string (HH:MM)
pub fn minutes_to_time_string(minutes: u32) -> String {
    let hours = minutes / 60;
    let mins = minutes % 60;
    format!("{:02}:{:02}", hours % 24, mins)
}

/// Parses "H:MM AM" / "H:MMPM" to minutes since midnight
fn parse_meridiem_time(time_str: &str) -> Option<u32> {
    let upper = time_str.trim().to_uppercase();
    let (clock, is_pm) = if let Some(rest) = upper.strip_suffix("AM") {
        (rest.trim_end(), false)
    } else if let Some(rest) = upper.strip_suffix("PM") {
        (rest.trim_end(), true)
    } else {
        return None;
    };

    let minutes = parse_time_to_minutes(clock)?;
    let (hours, mins) = (minutes / 60, minutes % 60);
    if !(1..=12).contains(&hours) {
        return None;
    }

    // 12 AM is midnight, 12 PM is noon
    let hours24 = match (hours, is_pm) {
        (12, false) => 0,
        (12, true) => 12,
        (h, false) => h,
        (h, true) => h + 12,
    };
    Some(hours24 * 60 + mins)
}

fn parse_endpoint(endpoint: &str, convention: TimeConvention) -> Option<u32> {
    match convention {
        TimeConvention::Clock24 => parse_time_to_minutes(endpoint.trim()),
        TimeConvention::Meridiem => parse_meridiem_time(endpoint),
    }
}

/// Parses a slot range into (start, end) minutes since midnight.
///
/// Returns None if the string doesn't follow the convention or the range is empty.
pub fn parse_slot_range(time_slot: &str, convention: TimeConvention) -> Option<(u32, u32)> {
    let (start, end) = time_slot.split_once('-')?;
    let start = parse_endpoint(start, convention)?;
    let end = parse_endpoint(end, convention)?;
    if end <= start {
        return None;
    }
    Some((start, end))
}

/// Extracts the 24-hour start time of a slot, used as the mail slot column
pub fn mail_slot(time_slot: &str, convention: TimeConvention) -> Option<String> {
    parse_slot_range(time_slot, convention).map(|(start, _)| minutes_to_time_string(start))
}

/// Formats minutes since midnight as "H:MM AM" / "H:MM PM"
fn minutes_to_meridiem_string(minutes: u32) -> String {
    let hours = (minutes / 60) % 24;
    let suffix = if hours < 12 { "AM" } else { "PM" };
    let hours12 = match hours % 12 {
        0 => 12,
        h => h,
    };
    format!("{}:{:02} {}", hours12, minutes % 60, suffix)
}

/// Renders a slot in the single spelling used for matching.
///
/// "9:00 - 10:00" and "09:00-10:00" both become "09:00-10:00"; meridiem
/// slots become "9:00 AM-10:00 AM".
pub fn canonical_slot(time_slot: &str, convention: TimeConvention) -> Option<String> {
    let (start, end) = parse_slot_range(time_slot, convention)?;
    let render = match convention {
        TimeConvention::Clock24 => minutes_to_time_string,
        TimeConvention::Meridiem => minutes_to_meridiem_string,
    };
    Some(format!("{}-{}", render(start), render(end)))
}
