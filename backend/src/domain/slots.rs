//! Pure slot generation over `HH:MM` time-of-day strings.

use chrono::{NaiveTime, Timelike};

/// Step between consecutive slots, in minutes.
pub const SLOT_INTERVAL_MINUTES: u32 = 30;

/// Fixed sequence returned when the working window cannot be parsed.
///
/// Covers a typical clinic day (morning block plus afternoon block) so a
/// misconfigured window degrades to something bookable instead of an error.
const FALLBACK_SLOTS: [&str; 14] = [
    "09:00", "09:30", "10:00", "10:30", "11:00", "11:30", "12:00", "12:30", "14:00", "14:30",
    "15:00", "15:30", "16:00", "16:30",
];

fn minutes_of_day(raw: &str) -> Option<u32> {
    let time = NaiveTime::parse_from_str(raw, "%H:%M").ok()?;
    Some(time.hour() * 60 + time.minute())
}

fn format_slot(minutes: u32) -> String {
    format!("{:02}:{:02}", minutes / 60, minutes % 60)
}

/// Generate the ordered slot sequence covering `[start, end)`.
///
/// Returns strictly increasing `HH:MM` strings stepped by `interval_minutes`;
/// the end time is excluded. Any unparsable input (including a zero interval)
/// yields the deterministic fallback sequence rather than an error, so
/// callers always receive a usable list.
///
/// # Examples
/// ```
/// use backend::domain::slots::generate_time_slots;
///
/// let slots = generate_time_slots("09:00", "10:00", 30);
/// assert_eq!(slots, vec!["09:00", "09:30"]);
/// ```
#[must_use]
pub fn generate_time_slots(start: &str, end: &str, interval_minutes: u32) -> Vec<String> {
    let (Some(start_min), Some(end_min)) = (minutes_of_day(start), minutes_of_day(end)) else {
        return fallback_slots();
    };
    if interval_minutes == 0 {
        return fallback_slots();
    }

    let mut slots = Vec::new();
    let mut current = start_min;
    while current < end_min {
        slots.push(format_slot(current));
        current += interval_minutes;
    }
    slots
}

fn fallback_slots() -> Vec<String> {
    FALLBACK_SLOTS.iter().map(|slot| (*slot).to_owned()).collect()
}
