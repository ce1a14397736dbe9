//! Attendance records and the derived-hours rule.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

/// Fixed lunch break deducted from every workday, in hours.
pub const LUNCH_BREAK_HOURS: f64 = 1.0;

/// Clock-time format used throughout the ledgers ("08:00").
pub const CLOCK_FORMAT: &str = "%H:%M";

/// Calendar-date format used throughout the ledgers ("2025-12-15").
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// One clock-in/clock-out entry for an employee on a given day.
///
/// `total_hours` is always derived from the clock times, never entered
/// directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttendanceRecord {
    /// Employee code. The Sheets ledger keys by name only and carries none.
    pub employee_id: Option<String>,
    pub employee_name: String,
    pub date: NaiveDate,
    pub time_in: NaiveTime,
    pub time_out: NaiveTime,
    pub total_hours: f64,
    pub note: String,
}

impl AttendanceRecord {
    /// Build a record, deriving `total_hours` from the clock times.
    pub fn new(
        employee_id: Option<String>,
        employee_name: impl Into<String>,
        date: NaiveDate,
        time_in: NaiveTime,
        time_out: NaiveTime,
        note: impl Into<String>,
    ) -> Self {
        Self {
            employee_id,
            employee_name: employee_name.into(),
            date,
            time_in,
            time_out,
            total_hours: worked_hours(time_in, time_out),
            note: note.into(),
        }
    }

    /// Month partition this record belongs to.
    pub fn partition_key(&self) -> String {
        partition_key(self.date)
    }
}

/// Month key ("YYYY-MM") for a calendar date.
pub fn partition_key(date: NaiveDate) -> String {
    date.format("%Y-%m").to_string()
}

/// Worked hours between two same-day clock times, minus the lunch break,
/// clamped at zero and rounded to 2 decimal places.
///
/// A time-out at or before the time-in yields 0.0; shifts crossing midnight
/// are not supported.
pub fn worked_hours(time_in: NaiveTime, time_out: NaiveTime) -> f64 {
    let minutes = (time_out - time_in).num_minutes() as f64;
    let hours = minutes / 60.0 - LUNCH_BREAK_HOURS;
    round_hours(hours.max(0.0))
}

/// String-level variant for form input: blank or malformed times yield 0.0.
pub fn compute_hours(time_in: &str, time_out: &str) -> f64 {
    match (parse_clock(time_in), parse_clock(time_out)) {
        (Some(t_in), Some(t_out)) => worked_hours(t_in, t_out),
        _ => 0.0,
    }
}

/// Parse an "HH:MM" clock time, treating blank input as absent.
pub fn parse_clock(value: &str) -> Option<NaiveTime> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    NaiveTime::parse_from_str(value, CLOCK_FORMAT).ok()
}

/// Round to the 2 decimal places stored in the ledgers.
pub(crate) fn round_hours(hours: f64) -> f64 {
    (hours * 100.0).round() / 100.0
}
