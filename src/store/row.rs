//! Row codecs shared by both storage backends.
//!
//! Fixed column order per partition:
//! `[EmployeeId?, EmployeeName, Date, TimeIn, TimeOut, TotalHours, Note]`.
//! The CSV ledger includes the employee code; the Sheets ledger keys by
//! name only, so its rows omit the leading column.

use chrono::{NaiveDate, NaiveTime};

use crate::models::attendance::{AttendanceRecord, CLOCK_FORMAT, DATE_FORMAT, worked_hours};
use crate::models::employee::Employee;

/// Header row for CSV month partitions.
pub const LEDGER_HEADER: [&str; 7] = [
    "Employee ID",
    "Employee Name",
    "Date",
    "Time In",
    "Time Out",
    "Total Hours",
    "Note",
];

/// Header row for Sheets month partitions (no employee code).
pub const SHEET_HEADER: [&str; 6] = [
    "Employee Name",
    "Date",
    "Time In",
    "Time Out",
    "Total Hours",
    "Note",
];

/// Header row for the CSV roster.
pub const ROSTER_HEADER: [&str; 4] = ["Employee ID", "Employee Name", "Department", "Position"];

/// Header row for the Sheets roster.
pub const SHEET_ROSTER_HEADER: [&str; 2] = ["Employee Name", "Daily Wage"];

/// Encode a record into one ledger row.
pub fn encode_record(record: &AttendanceRecord, with_id: bool) -> Vec<String> {
    let mut row = Vec::with_capacity(7);
    if with_id {
        row.push(record.employee_id.clone().unwrap_or_default());
    }
    row.push(record.employee_name.clone());
    row.push(record.date.format(DATE_FORMAT).to_string());
    row.push(record.time_in.format(CLOCK_FORMAT).to_string());
    row.push(record.time_out.format(CLOCK_FORMAT).to_string());
    row.push(format!("{:.2}", record.total_hours));
    row.push(record.note.clone());
    row
}

/// Decode one ledger row, or `None` for rows that do not parse.
///
/// The Sheets API omits trailing empty cells, so a missing note column is
/// tolerated; a stored total that does not parse is re-derived from the
/// clock times.
pub fn decode_record(row: &[String], with_id: bool) -> Option<AttendanceRecord> {
    let (employee_id, rest) = if with_id {
        let id = row.first()?.trim();
        let id = (!id.is_empty()).then(|| id.to_string());
        (id, &row[1..])
    } else {
        (None, row)
    };

    let employee_name = rest.first()?.trim();
    if employee_name.is_empty() {
        return None;
    }
    let date = NaiveDate::parse_from_str(rest.get(1)?.trim(), DATE_FORMAT).ok()?;
    let time_in = NaiveTime::parse_from_str(rest.get(2)?.trim(), CLOCK_FORMAT).ok()?;
    let time_out = NaiveTime::parse_from_str(rest.get(3)?.trim(), CLOCK_FORMAT).ok()?;
    let total_hours = rest
        .get(4)
        .and_then(|v| v.trim().parse::<f64>().ok())
        .unwrap_or_else(|| worked_hours(time_in, time_out));
    let note = rest.get(5).cloned().unwrap_or_default();

    Some(AttendanceRecord {
        employee_id,
        employee_name: employee_name.to_string(),
        date,
        time_in,
        time_out,
        total_hours,
        note,
    })
}

/// Encode a roster entry into one row of the backend's roster layout.
pub fn encode_employee(employee: &Employee, with_id: bool) -> Vec<String> {
    if with_id {
        vec![
            employee.id.clone().unwrap_or_default(),
            employee.name.clone(),
            employee.department.clone().unwrap_or_default(),
            employee.position.clone().unwrap_or_default(),
        ]
    } else {
        vec![
            employee.name.clone(),
            employee.daily_wage.map(|w| w.to_string()).unwrap_or_default(),
        ]
    }
}

/// Decode one roster row, or `None` for rows that do not parse.
pub fn decode_employee(row: &[String], with_id: bool) -> Option<Employee> {
    fn non_blank(value: Option<&String>) -> Option<String> {
        value.map(|v| v.trim()).filter(|v| !v.is_empty()).map(str::to_string)
    }

    if with_id {
        let name = row.get(1)?.trim();
        if name.is_empty() {
            return None;
        }
        Some(Employee {
            id: non_blank(row.first()),
            name: name.to_string(),
            department: non_blank(row.get(2)),
            position: non_blank(row.get(3)),
            daily_wage: None,
        })
    } else {
        let name = row.first()?.trim();
        if name.is_empty() {
            return None;
        }
        Some(Employee {
            id: None,
            name: name.to_string(),
            department: None,
            position: None,
            daily_wage: row.get(1).and_then(|v| v.trim().parse::<f64>().ok()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn record() -> AttendanceRecord {
        AttendanceRecord::new(
            Some("E001".to_string()),
            "An Nguyen",
            NaiveDate::from_ymd_opt(2025, 12, 15).unwrap(),
            NaiveTime::parse_from_str("08:00", CLOCK_FORMAT).unwrap(),
            NaiveTime::parse_from_str("17:00", CLOCK_FORMAT).unwrap(),
            "late bus",
        )
    }

    #[test]
    fn test_record_round_trip_with_id() {
        let original = record();
        let row = encode_record(&original, true);
        assert_eq!(row.len(), LEDGER_HEADER.len());
        assert_eq!(row[5], "8.00");

        let decoded = decode_record(&row, true).unwrap();
        assert_eq!(decoded, original);
    }

    #[test]
    fn test_record_round_trip_name_keyed() {
        let mut original = record();
        original.employee_id = None;

        let row = encode_record(&original, false);
        assert_eq!(row.len(), SHEET_HEADER.len());

        let decoded = decode_record(&row, false).unwrap();
        assert_eq!(decoded, original);
    }

    #[test]
    fn test_missing_trailing_note_tolerated() {
        let row: Vec<String> = ["An Nguyen", "2025-12-15", "08:00", "17:00", "8"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let decoded = decode_record(&row, false).unwrap();
        assert_eq!(decoded.note, "");
        assert_eq!(decoded.total_hours, 8.0);
    }

    #[test]
    fn test_bad_rows_skipped() {
        let blank: Vec<String> = vec!["".into(), "".into()];
        assert!(decode_record(&blank, false).is_none());

        let bad_date: Vec<String> = ["An", "yesterday", "08:00", "17:00", "8.00", ""]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert!(decode_record(&bad_date, false).is_none());
    }

    #[test]
    fn test_unparseable_total_rederived() {
        let row: Vec<String> = ["An Nguyen", "2025-12-15", "08:00", "17:00", "n/a", ""]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let decoded = decode_record(&row, false).unwrap();
        assert_eq!(decoded.total_hours, 8.0);
    }

    #[test]
    fn test_employee_round_trip_both_layouts() {
        let local = Employee {
            id: Some("E001".to_string()),
            name: "An Nguyen".to_string(),
            department: Some("IT".to_string()),
            position: Some("Developer".to_string()),
            daily_wage: None,
        };
        let decoded = decode_employee(&encode_employee(&local, true), true).unwrap();
        assert_eq!(decoded, local);

        let remote = Employee {
            id: None,
            name: "Binh Tran".to_string(),
            department: None,
            position: None,
            daily_wage: Some(350000.0),
        };
        let decoded = decode_employee(&encode_employee(&remote, false), false).unwrap();
        assert_eq!(decoded, remote);
    }
}
