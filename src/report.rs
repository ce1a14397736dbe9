//! Read-side aggregation over attendance records.
//!
//! Pure projections, recomputed on every call. Nothing here mutates or
//! persists.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::models::attendance::{AttendanceRecord, round_hours};

/// Per-employee totals.
#[derive(Debug, Clone, PartialEq)]
pub struct EmployeeSummary {
    pub employee: String,
    pub total_hours: f64,
    /// Number of attendance records, i.e. days worked.
    pub days: u64,
}

/// Headline numbers for the statistics view.
#[derive(Debug, Clone, PartialEq)]
pub struct OverviewStats {
    pub records: u64,
    pub employees: u64,
    pub total_hours: f64,
    pub average_hours: f64,
}

/// Total hours and record count per employee, keyed by display name, in
/// first-encountered order.
pub fn group_sum_by_employee(records: &[AttendanceRecord]) -> Vec<EmployeeSummary> {
    let mut summaries: Vec<EmployeeSummary> = Vec::new();
    for record in records {
        match summaries.iter_mut().find(|s| s.employee == record.employee_name) {
            Some(summary) => {
                summary.total_hours += record.total_hours;
                summary.days += 1;
            }
            None => summaries.push(EmployeeSummary {
                employee: record.employee_name.clone(),
                total_hours: record.total_hours,
                days: 1,
            }),
        }
    }
    for summary in &mut summaries {
        summary.total_hours = round_hours(summary.total_hours);
    }
    summaries
}

/// The `n` employees with the most hours, descending. The sort is stable,
/// so ties keep their first-encountered grouping order.
pub fn top_n_by_hours(records: &[AttendanceRecord], n: usize) -> Vec<EmployeeSummary> {
    let mut summaries = group_sum_by_employee(records);
    summaries.sort_by(|a, b| b.total_hours.total_cmp(&a.total_hours));
    summaries.truncate(n);
    summaries
}

/// Number of records per calendar date.
pub fn daily_count(records: &[AttendanceRecord]) -> BTreeMap<NaiveDate, u64> {
    let mut counts = BTreeMap::new();
    for record in records {
        *counts.entry(record.date).or_insert(0) += 1;
    }
    counts
}

/// Headline statistics across a record set.
pub fn overview(records: &[AttendanceRecord]) -> OverviewStats {
    let total_hours: f64 = records.iter().map(|r| r.total_hours).sum();
    let employees = group_sum_by_employee(records).len() as u64;
    let count = records.len() as u64;

    OverviewStats {
        records: count,
        employees,
        total_hours: round_hours(total_hours),
        average_hours: if count == 0 {
            0.0
        } else {
            round_hours(total_hours / count as f64)
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;

    fn record(name: &str, date: &str, hours: f64) -> AttendanceRecord {
        // Build directly so tests can pin total_hours without reverse
        // engineering clock times.
        AttendanceRecord {
            employee_id: None,
            employee_name: name.to_string(),
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            time_in: NaiveTime::from_hms_opt(8, 0, 0).unwrap(),
            time_out: NaiveTime::from_hms_opt(17, 0, 0).unwrap(),
            total_hours: hours,
            note: String::new(),
        }
    }

    #[test]
    fn test_group_sum_by_employee() {
        let records = vec![
            record("A", "2025-12-01", 5.0),
            record("A", "2025-12-02", 3.0),
            record("B", "2025-12-01", 2.0),
        ];
        let summary = group_sum_by_employee(&records);
        assert_eq!(
            summary,
            vec![
                EmployeeSummary { employee: "A".to_string(), total_hours: 8.0, days: 2 },
                EmployeeSummary { employee: "B".to_string(), total_hours: 2.0, days: 1 },
            ]
        );
    }

    #[test]
    fn test_group_sum_rounds_totals() {
        let records = vec![
            record("A", "2025-12-01", 7.33),
            record("A", "2025-12-02", 7.33),
            record("A", "2025-12-03", 7.33),
        ];
        let summary = group_sum_by_employee(&records);
        assert_eq!(summary[0].total_hours, 21.99);
    }

    #[test]
    fn test_top_n_sorts_descending() {
        let records = vec![
            record("A", "2025-12-01", 2.0),
            record("B", "2025-12-01", 8.0),
            record("C", "2025-12-01", 5.0),
        ];
        let top = top_n_by_hours(&records, 2);
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].employee, "B");
        assert_eq!(top[1].employee, "C");
    }

    #[test]
    fn test_top_n_ties_keep_grouping_order() {
        let records = vec![
            record("A", "2025-12-01", 4.0),
            record("B", "2025-12-01", 4.0),
            record("C", "2025-12-01", 4.0),
        ];
        let top = top_n_by_hours(&records, 3);
        let names: Vec<&str> = top.iter().map(|s| s.employee.as_str()).collect();
        assert_eq!(names, vec!["A", "B", "C"]);
    }

    #[test]
    fn test_daily_count() {
        let records = vec![
            record("A", "2025-12-01", 8.0),
            record("B", "2025-12-01", 8.0),
            record("A", "2025-12-02", 8.0),
        ];
        let counts = daily_count(&records);
        let first = NaiveDate::from_ymd_opt(2025, 12, 1).unwrap();
        let second = NaiveDate::from_ymd_opt(2025, 12, 2).unwrap();
        assert_eq!(counts[&first], 2);
        assert_eq!(counts[&second], 1);
    }

    #[test]
    fn test_overview() {
        let records = vec![
            record("A", "2025-12-01", 8.0),
            record("A", "2025-12-02", 7.0),
            record("B", "2025-12-01", 6.0),
        ];
        let stats = overview(&records);
        assert_eq!(stats.records, 3);
        assert_eq!(stats.employees, 2);
        assert_eq!(stats.total_hours, 21.0);
        assert_eq!(stats.average_hours, 7.0);
    }

    #[test]
    fn test_overview_empty() {
        let stats = overview(&[]);
        assert_eq!(stats.records, 0);
        assert_eq!(stats.average_hours, 0.0);
    }
}
