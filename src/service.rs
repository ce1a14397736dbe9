//! Attendance workflows shared by every frontend.
//!
//! Field validation and hours derivation happen here, against whichever
//! backend the store was built on; the store only moves rows.

use chrono::{NaiveDate, NaiveTime};
use tracing::info;

use crate::error::{AppError, Result};
use crate::models::attendance::AttendanceRecord;
use crate::models::employee::{Employee, NewEmployee};
use crate::store::AttendanceStore;

/// High-level operations over a partitioned attendance store.
pub struct AttendanceService {
    store: Box<dyn AttendanceStore>,
}

impl AttendanceService {
    pub fn new(store: Box<dyn AttendanceStore>) -> Self {
        Self { store }
    }

    /// Record a day's attendance for a rostered employee.
    ///
    /// `employee` matches either the roster code or the display name.
    pub async fn clock(
        &self,
        employee: &str,
        date: NaiveDate,
        time_in: NaiveTime,
        time_out: NaiveTime,
        note: &str,
    ) -> Result<AttendanceRecord> {
        let record = self.build_record(employee, date, time_in, time_out, note).await?;
        self.store.append(&record).await?;
        info!(
            employee = %record.employee_name,
            date = %record.date,
            hours = record.total_hours,
            "attendance recorded"
        );
        Ok(record)
    }

    /// Overwrite the record at an ordinal position within a month.
    ///
    /// The record stays in the addressed month even if the new date falls
    /// outside it; the next append for that date starts a fresh partition.
    pub async fn amend(
        &self,
        month: &str,
        position: usize,
        employee: &str,
        date: NaiveDate,
        time_in: NaiveTime,
        time_out: NaiveTime,
        note: &str,
    ) -> Result<AttendanceRecord> {
        let record = self.build_record(employee, date, time_in, time_out, note).await?;
        self.store.update_at(month, position, &record).await?;
        info!(month, position, "attendance record amended");
        Ok(record)
    }

    /// Delete the record at an ordinal position within a month.
    pub async fn remove(&self, month: &str, position: usize) -> Result<()> {
        self.store.delete_at(month, position).await?;
        info!(month, position, "attendance record deleted");
        Ok(())
    }

    /// Validate and add a roster entry; the roster is unchanged on
    /// rejection.
    pub async fn add_employee(&self, new: NewEmployee) -> Result<Employee> {
        let roster = self.store.employees().await;
        let employee = new.validate(&roster)?;
        self.store.add_employee(&employee).await?;
        info!(name = %employee.name, "employee added");
        Ok(employee)
    }

    pub async fn roster(&self) -> Vec<Employee> {
        self.store.employees().await
    }

    pub async fn monthly_records(&self, month: &str) -> Vec<AttendanceRecord> {
        self.store.read_partition(month).await
    }

    pub async fn all_records(&self) -> Vec<AttendanceRecord> {
        self.store.read_all().await
    }

    pub async fn months(&self) -> Vec<String> {
        self.store.list_partitions().await
    }

    async fn build_record(
        &self,
        employee: &str,
        date: NaiveDate,
        time_in: NaiveTime,
        time_out: NaiveTime,
        note: &str,
    ) -> Result<AttendanceRecord> {
        let roster = self.store.employees().await;
        let found = roster
            .iter()
            .find(|e| e.id.as_deref() == Some(employee) || e.name == employee)
            .ok_or_else(|| {
                AppError::not_found(format!("employee {employee} is not on the roster"))
            })?;

        Ok(AttendanceRecord::new(
            found.id.clone(),
            found.name.clone(),
            date,
            time_in,
            time_out,
            note,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::LocalStore;
    use tempfile::TempDir;

    fn service() -> (TempDir, AttendanceService) {
        let dir = TempDir::new().unwrap();
        let store = LocalStore::new(dir.path()).unwrap();
        (dir, AttendanceService::new(Box::new(store)))
    }

    fn new_employee(id: &str, name: &str) -> NewEmployee {
        NewEmployee {
            id: Some(id.to_string()),
            name: name.to_string(),
            department: Some("IT".to_string()),
            position: Some("Developer".to_string()),
            daily_wage: None,
        }
    }

    fn date(value: &str) -> NaiveDate {
        NaiveDate::parse_from_str(value, "%Y-%m-%d").unwrap()
    }

    fn clock_time(value: &str) -> NaiveTime {
        NaiveTime::parse_from_str(value, "%H:%M").unwrap()
    }

    #[tokio::test]
    async fn test_clock_for_rostered_employee() {
        let (_dir, service) = service();
        service.add_employee(new_employee("E001", "An Nguyen")).await.unwrap();

        let record = service
            .clock("E001", date("2025-12-15"), clock_time("08:00"), clock_time("17:00"), "")
            .await
            .unwrap();
        assert_eq!(record.employee_name, "An Nguyen");
        assert_eq!(record.total_hours, 8.0);

        let stored = service.monthly_records("2025-12").await;
        assert_eq!(stored, vec![record]);
    }

    #[tokio::test]
    async fn test_clock_unknown_employee_rejected() {
        let (_dir, service) = service();
        let err = service
            .clock("E404", date("2025-12-15"), clock_time("08:00"), clock_time("17:00"), "")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
        assert!(service.monthly_records("2025-12").await.is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_employee_leaves_roster_unchanged() {
        let (_dir, service) = service();
        service.add_employee(new_employee("E001", "An Nguyen")).await.unwrap();

        let err = service
            .add_employee(new_employee("E002", "An Nguyen"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert_eq!(service.roster().await.len(), 1);
    }

    #[tokio::test]
    async fn test_amend_recomputes_hours() {
        let (_dir, service) = service();
        service.add_employee(new_employee("E001", "An Nguyen")).await.unwrap();
        service
            .clock("E001", date("2025-12-15"), clock_time("08:00"), clock_time("17:00"), "")
            .await
            .unwrap();

        let amended = service
            .amend(
                "2025-12",
                0,
                "E001",
                date("2025-12-15"),
                clock_time("08:00"),
                clock_time("12:00"),
                "half day",
            )
            .await
            .unwrap();
        assert_eq!(amended.total_hours, 3.0);

        let stored = service.monthly_records("2025-12").await;
        assert_eq!(stored[0].note, "half day");
        assert_eq!(stored[0].total_hours, 3.0);
    }

    #[tokio::test]
    async fn test_remove_out_of_bounds_surfaces() {
        let (_dir, service) = service();
        let err = service.remove("2025-12", 0).await.unwrap_err();
        assert!(matches!(err, AppError::OutOfBounds { .. }));
    }
}
