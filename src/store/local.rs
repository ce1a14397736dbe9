//! CSV ledger backend: one file per month plus the employee roster.

use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::warn;

use crate::error::{AppError, Result};
use crate::models::attendance::AttendanceRecord;
use crate::models::employee::Employee;
use crate::store::row::{LEDGER_HEADER, ROSTER_HEADER, decode_employee, decode_record, encode_employee, encode_record};
use crate::store::{AttendanceStore, is_partition_name};

/// Roster file name inside the data directory.
const ROSTER_FILE: &str = "employees.csv";

/// File-based store rooted at a data directory.
///
/// Month partitions live at `<root>/YYYY-MM.csv`, the roster at
/// `<root>/employees.csv`. Updates and deletes rewrite the partition file
/// through a rename so a failed write never leaves a half-written ledger.
pub struct LocalStore {
    root: PathBuf,
}

impl LocalStore {
    /// Open a store, creating the data directory if needed.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    fn partition_path(&self, key: &str) -> PathBuf {
        self.root.join(format!("{key}.csv"))
    }

    fn roster_path(&self) -> PathBuf {
        self.root.join(ROSTER_FILE)
    }

    /// Strict partition read; the async trait wraps this with the
    /// degrade-to-empty read semantics.
    fn read_records(&self, key: &str) -> Result<Vec<AttendanceRecord>> {
        let path = self.partition_path(key);
        if !path.exists() {
            return Ok(Vec::new());
        }
        let mut reader = csv::ReaderBuilder::new().flexible(true).from_path(&path)?;
        let mut records = Vec::new();
        for row in reader.records() {
            let row = row?;
            let cells: Vec<String> = row.iter().map(str::to_string).collect();
            match decode_record(&cells, true) {
                Some(record) => records.push(record),
                None => warn!(partition = key, "skipping unparseable ledger row"),
            }
        }
        Ok(records)
    }

    /// Rewrite a whole partition: header plus every row, then rename over
    /// the old file.
    fn write_partition(&self, key: &str, records: &[AttendanceRecord]) -> Result<()> {
        let path = self.partition_path(key);
        let tmp = self.root.join(format!("{key}.csv.tmp"));
        {
            let mut writer = csv::Writer::from_path(&tmp)?;
            writer.write_record(LEDGER_HEADER)?;
            for record in records {
                writer.write_record(encode_record(record, true))?;
            }
            writer.flush()?;
        }
        fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn append_row(path: &Path, header: &[&str], row: &[String]) -> Result<()> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        let needs_header = file.metadata()?.len() == 0;
        let mut writer = csv::Writer::from_writer(file);
        if needs_header {
            writer.write_record(header)?;
        }
        writer.write_record(row)?;
        writer.flush()?;
        Ok(())
    }

    fn read_roster(&self) -> Result<Vec<Employee>> {
        let path = self.roster_path();
        if !path.exists() {
            return Ok(Vec::new());
        }
        let mut reader = csv::ReaderBuilder::new().flexible(true).from_path(&path)?;
        let mut roster = Vec::new();
        for row in reader.records() {
            let row = row?;
            let cells: Vec<String> = row.iter().map(str::to_string).collect();
            match decode_employee(&cells, true) {
                Some(employee) => roster.push(employee),
                None => warn!("skipping unparseable roster row"),
            }
        }
        Ok(roster)
    }

    fn partition_keys(&self) -> Result<Vec<String>> {
        let mut keys = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("csv") {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                if is_partition_name(stem) {
                    keys.push(stem.to_string());
                }
            }
        }
        keys.sort();
        Ok(keys)
    }
}

#[async_trait]
impl AttendanceStore for LocalStore {
    async fn append(&self, record: &AttendanceRecord) -> Result<()> {
        let key = record.partition_key();
        let row = encode_record(record, true);
        Self::append_row(&self.partition_path(&key), &LEDGER_HEADER, &row)
    }

    async fn read_partition(&self, key: &str) -> Vec<AttendanceRecord> {
        match self.read_records(key) {
            Ok(records) => records,
            Err(e) => {
                warn!(partition = key, error = %e, "partition read failed");
                Vec::new()
            }
        }
    }

    async fn read_all(&self) -> Vec<AttendanceRecord> {
        let keys = match self.partition_keys() {
            Ok(keys) => keys,
            Err(e) => {
                warn!(error = %e, "data directory scan failed");
                return Vec::new();
            }
        };
        let mut all = Vec::new();
        for key in keys {
            all.extend(self.read_partition(&key).await);
        }
        all
    }

    async fn update_at(&self, key: &str, position: usize, record: &AttendanceRecord) -> Result<()> {
        let mut records = self.read_records(key)?;
        if position >= records.len() {
            return Err(AppError::OutOfBounds {
                partition: key.to_string(),
                position,
                len: records.len(),
            });
        }
        records[position] = record.clone();
        self.write_partition(key, &records)
    }

    async fn delete_at(&self, key: &str, position: usize) -> Result<()> {
        let mut records = self.read_records(key)?;
        if position >= records.len() {
            return Err(AppError::OutOfBounds {
                partition: key.to_string(),
                position,
                len: records.len(),
            });
        }
        records.remove(position);
        self.write_partition(key, &records)
    }

    async fn list_partitions(&self) -> Vec<String> {
        match self.partition_keys() {
            Ok(keys) => keys,
            Err(e) => {
                warn!(error = %e, "data directory scan failed");
                Vec::new()
            }
        }
    }

    async fn employees(&self) -> Vec<Employee> {
        match self.read_roster() {
            Ok(roster) => roster,
            Err(e) => {
                warn!(error = %e, "roster read failed");
                Vec::new()
            }
        }
    }

    async fn add_employee(&self, employee: &Employee) -> Result<()> {
        let row = encode_employee(employee, true);
        Self::append_row(&self.roster_path(), &ROSTER_HEADER, &row)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime};
    use tempfile::TempDir;

    fn record(name: &str, date: &str, time_in: &str, time_out: &str) -> AttendanceRecord {
        AttendanceRecord::new(
            Some("E001".to_string()),
            name,
            NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            NaiveTime::parse_from_str(time_in, "%H:%M").unwrap(),
            NaiveTime::parse_from_str(time_out, "%H:%M").unwrap(),
            "",
        )
    }

    fn store() -> (TempDir, LocalStore) {
        let dir = TempDir::new().unwrap();
        let store = LocalStore::new(dir.path()).unwrap();
        (dir, store)
    }

    #[tokio::test]
    async fn test_append_then_read_round_trip() {
        let (_dir, store) = store();
        let r = record("An Nguyen", "2025-12-15", "08:00", "17:00");

        store.append(&r).await.unwrap();
        let read = store.read_partition("2025-12").await;
        assert_eq!(read, vec![r.clone()]);

        // A second append lands at the last position.
        let r2 = record("Binh Tran", "2025-12-16", "09:00", "18:00");
        store.append(&r2).await.unwrap();
        let read = store.read_partition("2025-12").await;
        assert_eq!(read.len(), 2);
        assert_eq!(read[1], r2);
    }

    #[tokio::test]
    async fn test_first_append_writes_header() {
        let (dir, store) = store();
        store
            .append(&record("An Nguyen", "2025-12-15", "08:00", "17:00"))
            .await
            .unwrap();

        let raw = fs::read_to_string(dir.path().join("2025-12.csv")).unwrap();
        let first_line = raw.lines().next().unwrap();
        assert_eq!(first_line, LEDGER_HEADER.join(","));
        assert_eq!(raw.lines().count(), 2);
    }

    #[tokio::test]
    async fn test_missing_partition_reads_empty() {
        let (_dir, store) = store();
        assert!(store.read_partition("2099-01").await.is_empty());
    }

    #[tokio::test]
    async fn test_update_at_replaces_only_target() {
        let (_dir, store) = store();
        let a = record("An Nguyen", "2025-12-01", "08:00", "17:00");
        let b = record("Binh Tran", "2025-12-02", "08:00", "17:00");
        store.append(&a).await.unwrap();
        store.append(&b).await.unwrap();

        let replacement = record("An Nguyen", "2025-12-01", "09:00", "18:30");
        store.update_at("2025-12", 0, &replacement).await.unwrap();

        let read = store.read_partition("2025-12").await;
        assert_eq!(read[0], replacement);
        assert_eq!(read[1], b);
    }

    #[tokio::test]
    async fn test_update_out_of_bounds_fails() {
        let (_dir, store) = store();
        store
            .append(&record("An Nguyen", "2025-12-01", "08:00", "17:00"))
            .await
            .unwrap();

        let r = record("An Nguyen", "2025-12-01", "08:00", "17:00");
        let err = store.update_at("2025-12", 1, &r).await.unwrap_err();
        assert!(matches!(err, AppError::OutOfBounds { position: 1, len: 1, .. }));
    }

    #[tokio::test]
    async fn test_delete_shifts_later_rows() {
        let (_dir, store) = store();
        let a = record("A", "2025-12-01", "08:00", "17:00");
        let b = record("B", "2025-12-02", "08:00", "17:00");
        let c = record("C", "2025-12-03", "08:00", "17:00");
        for r in [&a, &b, &c] {
            store.append(r).await.unwrap();
        }

        store.delete_at("2025-12", 1).await.unwrap();
        let read = store.read_partition("2025-12").await;
        assert_eq!(read, vec![a, c]);
    }

    #[tokio::test]
    async fn test_delete_last_record_leaves_empty_partition() {
        let (_dir, store) = store();
        store
            .append(&record("An Nguyen", "2025-12-01", "08:00", "17:00"))
            .await
            .unwrap();

        store.delete_at("2025-12", 0).await.unwrap();
        assert!(store.read_partition("2025-12").await.is_empty());

        let err = store.delete_at("2025-12", 0).await.unwrap_err();
        assert!(matches!(err, AppError::OutOfBounds { len: 0, .. }));
    }

    #[tokio::test]
    async fn test_list_partitions_skips_non_partition_files() {
        let (dir, store) = store();
        store
            .append(&record("A", "2025-11-30", "08:00", "17:00"))
            .await
            .unwrap();
        store
            .append(&record("A", "2025-12-01", "08:00", "17:00"))
            .await
            .unwrap();
        fs::write(dir.path().join("Template.csv"), "x").unwrap();
        fs::write(dir.path().join("notes.txt"), "x").unwrap();

        assert_eq!(store.list_partitions().await, vec!["2025-11", "2025-12"]);
    }

    #[tokio::test]
    async fn test_read_all_concatenates_months() {
        let (_dir, store) = store();
        let november = record("A", "2025-11-30", "08:00", "17:00");
        let december = record("B", "2025-12-01", "08:00", "17:00");
        store.append(&december).await.unwrap();
        store.append(&november).await.unwrap();

        // The roster file never shows up as attendance data.
        store
            .add_employee(&Employee {
                id: Some("E001".to_string()),
                name: "A".to_string(),
                department: None,
                position: None,
                daily_wage: None,
            })
            .await
            .unwrap();

        assert_eq!(store.read_all().await, vec![november, december]);
    }

    #[tokio::test]
    async fn test_roster_round_trip() {
        let (_dir, store) = store();
        let employee = Employee {
            id: Some("E001".to_string()),
            name: "An Nguyen".to_string(),
            department: Some("IT".to_string()),
            position: Some("Developer".to_string()),
            daily_wage: None,
        };
        store.add_employee(&employee).await.unwrap();
        assert_eq!(store.employees().await, vec![employee]);
    }
}
