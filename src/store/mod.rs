//! Month-partitioned attendance storage.
//!
//! Records are grouped into partitions named "YYYY-MM"; one partition is one
//! physical unit (a CSV file or a worksheet). Two backends implement the
//! same contract: [`LocalStore`] over a directory of CSV ledgers and
//! [`SheetsStore`] over a Google Sheets spreadsheet.

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::error::Result;
use crate::models::attendance::{AttendanceRecord, DATE_FORMAT};
use crate::models::employee::Employee;

pub mod local;
pub mod remote;
pub mod row;

pub use local::LocalStore;
pub use remote::SheetsStore;

/// Partition names that never hold data.
pub const RESERVED_PARTITIONS: [&str; 2] = ["Template", "Sheet1"];

/// True if `name` is a data partition name ("YYYY-MM").
pub fn is_partition_name(name: &str) -> bool {
    name.len() == 7 && NaiveDate::parse_from_str(&format!("{name}-01"), DATE_FORMAT).is_ok()
}

/// Backend-agnostic contract for the partitioned attendance store.
///
/// Read paths degrade to empty results on backend failure; write paths
/// surface failures and never leave a partial row behind. Rows are addressed
/// by 0-based ordinal position within their partition, matching the numbered
/// list a frontend renders.
#[async_trait]
pub trait AttendanceStore: Send + Sync {
    /// Append one record, creating its month partition (with the fixed
    /// column header) on first write.
    async fn append(&self, record: &AttendanceRecord) -> Result<()>;

    /// All records for one month, in stored order. Missing partitions and
    /// read failures yield an empty list.
    async fn read_partition(&self, key: &str) -> Vec<AttendanceRecord>;

    /// Every record across all non-reserved partitions, concatenated in
    /// backend order. No deduplication.
    async fn read_all(&self) -> Vec<AttendanceRecord>;

    /// Overwrite the full field set of the record at `position`.
    async fn update_at(&self, key: &str, position: usize, record: &AttendanceRecord)
    -> Result<()>;

    /// Remove the record at `position`; later records shift up by one.
    async fn delete_at(&self, key: &str, position: usize) -> Result<()>;

    /// Month keys that currently exist, reserved names excluded.
    async fn list_partitions(&self) -> Vec<String>;

    /// The employee roster, oldest entry first. Read failures yield an
    /// empty list.
    async fn employees(&self) -> Vec<Employee>;

    /// Append one roster entry. Duplicate checks happen in the service
    /// layer before this call.
    async fn add_employee(&self, employee: &Employee) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partition_names() {
        assert!(is_partition_name("2025-12"));
        assert!(is_partition_name("2026-01"));
        assert!(!is_partition_name("2025-13"));
        assert!(!is_partition_name("2025-1"));
        assert!(!is_partition_name("Template"));
        assert!(!is_partition_name("Sheet1"));
        assert!(!is_partition_name("notes"));
    }
}
