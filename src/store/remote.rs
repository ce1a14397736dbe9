//! Google Sheets backend with short-lived read caches.
//!
//! One worksheet per month partition in the attendance spreadsheet; the
//! roster lives in the first worksheet of a second spreadsheet. Reads go
//! through time-boxed caches to keep repeated calls within a session off
//! the network; every write invalidates the caches it touches.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use moka::future::Cache;
use reqwest::Client;
use tracing::warn;

use crate::config::SheetsConfig;
use crate::error::{AppError, Result};
use crate::models::attendance::AttendanceRecord;
use crate::models::employee::Employee;
use crate::sheets::auth::{ServiceAccountKey, TokenProvider};
use crate::sheets::client::{SheetsClient, Worksheet};
use crate::store::row::{SHEET_HEADER, SHEET_ROSTER_HEADER, decode_employee, decode_record, encode_employee, encode_record};
use crate::store::{AttendanceStore, is_partition_name};

/// TTL for the whole-ledger, month-list, and roster caches.
const AGGREGATE_TTL_SECS: u64 = 60;

const CACHE_CAPACITY: u64 = 64;

/// Sheets-backed store.
pub struct SheetsStore {
    attendance: SheetsClient,
    roster: SheetsClient,
    month_cache: Cache<String, Vec<AttendanceRecord>>,
    all_cache: Cache<(), Vec<AttendanceRecord>>,
    months_cache: Cache<(), Vec<String>>,
    roster_cache: Cache<(), Vec<Employee>>,
}

impl SheetsStore {
    /// Connect to the configured spreadsheets.
    ///
    /// Fails fast on missing or invalid credentials so the remote variant
    /// reports configuration problems once, at startup.
    pub fn new(config: &SheetsConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to build HTTP client");

        let key = ServiceAccountKey::from_file(&config.credentials_path)?;
        let auth = Arc::new(TokenProvider::new(key, http.clone())?);

        let attendance = SheetsClient::new(
            http.clone(),
            auth.clone(),
            config.attendance_spreadsheet_id.clone(),
        );
        let roster = SheetsClient::new(http, auth, config.employees_spreadsheet_id.clone());

        fn cache<K, V>(ttl_secs: u64) -> Cache<K, V>
        where
            K: std::hash::Hash + Eq + Send + Sync + 'static,
            V: Clone + Send + Sync + 'static,
        {
            Cache::builder()
                .max_capacity(CACHE_CAPACITY)
                .time_to_live(Duration::from_secs(ttl_secs))
                .build()
        }

        Ok(Self {
            attendance,
            roster,
            month_cache: cache(config.cache_ttl_secs),
            all_cache: cache(AGGREGATE_TTL_SECS),
            months_cache: cache(AGGREGATE_TTL_SECS),
            roster_cache: cache(AGGREGATE_TTL_SECS),
        })
    }

    async fn find_worksheet(&self, title: &str) -> Result<Option<Worksheet>> {
        let sheets = self.attendance.worksheets().await?;
        Ok(sheets.into_iter().find(|ws| ws.title == title))
    }

    /// Uncached partition fetch. A missing worksheet is an empty month,
    /// not an error.
    async fn fetch_partition(&self, key: &str) -> Result<Vec<AttendanceRecord>> {
        if self.find_worksheet(key).await?.is_none() {
            return Ok(Vec::new());
        }
        let rows = self.attendance.read_rows(key).await?;
        Ok(decode_rows(key, rows))
    }

    /// Number of data rows currently in a partition, for bounds checks on
    /// the write paths. Checked against live data, not the cache.
    async fn partition_len(&self, key: &str) -> Result<(Option<Worksheet>, usize)> {
        let Some(ws) = self.find_worksheet(key).await? else {
            return Ok((None, 0));
        };
        let rows = self.attendance.read_rows(key).await?;
        Ok((Some(ws), rows.len().saturating_sub(1)))
    }

    fn out_of_bounds(key: &str, position: usize, len: usize) -> AppError {
        AppError::OutOfBounds {
            partition: key.to_string(),
            position,
            len,
        }
    }

    async fn invalidate_partition(&self, key: &str) {
        self.month_cache.invalidate(key).await;
        self.all_cache.invalidate(&()).await;
        self.months_cache.invalidate(&()).await;
    }

    async fn roster_sheet(&self) -> Result<String> {
        let sheets = self.roster.worksheets().await?;
        sheets
            .first()
            .map(|ws| ws.title.clone())
            .ok_or_else(|| AppError::api("employee spreadsheet has no worksheets"))
    }
}

/// Drop the header row and decode the rest, skipping rows that do not
/// parse.
fn decode_rows(key: &str, rows: Vec<Vec<String>>) -> Vec<AttendanceRecord> {
    rows.into_iter()
        .skip(1)
        .filter_map(|row| {
            let decoded = decode_record(&row, false);
            if decoded.is_none() {
                warn!(partition = key, "skipping unparseable worksheet row");
            }
            decoded
        })
        .collect()
}

#[async_trait]
impl AttendanceStore for SheetsStore {
    async fn append(&self, record: &AttendanceRecord) -> Result<()> {
        let key = record.partition_key();
        if self.find_worksheet(&key).await?.is_none() {
            self.attendance.add_worksheet(&key).await?;
            let header: Vec<String> = SHEET_HEADER.iter().map(|s| s.to_string()).collect();
            self.attendance.append_row(&key, &header).await?;
        }
        self.attendance
            .append_row(&key, &encode_record(record, false))
            .await?;

        self.invalidate_partition(&key).await;
        Ok(())
    }

    async fn read_partition(&self, key: &str) -> Vec<AttendanceRecord> {
        if let Some(cached) = self.month_cache.get(key).await {
            return cached;
        }
        let records = match self.fetch_partition(key).await {
            Ok(records) => records,
            Err(e) => {
                warn!(partition = key, error = %e, "partition read failed");
                Vec::new()
            }
        };
        self.month_cache.insert(key.to_string(), records.clone()).await;
        records
    }

    async fn read_all(&self) -> Vec<AttendanceRecord> {
        if let Some(cached) = self.all_cache.get(&()).await {
            return cached;
        }
        let sheets = match self.attendance.worksheets().await {
            Ok(sheets) => sheets,
            Err(e) => {
                warn!(error = %e, "worksheet listing failed");
                return Vec::new();
            }
        };

        let mut all = Vec::new();
        for ws in sheets.iter().filter(|ws| is_partition_name(&ws.title)) {
            match self.attendance.read_rows(&ws.title).await {
                Ok(rows) => all.extend(decode_rows(&ws.title, rows)),
                Err(e) => warn!(partition = %ws.title, error = %e, "partition read failed"),
            }
        }
        self.all_cache.insert((), all.clone()).await;
        all
    }

    async fn update_at(&self, key: &str, position: usize, record: &AttendanceRecord) -> Result<()> {
        let (_, len) = self.partition_len(key).await?;
        if position >= len {
            return Err(Self::out_of_bounds(key, position, len));
        }

        // Data row N sits at sheet row N+2: rows are 1-based and row 1 is
        // the header.
        self.attendance
            .update_row(key, position + 2, &encode_record(record, false))
            .await?;

        self.invalidate_partition(key).await;
        Ok(())
    }

    async fn delete_at(&self, key: &str, position: usize) -> Result<()> {
        let (ws, len) = self.partition_len(key).await?;
        let Some(ws) = ws else {
            return Err(Self::out_of_bounds(key, position, 0));
        };
        if position >= len {
            return Err(Self::out_of_bounds(key, position, len));
        }

        // 0-based sheet index; the header occupies index 0.
        self.attendance.delete_row(ws.sheet_id, position + 1).await?;

        self.invalidate_partition(key).await;
        Ok(())
    }

    async fn list_partitions(&self) -> Vec<String> {
        if let Some(cached) = self.months_cache.get(&()).await {
            return cached;
        }
        let months = match self.attendance.worksheets().await {
            Ok(sheets) => sheets
                .into_iter()
                .filter(|ws| is_partition_name(&ws.title))
                .map(|ws| ws.title)
                .collect(),
            Err(e) => {
                warn!(error = %e, "worksheet listing failed");
                Vec::new()
            }
        };
        self.months_cache.insert((), months.clone()).await;
        months
    }

    async fn employees(&self) -> Vec<Employee> {
        if let Some(cached) = self.roster_cache.get(&()).await {
            return cached;
        }
        let roster = match self.fetch_roster().await {
            Ok(roster) => roster,
            Err(e) => {
                warn!(error = %e, "roster read failed");
                Vec::new()
            }
        };
        self.roster_cache.insert((), roster.clone()).await;
        roster
    }

    async fn add_employee(&self, employee: &Employee) -> Result<()> {
        let sheet = self.roster_sheet().await?;
        let rows = self.roster.read_rows(&sheet).await?;
        if rows.is_empty() {
            let header: Vec<String> = SHEET_ROSTER_HEADER.iter().map(|s| s.to_string()).collect();
            self.roster.append_row(&sheet, &header).await?;
        }
        self.roster
            .append_row(&sheet, &encode_employee(employee, false))
            .await?;

        self.roster_cache.invalidate(&()).await;
        Ok(())
    }
}

impl SheetsStore {
    async fn fetch_roster(&self) -> Result<Vec<Employee>> {
        let sheet = self.roster_sheet().await?;
        let rows = self.roster.read_rows(&sheet).await?;
        Ok(rows
            .into_iter()
            .skip(1)
            .filter_map(|row| decode_employee(&row, false))
            .collect())
    }
}
