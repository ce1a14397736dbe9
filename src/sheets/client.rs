//! Google Sheets HTTP client.
//!
//! A thin typed layer over the Sheets v4 REST API, scoped to one
//! spreadsheet. Covers exactly the operations the attendance store needs:
//! worksheet listing, row reads, appends, single-row updates and deletes,
//! and worksheet creation.

use std::sync::Arc;

use reqwest::Client;
use serde::Deserialize;
use serde_json::{Value, json};

use crate::error::{AppError, Result};
use crate::sheets::auth::TokenProvider;

const API_BASE: &str = "https://sheets.googleapis.com/v4/spreadsheets";

/// Worksheet name and numeric id inside a spreadsheet.
#[derive(Debug, Clone)]
pub struct Worksheet {
    pub title: String,
    pub sheet_id: i64,
}

#[derive(Debug, Deserialize)]
struct SpreadsheetMeta {
    #[serde(default)]
    sheets: Vec<SheetEntry>,
}

#[derive(Debug, Deserialize)]
struct SheetEntry {
    properties: SheetProperties,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SheetProperties {
    sheet_id: i64,
    title: String,
}

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

/// Client for one spreadsheet, authenticating through a shared token
/// provider.
pub struct SheetsClient {
    http: Client,
    auth: Arc<TokenProvider>,
    spreadsheet_id: String,
}

impl SheetsClient {
    pub fn new(http: Client, auth: Arc<TokenProvider>, spreadsheet_id: impl Into<String>) -> Self {
        Self {
            http,
            auth,
            spreadsheet_id: spreadsheet_id.into(),
        }
    }

    /// List worksheets with their titles and ids.
    pub async fn worksheets(&self) -> Result<Vec<Worksheet>> {
        let url = format!("{API_BASE}/{}", self.spreadsheet_id);
        let response = self
            .http
            .get(&url)
            .query(&[("fields", "sheets.properties")])
            .bearer_auth(self.auth.token().await?)
            .send()
            .await?;
        let meta: SpreadsheetMeta = Self::check(response).await?.json().await?;

        Ok(meta
            .sheets
            .into_iter()
            .map(|s| Worksheet {
                title: s.properties.title,
                sheet_id: s.properties.sheet_id,
            })
            .collect())
    }

    /// Read every row of a worksheet, header included.
    ///
    /// Fails if the worksheet does not exist; callers decide whether that
    /// means "empty" or "error".
    pub async fn read_rows(&self, title: &str) -> Result<Vec<Vec<String>>> {
        let url = format!("{API_BASE}/{}/values/'{title}'", self.spreadsheet_id);
        let response = self
            .http
            .get(&url)
            .bearer_auth(self.auth.token().await?)
            .send()
            .await?;
        let range: ValueRange = Self::check(response).await?.json().await?;

        Ok(range
            .values
            .into_iter()
            .map(|row| row.iter().map(cell_to_string).collect())
            .collect())
    }

    /// Append one row after the last row with data.
    pub async fn append_row(&self, title: &str, row: &[String]) -> Result<()> {
        let url = format!(
            "{API_BASE}/{}/values/'{title}':append",
            self.spreadsheet_id
        );
        let response = self
            .http
            .post(&url)
            .query(&[("valueInputOption", "USER_ENTERED")])
            .bearer_auth(self.auth.token().await?)
            .json(&json!({ "values": [row] }))
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    /// Overwrite one row. `row_number` is the 1-based sheet row, header
    /// counted as row 1.
    pub async fn update_row(&self, title: &str, row_number: usize, row: &[String]) -> Result<()> {
        let last = end_column(row.len());
        let range = format!("'{title}'!A{row_number}:{last}{row_number}");
        let url = format!("{API_BASE}/{}/values/{range}", self.spreadsheet_id);
        let response = self
            .http
            .put(&url)
            .query(&[("valueInputOption", "USER_ENTERED")])
            .bearer_auth(self.auth.token().await?)
            .json(&json!({ "range": range, "values": [row] }))
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    /// Delete one row by 0-based sheet index (header is index 0); rows
    /// below shift up.
    pub async fn delete_row(&self, sheet_id: i64, row_index: usize) -> Result<()> {
        self.batch_update(json!({
            "deleteDimension": {
                "range": {
                    "sheetId": sheet_id,
                    "dimension": "ROWS",
                    "startIndex": row_index,
                    "endIndex": row_index + 1,
                }
            }
        }))
        .await
    }

    /// Create a worksheet.
    pub async fn add_worksheet(&self, title: &str) -> Result<()> {
        self.batch_update(json!({
            "addSheet": {
                "properties": { "title": title }
            }
        }))
        .await
    }

    async fn batch_update(&self, request: Value) -> Result<()> {
        let url = format!("{API_BASE}/{}:batchUpdate", self.spreadsheet_id);
        let response = self
            .http
            .post(&url)
            .bearer_auth(self.auth.token().await?)
            .json(&json!({ "requests": [request] }))
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    async fn check(response: reqwest::Response) -> Result<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(AppError::api(format!("{status}: {body}")))
    }
}

/// A1-notation letter of the last column for a row of `len` cells.
fn end_column(len: usize) -> char {
    debug_assert!((1..=26).contains(&len));
    (b'A' + (len.saturating_sub(1).min(25)) as u8) as char
}

/// Cell values come back as JSON strings, numbers, or booleans.
fn cell_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
