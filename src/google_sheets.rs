//! Google Sheets API v4 destination.
//!
//! Implements [`RowDestination`] against one tab of one spreadsheet:
//!
//! - extent — `GET spreadsheets/{id}/values/{tab}`; the API trims trailing
//!   empty rows and columns, so the returned grid is the used area.
//! - clear — `POST spreadsheets/{id}/values/{range}:clear`; removes values
//!   and keeps formatting.
//! - write — `PUT spreadsheets/{id}/values/{range}?valueInputOption=RAW`;
//!   `RAW` keeps serial numbers and dates as literal text.
//!
//! Every cell is sent as a JSON string, so the tab holds text cells only.
//! A device's `CompromisedStatus: false` lands as the text `false`, not a
//! checkbox-style boolean, and build numbers keep leading zeros.
//!
//! The tab name is quoted with [`quote_sheet_name`] for all three calls.

use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::SheetConfig;
use crate::error::{Result, SyncError};
use crate::sheet::{Extent, RowDestination, a1_range, quote_sheet_name};

/// Response of `GET values/{range}`. `values` is absent for an empty tab.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValueRange {
    /// Used cells, row by row, trailing empties trimmed.
    #[serde(default)]
    pub values: Vec<Vec<serde_json::Value>>,
}

/// Body of `PUT values/{range}`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValueRangeInput<'a> {
    /// Target range; must match the URL range.
    pub range: &'a str,
    /// Always `ROWS`.
    pub major_dimension: &'a str,
    /// Cells, row by row.
    pub values: Vec<Vec<String>>,
}

/// Response of `PUT values/{range}`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateValuesResponse {
    /// Range the API actually wrote.
    #[serde(default)]
    pub updated_range: Option<String>,
    /// Rows the API actually wrote.
    #[serde(default)]
    pub updated_rows: Option<u64>,
}

/// Response of `POST values/{range}:clear`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClearValuesResponse {
    /// Range the API actually cleared.
    #[serde(default)]
    pub cleared_range: Option<String>,
}

/// One tab of a Google spreadsheet.
pub struct GoogleSheet {
    http: Client,
    base_url: String,
    spreadsheet_id: String,
    sheet_name: String,
    access_token: String,
}

impl GoogleSheet {
    /// Builds the destination from configuration.
    ///
    /// # Errors
    ///
    /// `SyncError::Config` when the spreadsheet id, tab name, access token or
    /// endpoint is empty.
    pub fn new(http: Client, config: &SheetConfig) -> Result<Self> {
        let required = [
            ("sheet.spreadsheet_id", &config.spreadsheet_id),
            ("sheet.sheet_name", &config.sheet_name),
            ("sheet.access_token", &config.access_token),
            ("sheet.endpoint", &config.endpoint),
        ];
        for (name, value) in required {
            if value.trim().is_empty() {
                return Err(SyncError::Config(format!("{name} must not be empty")));
            }
        }
        Ok(GoogleSheet {
            http,
            base_url: config.endpoint.trim().trim_end_matches('/').to_string(),
            spreadsheet_id: config.spreadsheet_id.clone(),
            sheet_name: config.sheet_name.clone(),
            access_token: config.access_token.clone(),
        })
    }

    fn values_url(&self, last_segment: &str) -> Result<Url> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| SyncError::Config(format!("invalid sheet.endpoint: {e}")))?;
        url.path_segments_mut()
            .map_err(|()| SyncError::Config("sheet.endpoint must be an absolute URL".to_string()))?
            .extend(["spreadsheets", self.spreadsheet_id.as_str(), "values", last_segment]);
        Ok(url)
    }

    async fn handle_response<T: DeserializeOwned>(
        &self,
        what: &str,
        response: reqwest::Response,
    ) -> Result<T> {
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(SyncError::sheet(
                format!("{what} failed ({status}): {body}"),
                Some(status),
            ));
        }
        Ok(serde_json::from_str(&body)?)
    }
}

impl RowDestination for GoogleSheet {
    async fn extent(&mut self) -> Result<Extent> {
        let url = self.values_url(&quote_sheet_name(&self.sheet_name))?;
        debug!(%url, "reading used range");
        let response = self
            .http
            .get(url)
            .query(&[("majorDimension", "ROWS")])
            .bearer_auth(&self.access_token)
            .send()
            .await?;
        let range: ValueRange = self.handle_response("read", response).await?;
        Ok(Extent {
            rows: range.values.len(),
            columns: range.values.iter().map(Vec::len).max().unwrap_or(0),
        })
    }

    async fn clear(&mut self, first_row: usize, last_row: usize, columns: usize) -> Result<()> {
        let range = a1_range(&self.sheet_name, first_row, last_row, columns);
        let url = self.values_url(&format!("{range}:clear"))?;
        debug!(%range, "clearing");
        let response = self
            .http
            .post(url)
            .bearer_auth(&self.access_token)
            .json(&serde_json::json!({}))
            .send()
            .await?;
        let cleared: ClearValuesResponse = self
            .handle_response(&format!("clear {range}"), response)
            .await?;
        debug!(
            cleared_range = cleared.cleared_range.as_deref().unwrap_or(""),
            "clear acknowledged"
        );
        Ok(())
    }

    async fn write(&mut self, first_row: usize, rows: Vec<Vec<String>>) -> Result<()> {
        let columns = rows.iter().map(Vec::len).max().unwrap_or(0);
        let last_row = first_row + rows.len().saturating_sub(1);
        let range = a1_range(&self.sheet_name, first_row, last_row, columns);
        let url = self.values_url(&range)?;
        debug!(%range, rows = rows.len(), "writing");

        let body = ValueRangeInput {
            range: &range,
            major_dimension: "ROWS",
            values: rows,
        };
        let response = self
            .http
            .put(url)
            .query(&[("valueInputOption", "RAW")])
            .bearer_auth(&self.access_token)
            .json(&body)
            .send()
            .await?;
        let updated: UpdateValuesResponse = self
            .handle_response(&format!("write {range}"), response)
            .await?;
        debug!(
            updated_range = updated.updated_range.as_deref().unwrap_or(""),
            updated_rows = ?updated.updated_rows,
            "write acknowledged"
        );
        Ok(())
    }
}
