//! User directory and role resolution.
//!
//! DESIGN
//! ======
//! The directory is a sheet of rows: row 0 is a header, then one row per
//! user with the username in column 0 and the role in column 1. Backends only
//! fetch rows; the scan lives in [`find_role`] so it behaves the same whether
//! the rows came from the Sheets API or a local file.
//!
//! Every lookup refetches the whole sheet. There is no cache and no isolation
//! from concurrent edits to the sheet.

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;
use serde_json::Value;

pub const DEFAULT_SPREADSHEET_ID: &str = "1nhEpjRtGOBnwXLY8CBtcsMg1Cbfu-pox3ylraFoCg4c";
pub const DEFAULT_SHEET_NAME: &str = "CMDutilisateurs";
pub const DEFAULT_SHEETS_BASE_URL: &str = "https://sheets.googleapis.com/v4";
pub const DEFAULT_SHEETS_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_SHEETS_CONNECT_TIMEOUT_SECS: u64 = 10;

/// One directory row as returned by the backend, cells untyped.
pub type DirectoryRow = Vec<Value>;

#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    #[error("failed to build http client: {0}")]
    HttpClientBuild(String),
    #[error("invalid sheets url: {0}")]
    InvalidUrl(String),
    #[error("sheets request failed: {0}")]
    Request(String),
    #[error("sheets api error (status {status}): {body}")]
    ApiResponse { status: u16, body: String },
    #[error("failed to read directory file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed directory data: {0}")]
    Parse(String),
}

/// Source of directory rows. Enables mocking in tests.
#[async_trait::async_trait]
pub trait UserDirectory: Send + Sync {
    /// Fetch every row of the directory, header included.
    ///
    /// # Errors
    ///
    /// Returns a [`DirectoryError`] if the backing store cannot be read or
    /// its content is not a row array.
    async fn fetch_rows(&self) -> Result<Vec<DirectoryRow>, DirectoryError>;
}

/// Look up `username` in the directory and return its role.
///
/// `Ok(None)` when no row matches; backend failures are returned as errors.
pub async fn resolve_role(directory: &dyn UserDirectory, username: &str) -> Result<Option<String>, DirectoryError> {
    let rows = directory.fetch_rows().await?;
    Ok(find_role(&rows, username))
}

/// Scan data rows in order and return the role of the first exact username
/// match. Row 0 is the header and is never matched.
#[must_use]
pub fn find_role(rows: &[DirectoryRow], username: &str) -> Option<String> {
    rows.iter()
        .skip(1)
        .find(|row| matches!(row.first(), Some(Value::String(name)) if name == username))
        .and_then(|row| row.get(1))
        .and_then(cell_text)
}

fn cell_text(cell: &Value) -> Option<String> {
    match cell {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

// =============================================================================
// LOCAL FILE
// =============================================================================

/// Directory read from a JSON file holding an array of rows, e.g.
/// `[["username", "role"], ["alice", "admin"]]`. Reread on every lookup.
pub struct FileDirectory {
    path: PathBuf,
}

impl FileDirectory {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait::async_trait]
impl UserDirectory for FileDirectory {
    async fn fetch_rows(&self) -> Result<Vec<DirectoryRow>, DirectoryError> {
        let text = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|source| DirectoryError::Io { path: self.path.clone(), source })?;
        serde_json::from_str(&text).map_err(|e| DirectoryError::Parse(e.to_string()))
    }
}

// =============================================================================
// GOOGLE SHEETS
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SheetsCredentials {
    /// Sent as the `key` query parameter.
    ApiKey(String),
    /// Sent as a bearer token.
    AccessToken(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetsConfig {
    pub base_url: String,
    pub spreadsheet_id: String,
    pub sheet_name: String,
    pub credentials: SheetsCredentials,
    pub request_timeout_secs: u64,
    pub connect_timeout_secs: u64,
}

/// `ValueRange` payload of `spreadsheets.values.get`. An empty sheet omits
/// `values` entirely.
#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<DirectoryRow>,
}

/// Directory backed by a sheet read through the Sheets v4 values API.
pub struct SheetsDirectory {
    http: reqwest::Client,
    config: SheetsConfig,
}

impl SheetsDirectory {
    pub fn new(config: SheetsConfig) -> Result<Self, DirectoryError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .build()
            .map_err(|e| DirectoryError::HttpClientBuild(e.to_string()))?;
        Ok(Self { http, config })
    }

    /// Build `{base}/spreadsheets/{id}/values/{sheet}`, percent-encoding the
    /// id and sheet name as path segments. Cells are requested unformatted so
    /// numbers and booleans keep their JSON types.
    pub(crate) fn values_url(&self) -> Result<reqwest::Url, DirectoryError> {
        let mut url = reqwest::Url::parse(self.config.base_url.trim_end_matches('/'))
            .map_err(|e| DirectoryError::InvalidUrl(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|()| DirectoryError::InvalidUrl(self.config.base_url.clone()))?
            .extend([
                "spreadsheets",
                self.config.spreadsheet_id.as_str(),
                "values",
                self.config.sheet_name.as_str(),
            ]);
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("valueRenderOption", "UNFORMATTED_VALUE");
            if let SheetsCredentials::ApiKey(key) = &self.config.credentials {
                query.append_pair("key", key);
            }
        }
        Ok(url)
    }
}

#[async_trait::async_trait]
impl UserDirectory for SheetsDirectory {
    async fn fetch_rows(&self) -> Result<Vec<DirectoryRow>, DirectoryError> {
        let mut request = self.http.get(self.values_url()?);
        if let SheetsCredentials::AccessToken(token) = &self.config.credentials {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| DirectoryError::Request(e.to_string()))?;
        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| DirectoryError::Request(e.to_string()))?;

        if status != 200 {
            return Err(DirectoryError::ApiResponse { status, body: text });
        }
        parse_value_range(&text)
    }
}

/// Parse a `ValueRange` JSON body into rows.
pub(crate) fn parse_value_range(text: &str) -> Result<Vec<DirectoryRow>, DirectoryError> {
    let range: ValueRange = serde_json::from_str(text).map_err(|e| DirectoryError::Parse(e.to_string()))?;
    Ok(range.values)
}

#[cfg(test)]
#[path = "directory_test.rs"]
mod tests;
