//! Server configuration parsed from environment variables.

use std::path::PathBuf;

use crate::services::directory::{
    DEFAULT_SHEET_NAME, DEFAULT_SHEETS_BASE_URL, DEFAULT_SHEETS_CONNECT_TIMEOUT_SECS,
    DEFAULT_SHEETS_REQUEST_TIMEOUT_SECS, DEFAULT_SPREADSHEET_ID, SheetsConfig, SheetsCredentials,
};

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_DB_MAX_CONNECTIONS: u32 = 5;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid {var}: {value:?}")]
    Invalid { var: &'static str, value: String },
    #[error("spreadsheet directory needs SHEETS_API_KEY or SHEETS_ACCESS_TOKEN (or set DIRECTORY_FILE)")]
    MissingSheetsCredentials,
}

/// Where role lookups read the user table from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DirectorySource {
    File(PathBuf),
    Sheets(SheetsConfig),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub port: u16,
    pub template_dir: PathBuf,
    /// Enables the Postgres property store when set.
    pub database_url: Option<String>,
    pub db_max_connections: u32,
    pub directory: DirectorySource,
    pub cookie_secure: bool,
}

impl AppConfig {
    /// Build typed config from the process environment.
    ///
    /// Optional:
    /// - `PORT`: default 3000
    /// - `TEMPLATE_DIR`: default `templates/` next to `Cargo.toml`
    /// - `DATABASE_URL`, `DB_MAX_CONNECTIONS` (default 5)
    /// - `DIRECTORY_FILE`: JSON rows file; takes precedence over Sheets
    /// - `DIRECTORY_SPREADSHEET_ID`, `DIRECTORY_SHEET`, `SHEETS_BASE_URL`
    /// - `SHEETS_API_KEY` or `SHEETS_ACCESS_TOKEN` (one required for Sheets)
    /// - `SHEETS_REQUEST_TIMEOUT_SECS` (30), `SHEETS_CONNECT_TIMEOUT_SECS` (10)
    /// - `COOKIE_SECURE`: default false
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] for unparseable values or missing Sheets
    /// credentials.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let port = parse_or("PORT", lookup("PORT"), DEFAULT_PORT)?;
        let template_dir = lookup("TEMPLATE_DIR")
            .map_or_else(|| PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("templates"), PathBuf::from);
        let database_url = lookup("DATABASE_URL").filter(|v| !v.trim().is_empty());
        let db_max_connections = parse_or("DB_MAX_CONNECTIONS", lookup("DB_MAX_CONNECTIONS"), DEFAULT_DB_MAX_CONNECTIONS)?;
        let cookie_secure = match lookup("COOKIE_SECURE") {
            None => false,
            Some(raw) => parse_bool(&raw).ok_or(ConfigError::Invalid { var: "COOKIE_SECURE", value: raw })?,
        };

        let directory = match lookup("DIRECTORY_FILE") {
            Some(path) => DirectorySource::File(PathBuf::from(path)),
            None => DirectorySource::Sheets(sheets_config(&lookup)?),
        };

        Ok(Self { port, template_dir, database_url, db_max_connections, directory, cookie_secure })
    }
}

fn sheets_config(lookup: &impl Fn(&str) -> Option<String>) -> Result<SheetsConfig, ConfigError> {
    let credentials = match (lookup("SHEETS_ACCESS_TOKEN"), lookup("SHEETS_API_KEY")) {
        (Some(token), _) => SheetsCredentials::AccessToken(token),
        (None, Some(key)) => SheetsCredentials::ApiKey(key),
        (None, None) => return Err(ConfigError::MissingSheetsCredentials),
    };

    Ok(SheetsConfig {
        base_url: lookup("SHEETS_BASE_URL").unwrap_or_else(|| DEFAULT_SHEETS_BASE_URL.to_owned()),
        spreadsheet_id: lookup("DIRECTORY_SPREADSHEET_ID").unwrap_or_else(|| DEFAULT_SPREADSHEET_ID.to_owned()),
        sheet_name: lookup("DIRECTORY_SHEET").unwrap_or_else(|| DEFAULT_SHEET_NAME.to_owned()),
        credentials,
        request_timeout_secs: parse_or(
            "SHEETS_REQUEST_TIMEOUT_SECS",
            lookup("SHEETS_REQUEST_TIMEOUT_SECS"),
            DEFAULT_SHEETS_REQUEST_TIMEOUT_SECS,
        )?,
        connect_timeout_secs: parse_or(
            "SHEETS_CONNECT_TIMEOUT_SECS",
            lookup("SHEETS_CONNECT_TIMEOUT_SECS"),
            DEFAULT_SHEETS_CONNECT_TIMEOUT_SECS,
        )?,
    })
}

fn parse_or<T: std::str::FromStr>(var: &'static str, raw: Option<String>, default: T) -> Result<T, ConfigError> {
    match raw {
        None => Ok(default),
        Some(value) => value.trim().parse().map_err(|_| ConfigError::Invalid { var, value }),
    }
}

pub(crate) fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
