use super::*;
use crate::state::test_helpers::StaticDirectory;
use serde_json::json;

fn rows(value: Value) -> Vec<DirectoryRow> {
    serde_json::from_value(value).unwrap()
}

fn sheets_config(credentials: SheetsCredentials) -> SheetsConfig {
    SheetsConfig {
        base_url: DEFAULT_SHEETS_BASE_URL.into(),
        spreadsheet_id: DEFAULT_SPREADSHEET_ID.into(),
        sheet_name: DEFAULT_SHEET_NAME.into(),
        credentials,
        request_timeout_secs: 5,
        connect_timeout_secs: 5,
    }
}

// =============================================================================
// find_role
// =============================================================================

#[test]
fn find_role_returns_matching_role() {
    let data = rows(json!([["username", "role"], ["alice", "admin"], ["bob", "operator"]]));
    assert_eq!(find_role(&data, "alice").as_deref(), Some("admin"));
    assert_eq!(find_role(&data, "bob").as_deref(), Some("operator"));
}

#[test]
fn find_role_unknown_user_is_none() {
    let data = rows(json!([["username", "role"], ["alice", "admin"]]));
    assert_eq!(find_role(&data, "carol"), None);
}

#[test]
fn find_role_never_matches_header_row() {
    let data = rows(json!([["username", "role"], ["alice", "admin"]]));
    assert_eq!(find_role(&data, "username"), None);
}

#[test]
fn find_role_header_only_is_none() {
    let data = rows(json!([["username", "role"]]));
    assert_eq!(find_role(&data, "alice"), None);
}

#[test]
fn find_role_empty_sheet_is_none() {
    assert_eq!(find_role(&[], "alice"), None);
}

#[test]
fn find_role_first_match_wins_on_duplicates() {
    let data = rows(json!([["username", "role"], ["alice", "admin"], ["alice", "operator"]]));
    assert_eq!(find_role(&data, "alice").as_deref(), Some("admin"));
}

#[test]
fn find_role_is_case_sensitive() {
    let data = rows(json!([["username", "role"], ["Alice", "admin"]]));
    assert_eq!(find_role(&data, "alice"), None);
    assert_eq!(find_role(&data, "Alice").as_deref(), Some("admin"));
}

#[test]
fn find_role_does_not_trim_whitespace() {
    let data = rows(json!([["username", "role"], ["alice ", "admin"]]));
    assert_eq!(find_role(&data, "alice"), None);
}

#[test]
fn find_role_non_string_username_cell_never_matches() {
    let data = rows(json!([["username", "role"], [42, "admin"], [true, "operator"]]));
    assert_eq!(find_role(&data, "42"), None);
    assert_eq!(find_role(&data, "true"), None);
}

#[test]
fn find_role_missing_role_cell_is_none() {
    let data = rows(json!([["username", "role"], ["alice"]]));
    assert_eq!(find_role(&data, "alice"), None);
}

#[test]
fn find_role_empty_role_cell_is_empty_string() {
    let data = rows(json!([["username", "role"], ["alice", ""]]));
    assert_eq!(find_role(&data, "alice").as_deref(), Some(""));
}

#[test]
fn find_role_numeric_role_uses_display_text() {
    let data = rows(json!([["username", "role"], ["alice", 3]]));
    assert_eq!(find_role(&data, "alice").as_deref(), Some("3"));
}

#[test]
fn find_role_skips_empty_rows() {
    let data = rows(json!([["username", "role"], [], ["bob", "operator"]]));
    assert_eq!(find_role(&data, "bob").as_deref(), Some("operator"));
}

#[test]
fn find_role_ignores_extra_columns() {
    let data = rows(json!([["username", "role", "note"], ["alice", "admin", "on call"]]));
    assert_eq!(find_role(&data, "alice").as_deref(), Some("admin"));
}

// =============================================================================
// resolve_role
// =============================================================================

#[tokio::test]
async fn resolve_role_reads_through_directory() {
    let dir = StaticDirectory::from_records(&[("alice", "admin"), ("bob", "operator")]);
    assert_eq!(resolve_role(&dir, "bob").await.unwrap().as_deref(), Some("operator"));
    assert_eq!(resolve_role(&dir, "carol").await.unwrap(), None);
}

#[tokio::test]
async fn resolve_role_propagates_backend_failure() {
    let dir = FileDirectory::new("/definitely/not/here/users.json");
    let err = resolve_role(&dir, "alice").await.unwrap_err();
    assert!(matches!(err, DirectoryError::Io { .. }));
}

// =============================================================================
// FileDirectory
// =============================================================================

#[tokio::test]
async fn file_directory_reads_rows() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("users.json");
    std::fs::write(&path, r#"[["username","role"],["alice","admin"]]"#).unwrap();

    let directory = FileDirectory::new(&path);
    assert_eq!(resolve_role(&directory, "alice").await.unwrap().as_deref(), Some("admin"));
}

#[tokio::test]
async fn file_directory_rereads_on_every_lookup() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("users.json");
    std::fs::write(&path, r#"[["username","role"],["alice","admin"]]"#).unwrap();
    let directory = FileDirectory::new(&path);
    assert_eq!(resolve_role(&directory, "alice").await.unwrap().as_deref(), Some("admin"));

    std::fs::write(&path, r#"[["username","role"],["alice","operator"]]"#).unwrap();
    assert_eq!(resolve_role(&directory, "alice").await.unwrap().as_deref(), Some("operator"));
}

#[tokio::test]
async fn file_directory_malformed_json_is_parse_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("users.json");
    std::fs::write(&path, r#"{"alice":"admin"}"#).unwrap();

    let err = FileDirectory::new(&path).fetch_rows().await.unwrap_err();
    assert!(matches!(err, DirectoryError::Parse(_)));
}

// =============================================================================
// Sheets
// =============================================================================

#[test]
fn parse_value_range_reads_values() {
    let body = r#"{"range":"CMDutilisateurs!A1:Z1000","majorDimension":"ROWS","values":[["username","role"],["alice","admin"]]}"#;
    let data = parse_value_range(body).unwrap();
    assert_eq!(data.len(), 2);
    assert_eq!(find_role(&data, "alice").as_deref(), Some("admin"));
}

#[test]
fn parse_value_range_empty_sheet_has_no_rows() {
    let body = r#"{"range":"CMDutilisateurs!A1:Z1000","majorDimension":"ROWS"}"#;
    assert!(parse_value_range(body).unwrap().is_empty());
}

#[test]
fn parse_value_range_keeps_numeric_cells_typed() {
    let body = r#"{"values":[["username","role"],[123,"admin"],["456",7]]}"#;
    let data = parse_value_range(body).unwrap();
    assert_eq!(find_role(&data, "123"), None);
    assert_eq!(find_role(&data, "456").as_deref(), Some("7"));
}

#[test]
fn parse_value_range_rejects_garbage() {
    assert!(matches!(parse_value_range("<html>"), Err(DirectoryError::Parse(_))));
}

#[test]
fn values_url_with_api_key() {
    let dir = SheetsDirectory::new(sheets_config(SheetsCredentials::ApiKey("k3y".into()))).unwrap();
    let url = dir.values_url().unwrap();
    assert_eq!(
        url.as_str(),
        "https://sheets.googleapis.com/v4/spreadsheets/1nhEpjRtGOBnwXLY8CBtcsMg1Cbfu-pox3ylraFoCg4c/values/CMDutilisateurs?valueRenderOption=UNFORMATTED_VALUE&key=k3y"
    );
}

#[test]
fn values_url_with_access_token_has_no_key() {
    let dir = SheetsDirectory::new(sheets_config(SheetsCredentials::AccessToken("tok".into()))).unwrap();
    let url = dir.values_url().unwrap();
    assert_eq!(url.query(), Some("valueRenderOption=UNFORMATTED_VALUE"));
    assert!(url.path().ends_with("/values/CMDutilisateurs"));
}

#[test]
fn values_url_encodes_sheet_name() {
    let mut config = sheets_config(SheetsCredentials::AccessToken("tok".into()));
    config.sheet_name = "Team A/B".into();
    let dir = SheetsDirectory::new(config).unwrap();
    let url = dir.values_url().unwrap();
    assert!(url.path().ends_with("/values/Team%20A%2FB"));
}

#[test]
fn values_url_tolerates_trailing_slash_in_base() {
    let mut config = sheets_config(SheetsCredentials::AccessToken("tok".into()));
    config.base_url = "http://localhost:9000/v4/".into();
    let dir = SheetsDirectory::new(config).unwrap();
    let url = dir.values_url().unwrap();
    assert!(url.as_str().starts_with("http://localhost:9000/v4/spreadsheets/"));
}

#[test]
fn values_url_rejects_invalid_base() {
    let mut config = sheets_config(SheetsCredentials::AccessToken("tok".into()));
    config.base_url = "not a url".into();
    let dir = SheetsDirectory::new(config).unwrap();
    assert!(matches!(dir.values_url(), Err(DirectoryError::InvalidUrl(_))));
}

#[test]
fn api_response_error_display_includes_status() {
    let err = DirectoryError::ApiResponse { status: 403, body: "PERMISSION_DENIED".into() };
    let msg = err.to_string();
    assert!(msg.contains("403"));
    assert!(msg.contains("PERMISSION_DENIED"));
}
