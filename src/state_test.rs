use super::*;
use super::test_helpers::*;

#[tokio::test]
async fn static_directory_has_header_row() {
    let dir = StaticDirectory::from_records(&[("alice", "admin")]);
    let rows = dir.fetch_rows().await.unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0][0], "username");
    assert_eq!(rows[1][1], "admin");
}

#[tokio::test]
async fn test_app_state_starts_anonymous() {
    let state = test_app_state(&[("alice", "admin")]);
    let user = state.properties.get_property("any", "activeUser").await.unwrap();
    assert!(user.is_none());
}

#[test]
fn app_state_clone_shares_collaborators() {
    let state = test_app_state(&[]);
    let cloned = state.clone();
    assert!(Arc::ptr_eq(&state.renderer, &cloned.renderer));
    assert!(Arc::ptr_eq(&state.properties, &cloned.properties));
    assert!(!cloned.cookie_secure);
}

#[test]
fn shipped_renderer_points_at_crate_templates() {
    let renderer = shipped_renderer();
    assert!(renderer.template_dir().ends_with("templates"));
}
