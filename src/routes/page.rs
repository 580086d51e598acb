//! Page entry point: login or dashboard depending on session state.

use axum::extract::State;
use axum::response::Html;
use axum_extra::extract::cookie::CookieJar;

use super::AppError;
use super::identity::Identity;
use crate::services::render::{DashboardViewModel, Document, LoginViewModel, PAGE_TITLE, VIEWPORT};
use crate::services::{directory, session};
use crate::state::AppState;

/// `GET /` — render the login page for anonymous identities, otherwise the
/// dashboard bound to the active user and their directory role.
pub async fn handle_request(State(state): State<AppState>, jar: CookieJar) -> Result<(CookieJar, Html<String>), AppError> {
    let identity = Identity::from_jar(&jar);
    let document = build_page(&state, &identity.id).await?;
    let html = state.renderer.render_document(&document)?;
    Ok((identity.persist(jar, state.cookie_secure), Html(html)))
}

/// Select and render the page body for `identity`.
pub(crate) async fn build_page(state: &AppState, identity: &str) -> Result<Document, AppError> {
    // An empty username counts as logged out.
    let body = match session::get_active_user(state.properties.as_ref(), identity).await? {
        Some(user) if !user.is_empty() => {
            let role = directory::resolve_role(state.directory.as_ref(), &user).await?;
            if role.is_none() {
                tracing::debug!(%user, "active user has no directory role");
            }
            state.renderer.render(&DashboardViewModel { user, role })?
        }
        _ => state.renderer.render(&LoginViewModel {})?,
    };

    Ok(Document::new(body)
        .with_title(PAGE_TITLE)
        .with_meta_tag("viewport", VIEWPORT))
}

#[cfg(test)]
#[path = "page_test.rs"]
mod tests;
