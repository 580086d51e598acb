//! JSON endpoints page scripts call for session and directory operations.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::http::header::CONTENT_TYPE;
use axum::response::{IntoResponse, Json};
use axum_extra::extract::cookie::CookieJar;
use serde::{Deserialize, Serialize};

use super::AppError;
use super::identity::Identity;
use crate::services::render::RenderError;
use crate::services::{directory, session};
use crate::state::AppState;

#[derive(Debug, Serialize, Deserialize)]
pub struct ActiveUserResponse {
    pub user: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SetActiveUserBody {
    pub username: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RoleResponse {
    pub username: String,
    pub role: Option<String>,
}

/// `GET /api/session` — the identity's active user, or `null`.
pub async fn get_active_user(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<(CookieJar, Json<ActiveUserResponse>), AppError> {
    let identity = Identity::from_jar(&jar);
    let user = session::get_active_user(state.properties.as_ref(), &identity.id).await?;
    Ok((identity.persist(jar, state.cookie_secure), Json(ActiveUserResponse { user })))
}

/// `POST /api/session` — log the identity in as `username`. Not checked
/// against the directory.
pub async fn set_active_user(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(body): Json<SetActiveUserBody>,
) -> Result<(CookieJar, StatusCode), AppError> {
    let identity = Identity::from_jar(&jar);
    session::set_active_user(state.properties.as_ref(), &identity.id, &body.username).await?;
    Ok((identity.persist(jar, state.cookie_secure), StatusCode::NO_CONTENT))
}

/// `POST /api/logout` — clear the session. Always answers `true`.
pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> impl IntoResponse {
    let identity = Identity::from_jar(&jar);
    let ok = session::logout(state.properties.as_ref(), &identity.id).await;
    (identity.persist(jar, state.cookie_secure), Json(ok))
}

/// `GET /api/roles/{username}` — directory role for any username.
pub async fn get_role(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Json<RoleResponse>, AppError> {
    let role = directory::resolve_role(state.directory.as_ref(), &username).await?;
    Ok(Json(RoleResponse { username, role }))
}

/// `GET /api/include/{name}` — raw source of a template fragment.
pub async fn include(State(state): State<AppState>, Path(name): Path<String>) -> Result<impl IntoResponse, AppError> {
    // A missing fragment is the caller's mistake; a missing page template is not.
    let source = state.renderer.include(&name).map_err(|e| match e {
        RenderError::NotFound(name) => AppError::FragmentNotFound(name),
        other => AppError::Render(other),
    })?;
    Ok(([(CONTENT_TYPE, "text/plain; charset=utf-8")], source))
}

#[cfg(test)]
#[path = "rpc_test.rs"]
mod tests;
