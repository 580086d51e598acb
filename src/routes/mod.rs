//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! `/` serves the session-gated page. Page scripts talk to the JSON endpoints
//! under `/api` to log in, log out, and look up roles. All endpoints key their
//! session state by the identity cookie.

pub mod identity;
pub mod page;
pub mod rpc;

use axum::Router;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use tower_http::trace::TraceLayer;

use crate::services::directory::DirectoryError;
use crate::services::properties::PropertyStoreError;
use crate::services::render::RenderError;
use crate::state::AppState;

pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/", get(page::handle_request))
        .route("/api/session", get(rpc::get_active_user).post(rpc::set_active_user))
        .route("/api/logout", post(rpc::logout))
        .route("/api/roles/{username}", get(rpc::get_role))
        .route("/api/include/{name}", get(rpc::include))
        .route("/healthz", get(healthz))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}

// =============================================================================
// ERRORS
// =============================================================================

/// Any collaborator failure while serving a request. The whole request fails;
/// nothing is retried.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Properties(#[from] PropertyStoreError),
    #[error(transparent)]
    Directory(#[from] DirectoryError),
    #[error(transparent)]
    Render(#[from] RenderError),
    /// A fragment requested through `/api/include` does not exist.
    #[error("fragment not found: {0}")]
    FragmentNotFound(String),
}

pub(crate) fn app_error_to_status(err: &AppError) -> StatusCode {
    match err {
        AppError::FragmentNotFound(_) => StatusCode::NOT_FOUND,
        AppError::Properties(_) | AppError::Directory(_) | AppError::Render(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = app_error_to_status(&self);
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
            return (status, "Internal Server Error").into_response();
        }
        (status, self.to_string()).into_response()
    }
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
