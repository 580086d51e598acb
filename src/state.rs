//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor. It
//! holds the three collaborators a request needs: the property store backing
//! sessions, the user directory, and the template renderer. Each is behind an
//! `Arc` so handlers never touch a process-wide global.

use std::sync::Arc;

use crate::services::directory::UserDirectory;
use crate::services::properties::PropertyStore;
use crate::services::render::TemplateRenderer;

/// Shared application state, injected into Axum handlers via State extractor.
/// Clone is required by Axum; all inner fields are Arc-wrapped or Copy.
#[derive(Clone)]
pub struct AppState {
    pub properties: Arc<dyn PropertyStore>,
    pub directory: Arc<dyn UserDirectory>,
    pub renderer: Arc<TemplateRenderer>,
    /// Sets the `Secure` flag on the identity cookie.
    pub cookie_secure: bool,
}

impl AppState {
    #[must_use]
    pub fn new(
        properties: Arc<dyn PropertyStore>,
        directory: Arc<dyn UserDirectory>,
        renderer: TemplateRenderer,
        cookie_secure: bool,
    ) -> Self {
        Self { properties, directory, renderer: Arc::new(renderer), cookie_secure }
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================


#[cfg(test)]
#[path = "state_test.rs"]
mod tests;
