//! Domain services used by the HTTP routes.
//!
//! ARCHITECTURE
//! ============
//! Service modules own session, directory, and rendering logic so route
//! handlers stay focused on cookie plumbing and protocol translation.

pub mod directory;
pub mod properties;
pub mod render;
pub mod session;
