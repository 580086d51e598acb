//! Active-user session management.
//!
//! ARCHITECTURE
//! ============
//! A session is a single property, `activeUser`, in the identity's property
//! scope. Presence means the identity is authenticated as that username;
//! absence means anonymous. Identities themselves are opaque random tokens
//! minted here and carried by the routes layer in a cookie.
//!
//! TRADE-OFFS
//! ==========
//! `set_active_user` does not check the directory. Any username is accepted
//! and an unknown one simply resolves to no role on the dashboard.

use std::fmt::Write;

use rand::Rng;

use super::properties::{PropertyStore, PropertyStoreError};

/// Property key holding the logged-in username.
pub const ACTIVE_USER_KEY: &str = "activeUser";

pub(crate) fn bytes_to_hex(bytes: &[u8]) -> String {
    let mut s = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        let _ = write!(s, "{b:02x}");
    }
    s
}

/// Generate a cryptographically random 32-byte hex identity token.
#[must_use]
pub fn generate_identity() -> String {
    let bytes: [u8; 32] = rand::rng().random();
    bytes_to_hex(&bytes)
}

/// True when `raw` has the shape of a token minted by [`generate_identity`].
#[must_use]
pub fn is_valid_identity(raw: &str) -> bool {
    raw.len() == 64 && raw.bytes().all(|b| b.is_ascii_hexdigit())
}

/// Return the username this identity is logged in as, if any.
pub async fn get_active_user(store: &dyn PropertyStore, identity: &str) -> Result<Option<String>, PropertyStoreError> {
    store.get_property(identity, ACTIVE_USER_KEY).await
}

/// Log the identity in as `username`, replacing any previous user.
pub async fn set_active_user(store: &dyn PropertyStore, identity: &str, username: &str) -> Result<(), PropertyStoreError> {
    store.set_property(identity, ACTIVE_USER_KEY, username).await?;
    tracing::info!(%username, "active user set");
    Ok(())
}

/// Clear the identity's session. Always reports success.
pub async fn logout(store: &dyn PropertyStore, identity: &str) -> bool {
    if let Err(e) = store.delete_property(identity, ACTIVE_USER_KEY).await {
        tracing::warn!(error = %e, "failed to clear active user");
    }
    true
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
