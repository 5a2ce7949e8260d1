//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor.
//! It holds the parsed config and the cookie signing key. There is no
//! per-client state here: sessions live entirely in the client's cookie.

use std::sync::Arc;

use axum::extract::FromRef;
use axum_extra::extract::cookie::Key;
use sha2::{Digest, Sha512};

use crate::config::AppConfig;

/// Shared application state, injected into Axum handlers via State extractor.
/// Clone is required by Axum; all inner fields are Arc-wrapped or Clone.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub key: Key,
}

impl AppState {
    #[must_use]
    pub fn new(config: AppConfig) -> Self {
        let key = signing_key(config.secret_key.as_deref());
        Self { config: Arc::new(config), key }
    }

    #[must_use]
    pub fn cookie_secure(&self) -> bool {
        self.config.cookie_secure
    }
}

/// Lets `SignedCookieJar` pull the key straight out of the state.
impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Self {
        state.key.clone()
    }
}

/// Expand the configured secret to the 64 bytes the cookie key needs.
/// Without a secret, a random key is used and sessions die with the process.
pub(crate) fn signing_key(secret: Option<&str>) -> Key {
    match secret {
        Some(secret) => Key::from(Sha512::digest(secret.as_bytes()).as_slice()),
        None => {
            tracing::warn!("SECRET_KEY not set; using a random key, sessions will not survive restarts");
            Key::generate()
        }
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================
