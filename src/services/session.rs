//! Client-side sessions carried in a signed cookie.
//!
//! ARCHITECTURE
//! ============
//! The whole session (a string key-value map plus the flash queue) is
//! serialized as JSON into a single `session` cookie and signed with the
//! server key. A cookie that fails signature verification never reaches
//! this module: `SignedCookieJar::get` drops it, so the client simply
//! starts over as anonymous.
//!
//! TRADE-OFFS
//! ==========
//! Nothing is stored server-side, so there is no expiry or revocation.
//! A session lives exactly as long as the browser keeps the cookie.

use std::collections::{BTreeMap, VecDeque};

use axum_extra::extract::cookie::{Cookie, SameSite, SignedCookieJar};
use serde::{Deserialize, Serialize};

pub const COOKIE_NAME: &str = "session";

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct Payload {
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    values: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "VecDeque::is_empty")]
    flashes: VecDeque<String>,
}

impl Payload {
    fn is_empty(&self) -> bool {
        self.values.is_empty() && self.flashes.is_empty()
    }
}

/// Per-client session state for one request.
///
/// Load it with [`Session::from_jar`], mutate it, then write it back with
/// [`Session::store`]. Only a modified session produces a `Set-Cookie`.
#[derive(Debug, Default, Clone)]
pub struct Session {
    payload: Payload,
    modified: bool,
}

impl Session {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Read the verified session cookie. Missing or undecodable cookies
    /// yield an empty session.
    #[must_use]
    pub fn from_jar(jar: &SignedCookieJar) -> Self {
        let Some(cookie) = jar.get(COOKIE_NAME) else {
            return Self::new();
        };

        match serde_json::from_str::<Payload>(cookie.value()) {
            Ok(payload) => Self { payload, modified: false },
            Err(e) => {
                tracing::warn!(error = %e, "discarding undecodable session cookie");
                // Marked modified so the bad cookie gets cleared on the way out.
                Self { payload: Payload::default(), modified: true }
            }
        }
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.payload.values.get(key).map(String::as_str)
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.payload.values.insert(key.into(), value.into());
        self.modified = true;
    }

    /// Queue a one-shot notice for the next rendered page. A notice equal
    /// to the last one still pending is dropped, so redirects that are never
    /// followed cannot grow the cookie.
    pub fn flash(&mut self, message: impl Into<String>) {
        let message = message.into();
        if self.payload.flashes.back() == Some(&message) {
            return;
        }
        self.payload.flashes.push_back(message);
        self.modified = true;
    }

    /// Pending notices in the order they were queued.
    pub fn flashes(&self) -> impl Iterator<Item = &str> {
        self.payload.flashes.iter().map(String::as_str)
    }

    /// Drain the flash queue. Called by the render step only.
    pub fn take_flashes(&mut self) -> Vec<String> {
        if self.payload.flashes.is_empty() {
            return Vec::new();
        }
        self.modified = true;
        self.payload.flashes.drain(..).collect()
    }

    #[must_use]
    pub fn is_modified(&self) -> bool {
        self.modified
    }

    /// Write the session back into the jar. Unmodified sessions leave the
    /// jar untouched; an emptied session removes the cookie.
    #[must_use]
    pub fn store(self, jar: SignedCookieJar, secure: bool) -> SignedCookieJar {
        if !self.is_modified() {
            return jar;
        }

        if self.payload.is_empty() {
            return jar.remove(Cookie::build(COOKIE_NAME).path("/"));
        }

        let value = match serde_json::to_string(&self.payload) {
            Ok(v) => v,
            Err(e) => {
                tracing::error!(error = %e, "session serialization failed");
                return jar;
            }
        };

        let cookie = Cookie::build((COOKIE_NAME, value))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(secure);
        jar.add(cookie)
    }
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
