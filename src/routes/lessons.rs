//! Stateless routes exercising dynamic segments and URL building.
//!
//! Integer segments follow the usual converter rules: ASCII digits only.
//! Anything else is a 404, the same as an unmatched path.

use std::sync::LazyLock;

use axum::extract::Path;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use url::Url;

use super::found;
use crate::error::AppError;
use crate::views;

/// Scores below this fail.
pub const PASS_MARK: u64 = 30;

static BASE_URL: LazyLock<Url> = LazyLock::new(|| Url::parse("http://localhost/").unwrap());

/// Capitalise the first letter of every run of letters, lowercase the rest.
pub(crate) fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_alpha = false;
    for c in s.chars() {
        if prev_alpha {
            out.extend(c.to_lowercase());
        } else {
            out.extend(c.to_uppercase());
        }
        prev_alpha = c.is_alphabetic();
    }
    out
}

pub(crate) fn parse_uint(raw: &str) -> Option<u64> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    raw.parse().ok()
}

/// Absolute path from raw segments, each percent-encoded.
pub(crate) fn url_for(segments: &[&str]) -> String {
    let mut url = BASE_URL.clone();
    if let Ok(mut path) = url.path_segments_mut() {
        path.clear().extend(segments);
    }
    url.path().to_owned()
}

// =============================================================================
// HANDLERS
// =============================================================================

/// `GET /welcome/{name}`
pub async fn welcome(Path(name): Path<String>) -> Result<Response, AppError> {
    Ok(views::render_heading(&format!("Hello {}", title_case(&name)))?.into_response())
}

/// `GET /addition/{a}/{b}`: plain-text sum.
pub async fn addition(Path((a, b)): Path<(String, String)>) -> Response {
    match (parse_uint(&a), parse_uint(&b)) {
        (Some(a), Some(b)) => (u128::from(a) + u128::from(b)).to_string().into_response(),
        _ => StatusCode::NOT_FOUND.into_response(),
    }
}

/// `GET /score/{name}/{marks}`: redirect to the pass or fail page.
pub async fn score(Path((name, marks)): Path<(String, String)>) -> Response {
    let Some(marks) = parse_uint(&marks) else {
        return StatusCode::NOT_FOUND.into_response();
    };

    let verdict = if marks < PASS_MARK { "fail" } else { "pass" };
    tracing::debug!(%name, marks, verdict, "score routed");
    found(&url_for(&[verdict, &name, &marks.to_string()]))
}

/// `GET /pass/{name}/{marks}`
pub async fn passed(Path((name, marks)): Path<(String, String)>) -> Result<Response, AppError> {
    let Some(marks) = parse_uint(&marks) else {
        return Ok(StatusCode::NOT_FOUND.into_response());
    };
    let text = format!("Congrats {}, you passed with {marks}", title_case(&name));
    Ok(views::render_heading(&text)?.into_response())
}

/// `GET /fail/{name}/{marks}`
pub async fn failed(Path((name, marks)): Path<(String, String)>) -> Result<Response, AppError> {
    let Some(marks) = parse_uint(&marks) else {
        return Ok(StatusCode::NOT_FOUND.into_response());
    };
    let text = format!("Sorry {}, you failed with {marks}", title_case(&name));
    Ok(views::render_heading(&text)?.into_response())
}

#[cfg(test)]
#[path = "lessons_test.rs"]
mod tests;
