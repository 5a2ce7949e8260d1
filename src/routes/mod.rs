//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! This module binds the server-rendered pages (session-gated navigation,
//! login and signup forms) and the stateless lesson routes (dynamic
//! segments and redirects) under a single Axum router.

pub mod lessons;
pub mod pages;

use axum::Router;
use axum::http::StatusCode;
use axum::http::header::LOCATION;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/", get(pages::home))
        .route("/home", get(pages::home))
        .route("/about", get(pages::about))
        .route("/contact", get(pages::contact))
        .route("/login", get(pages::login_page).post(pages::login_submit))
        .route("/signup", get(pages::signup_page).post(pages::signup_submit))
        .route("/welcome/{name}", get(lessons::welcome))
        .route("/addition/{a}/{b}", get(lessons::addition))
        .route("/score/{name}/{marks}", get(lessons::score))
        .route("/pass/{name}/{marks}", get(lessons::passed))
        .route("/fail/{name}/{marks}", get(lessons::failed))
        .route("/healthz", get(healthz))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// `302 Found` to `target`.
pub(crate) fn found(target: &str) -> Response {
    (StatusCode::FOUND, [(LOCATION, target.to_owned())]).into_response()
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}
