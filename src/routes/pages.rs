//! Page routes: home, the gated about/contact pages, login and signup.
//!
//! Each handler loads the session from the signed cookie jar, runs the
//! matching `gate` operation, and writes the session back alongside the
//! response. Flashes are drained only when a page is actually rendered, so
//! notices queued before a redirect show up on the page it lands on.

use axum::extract::{Form, OriginalUri, RawQuery, State};
use axum::http::Uri;
use axum::response::{IntoResponse, Response};
use axum_extra::extract::cookie::SignedCookieJar;
use url::form_urlencoded;

use super::found;
use crate::error::AppError;
use crate::services::forms::{LoginInput, SignupInput};
use crate::services::gate::{self, GuardedPage, Outcome};
use crate::services::session::Session;
use crate::state::AppState;
use crate::views;

fn respond(state: &AppState, jar: SignedCookieJar, mut session: Session, outcome: Outcome) -> Response {
    let secure = state.cookie_secure();
    match outcome {
        Outcome::Redirect(target) => {
            tracing::debug!(location = %target, pending_flashes = session.flashes().count(), "redirecting");
            (session.store(jar, secure), found(&target)).into_response()
        }
        Outcome::Render(page) => {
            let flashes = session.take_flashes();
            match views::render_page(&page, &flashes) {
                Ok(html) => (session.store(jar, secure), html).into_response(),
                // Session left unstored so the notices are not lost.
                Err(e) => AppError::from(e).into_response(),
            }
        }
    }
}

/// First `next` value in a raw query string.
pub(crate) fn next_param(query: Option<&str>) -> Option<String> {
    form_urlencoded::parse(query?.as_bytes())
        .find(|(key, _)| key == "next")
        .map(|(_, value)| value.into_owned())
}

fn guarded(state: &AppState, jar: SignedCookieJar, page: GuardedPage, uri: &Uri) -> Response {
    let mut session = Session::from_jar(&jar);
    let request_url = uri.path_and_query().map_or_else(|| uri.path(), |pq| pq.as_str());
    let outcome = gate::guarded_page(&mut session, page, request_url);
    respond(state, jar, session, outcome)
}

// =============================================================================
// HANDLERS
// =============================================================================

/// `GET /` and `GET /home`.
pub async fn home(State(state): State<AppState>, jar: SignedCookieJar) -> Response {
    let session = Session::from_jar(&jar);
    respond(&state, jar, session, gate::home())
}

/// `GET /about`: signed-in clients only.
pub async fn about(State(state): State<AppState>, jar: SignedCookieJar, OriginalUri(uri): OriginalUri) -> Response {
    guarded(&state, jar, GuardedPage::About, &uri)
}

/// `GET /contact`: signed-in clients only.
pub async fn contact(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    OriginalUri(uri): OriginalUri,
) -> Response {
    guarded(&state, jar, GuardedPage::Contact, &uri)
}

/// `GET /login`
pub async fn login_page(State(state): State<AppState>, jar: SignedCookieJar) -> Response {
    let session = Session::from_jar(&jar);
    respond(&state, jar, session, gate::login_page())
}

/// `POST /login`: `next` rides along in the query string of the form action.
pub async fn login_submit(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    RawQuery(query): RawQuery,
    Form(input): Form<LoginInput>,
) -> Response {
    let mut session = Session::from_jar(&jar);
    let next = next_param(query.as_deref());
    let outcome = gate::login_submit(&mut session, input, next.as_deref());
    respond(&state, jar, session, outcome)
}

/// `GET /signup`
pub async fn signup_page(State(state): State<AppState>, jar: SignedCookieJar) -> Response {
    let session = Session::from_jar(&jar);
    respond(&state, jar, session, gate::signup_page())
}

/// `POST /signup`
pub async fn signup_submit(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    Form(input): Form<SignupInput>,
) -> Response {
    let mut session = Session::from_jar(&jar);
    let outcome = gate::signup_submit(&mut session, input);
    respond(&state, jar, session, outcome)
}

#[cfg(test)]
#[path = "pages_test.rs"]
mod tests;
