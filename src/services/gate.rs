//! Session-gated page controller.
//!
//! SYSTEM CONTEXT
//! ==============
//! Route handlers load the caller's [`Session`], hand it to one of the
//! functions here, and turn the returned [`Outcome`] into a response. No
//! function in this module touches HTTP types or fails: a missing identity
//! or a bad form is an ordinary branch.
//!
//! STATE MACHINE
//! =============
//! Anonymous --(valid login)--> Authenticated
//! Anonymous --(invalid login)--> Anonymous
//! There is no way back to Anonymous short of the browser dropping the
//! cookie.

use std::sync::LazyLock;

use url::{Url, form_urlencoded};

use super::forms::{LoginForm, LoginInput, SignupForm, SignupInput};
use super::session::Session;

pub const USER_NAME_KEY: &str = "user_name";
pub const HOME_PATH: &str = "/home";
pub const LOGIN_PATH: &str = "/login";

pub const LOGIN_REQUIRED: &str = "Login Required";
pub const LOGGED_IN: &str = "You are now logged in";

/// Stand-in origin used to resolve `next` without trusting a host.
static LOCAL_ORIGIN: LazyLock<Url> = LazyLock::new(|| Url::parse("http://localhost/").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardedPage {
    About,
    Contact,
}

impl GuardedPage {
    #[must_use]
    pub fn title(self) -> &'static str {
        match self {
            Self::About => "About",
            Self::Contact => "Contact",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Identity<'a> {
    Anonymous,
    Authenticated(&'a str),
}

impl<'a> Identity<'a> {
    #[must_use]
    pub fn of(session: &'a Session) -> Self {
        session
            .get(USER_NAME_KEY)
            .map_or(Self::Anonymous, Self::Authenticated)
    }
}

/// Something the view layer knows how to render.
#[derive(Debug, Clone)]
pub enum Page {
    Home,
    Guarded(GuardedPage),
    Login(LoginForm),
    Signup(SignupForm),
}

#[derive(Debug, Clone)]
pub enum Outcome {
    Render(Page),
    Redirect(String),
}

#[must_use]
pub fn greeting(user_name: &str) -> String {
    format!("Hi {user_name}, Have a good day")
}

/// `/login?next=<url>` with the target form-encoded.
#[must_use]
pub fn login_url(next: &str) -> String {
    let query = form_urlencoded::Serializer::new(String::new())
        .append_pair("next", next)
        .finish();
    format!("{LOGIN_PATH}?{query}")
}

/// Where to send the client after login. Only same-site absolute paths are
/// honoured, re-encoded so the result is a valid `Location`; anything else
/// falls back to home.
#[must_use]
pub fn post_login_target(next: Option<&str>) -> String {
    next.map(str::trim)
        .and_then(local_target)
        .unwrap_or_else(|| HOME_PATH.to_owned())
}

fn local_target(next: &str) -> Option<String> {
    if !next.starts_with('/') {
        return None;
    }
    // `//host` and `/\host` resolve to another origin.
    let url = LOCAL_ORIGIN.join(next).ok()?;
    if url.origin() != LOCAL_ORIGIN.origin() {
        return None;
    }

    let mut target = url.path().to_owned();
    if let Some(query) = url.query() {
        target.push('?');
        target.push_str(query);
    }
    Some(target)
}

// =============================================================================
// OPERATIONS
// =============================================================================

#[must_use]
pub fn home() -> Outcome {
    Outcome::Render(Page::Home)
}

/// Render `page` for a signed-in client, otherwise bounce to login with
/// `request_url` preserved as `next`.
pub fn guarded_page(session: &mut Session, page: GuardedPage, request_url: &str) -> Outcome {
    let user_name = match Identity::of(session) {
        Identity::Anonymous => {
            tracing::debug!(page = page.title(), next = request_url, "login required");
            session.flash(LOGIN_REQUIRED);
            return Outcome::Redirect(login_url(request_url));
        }
        Identity::Authenticated(name) => name.to_owned(),
    };

    session.flash(greeting(&user_name));
    Outcome::Render(Page::Guarded(page))
}

#[must_use]
pub fn login_page() -> Outcome {
    Outcome::Render(Page::Login(LoginForm::new()))
}

pub fn login_submit(session: &mut Session, input: LoginInput, next: Option<&str>) -> Outcome {
    match input.validate() {
        Ok(login) => {
            tracing::info!(user_name = %login.username, "login accepted");
            session.set(USER_NAME_KEY, login.username);
            session.flash(LOGGED_IN);
            Outcome::Redirect(post_login_target(next))
        }
        Err(errors) => {
            tracing::debug!(fields = ?errors.keys().collect::<Vec<_>>(), "login rejected");
            Outcome::Render(Page::Login(LoginForm::with_errors(input, errors)))
        }
    }
}

#[must_use]
pub fn signup_page() -> Outcome {
    Outcome::Render(Page::Signup(SignupForm::new()))
}

/// Registration only acknowledges the submission; nothing is stored and
/// the client stays anonymous.
pub fn signup_submit(session: &mut Session, input: SignupInput) -> Outcome {
    match input.validate() {
        Ok(registration) => {
            tracing::info!(username = %registration.username, "signup accepted");
            tracing::debug!(
                email = %registration.email,
                gender = ?registration.gender,
                dob = ?registration.dob,
                "signup details"
            );
            session.flash(format!("You are now registered {}", registration.username));
            Outcome::Redirect(HOME_PATH.to_owned())
        }
        Err(errors) => Outcome::Render(Page::Signup(SignupForm::with_errors(input, errors))),
    }
}

#[cfg(test)]
#[path = "gate_test.rs"]
mod tests;
