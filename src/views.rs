//! Server-rendered pages.
//!
//! Every full page extends `templates/base.html`, which draws the
//! navigation bar and the flash list. Output is HTML-escaped by askama.

use askama::Template;
use axum::response::Html;

use crate::services::forms::{LoginForm, SignupForm};
use crate::services::gate::{GuardedPage, Page};

#[derive(Template)]
#[template(path = "home.html")]
struct HomeTemplate<'a> {
    title: &'a str,
    flashes: &'a [String],
}

#[derive(Template)]
#[template(path = "about.html")]
struct AboutTemplate<'a> {
    title: &'a str,
    flashes: &'a [String],
}

#[derive(Template)]
#[template(path = "contact.html")]
struct ContactTemplate<'a> {
    title: &'a str,
    flashes: &'a [String],
}

#[derive(Template)]
#[template(path = "login.html")]
struct LoginTemplate<'a> {
    title: &'a str,
    flashes: &'a [String],
    form: &'a LoginForm,
}

#[derive(Template)]
#[template(path = "signup.html")]
struct SignupTemplate<'a> {
    title: &'a str,
    flashes: &'a [String],
    form: &'a SignupForm,
}

/// Bare `<h1>` fragment for the lesson routes.
#[derive(Template)]
#[template(path = "heading.html")]
struct HeadingTemplate<'a> {
    text: &'a str,
}

/// Render `page` with the notices drained from the session.
pub fn render_page(page: &Page, flashes: &[String]) -> Result<Html<String>, askama::Error> {
    let body = match page {
        Page::Home => HomeTemplate { title: "Home", flashes }.render()?,
        Page::Guarded(guarded @ GuardedPage::About) => AboutTemplate { title: guarded.title(), flashes }.render()?,
        Page::Guarded(guarded @ GuardedPage::Contact) => {
            ContactTemplate { title: guarded.title(), flashes }.render()?
        }
        Page::Login(form) => LoginTemplate { title: "Login", flashes, form }.render()?,
        Page::Signup(form) => SignupTemplate { title: "Signup", flashes, form }.render()?,
    };
    Ok(Html(body))
}

pub fn render_heading(text: &str) -> Result<Html<String>, askama::Error> {
    Ok(Html(HeadingTemplate { text }.render()?))
}
