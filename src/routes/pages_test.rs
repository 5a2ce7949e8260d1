use axum::Router;
use axum::body::Body;
use axum::http::header::{CONTENT_TYPE, COOKIE, LOCATION, SET_COOKIE};
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use tower::ServiceExt;

use super::*;
use crate::routes::app;
use crate::state::test_helpers::test_app_state;

fn test_app() -> Router {
    app(test_app_state())
}

fn get(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

fn post_form(uri: &str, body: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(CONTENT_TYPE, "application/x-www-form-urlencoded");
    if let Some(cookie) = cookie {
        builder = builder.header(COOKIE, cookie);
    }
    builder.body(Body::from(body.to_owned())).unwrap()
}

/// `name=value` of the `session` cookie the response set, as a browser would send it back.
fn session_cookie(response: &Response) -> Option<String> {
    response
        .headers()
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find(|v| v.starts_with("session="))
        .and_then(|v| v.split(';').next())
        .map(str::to_owned)
}

fn location(response: &Response) -> &str {
    response.headers().get(LOCATION).unwrap().to_str().unwrap()
}

async fn body_text(response: Response) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

/// Log in as `username` and return the session cookie.
async fn login_as(app: &Router, username: &str) -> String {
    let response = app
        .clone()
        .oneshot(post_form("/login", &format!("username={username}"), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FOUND);
    session_cookie(&response).unwrap()
}

// =============================================================================
// next_param
// =============================================================================

#[test]
fn next_param_extracts_and_decodes() {
    assert_eq!(next_param(Some("next=%2Fabout")), Some("/about".to_owned()));
    assert_eq!(next_param(Some("a=1&next=/contact")), Some("/contact".to_owned()));
    assert_eq!(next_param(Some("a=1")), None);
    assert_eq!(next_param(None), None);
}

// =============================================================================
// home
// =============================================================================

#[tokio::test]
async fn home_renders_on_both_paths() {
    let app = test_app();
    for path in ["/", "/home"] {
        let response = app.clone().oneshot(get(path, None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(session_cookie(&response).is_none());
        assert!(body_text(response).await.contains("<title>Home</title>"));
    }
}

#[tokio::test]
async fn healthz_ok() {
    let response = test_app().oneshot(get("/healthz", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

// =============================================================================
// gate
// =============================================================================

#[tokio::test]
async fn anonymous_about_redirects_to_login_with_next() {
    let app = test_app();
    let response = app.clone().oneshot(get("/about", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(location(&response), "/login?next=%2Fabout");

    // The queued notice shows up on the login page and only there.
    let cookie = session_cookie(&response).unwrap();
    let response = app.clone().oneshot(get("/login?next=%2Fabout", Some(&cookie))).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let cleared = session_cookie(&response);
    let body = body_text(response).await;
    assert!(body.contains("<li>Login Required</li>"));

    let response = app.oneshot(get("/home", cleared.as_deref())).await.unwrap();
    assert!(!body_text(response).await.contains("Login Required"));
}

#[tokio::test]
async fn anonymous_contact_redirect_is_idempotent() {
    let app = test_app();
    for _ in 0..3 {
        let response = app.clone().oneshot(get("/contact", None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(location(&response), "/login?next=%2Fcontact");
    }
}

#[tokio::test]
async fn unfollowed_redirects_queue_one_notice() {
    let app = test_app();
    let response = app.clone().oneshot(get("/about", None)).await.unwrap();
    let mut cookie = session_cookie(&response).unwrap();
    for _ in 0..2 {
        let response = app.clone().oneshot(get("/about", Some(&cookie))).await.unwrap();
        assert_eq!(response.status(), StatusCode::FOUND);
        if let Some(next) = session_cookie(&response) {
            cookie = next;
        }
    }

    let response = app.oneshot(get("/login", Some(&cookie))).await.unwrap();
    assert_eq!(body_text(response).await.matches("Login Required").count(), 1);
}

#[tokio::test]
async fn next_keeps_query_string() {
    let response = test_app().oneshot(get("/about?tab=team", None)).await.unwrap();
    assert_eq!(location(&response), "/login?next=%2Fabout%3Ftab%3Dteam");
}

#[tokio::test]
async fn authenticated_pages_render_with_greeting() {
    let app = test_app();
    let cookie = login_as(&app, "alice").await;

    for (path, title) in [("/about", "About"), ("/contact", "Contact")] {
        let response = app.clone().oneshot(get(path, Some(&cookie))).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_text(response).await;
        assert!(body.contains(&format!("<title>{title}</title>")));
        assert!(body.contains("Hi alice, Have a good day"));
    }
}

#[tokio::test]
async fn tampered_cookie_is_treated_as_anonymous() {
    let app = test_app();
    let cookie = login_as(&app, "alice").await;
    let tampered = cookie.replace("alice", "mallo");
    let response = app.oneshot(get("/about", Some(&tampered))).await.unwrap();
    assert_eq!(response.status(), StatusCode::FOUND);
}

// =============================================================================
// login
// =============================================================================

#[tokio::test]
async fn login_page_renders_empty_form() {
    let response = test_app().oneshot(get("/login", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;
    assert!(body.contains("<title>Login</title>"));
    assert!(body.contains("name=\"username\""));
    assert!(!body.contains("class=\"error\""));
}

#[tokio::test]
async fn login_round_trip_resumes_at_next() {
    let app = test_app();

    let response = app.clone().oneshot(post_form("/login?next=/contact", "username=alice", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(location(&response), "/contact");
    let cookie = session_cookie(&response).unwrap();

    let response = app.oneshot(get("/contact", Some(&cookie))).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;
    assert!(body.contains("<li>You are now logged in</li>"));
    assert!(body.contains("alice"));
}

#[tokio::test]
async fn login_with_encoded_next() {
    let response = test_app()
        .oneshot(post_form("/login?next=%2Fabout", "username=alice", None))
        .await
        .unwrap();
    assert_eq!(location(&response), "/about");
}

#[tokio::test]
async fn login_without_next_goes_home() {
    let response = test_app().oneshot(post_form("/login", "username=alice", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(location(&response), "/home");
}

#[tokio::test]
async fn login_with_non_ascii_next_is_reencoded() {
    let response = test_app()
        .oneshot(post_form("/login?next=/caf%C3%A9", "username=alice", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(location(&response), "/caf%C3%A9");
}

#[tokio::test]
async fn login_with_foreign_next_goes_home() {
    let response = test_app()
        .oneshot(post_form("/login?next=https%3A%2F%2Fevil.example%2F", "username=alice", None))
        .await
        .unwrap();
    assert_eq!(location(&response), "/home");
}

#[tokio::test]
async fn empty_username_rerenders_without_session() {
    let app = test_app();
    let response = app.clone().oneshot(post_form("/login?next=/about", "username=", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().get(LOCATION).is_none());
    assert!(session_cookie(&response).is_none());
    let body = body_text(response).await;
    assert!(body.contains("This field is required."));

    let response = app.oneshot(get("/about", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::FOUND);
}

#[tokio::test]
async fn missing_username_field_is_a_validation_error() {
    let response = test_app().oneshot(post_form("/login", "", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("This field is required."));
}

// =============================================================================
// signup
// =============================================================================

#[tokio::test]
async fn signup_success_flashes_on_home() {
    let app = test_app();
    let body = "username=alice&email=alice%40example.com&gender=Female&dob=2000-01-31&password=secret&confirm_password=secret";
    let response = app.clone().oneshot(post_form("/signup", body, None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(location(&response), "/home");
    let cookie = session_cookie(&response).unwrap();

    let response = app.clone().oneshot(get("/home", Some(&cookie))).await.unwrap();
    assert!(body_text(response).await.contains("You are now registered alice"));

    // Registering does not sign the client in.
    let response = app.oneshot(get("/about", Some(&cookie))).await.unwrap();
    assert_eq!(response.status(), StatusCode::FOUND);
}

#[tokio::test]
async fn signup_mismatch_rerenders() {
    let body = "username=alice&email=alice%40example.com&password=secret&confirm_password=other";
    let response = test_app().oneshot(post_form("/signup", body, None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;
    assert!(body.contains("Passwords must match"));
    assert!(body.contains("value=\"alice\""));
}

#[tokio::test]
async fn signup_page_renders() {
    let response = test_app().oneshot(get("/signup", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("<title>Signup</title>"));
}
