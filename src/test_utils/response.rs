//! Assertions on handler responses and helpers for reading their bodies.

use axum::{body::Body, http::StatusCode, response::Response};
use scraper::Html;

async fn body_text(response: Response<Body>) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("could not read response body");

    String::from_utf8_lossy(&bytes).into_owned()
}

/// Parse a full page, `<html>` and all.
pub(crate) async fn parse_html_document(response: Response<Body>) -> Html {
    Html::parse_document(&body_text(response).await)
}

/// Parse a partial that htmx swaps into a page.
pub(crate) async fn parse_html_fragment(response: Response<Body>) -> Html {
    Html::parse_fragment(&body_text(response).await)
}

#[track_caller]
pub(crate) fn assert_valid_html(html: &Html) {
    assert!(html.errors.is_empty(), "HTML parse errors: {:?}", html.errors);
}

#[track_caller]
pub(crate) fn get_header(response: &Response<Body>, name: &str) -> String {
    match response.headers().get(name) {
        Some(value) => value
            .to_str()
            .unwrap_or_else(|error| panic!("header {name} is not visible ASCII: {error}"))
            .to_owned(),
        None => panic!("response has no {name} header, got {:?}", response.headers()),
    }
}

#[track_caller]
pub(crate) fn assert_status_ok(response: &Response<Body>) {
    assert_eq!(response.status(), StatusCode::OK, "unexpected status code");
}

#[track_caller]
pub(crate) fn assert_content_type(response: &Response<Body>, want: &str) {
    assert_eq!(get_header(response, "content-type"), want);
}

#[track_caller]
pub(crate) fn assert_hx_redirect(response: &Response<Body>, want: &str) {
    assert_eq!(get_header(response, "hx-redirect"), want);
}
