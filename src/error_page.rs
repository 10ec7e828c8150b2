//! Full-page responses for failed requests: the 404 and 500 pages.

use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};

use crate::html::error_view;

/// A page explaining a failed request, and what the user can do about it.
#[derive(Debug)]
pub struct ErrorPage {
    pub status: StatusCode,
    pub description: String,
    pub fix: String,
}

impl ErrorPage {
    pub fn not_found() -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            description: "Something's missing.".to_owned(),
            fix: "Sorry, we can't find that page. Head back to the dashboard to keep going."
                .to_owned(),
        }
    }

    pub fn internal() -> Self {
        Self::internal_with(
            "Sorry, something went wrong.",
            "Try again later or check the server logs",
        )
    }

    pub fn internal_with(description: &str, fix: &str) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            description: description.to_owned(),
            fix: fix.to_owned(),
        }
    }

    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }
}

impl IntoResponse for ErrorPage {
    fn into_response(self) -> Response {
        let title = self.status.canonical_reason().unwrap_or("Error");
        let page = error_view(title, self.status.as_str(), &self.description, &self.fix);

        (self.status, Html(page.into_string())).into_response()
    }
}

/// Route handler for the 404 fallback.
pub async fn get_404_not_found() -> Response {
    ErrorPage::not_found().into_response()
}

/// The page htmx requests are redirected to when a handler fails mid-flow.
pub async fn get_internal_server_error_page() -> Response {
    ErrorPage::internal().into_response()
}

#[cfg(test)]
mod tests {
    use axum::{http::StatusCode, response::IntoResponse};
    use scraper::{Html, Selector};

    use crate::test_utils::{assert_valid_html, parse_html_document};

    use super::{ErrorPage, get_404_not_found, get_internal_server_error_page};

    fn heading(document: &Html) -> String {
        document
            .select(&Selector::parse("h1").unwrap())
            .next()
            .expect("no heading")
            .text()
            .collect::<String>()
            .trim()
            .to_owned()
    }

    #[tokio::test]
    async fn fallback_renders_404_page() {
        let response = get_404_not_found().await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let document = parse_html_document(response).await;
        assert_valid_html(&document);
        assert_eq!(heading(&document), "404");
    }

    #[tokio::test]
    async fn renders_500_page() {
        let response = get_internal_server_error_page().await;

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let document = parse_html_document(response).await;
        assert_valid_html(&document);
        assert_eq!(heading(&document), "500");
        let text = document.root_element().text().collect::<String>();
        assert!(text.contains("Sorry, something went wrong."));
    }

    #[tokio::test]
    async fn status_can_be_overridden() {
        let response =
            ErrorPage::internal_with("Invalid Period", "2024-13 is not a valid year and month.")
                .with_status(StatusCode::BAD_REQUEST)
                .into_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let document = parse_html_document(response).await;
        assert_eq!(heading(&document), "400");
    }
}
