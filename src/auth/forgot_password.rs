//! Explains how to reset a forgotten password.

use axum::response::{IntoResponse, Response};
use maud::html;

use crate::{
    endpoints,
    html::{base, link, log_in_register},
};

/// Display the instructions for resetting a password from the server.
///
/// There is no email delivery, so passwords are reset by whoever runs the
/// server.
pub async fn get_forgot_password_page() -> Response {
    let content = html! {
        div class="space-y-4 text-gray-900 dark:text-white"
        {
            p
            {
                "Ask the person who runs Zard Finance to reset your password with the "
                code { "reset_password" }
                " tool on the server:"
            }

            pre class="p-2 overflow-x-auto rounded bg-gray-100 dark:bg-gray-700"
            {
                code { "reset_password --db-path <database> --email <your email>" }
            }

            p
            {
                "Remembered it? "
                (link(endpoints::LOG_IN_VIEW, "Log in here"))
            }
        }
    };

    base(
        "Forgot Password",
        &[],
        &log_in_register("Forgot your password?", &content),
    )
    .into_response()
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use scraper::Selector;

    use crate::{
        endpoints,
        test_utils::{assert_valid_html, parse_html_document},
    };

    use super::get_forgot_password_page;

    #[tokio::test]
    async fn page_links_back_to_log_in() {
        let response = get_forgot_password_page().await;

        assert_eq!(response.status(), StatusCode::OK);
        let document = parse_html_document(response).await;
        assert_valid_html(&document);
        let has_log_in_link = document
            .select(&Selector::parse("a[href]").unwrap())
            .any(|link| link.value().attr("href") == Some(endpoints::LOG_IN_VIEW));
        assert!(has_log_in_link, "no link to the log-in page");
    }
}
