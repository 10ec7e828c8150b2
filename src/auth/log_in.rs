//! The log-in page and the handler for log-in requests.

use std::sync::{Arc, Mutex};

use axum::{
    Form,
    extract::{FromRef, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};
use axum_htmx::HxRedirect;
use maud::{Markup, html};
use rusqlite::Connection;
use serde::Deserialize;
use time::Duration;

use crate::{
    AppState, Error,
    auth::{
        UserID, get_user_by_email, invalidate_auth_cookie, normalize_redirect_url,
        set_auth_cookie,
    },
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, LINK_STYLE, PasswordInput,
        base, loading_spinner, log_in_register, password_input,
    },
    timezone::get_local_offset,
};

/// How long the auth cookie should last if the user selects "remember me" at log-in.
const REMEMBER_ME_COOKIE_DURATION: Duration = Duration::days(7);

pub const INVALID_CREDENTIALS_ERROR_MSG: &str = "Incorrect email or password.";

const INTERNAL_ERROR_MSG: &str = "An internal error occurred. Please try again later.";

fn log_in_form(email: &str, error_message: Option<&str>, redirect_url: Option<&str>) -> Markup {
    html! {
        form
            hx-post=(endpoints::LOG_IN_API)
            hx-swap="outerHTML"
            hx-indicator="#indicator"
            hx-disabled-elt="#email, #password, #submit-button"
            class="space-y-4 md:space-y-6"
        {
            @if let Some(redirect_url) = redirect_url {
                input type="hidden" name="redirect_url" value=(redirect_url);
            }

            div
            {
                label for="email" class=(FORM_LABEL_STYLE) { "Email" }

                input
                    type="email"
                    name="email"
                    id="email"
                    placeholder="you@example.com"
                    class=(FORM_TEXT_INPUT_STYLE)
                    required
                    autofocus
                    value=(email);
            }

            (password_input(PasswordInput {
                name: "password",
                label: "Password",
                value: "",
                min_length: 0,
                autofocus: false,
                error_message,
            }))

            div class="flex items-center gap-x-3"
            {
                input
                    type="checkbox"
                    name="remember_me"
                    id="remember_me"
                    tabindex="0"
                    class="rounded-xs";

                label
                    for="remember_me"
                    class="block text-sm font-medium text-gray-900 dark:text-white"
                {
                    "Keep me logged in for one week"
                }
            }

            button type="submit" id="submit-button" tabindex="0" class=(BUTTON_PRIMARY_STYLE)
            {
                span class="inline htmx-indicator" id="indicator"
                {
                    (loading_spinner())
                }
                "Log in"
            }

            p class="text-sm font-light text-gray-500 dark:text-gray-400"
            {
                "Forgot your password? "
                a href=(endpoints::FORGOT_PASSWORD_VIEW) tabindex="0" class=(LINK_STYLE)
                {
                    "Reset it here"
                }
            }

            p class="text-sm font-light text-gray-500 dark:text-gray-400"
            {
                "Don't have an account? "
                a href=(endpoints::REGISTER_VIEW) tabindex="0" class=(LINK_STYLE)
                {
                    "Register here"
                }
            }
        }
    }
}

fn parse_redirect_url(raw_url: Option<&str>, source: &str) -> Option<String> {
    let redirect_url = raw_url.and_then(normalize_redirect_url);

    if let (None, Some(raw_url)) = (&redirect_url, raw_url) {
        tracing::warn!("Invalid redirect URL from {source}: {raw_url}");
    }

    redirect_url
}

#[derive(Deserialize)]
pub struct RedirectQuery {
    pub redirect_url: Option<String>,
}

/// Display the log-in page.
pub async fn get_log_in_page(Query(query): Query<RedirectQuery>) -> Response {
    let redirect_url = parse_redirect_url(query.redirect_url.as_deref(), "log-in query");
    let log_in_form = log_in_form("", None, redirect_url.as_deref());
    let content = log_in_register("Log in to your account", &log_in_form);

    base("Log In", &[], &content).into_response()
}

/// The state needed to perform a login.
#[derive(Debug, Clone)]
pub struct LoginState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
    /// The duration for which cookies used for authentication are valid.
    pub cookie_duration: Duration,
    /// The local timezone as a canonical timezone name, e.g. "America/Sao_Paulo".
    pub local_timezone: String,
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for LoginState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            cookie_duration: state.cookie_duration,
            local_timezone: state.local_timezone.clone(),
            db_connection: state.db_connection.clone(),
        }
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<LoginState> for Key {
    fn from_ref(state: &LoginState) -> Self {
        state.cookie_key.clone()
    }
}

/// The raw data entered by the user in the log-in form.
#[derive(Clone, Deserialize)]
pub struct LogInData {
    pub email: String,

    /// Compared against the stored hash, so it is not validated.
    pub password: String,

    /// Set to any value when the "remember me" checkbox is ticked, missing otherwise.
    pub remember_me: Option<String>,

    /// Where to go after logging in, only accepted from the form.
    pub redirect_url: Option<String>,
}

/// Why a log-in attempt was turned down.
#[derive(Debug, PartialEq)]
enum Rejection {
    /// Unknown email or wrong password. The two are not told apart.
    BadCredentials,
    /// Something broke on our side; the details have already been logged.
    Internal,
}

impl Rejection {
    fn message(&self) -> &'static str {
        match self {
            Rejection::BadCredentials => INVALID_CREDENTIALS_ERROR_MSG,
            Rejection::Internal => INTERNAL_ERROR_MSG,
        }
    }
}

/// Check `password` against the account registered under `email`.
fn authenticate(
    email: &str,
    password: &str,
    db_connection: &Mutex<Connection>,
) -> Result<UserID, Rejection> {
    let user = {
        let connection = db_connection.lock().map_err(|error| {
            tracing::error!("could not acquire database lock: {error}");
            Rejection::Internal
        })?;

        get_user_by_email(email, &connection).map_err(|error| match error {
            Error::NotFound => Rejection::BadCredentials,
            error => {
                tracing::error!("could not look up user for log-in: {error}");
                Rejection::Internal
            }
        })?
    };

    match user.password_hash.verify(password) {
        Ok(true) => Ok(user.id),
        Ok(false) => Err(Rejection::BadCredentials),
        Err(error) => {
            tracing::error!("could not verify password of user {}: {error}", user.id);
            Err(Rejection::Internal)
        }
    }
}

/// Handler for log-in requests via the POST method.
///
/// On success the auth cookie is set and the client is sent on to the
/// requested page, or the dashboard. Otherwise the form comes back with the
/// reason filled in.
pub async fn post_log_in(
    State(state): State<LoginState>,
    jar: PrivateCookieJar,
    Form(user_data): Form<LogInData>,
) -> Response {
    let redirect_url = parse_redirect_url(user_data.redirect_url.as_deref(), "log-in form");

    let user_id = match authenticate(&user_data.email, &user_data.password, &state.db_connection)
    {
        Ok(user_id) => user_id,
        Err(rejection) => {
            return log_in_form(
                &user_data.email,
                Some(rejection.message()),
                redirect_url.as_deref(),
            )
            .into_response();
        }
    };

    let Some(local_offset) = get_local_offset(&state.local_timezone) else {
        return Error::InvalidTimezoneError(state.local_timezone).into_response();
    };
    let cookie_duration = match user_data.remember_me {
        Some(_) => REMEMBER_ME_COOKIE_DURATION,
        None => state.cookie_duration,
    };

    match set_auth_cookie(jar.clone(), user_id, cookie_duration, local_offset) {
        Ok(jar) => {
            let destination = redirect_url.unwrap_or_else(|| endpoints::DASHBOARD_VIEW.to_owned());
            (StatusCode::SEE_OTHER, HxRedirect(destination), jar).into_response()
        }
        Err(error) => {
            tracing::error!("could not set auth cookie for user {user_id}: {error}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                HxRedirect(endpoints::INTERNAL_ERROR_VIEW.to_owned()),
                invalidate_auth_cookie(jar),
            )
                .into_response()
        }
    }
}

#[cfg(test)]
mod log_in_tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        Form, Router,
        body::Body,
        extract::{Query, State},
        http::{Response, StatusCode},
        routing::post,
    };
    use axum_extra::extract::PrivateCookieJar;
    use axum_test::TestServer;
    use rusqlite::Connection;
    use time::{Duration, OffsetDateTime};

    use crate::{
        app_state::create_cookie_key,
        auth::{COOKIE_TOKEN, DEFAULT_COOKIE_DURATION, Email, PasswordHash, create_user},
        db::initialize,
        endpoints,
        test_utils::{
            assert_form_input, assert_hx_endpoint, assert_hx_redirect, assert_valid_html,
            must_get_form, parse_html_document, parse_html_fragment,
        },
    };

    use super::{
        INVALID_CREDENTIALS_ERROR_MSG, LogInData, LoginState, REMEMBER_ME_COOKIE_DURATION,
        RedirectQuery, get_log_in_page, post_log_in,
    };

    const TEST_EMAIL: &str = "maria@example.com";
    const TEST_PASSWORD: &str = "correcthorsebatterystaple";

    fn get_test_state() -> LoginState {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        create_user(
            &Email::new(TEST_EMAIL).unwrap(),
            PasswordHash::from_raw_password(TEST_PASSWORD, 4).unwrap(),
            &connection,
        )
        .unwrap();

        LoginState {
            cookie_key: create_cookie_key("foobar"),
            cookie_duration: DEFAULT_COOKIE_DURATION,
            local_timezone: "Etc/UTC".to_owned(),
            db_connection: Arc::new(Mutex::new(connection)),
        }
    }

    fn log_in_data(email: &str, password: &str) -> LogInData {
        LogInData {
            email: email.to_owned(),
            password: password.to_owned(),
            remember_me: None,
            redirect_url: None,
        }
    }

    async fn new_log_in_request(state: LoginState, form: LogInData) -> Response<Body> {
        let jar = PrivateCookieJar::new(state.cookie_key.clone());

        post_log_in(State(state), jar, Form(form)).await
    }

    #[tokio::test]
    async fn log_in_page_displays_form() {
        let response = get_log_in_page(Query(RedirectQuery { redirect_url: None })).await;

        assert_eq!(response.status(), StatusCode::OK);
        let document = parse_html_document(response).await;
        assert_valid_html(&document);
        let form = must_get_form(&document);
        assert_hx_endpoint(&form, endpoints::LOG_IN_API, "hx-post");
        assert_form_input(&form, "email", "email");
        assert_form_input(&form, "password", "password");
    }

    #[tokio::test]
    async fn log_in_page_preserves_redirect_url() {
        let redirect_url = "/cashflow?year=2025&month=10";

        let response = get_log_in_page(Query(RedirectQuery {
            redirect_url: Some(redirect_url.to_owned()),
        }))
        .await;

        let document = parse_html_document(response).await;
        let input = document
            .select(&scraper::Selector::parse("input[name=redirect_url]").unwrap())
            .next()
            .expect("no redirect_url input");
        assert_eq!(input.value().attr("value"), Some(redirect_url));
    }

    #[tokio::test]
    async fn log_in_succeeds_with_valid_credentials() {
        let response =
            new_log_in_request(get_test_state(), log_in_data(TEST_EMAIL, TEST_PASSWORD)).await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_hx_redirect(&response, endpoints::DASHBOARD_VIEW);
    }

    #[tokio::test]
    async fn log_in_email_is_case_insensitive() {
        let response = new_log_in_request(
            get_test_state(),
            log_in_data("Maria@Example.com", TEST_PASSWORD),
        )
        .await;

        assert_hx_redirect(&response, endpoints::DASHBOARD_VIEW);
    }

    #[tokio::test]
    async fn log_in_redirects_to_requested_url() {
        let mut form = log_in_data(TEST_EMAIL, TEST_PASSWORD);
        form.redirect_url = Some("/goals".to_owned());

        let response = new_log_in_request(get_test_state(), form).await;

        assert_hx_redirect(&response, endpoints::GOALS_VIEW);
    }

    #[tokio::test]
    async fn log_in_falls_back_on_invalid_redirect_url() {
        let mut form = log_in_data(TEST_EMAIL, TEST_PASSWORD);
        form.redirect_url = Some("https://example.com".to_owned());

        let response = new_log_in_request(get_test_state(), form).await;

        assert_hx_redirect(&response, endpoints::DASHBOARD_VIEW);
    }

    #[tokio::test]
    async fn log_in_fails_with_incorrect_password() {
        let response =
            new_log_in_request(get_test_state(), log_in_data(TEST_EMAIL, "wrongpassword")).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_error_message(response, INVALID_CREDENTIALS_ERROR_MSG).await;
    }

    #[tokio::test]
    async fn log_in_fails_with_unknown_email() {
        let response = new_log_in_request(
            get_test_state(),
            log_in_data("nobody@example.com", TEST_PASSWORD),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_error_message(response, INVALID_CREDENTIALS_ERROR_MSG).await;
    }

    #[tokio::test]
    async fn remember_me_extends_auth_cookie_through_form() {
        let app = Router::new()
            .route(endpoints::LOG_IN_API, post(post_log_in))
            .with_state(get_test_state());
        let server = TestServer::try_new(app).expect("Could not create test server.");
        let form = [
            ("email", TEST_EMAIL),
            ("password", TEST_PASSWORD),
            ("remember_me", "on"),
        ];

        let response = server.post(endpoints::LOG_IN_API).form(&form).await;

        assert_eq!(response.status_code(), StatusCode::SEE_OTHER);
        let expires = response.cookie(COOKIE_TOKEN).expires_datetime().unwrap();
        let want = OffsetDateTime::now_utc() + REMEMBER_ME_COOKIE_DURATION;
        assert!((expires - want).abs() < Duration::seconds(2));
    }

    #[tokio::test]
    async fn log_in_fails_with_missing_fields() {
        let app = Router::new()
            .route(endpoints::LOG_IN_API, post(post_log_in))
            .with_state(get_test_state());
        let server = TestServer::try_new(app).expect("Could not create test server.");

        server
            .post(endpoints::LOG_IN_API)
            .content_type("application/x-www-form-urlencoded")
            .await
            .assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    }

    async fn assert_error_message(response: Response<Body>, message: &str) {
        let fragment = parse_html_fragment(response).await;
        let error = fragment
            .select(&scraper::Selector::parse("p.text-red-500.text-base").unwrap())
            .next()
            .expect("expected error message paragraph");

        assert_eq!(error.text().collect::<String>().trim(), message);
    }
}
