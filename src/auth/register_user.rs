//! The registration page and the handler that creates new accounts.

use std::sync::{Arc, Mutex};

use axum::{
    Form,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_htmx::HxRedirect;
use maud::{Markup, html};
use rusqlite::Connection;
use serde::Deserialize;

use crate::{
    AppState, Error,
    alert::Alert,
    auth::{Email, PasswordHash, ValidatedPassword, create_user},
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, LINK_STYLE, PasswordInput,
        base, loading_spinner, log_in_register, password_input,
    },
    notification::NotificationQueue,
    profile::create_profile,
};

/// The minimum number of characters checked in the browser, the server
/// checks password strength on top of this.
const PASSWORD_INPUT_MIN_LENGTH: u8 = 14;

/// What the user typed in, echoed back along with any errors.
#[derive(Default)]
struct RegistrationFormView<'a> {
    name: &'a str,
    email: &'a str,
    name_error: Option<&'a str>,
    email_error: Option<&'a str>,
    password_error: Option<&'a str>,
    confirm_password_error: Option<&'a str>,
}

fn text_input(
    input_type: &str,
    name: &str,
    label: &str,
    value: &str,
    error_message: Option<&str>,
) -> Markup {
    html! {
        div
        {
            label for=(name) class=(FORM_LABEL_STYLE) { (label) }

            input
                type=(input_type)
                name=(name)
                id=(name)
                class=(FORM_TEXT_INPUT_STYLE)
                required
                value=(value);

            @if let Some(error_message) = error_message
            {
                p class="text-red-500 text-base" { (error_message) }
            }
        }
    }
}

fn registration_form(view: RegistrationFormView<'_>) -> Markup {
    html! {
        form
            hx-post=(endpoints::USERS)
            hx-swap="outerHTML"
            hx-indicator="#indicator"
            hx-disabled-elt="#submit-button"
            class="space-y-4 md:space-y-6"
        {
            (text_input("text", "name", "Name", view.name, view.name_error))
            (text_input("email", "email", "Email", view.email, view.email_error))

            (password_input(PasswordInput {
                name: "password",
                label: "Password",
                value: "",
                min_length: PASSWORD_INPUT_MIN_LENGTH,
                autofocus: false,
                error_message: view.password_error,
            }))

            (password_input(PasswordInput {
                name: "confirm_password",
                label: "Confirm Password",
                value: "",
                min_length: PASSWORD_INPUT_MIN_LENGTH,
                autofocus: false,
                error_message: view.confirm_password_error,
            }))

            button type="submit" id="submit-button" tabindex="0" class=(BUTTON_PRIMARY_STYLE)
            {
                span class="inline htmx-indicator" id="indicator"
                {
                    (loading_spinner())
                }
                "Create Account"
            }

            p class="text-sm font-light text-gray-500 dark:text-gray-400"
            {
                "Already have an account? "
                a href=(endpoints::LOG_IN_VIEW) tabindex="0" class=(LINK_STYLE)
                {
                    "Log in here"
                }
            }
        }
    }
}

/// Display the registration page.
pub async fn get_register_page() -> Response {
    let form = registration_form(RegistrationFormView::default());
    let content = log_in_register("Create your account", &form);

    base("Register", &[], &content).into_response()
}

/// The state needed for creating a new user.
#[derive(Debug, Clone)]
pub struct RegistrationState {
    pub db_connection: Arc<Mutex<Connection>>,
    pub notifications: NotificationQueue,
}

impl FromRef<AppState> for RegistrationState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            notifications: state.notifications.clone(),
        }
    }
}

#[derive(Deserialize)]
pub struct RegisterForm {
    pub name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

/// Create a user and their default profile, then send the client to the log-in page.
///
/// Validation errors are shown next to the offending field.
pub async fn register_user(
    State(state): State<RegistrationState>,
    Form(user_data): Form<RegisterForm>,
) -> Response {
    let echo = RegistrationFormView {
        name: &user_data.name,
        email: &user_data.email,
        ..Default::default()
    };

    if user_data.name.trim().is_empty() {
        return registration_form(RegistrationFormView {
            name_error: Some("Enter your name."),
            ..echo
        })
        .into_response();
    }

    let email = match Email::new(&user_data.email) {
        Ok(email) => email,
        Err(_) => {
            return registration_form(RegistrationFormView {
                email_error: Some("Enter a valid email address."),
                ..echo
            })
            .into_response();
        }
    };

    let validated_password = match ValidatedPassword::new_with_user_inputs(
        &user_data.password,
        &[&user_data.name, email.as_ref()],
    ) {
        Ok(password) => password,
        Err(error) => {
            return registration_form(RegistrationFormView {
                password_error: Some(&error.to_string()),
                ..echo
            })
            .into_response();
        }
    };

    if user_data.password != user_data.confirm_password {
        return registration_form(RegistrationFormView {
            confirm_password_error: Some("Passwords do not match."),
            ..echo
        })
        .into_response();
    }

    let password_hash = match PasswordHash::new(validated_password, PasswordHash::DEFAULT_COST) {
        Ok(password_hash) => password_hash,
        Err(error) => {
            tracing::error!("Could not hash password: {error}");
            return (
                HxRedirect(endpoints::INTERNAL_ERROR_VIEW.to_owned()),
                StatusCode::INTERNAL_SERVER_ERROR,
            )
                .into_response();
        }
    };

    let result = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)
        .and_then(|connection| {
            create_account(&email, &user_data.name, password_hash, &connection)
        });

    match result {
        Ok(user_id) => {
            state.notifications.push(
                user_id,
                Alert::success("Welcome to Zard Finance!", "Your account is ready."),
            );

            (
                HxRedirect(endpoints::LOG_IN_VIEW.to_owned()),
                StatusCode::SEE_OTHER,
            )
                .into_response()
        }
        Err(Error::DuplicateEmail) => registration_form(RegistrationFormView {
            email_error: Some("An account with this email already exists."),
            ..echo
        })
        .into_response(),
        Err(error) => {
            tracing::error!("Could not create account: {error}");
            (
                HxRedirect(endpoints::INTERNAL_ERROR_VIEW.to_owned()),
                StatusCode::INTERNAL_SERVER_ERROR,
            )
                .into_response()
        }
    }
}

/// Create the user and their profile together so that neither exists without the other.
fn create_account(
    email: &Email,
    name: &str,
    password_hash: PasswordHash,
    connection: &Connection,
) -> Result<crate::auth::UserID, Error> {
    let transaction = connection.unchecked_transaction()?;
    let user = create_user(email, password_hash, &transaction)?;
    create_profile(user.id, name, &transaction)?;
    transaction.commit()?;

    Ok(user.id)
}

#[cfg(test)]
mod register_tests {
    use std::sync::{Arc, Mutex};

    use axum::{Form, extract::State, http::StatusCode};
    use rusqlite::Connection;

    use crate::{
        auth::{count_users, get_user_by_email},
        db::initialize,
        endpoints,
        notification::NotificationQueue,
        profile::get_profile,
        test_utils::{
            assert_form_input, assert_hx_endpoint, assert_hx_redirect, assert_valid_html,
            must_get_form, parse_html_document, parse_html_fragment,
        },
    };

    use super::{RegisterForm, RegistrationState, get_register_page, register_user};

    const STRONG_PASSWORD: &str = "correcthorsebatterystaple";

    fn get_test_state() -> RegistrationState {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();

        RegistrationState {
            db_connection: Arc::new(Mutex::new(connection)),
            notifications: NotificationQueue::new(),
        }
    }

    fn register_form(email: &str, password: &str, confirm_password: &str) -> RegisterForm {
        RegisterForm {
            name: "Maria".to_owned(),
            email: email.to_owned(),
            password: password.to_owned(),
            confirm_password: confirm_password.to_owned(),
        }
    }

    async fn get_error_text(response: axum::response::Response) -> String {
        let fragment = parse_html_fragment(response).await;

        fragment
            .select(&scraper::Selector::parse("p.text-red-500").unwrap())
            .map(|p| p.text().collect::<String>())
            .collect()
    }

    #[tokio::test]
    async fn register_page_displays_form() {
        let response = get_register_page().await;

        let document = parse_html_document(response).await;
        assert_valid_html(&document);
        let form = must_get_form(&document);
        assert_hx_endpoint(&form, endpoints::USERS, "hx-post");
        assert_form_input(&form, "name", "text");
        assert_form_input(&form, "email", "email");
        assert_form_input(&form, "password", "password");
        assert_form_input(&form, "confirm_password", "password");
    }

    #[tokio::test]
    async fn register_creates_user_and_profile() {
        let state = get_test_state();

        let response = register_user(
            State(state.clone()),
            Form(register_form(
                "maria@example.com",
                STRONG_PASSWORD,
                STRONG_PASSWORD,
            )),
        )
        .await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_hx_redirect(&response, endpoints::LOG_IN_VIEW);
        let connection = state.db_connection.lock().unwrap();
        let user = get_user_by_email("maria@example.com", &connection).unwrap();
        let profile = get_profile(user.id, &connection).unwrap();
        assert_eq!(profile.name, "Maria");
        assert_eq!(state.notifications.drain(user.id).len(), 1);
    }

    #[tokio::test]
    async fn register_rejects_mismatched_passwords() {
        let state = get_test_state();

        let response = register_user(
            State(state.clone()),
            Form(register_form(
                "maria@example.com",
                STRONG_PASSWORD,
                "somethingelseentirely",
            )),
        )
        .await;

        assert_eq!(get_error_text(response).await, "Passwords do not match.");
        assert_eq!(count_users(&state.db_connection.lock().unwrap()), Ok(0));
    }

    #[tokio::test]
    async fn register_rejects_weak_password() {
        let state = get_test_state();

        let response = register_user(
            State(state.clone()),
            Form(register_form("maria@example.com", "password", "password")),
        )
        .await;

        assert!(!get_error_text(response).await.is_empty());
        assert_eq!(count_users(&state.db_connection.lock().unwrap()), Ok(0));
    }

    #[tokio::test]
    async fn register_rejects_duplicate_email() {
        let state = get_test_state();
        let form = || register_form("maria@example.com", STRONG_PASSWORD, STRONG_PASSWORD);
        register_user(State(state.clone()), Form(form())).await;

        let response = register_user(State(state.clone()), Form(form())).await;

        assert_eq!(
            get_error_text(response).await,
            "An account with this email already exists."
        );
        assert_eq!(count_users(&state.db_connection.lock().unwrap()), Ok(1));
    }

    #[tokio::test]
    async fn register_rejects_invalid_email() {
        let response = register_user(
            State(get_test_state()),
            Form(register_form("maria", STRONG_PASSWORD, STRONG_PASSWORD)),
        )
        .await;

        assert_eq!(
            get_error_text(response).await,
            "Enter a valid email address."
        );
    }
}
