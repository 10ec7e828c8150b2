//! Lets a logged in user change their password.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Form,
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
    auth::{PasswordHash, UserID, ValidatedPassword, get_user_by_id, update_password},
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, PAGE_CONTAINER_STYLE, PasswordInput, base, loading_spinner,
        log_in_register, password_input,
    },
    navigation::NavBar,
    notification::NotificationQueue,
};

const PASSWORD_INPUT_MIN_LENGTH: u8 = 14;

#[derive(Default)]
struct PasswordErrors<'a> {
    current_password: Option<&'a str>,
    new_password: Option<&'a str>,
    confirm_password: Option<&'a str>,
}

fn change_password_form(errors: PasswordErrors<'_>) -> Markup {
    html! {
        form
            hx-put=(endpoints::PASSWORD_API)
            hx-swap="outerHTML"
            hx-indicator="#indicator"
            hx-disabled-elt="#submit-button"
            hx-target-error="#alert-container"
            class="space-y-4 md:space-y-6"
        {
            (password_input(PasswordInput {
                name: "current_password",
                label: "Current Password",
                value: "",
                min_length: 0,
                autofocus: true,
                error_message: errors.current_password,
            }))

            (password_input(PasswordInput {
                name: "new_password",
                label: "New Password",
                value: "",
                min_length: PASSWORD_INPUT_MIN_LENGTH,
                autofocus: false,
                error_message: errors.new_password,
            }))

            (password_input(PasswordInput {
                name: "confirm_password",
                label: "Confirm New Password",
                value: "",
                min_length: PASSWORD_INPUT_MIN_LENGTH,
                autofocus: false,
                error_message: errors.confirm_password,
            }))

            button type="submit" id="submit-button" tabindex="0" class=(BUTTON_PRIMARY_STYLE)
            {
                span class="inline htmx-indicator" id="indicator"
                {
                    (loading_spinner())
                }
                "Change Password"
            }
        }
    }
}

/// Display the page for changing the password.
pub async fn get_reset_password_page() -> Response {
    let content = html! {
        (NavBar::new(endpoints::RESET_PASSWORD_VIEW).into_html())

        div class=(PAGE_CONTAINER_STYLE)
        {
            (log_in_register("Change your password", &change_password_form(PasswordErrors::default())))
        }
    };

    base("Change Password", &[], &content).into_response()
}

#[derive(Debug, Clone)]
pub struct PasswordState {
    pub db_connection: Arc<Mutex<Connection>>,
    pub notifications: NotificationQueue,
}

impl FromRef<AppState> for PasswordState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            notifications: state.notifications.clone(),
        }
    }
}

#[derive(Deserialize)]
pub struct ChangePasswordForm {
    pub current_password: String,
    pub new_password: String,
    pub confirm_password: String,
}

/// Check the current password and store the new one.
///
/// Mistakes are shown next to the offending field. On success the user is
/// sent to the settings page where a notification confirms the change.
pub async fn put_password(
    State(state): State<PasswordState>,
    Extension(user_id): Extension<UserID>,
    Form(form): Form<ChangePasswordForm>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    let user = match get_user_by_id(user_id, &connection) {
        Ok(user) => user,
        Err(error) => {
            tracing::error!("Could not get user {user_id}: {error}");
            return error.into_alert_response();
        }
    };

    match user.password_hash.verify(&form.current_password) {
        Ok(true) => {}
        Ok(false) => {
            return change_password_form(PasswordErrors {
                current_password: Some("Incorrect password."),
                ..Default::default()
            })
            .into_response();
        }
        Err(error) => {
            tracing::error!("Could not verify password for user {user_id}: {error}");
            return error.into_alert_response();
        }
    }

    let validated_password =
        match ValidatedPassword::new_with_user_inputs(&form.new_password, &[&user.email]) {
            Ok(password) => password,
            Err(error) => {
                return change_password_form(PasswordErrors {
                    new_password: Some(&error.to_string()),
                    ..Default::default()
                })
                .into_response();
            }
        };

    if form.new_password != form.confirm_password {
        return change_password_form(PasswordErrors {
            confirm_password: Some("Passwords do not match."),
            ..Default::default()
        })
        .into_response();
    }

    let result = PasswordHash::new(validated_password, PasswordHash::DEFAULT_COST)
        .and_then(|password_hash| update_password(user_id, &password_hash, &connection));

    if let Err(error) = result {
        tracing::error!("Could not update password for user {user_id}: {error}");
        return error.into_alert_response();
    }

    state.notifications.push(
        user_id,
        Alert::success("Password changed", "Use your new password next time you log in."),
    );

    (
        HxRedirect(endpoints::SETTINGS_VIEW.to_owned()),
        StatusCode::SEE_OTHER,
    )
        .into_response()
}
