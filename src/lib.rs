//! Zard Finance is a web app for tracking personal income, expenses and
//! savings goals.
//!
//! This library provides a REST API that directly serves HTML pages. Pages are
//! rendered with maud and updated in place with htmx.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use tokio::signal;

mod aggregation;
mod alert;
mod analysis;
mod app_state;
mod auth;
mod cashflow;
mod chart;
mod dashboard;
mod database_id;
mod db;
mod endpoints;
mod error_page;
mod export;
mod goal;
mod html;
mod logging;
mod navigation;
mod notification;
mod profile;
mod routing;
mod sequence;
mod settings;
mod timezone;
mod transaction;

#[cfg(test)]
mod test_utils;

pub use app_state::AppState;
pub use auth::{
    Email, PasswordHash, User, UserID, ValidatedPassword, create_user, get_user_by_email,
    update_password,
};
pub use db::initialize as initialize_db;
pub use goal::{GoalCategory, GoalStatus, NewGoal, create_goal};
pub use logging::{LOG_BODY_LENGTH_LIMIT, logging_middleware};
pub use profile::{Profile, create_profile};
pub use routing::build_router;
pub use transaction::{Category, NewTransaction, TransactionType, create_transaction};

use crate::{alert::Alert, error_page::ErrorPage};

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        if let Err(error) = signal::ctrl_c().await {
            tracing::error!("Could not listen for ctrl+c: {error}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut terminate_signal) => {
                terminate_signal.recv().await;
            }
            Err(error) => {
                tracing::error!("Could not listen for the terminate signal: {error}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The email and password combination did not match a registered user.
    #[error("invalid email or password")]
    InvalidCredentials,

    /// The auth cookie is missing from the cookie jar in the request.
    #[error("no cookies in the cookie jar :(")]
    CookieMissing,

    /// There was an error parsing the date in the cookie or creating the new
    /// expiry date time.
    ///
    /// Callers should pass in the original error as a string and the date
    /// string that caused the error.
    #[error("could not format expiry cookie date-time string \"{1}\": {0}")]
    InvalidDateFormat(String, String),

    /// The user provided a password that is too easy to guess.
    #[error("password is too weak: {0}")]
    TooWeak(String),

    /// An unexpected error occurred with the underlying hashing library.
    ///
    /// The error string should only be logged for debugging on the server.
    /// When communicating with the application client this error should be
    /// replaced with a general error type indicating an internal server error.
    #[error("hashing failed: {0}")]
    HashingError(String),

    /// The email address is not in a valid format.
    #[error("\"{0}\" is not a valid email address")]
    InvalidEmail(String),

    /// A user with the email address is already registered.
    #[error("the email address is already in use")]
    DuplicateEmail,

    /// A transaction amount was negative, NaN or infinite.
    ///
    /// The direction of a transaction is given by its type, so amounts are
    /// always zero or positive.
    #[error("{0} is not a valid amount, amounts must be a finite number that is zero or greater")]
    InvalidAmount(f64),

    /// A goal was given a target that is zero, negative or not finite.
    #[error("{0} is not a valid goal target, the target must be greater than zero")]
    InvalidGoalTarget(f64),

    /// An empty string was used for a goal title.
    #[error("the goal title cannot be empty")]
    EmptyTitle,

    /// An empty string was used for a user's name.
    #[error("the name cannot be empty")]
    EmptyName,

    /// A label could not be parsed into one of the known variants, e.g. a
    /// transaction category or a currency code.
    #[error("\"{0}\" is not a recognised value")]
    InvalidLabel(String),

    /// A year and month combination that does not exist was requested.
    #[error("{0} is not a valid period")]
    InvalidPeriod(String),

    /// The requested resource was not found.
    ///
    /// For HTTP request handlers, the client should check that the parameters
    /// (e.g., ID) are correct and that the resource has been created.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// An error occurred while getting the local timezone from a canonical timezone string.
    #[error("invalid timezone {0}")]
    InvalidTimezoneError(String),

    /// An error occurred while serializing a struct as JSON
    #[error("could not serialize as JSON: {0}")]
    JSONSerializationError(String),

    /// An error occurred while writing CSV data.
    #[error("could not write CSV: {0}")]
    CsvError(String),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// Tried to delete a transaction that does not exist
    #[error("tried to delete a transaction that is not in the database")]
    DeleteMissingTransaction,

    /// Tried to update a transaction that does not exist
    #[error("tried to update a transaction that is not in the database")]
    UpdateMissingTransaction,

    /// Tried to delete a goal that does not exist
    #[error("tried to delete a goal that is not in the database")]
    DeleteMissingGoal,

    /// Tried to update a goal that does not exist
    #[error("tried to update a goal that is not in the database")]
    UpdateMissingGoal,

    /// Tried to update a profile that does not exist
    #[error("tried to update a profile that is not in the database")]
    UpdateMissingProfile,
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            // Code 2067 occurs when a UNIQUE constraint failed.
            rusqlite::Error::SqliteFailure(sql_error, Some(ref desc))
                if sql_error.extended_code == 2067 && desc.ends_with("user.email") =>
            {
                Error::DuplicateEmail
            }
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::NotFound => ErrorPage::not_found().into_response(),
            Error::InvalidTimezoneError(timezone) => ErrorPage::internal_with(
                "Invalid Timezone Settings",
                &format!(
                    "Could not get local timezone \"{timezone}\". Check your server settings and \
                    ensure the timezone has been set to valid, canonical timezone string"
                ),
            )
            .into_response(),
            Error::InvalidPeriod(period) => ErrorPage::internal_with(
                "Invalid Period",
                &format!("{period} is not a valid year and month."),
            )
            .with_status(StatusCode::BAD_REQUEST)
            .into_response(),
            Error::DatabaseLockError => ErrorPage::internal().into_response(),
            // Any errors that are not handled above are not intended to be shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                ErrorPage::internal().into_response()
            }
        }
    }
}

impl Error {
    /// Render the error as an alert for htmx requests.
    ///
    /// The alert is swapped into the alert container, so the status code is
    /// chosen to match the error and htmx's response-targets extension takes
    /// care of the rest.
    fn into_alert_response(self) -> Response {
        let (status_code, alert) = match self {
            Error::InvalidTimezoneError(timezone) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Alert::error(
                    "Invalid Timezone Settings",
                    &format!(
                        "Could not get local timezone \"{timezone}\". Check your server settings and \
                        ensure the timezone has been set to valid, canonical timezone string"
                    ),
                ),
            ),
            Error::InvalidAmount(amount) => (
                StatusCode::BAD_REQUEST,
                Alert::error(
                    "Invalid amount",
                    &format!("{amount} is not a valid amount. Enter a number that is zero or greater."),
                ),
            ),
            Error::InvalidGoalTarget(target) => (
                StatusCode::BAD_REQUEST,
                Alert::error(
                    "Invalid goal target",
                    &format!("{target} is not a valid target. The target must be greater than zero."),
                ),
            ),
            Error::EmptyTitle => (
                StatusCode::BAD_REQUEST,
                Alert::error("Invalid goal title", "The goal title cannot be empty."),
            ),
            Error::EmptyName => (
                StatusCode::BAD_REQUEST,
                Alert::error("Invalid name", "Your name cannot be empty."),
            ),
            Error::InvalidLabel(label) => (
                StatusCode::BAD_REQUEST,
                Alert::error(
                    "Invalid option",
                    &format!("\"{label}\" is not one of the available options."),
                ),
            ),
            Error::InvalidPeriod(period) => (
                StatusCode::BAD_REQUEST,
                Alert::error(
                    "Invalid period",
                    &format!("{period} is not a valid year and month."),
                ),
            ),
            Error::UpdateMissingTransaction => (
                StatusCode::NOT_FOUND,
                Alert::error(
                    "Could not update transaction",
                    "The transaction could not be found.",
                ),
            ),
            Error::DeleteMissingTransaction => (
                StatusCode::NOT_FOUND,
                Alert::error(
                    "Could not delete transaction",
                    "The transaction could not be found. \
                    Try refreshing the page to see if the transaction has already been deleted.",
                ),
            ),
            Error::UpdateMissingGoal => (
                StatusCode::NOT_FOUND,
                Alert::error("Could not update goal", "The goal could not be found."),
            ),
            Error::DeleteMissingGoal => (
                StatusCode::NOT_FOUND,
                Alert::error(
                    "Could not delete goal",
                    "The goal could not be found. \
                    Try refreshing the page to see if the goal has already been deleted.",
                ),
            ),
            Error::UpdateMissingProfile => (
                StatusCode::NOT_FOUND,
                Alert::error(
                    "Could not save settings",
                    "Your profile could not be found. Try logging out and in again.",
                ),
            ),
            _ => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Alert::error(
                    "Something went wrong",
                    "An unexpected error occurred, check the server logs for more details.",
                ),
            ),
        };

        (status_code, alert.into_html()).into_response()
    }
}
