//! Deletes the logged in user's account and logs them out.

use axum::{
    Extension,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::PrivateCookieJar;
use axum_htmx::HxRedirect;

use crate::{
    Error,
    auth::{UserID, delete_user, invalidate_auth_cookie},
    endpoints,
    settings::SettingsState,
};

/// Remove the user along with their profile, transactions and goals.
pub async fn delete_account_endpoint(
    State(state): State<SettingsState>,
    Extension(user_id): Extension<UserID>,
    jar: PrivateCookieJar,
) -> Response {
    let connection = match state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)
    {
        Ok(connection) => connection,
        Err(error) => return error.into_alert_response(),
    };

    if let Err(error) = delete_user(user_id, &connection) {
        tracing::error!("could not delete user {user_id}: {error}");
        return error.into_alert_response();
    }

    tracing::info!("deleted account of user {user_id}");
    state.notifications.drain(user_id);

    (
        invalidate_auth_cookie(jar),
        HxRedirect(endpoints::LOG_IN_VIEW.to_owned()),
        StatusCode::SEE_OTHER,
    )
        .into_response()
}
