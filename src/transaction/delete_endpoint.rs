//! Defines the endpoint for deleting a transaction.

use axum::{
    Extension,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::{
    Error,
    auth::UserID,
    database_id::TransactionId,
    transaction::{TransactionState, core::delete_transaction},
};

/// A route handler for deleting a transaction.
///
/// On success the response is empty so that htmx replaces the table row with
/// nothing. The status code has to be 200 OK or htmx will not remove the row.
pub async fn delete_transaction_endpoint(
    State(state): State<TransactionState>,
    Extension(user_id): Extension<UserID>,
    Path(transaction_id): Path<TransactionId>,
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

    match delete_transaction(transaction_id, user_id, &connection) {
        Ok(()) => StatusCode::OK.into_response(),
        Err(error) => {
            tracing::error!("could not delete transaction {transaction_id}: {error}");
            error.into_alert_response()
        }
    }
}
