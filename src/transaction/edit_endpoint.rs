//! Defines the endpoint for updating a transaction.

use axum::{
    Extension,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::Form;
use axum_htmx::HxRedirect;

use crate::{
    Error,
    alert::Alert,
    auth::{UserID, normalize_redirect_url},
    database_id::TransactionId,
    endpoints,
    transaction::{
        TransactionState, core::update_transaction, edit_page::RedirectQuery,
        form::TransactionForm,
    },
};

/// A route handler for updating a transaction.
///
/// Redirects to `redirect_url` if it is a safe local path, otherwise to the
/// transactions view.
pub async fn edit_transaction_endpoint(
    State(state): State<TransactionState>,
    Extension(user_id): Extension<UserID>,
    Path(transaction_id): Path<TransactionId>,
    Query(query): Query<RedirectQuery>,
    Form(form): Form<TransactionForm>,
) -> Response {
    let new_transaction = match form.validate() {
        Ok(new_transaction) => new_transaction,
        Err(error) => {
            tracing::warn!("rejected edit of transaction {transaction_id}: {error}");
            return error.into_alert_response();
        }
    };

    let connection = match state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)
    {
        Ok(connection) => connection,
        Err(error) => return error.into_alert_response(),
    };

    if let Err(error) =
        update_transaction(transaction_id, user_id, &new_transaction, &connection)
    {
        tracing::error!("could not update transaction {transaction_id}: {error}");
        return error.into_alert_response();
    }

    state
        .notifications
        .push(user_id, Alert::success("Transaction updated", "Your changes have been saved."));

    let redirect_url = query
        .redirect_url
        .as_deref()
        .and_then(normalize_redirect_url)
        .unwrap_or_else(|| endpoints::TRANSACTIONS_VIEW.to_owned());

    (HxRedirect(redirect_url), StatusCode::SEE_OTHER).into_response()
}
