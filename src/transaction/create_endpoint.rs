//! Defines the endpoint for creating a new transaction.

use axum::{
    Extension,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
// Must use axum_extra's Form since that parses an empty string as None instead
// of crashing like axum::Form.
use axum_extra::extract::Form;
use axum_htmx::HxRedirect;

use crate::{
    Error,
    alert::Alert,
    auth::UserID,
    endpoints,
    transaction::{TransactionState, core::create_transaction, form::TransactionForm},
};

/// A route handler for creating a new transaction, redirects to transactions view on success.
pub async fn create_transaction_endpoint(
    State(state): State<TransactionState>,
    Extension(user_id): Extension<UserID>,
    Form(form): Form<TransactionForm>,
) -> Response {
    let new_transaction = match form.validate() {
        Ok(new_transaction) => new_transaction,
        Err(error) => {
            tracing::warn!("rejected transaction form from user {user_id}: {error}");
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

    if let Err(error) = create_transaction(user_id, &new_transaction, &connection) {
        tracing::error!("could not create transaction for user {user_id}: {error}");
        return error.into_alert_response();
    }

    state
        .notifications
        .push(user_id, Alert::success("Transaction created", "Your transaction has been recorded."));

    (
        HxRedirect(endpoints::TRANSACTIONS_VIEW.to_owned()),
        StatusCode::SEE_OTHER,
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use axum::{
        Extension,
        extract::{FromRef, State},
        http::StatusCode,
    };
    use axum_extra::extract::Form;
    use time::macros::date;

    use crate::{
        auth::UserID,
        endpoints,
        test_utils::{assert_hx_redirect, test_state_with_user},
        transaction::{
            Category, TransactionQuery, TransactionState, TransactionType, count_transactions,
            form::TransactionForm, query_transactions,
        },
    };

    use super::create_transaction_endpoint;

    fn form(amount: f64, category: &str) -> TransactionForm {
        TransactionForm {
            amount,
            transaction_type: Some("income".to_owned()),
            category: Some(category.to_owned()),
            description: "  Salary ".to_owned(),
            date: date!(2024 - 01 - 05),
        }
    }

    #[tokio::test]
    async fn can_create_transaction() {
        let (app_state, user_id) = test_state_with_user();
        let state = TransactionState::from_ref(&app_state);

        let response = create_transaction_endpoint(
            State(state.clone()),
            Extension(user_id),
            Form(form(1000.0, "salary")),
        )
        .await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_hx_redirect(&response, endpoints::TRANSACTIONS_VIEW);

        let connection = state.db_connection.lock().unwrap();
        let transactions =
            query_transactions(user_id, &TransactionQuery::default(), &connection).unwrap();
        assert_eq!(transactions.len(), 1);
        let transaction = &transactions[0];
        assert_eq!(transaction.amount, 1000.0);
        assert_eq!(transaction.transaction_type, TransactionType::Income);
        assert_eq!(transaction.category, Category::Salary);
        assert_eq!(transaction.description, "Salary");
        assert_eq!(transaction.user_id, user_id);
    }

    #[tokio::test]
    async fn queues_success_notification() {
        let (app_state, user_id) = test_state_with_user();

        create_transaction_endpoint(
            State(TransactionState::from_ref(&app_state)),
            Extension(user_id),
            Form(form(10.0, "food")),
        )
        .await;

        assert_eq!(app_state.notifications.drain(user_id).len(), 1);
    }

    #[tokio::test]
    async fn rejects_negative_amount() {
        let (app_state, user_id) = test_state_with_user();
        let state = TransactionState::from_ref(&app_state);

        let response = create_transaction_endpoint(
            State(state.clone()),
            Extension(user_id),
            Form(form(-5.0, "food")),
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            count_transactions(user_id, &state.db_connection.lock().unwrap()).unwrap(),
            0
        );
    }

    #[tokio::test]
    async fn rejects_unknown_category() {
        let (app_state, user_id) = test_state_with_user();

        let response = create_transaction_endpoint(
            State(TransactionState::from_ref(&app_state)),
            Extension(user_id),
            Form(form(5.0, "crypto")),
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn unknown_user_gets_error_alert() {
        let (app_state, _) = test_state_with_user();

        let response = create_transaction_endpoint(
            State(TransactionState::from_ref(&app_state)),
            Extension(UserID::new(999)),
            Form(form(5.0, "food")),
        )
        .await;

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
