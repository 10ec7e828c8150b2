use rusqlite::Connection;
use time::Date;

use crate::{
    AppState,
    auth::{Email, PasswordHash, UserID, create_user},
    profile::create_profile,
    transaction::{Category, NewTransaction, Transaction, TransactionType, create_transaction},
};

/// An app state backed by an in-memory database with one registered user,
/// "Maria", who has the default profile.
pub(crate) fn test_state_with_user() -> (AppState, UserID) {
    let connection =
        Connection::open_in_memory().expect("Could not create in-memory SQLite database");
    let state = AppState::new(connection, "foobar", "Etc/UTC").expect("Could not create state");

    let user_id = {
        let connection = state.db_connection.lock().unwrap();
        let user = create_user(
            &Email::new("maria@example.com").unwrap(),
            PasswordHash::new_unchecked("hunter2"),
            &connection,
        )
        .expect("Could not create test user");
        create_profile(user.id, "Maria", &connection).expect("Could not create test profile");

        user.id
    };

    (state, user_id)
}

pub(crate) fn insert_transaction(
    state: &AppState,
    user_id: UserID,
    amount: f64,
    transaction_type: TransactionType,
    category: Category,
    date: Date,
) -> Transaction {
    let new_transaction =
        NewTransaction::new(amount, transaction_type, category, "test", date).unwrap();

    create_transaction(
        user_id,
        &new_transaction,
        &state.db_connection.lock().unwrap(),
    )
    .expect("Could not create test transaction")
}
