//! Filtered and sorted reads of a user's transactions.

use std::ops::RangeInclusive;

use rusqlite::{Connection, ToSql};
use serde::Deserialize;
use time::Date;

use crate::{Error, auth::UserID};

use super::core::{
    Category, TRANSACTION_COLUMNS, Transaction, TransactionType, map_transaction_row,
};

/// The order to sort transactions by date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Oldest first.
    Ascending,
    /// Newest first.
    #[default]
    Descending,
}

impl SortOrder {
    pub fn as_str(self) -> &'static str {
        match self {
            SortOrder::Ascending => "ascending",
            SortOrder::Descending => "descending",
        }
    }
}

/// Which of a user's transactions to fetch.
///
/// The default fetches everything, newest first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionQuery {
    /// Only include transactions dated within this inclusive range.
    pub date_range: Option<RangeInclusive<Date>>,
    pub transaction_type: Option<TransactionType>,
    pub category: Option<Category>,
    pub sort_order: SortOrder,
}

/// Get the transactions of `user_id` that match `query`.
///
/// Transactions on the same date are ordered by ID so that the order is
/// stable after edits.
///
/// # Errors
/// Returns [Error::SqlError] if the query could not be prepared or a row could
/// not be mapped.
pub fn query_transactions(
    user_id: UserID,
    query: &TransactionQuery,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    let user_id = user_id.as_i64();
    let mut conditions = vec!["user_id = ?".to_owned()];
    let mut parameters: Vec<&dyn ToSql> = vec![&user_id];

    if let Some(date_range) = &query.date_range {
        conditions.push("date BETWEEN ? AND ?".to_owned());
        parameters.push(date_range.start());
        parameters.push(date_range.end());
    }

    let transaction_type = query.transaction_type.map(TransactionType::as_str);
    if let Some(transaction_type) = &transaction_type {
        conditions.push("type = ?".to_owned());
        parameters.push(transaction_type);
    }

    let category = query.category.map(Category::as_str);
    if let Some(category) = &category {
        conditions.push("category = ?".to_owned());
        parameters.push(category);
    }

    let order_clause = match query.sort_order {
        SortOrder::Ascending => "ORDER BY date ASC, id ASC",
        SortOrder::Descending => "ORDER BY date DESC, id DESC",
    };

    let sql = format!(
        "SELECT {TRANSACTION_COLUMNS} FROM \"transaction\" WHERE {} {order_clause}",
        conditions.join(" AND ")
    );

    connection
        .prepare(&sql)?
        .query_map(parameters.as_slice(), map_transaction_row)?
        .map(|transaction_result| transaction_result.map_err(Error::SqlError))
        .collect()
}

#[cfg(test)]
mod tests {
    use rusqlite::Connection;
    use time::{Date, macros::date};

    use crate::{
        auth::{Email, PasswordHash, UserID, create_user},
        db::initialize,
        transaction::{Category, NewTransaction, TransactionType, create_transaction},
    };

    use super::{SortOrder, TransactionQuery, query_transactions};

    fn get_test_connection() -> (Connection, UserID) {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        let user = create_user(
            &Email::new("maria@example.com").unwrap(),
            PasswordHash::new_unchecked("hunter2"),
            &connection,
        )
        .unwrap();

        (connection, user.id)
    }

    fn insert(
        connection: &Connection,
        user_id: UserID,
        amount: f64,
        transaction_type: TransactionType,
        category: Category,
        date: Date,
    ) {
        let transaction =
            NewTransaction::new(amount, transaction_type, category, "", date).unwrap();
        create_transaction(user_id, &transaction, connection).unwrap();
    }

    fn insert_month_of_data(connection: &Connection, user_id: UserID) {
        use Category::*;
        use TransactionType::*;

        insert(connection, user_id, 1000.0, Income, Salary, date!(2024 - 01 - 05));
        insert(connection, user_id, 300.0, Expense, Food, date!(2024 - 01 - 10));
        insert(connection, user_id, 50.0, Expense, Transport, date!(2024 - 01 - 20));
        insert(connection, user_id, 80.0, Expense, Food, date!(2024 - 02 - 02));
    }

    #[test]
    fn default_query_returns_everything_newest_first() {
        let (connection, user_id) = get_test_connection();
        insert_month_of_data(&connection, user_id);

        let got = query_transactions(user_id, &TransactionQuery::default(), &connection).unwrap();

        let dates: Vec<_> = got.iter().map(|transaction| transaction.date).collect();
        assert_eq!(
            dates,
            vec![
                date!(2024 - 02 - 02),
                date!(2024 - 01 - 20),
                date!(2024 - 01 - 10),
                date!(2024 - 01 - 05),
            ]
        );
    }

    #[test]
    fn filters_by_date_range_inclusive() {
        let (connection, user_id) = get_test_connection();
        insert_month_of_data(&connection, user_id);

        let got = query_transactions(
            user_id,
            &TransactionQuery {
                date_range: Some(date!(2024 - 01 - 05)..=date!(2024 - 01 - 20)),
                sort_order: SortOrder::Ascending,
                ..Default::default()
            },
            &connection,
        )
        .unwrap();

        assert_eq!(got.len(), 3);
        assert_eq!(got[0].date, date!(2024 - 01 - 05));
        assert_eq!(got[2].date, date!(2024 - 01 - 20));
    }

    #[test]
    fn filters_by_type_and_category() {
        let (connection, user_id) = get_test_connection();
        insert_month_of_data(&connection, user_id);

        let got = query_transactions(
            user_id,
            &TransactionQuery {
                transaction_type: Some(TransactionType::Expense),
                category: Some(Category::Food),
                ..Default::default()
            },
            &connection,
        )
        .unwrap();

        let amounts: Vec<_> = got.iter().map(|transaction| transaction.amount).collect();
        assert_eq!(amounts, vec![80.0, 300.0]);
    }


    #[test]
    fn only_returns_rows_of_the_user() {
        let (connection, user_id) = get_test_connection();
        insert_month_of_data(&connection, user_id);
        let other_user = create_user(
            &Email::new("joao@example.com").unwrap(),
            PasswordHash::new_unchecked("hunter2"),
            &connection,
        )
        .unwrap();

        let got =
            query_transactions(other_user.id, &TransactionQuery::default(), &connection).unwrap();

        assert!(got.is_empty());
    }
}
