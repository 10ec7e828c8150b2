//! Defines the core data models and database queries for transactions.

use std::{fmt::Display, str::FromStr};

use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};

use crate::{Error, auth::UserID, database_id::TransactionId, timezone::iso_date};

// ============================================================================
// MODELS
// ============================================================================

/// Whether money was earned or spent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Income,
    #[default]
    Expense,
}

impl TransactionType {
    pub const ALL: [TransactionType; 2] = [TransactionType::Income, TransactionType::Expense];

    pub fn as_str(self) -> &'static str {
        match self {
            TransactionType::Income => "income",
            TransactionType::Expense => "expense",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TransactionType::Income => "Income",
            TransactionType::Expense => "Expense",
        }
    }
}

impl FromStr for TransactionType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "income" => Ok(TransactionType::Income),
            "expense" => Ok(TransactionType::Expense),
            _ => Err(Error::InvalidLabel(s.to_owned())),
        }
    }
}

/// What a transaction was for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Salary,
    Investment,
    Food,
    Transport,
    Housing,
    Utilities,
    Entertainment,
    #[default]
    Other,
}

impl Category {
    /// All categories in the order they are offered to the user.
    pub const ALL: [Category; 8] = [
        Category::Salary,
        Category::Investment,
        Category::Food,
        Category::Transport,
        Category::Housing,
        Category::Utilities,
        Category::Entertainment,
        Category::Other,
    ];

    /// The label stored in the database and used in exports, e.g. "food".
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Salary => "salary",
            Category::Investment => "investment",
            Category::Food => "food",
            Category::Transport => "transport",
            Category::Housing => "housing",
            Category::Utilities => "utilities",
            Category::Entertainment => "entertainment",
            Category::Other => "other",
        }
    }

    /// The name shown to the user.
    pub fn label(self) -> &'static str {
        match self {
            Category::Salary => "Salary",
            Category::Investment => "Investment",
            Category::Food => "Food",
            Category::Transport => "Transport",
            Category::Housing => "Housing",
            Category::Utilities => "Utilities",
            Category::Entertainment => "Entertainment",
            Category::Other => "Other",
        }
    }
}

impl FromStr for Category {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|category| category.as_str() == s)
            .ok_or_else(|| Error::InvalidLabel(s.to_owned()))
    }
}

impl Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An expense or income, i.e. an event where money was either spent or earned.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Transaction {
    /// The ID of the transaction.
    pub id: TransactionId,
    /// The user that recorded the transaction.
    pub user_id: UserID,
    /// The amount of money, always zero or greater. See `transaction_type` for the direction.
    pub amount: f64,
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    pub category: Category,
    /// A text description of what the transaction was for.
    pub description: String,
    /// When the transaction happened.
    #[serde(with = "iso_date")]
    pub date: Date,
    /// When the transaction was recorded.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// A validated transaction that is ready to be written to the database.
///
/// Used for both creating and updating transactions.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    amount: f64,
    transaction_type: TransactionType,
    category: Category,
    description: String,
    date: Date,
}

impl NewTransaction {
    /// Validate the fields of a transaction.
    ///
    /// Surrounding whitespace is trimmed from `description`.
    ///
    /// # Errors
    ///
    /// Returns [Error::InvalidAmount] if `amount` is negative, NaN or infinite.
    pub fn new(
        amount: f64,
        transaction_type: TransactionType,
        category: Category,
        description: &str,
        date: Date,
    ) -> Result<Self, Error> {
        if !amount.is_finite() || amount < 0.0 {
            return Err(Error::InvalidAmount(amount));
        }

        Ok(Self {
            amount,
            transaction_type,
            category,
            description: description.trim().to_owned(),
            date,
        })
    }

    pub fn amount(&self) -> f64 {
        self.amount
    }

    pub fn transaction_type(&self) -> TransactionType {
        self.transaction_type
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn date(&self) -> Date {
        self.date
    }
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

/// Create the transaction table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS \"transaction\" (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL,
                amount REAL NOT NULL CHECK (amount >= 0),
                type TEXT NOT NULL,
                category TEXT NOT NULL,
                description TEXT NOT NULL,
                date TEXT NOT NULL,
                created_at TEXT NOT NULL,
                FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
                )",
        (),
    )?;

    // Every query filters by user and most by date as well.
    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_transaction_user_date ON \"transaction\"(user_id, date);",
        (),
    )?;

    Ok(())
}

/// The columns selected by every transaction query, in the order expected by
/// [map_transaction_row].
pub(crate) const TRANSACTION_COLUMNS: &str =
    "id, user_id, amount, type, category, description, date, created_at";

/// Map a database row to a Transaction.
///
/// Unknown type or category labels are treated as the defaults so that one
/// bad row cannot break a whole page.
pub fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    let raw_type: String = row.get(3)?;
    let raw_category: String = row.get(4)?;

    Ok(Transaction {
        id: row.get(0)?,
        user_id: UserID::new(row.get(1)?),
        amount: row.get(2)?,
        transaction_type: raw_type.parse().unwrap_or_default(),
        category: raw_category.parse().unwrap_or_default(),
        description: row.get(5)?,
        date: row.get(6)?,
        created_at: row.get(7)?,
    })
}

/// Create a new transaction for `user_id`.
///
/// # Errors
/// Returns [Error::SqlError] if `user_id` does not exist or there is some other SQL error.
pub fn create_transaction(
    user_id: UserID,
    new_transaction: &NewTransaction,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let transaction = connection
        .prepare(&format!(
            "INSERT INTO \"transaction\" (user_id, amount, type, category, description, date, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
             RETURNING {TRANSACTION_COLUMNS}"
        ))?
        .query_row(
            (
                user_id.as_i64(),
                new_transaction.amount,
                new_transaction.transaction_type.as_str(),
                new_transaction.category.as_str(),
                &new_transaction.description,
                new_transaction.date,
                OffsetDateTime::now_utc(),
            ),
            map_transaction_row,
        )?;

    Ok(transaction)
}

/// Retrieve the transaction `id` if it belongs to `user_id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a transaction owned by `user_id`,
/// - or [Error::SqlError] there is some other SQL error.
pub fn get_transaction(
    id: TransactionId,
    user_id: UserID,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let transaction = connection
        .prepare(&format!(
            "SELECT {TRANSACTION_COLUMNS} FROM \"transaction\" WHERE id = ?1 AND user_id = ?2"
        ))?
        .query_row((id, user_id.as_i64()), map_transaction_row)?;

    Ok(transaction)
}

/// Replace the fields of transaction `id` owned by `user_id`.
///
/// # Errors
/// Returns [Error::UpdateMissingTransaction] if `id` does not refer to a
/// transaction owned by `user_id`.
pub fn update_transaction(
    id: TransactionId,
    user_id: UserID,
    transaction: &NewTransaction,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "UPDATE \"transaction\"
        SET amount = ?1, type = ?2, category = ?3, description = ?4, date = ?5
        WHERE id = ?6 AND user_id = ?7",
        (
            transaction.amount,
            transaction.transaction_type.as_str(),
            transaction.category.as_str(),
            &transaction.description,
            transaction.date,
            id,
            user_id.as_i64(),
        ),
    )?;

    if rows_affected == 0 {
        return Err(Error::UpdateMissingTransaction);
    }

    Ok(())
}

/// Delete transaction `id` owned by `user_id`.
///
/// # Errors
/// Returns [Error::DeleteMissingTransaction] if `id` does not refer to a
/// transaction owned by `user_id`.
pub fn delete_transaction(
    id: TransactionId,
    user_id: UserID,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "DELETE FROM \"transaction\" WHERE id = ?1 AND user_id = ?2",
        (id, user_id.as_i64()),
    )?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingTransaction);
    }

    Ok(())
}

/// Get the number of transactions recorded by `user_id`.
///
/// # Errors
/// This function will return a [Error::SqlError] there is some SQL error.
#[cfg(test)]
pub fn count_transactions(user_id: UserID, connection: &Connection) -> Result<u32, Error> {
    connection
        .query_row(
            "SELECT COUNT(id) FROM \"transaction\" WHERE user_id = ?1",
            (user_id.as_i64(),),
            |row| row.get(0),
        )
        .map_err(|error| error.into())
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        Error,
        auth::{Email, PasswordHash, UserID, create_user, delete_user},
        db::initialize,
    };

    use super::{
        Category, NewTransaction, TransactionType, count_transactions, create_transaction,
        delete_transaction, get_transaction, update_transaction,
    };

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

    fn create_other_user(connection: &Connection) -> UserID {
        create_user(
            &Email::new("joao@example.com").unwrap(),
            PasswordHash::new_unchecked("hunter2"),
            connection,
        )
        .unwrap()
        .id
    }

    fn groceries() -> NewTransaction {
        NewTransaction::new(
            300.0,
            TransactionType::Expense,
            Category::Food,
            "  Groceries ",
            date!(2024 - 01 - 10),
        )
        .unwrap()
    }

    #[test]
    fn new_transaction_rejects_invalid_amounts() {
        for amount in [-0.01, f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let result = NewTransaction::new(
                amount,
                TransactionType::Income,
                Category::Salary,
                "",
                date!(2024 - 01 - 05),
            );

            assert!(
                matches!(result, Err(Error::InvalidAmount(_))),
                "want InvalidAmount for {amount}, got {result:?}"
            );
        }
    }

    #[test]
    fn new_transaction_accepts_zero() {
        let result = NewTransaction::new(
            0.0,
            TransactionType::Expense,
            Category::Other,
            "",
            date!(2024 - 01 - 05),
        );

        assert!(result.is_ok());
    }

    #[test]
    fn create_succeeds() {
        let (connection, user_id) = get_test_connection();

        let transaction = create_transaction(user_id, &groceries(), &connection).unwrap();

        assert_eq!(transaction.user_id, user_id);
        assert_eq!(transaction.amount, 300.0);
        assert_eq!(transaction.transaction_type, TransactionType::Expense);
        assert_eq!(transaction.category, Category::Food);
        assert_eq!(transaction.description, "Groceries");
        assert_eq!(transaction.date, date!(2024 - 01 - 10));
        assert_eq!(
            get_transaction(transaction.id, user_id, &connection),
            Ok(transaction)
        );
    }

    #[test]
    fn other_users_cannot_see_or_change_transaction() {
        let (connection, user_id) = get_test_connection();
        let other_user_id = create_other_user(&connection);
        let transaction = create_transaction(user_id, &groceries(), &connection).unwrap();

        assert_eq!(
            get_transaction(transaction.id, other_user_id, &connection),
            Err(Error::NotFound)
        );
        assert_eq!(
            update_transaction(transaction.id, other_user_id, &groceries(), &connection),
            Err(Error::UpdateMissingTransaction)
        );
        assert_eq!(
            delete_transaction(transaction.id, other_user_id, &connection),
            Err(Error::DeleteMissingTransaction)
        );
        assert_eq!(count_transactions(user_id, &connection), Ok(1));
    }

    #[test]
    fn update_replaces_fields() {
        let (connection, user_id) = get_test_connection();
        let transaction = create_transaction(user_id, &groceries(), &connection).unwrap();
        let salary = NewTransaction::new(
            1000.0,
            TransactionType::Income,
            Category::Salary,
            "Salary",
            date!(2024 - 01 - 05),
        )
        .unwrap();

        update_transaction(transaction.id, user_id, &salary, &connection).unwrap();

        let got = get_transaction(transaction.id, user_id, &connection).unwrap();
        assert_eq!(got.amount, 1000.0);
        assert_eq!(got.transaction_type, TransactionType::Income);
        assert_eq!(got.category, Category::Salary);
        assert_eq!(got.description, "Salary");
        assert_eq!(got.date, date!(2024 - 01 - 05));
        assert_eq!(got.created_at, transaction.created_at);
    }

    #[test]
    fn delete_removes_transaction() {
        let (connection, user_id) = get_test_connection();
        let transaction = create_transaction(user_id, &groceries(), &connection).unwrap();

        delete_transaction(transaction.id, user_id, &connection).unwrap();

        assert_eq!(
            get_transaction(transaction.id, user_id, &connection),
            Err(Error::NotFound)
        );
        assert_eq!(
            delete_transaction(transaction.id, user_id, &connection),
            Err(Error::DeleteMissingTransaction)
        );
    }

    #[test]
    fn deleting_user_deletes_their_transactions() {
        let (connection, user_id) = get_test_connection();
        create_transaction(user_id, &groceries(), &connection).unwrap();

        delete_user(user_id, &connection).unwrap();

        assert_eq!(count_transactions(user_id, &connection), Ok(0));
    }

    #[test]
    fn category_parses_stored_labels() {
        for category in Category::ALL {
            assert_eq!(category.as_str().parse::<Category>(), Ok(category));
        }

        assert_eq!(
            "groceries".parse::<Category>(),
            Err(Error::InvalidLabel("groceries".to_owned()))
        );
    }
}
