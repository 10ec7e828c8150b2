//! Code for creating the user table and fetching users from the database.

use std::{fmt::Display, str::FromStr};

use email_address::EmailAddress;
use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};

use crate::{Error, auth::PasswordHash};

/// A newtype wrapper for integer user IDs.
///
/// This helps disambiguate user IDs from other types of IDs, leading to better compile time
/// errors, and more flexible generics that can have distinct implementations for multiple ID types.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct UserID(i64);

impl UserID {
    /// Create a new user ID.
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// Cast the user ID to a 64 bit integer.
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl Display for UserID {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// A syntactically valid email address, lowercased so that lookups are case-insensitive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Email(String);

impl Email {
    /// Parse and normalize an email address.
    ///
    /// # Errors
    ///
    /// Returns [Error::InvalidEmail] if `raw_email` is not a valid address.
    pub fn new(raw_email: &str) -> Result<Self, Error> {
        let normalized = raw_email.trim().to_lowercase();

        EmailAddress::from_str(&normalized)
            .map(|_| Self(normalized))
            .map_err(|_| Error::InvalidEmail(raw_email.to_owned()))
    }
}

impl AsRef<str> for Email {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A registered user of the application.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    /// The user's ID in the application database.
    pub id: UserID,
    /// The lowercased email the user logs in with.
    pub email: String,
    /// The user's password hash.
    pub password_hash: PasswordHash,
}

/// Create the user table.
///
/// # Errors
///
/// This function will return an error if the SQL query failed.
pub fn create_user_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS user (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                email TEXT NOT NULL UNIQUE,
                password TEXT NOT NULL
                )",
        (),
    )?;

    Ok(())
}

fn map_user_row(row: &Row) -> Result<User, rusqlite::Error> {
    let raw_password_hash: String = row.get(2)?;

    Ok(User {
        id: UserID::new(row.get(0)?),
        email: row.get(1)?,
        password_hash: PasswordHash::new_unchecked(&raw_password_hash),
    })
}

/// Create and insert a new user into the database.
///
/// # Errors
///
/// Returns a [Error::DuplicateEmail] if the email is already registered or
/// [Error::SqlError] if another SQL related error occurred.
pub fn create_user(
    email: &Email,
    password_hash: PasswordHash,
    connection: &Connection,
) -> Result<User, Error> {
    let id = connection
        .prepare("INSERT INTO user (email, password) VALUES (?1, ?2) RETURNING id")?
        .query_row((email.as_ref(), password_hash.as_ref()), |row| row.get(0))?;

    Ok(User {
        id: UserID::new(id),
        email: email.as_ref().to_owned(),
        password_hash,
    })
}

/// Get the user from the database with an ID equal to `user_id`.
///
/// # Errors
///
/// Returns [Error::NotFound] if `user_id` does not belong to a registered user.
pub fn get_user_by_id(user_id: UserID, connection: &Connection) -> Result<User, Error> {
    connection
        .prepare("SELECT id, email, password FROM user WHERE id = :id")?
        .query_row(&[(":id", &user_id.as_i64())], map_user_row)
        .map_err(|error| error.into())
}

/// Get the user registered with `email`, ignoring case and surrounding whitespace.
///
/// # Errors
///
/// Returns [Error::NotFound] if no user is registered with `email`.
pub fn get_user_by_email(email: &str, connection: &Connection) -> Result<User, Error> {
    connection
        .prepare("SELECT id, email, password FROM user WHERE email = :email")?
        .query_row(
            &[(":email", &email.trim().to_lowercase())],
            map_user_row,
        )
        .map_err(|error| error.into())
}

/// Replace the password hash of the user with `user_id`.
///
/// # Errors
///
/// Returns [Error::NotFound] if `user_id` does not belong to a registered user.
pub fn update_password(
    user_id: UserID,
    password_hash: &PasswordHash,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "UPDATE user SET password = ?1 WHERE id = ?2",
        (password_hash.as_ref(), user_id.as_i64()),
    )?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    Ok(())
}

/// Delete the user with `user_id` along with their profile, transactions and goals.
///
/// # Errors
///
/// Returns [Error::NotFound] if `user_id` does not belong to a registered user.
pub fn delete_user(user_id: UserID, connection: &Connection) -> Result<(), Error> {
    let rows_affected =
        connection.execute("DELETE FROM user WHERE id = ?1", (user_id.as_i64(),))?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    Ok(())
}

/// Get the number of users in the database.
#[cfg(test)]
pub fn count_users(connection: &Connection) -> Result<u32, Error> {
    connection
        .query_row("SELECT COUNT(id) FROM user;", [], |row| row.get(0))
        .map_err(|error| error.into())
}

#[cfg(test)]
mod user_tests {
    use rusqlite::Connection;

    use crate::{
        Error,
        auth::{PasswordHash, UserID},
        db::initialize,
    };

    use super::{
        Email, count_users, create_user, delete_user, get_user_by_email, get_user_by_id,
        update_password,
    };

    fn get_test_connection() -> Connection {
        let connection =
            Connection::open_in_memory().expect("Could not create in-memory SQLite database");
        initialize(&connection).expect("Could not initialize database");

        connection
    }

    #[test]
    fn email_is_normalized() {
        let email = Email::new("  Maria@Example.COM ").unwrap();

        assert_eq!(email.as_ref(), "maria@example.com");
    }

    #[test]
    fn invalid_email_is_rejected() {
        assert_eq!(
            Email::new("not an email"),
            Err(Error::InvalidEmail("not an email".to_owned()))
        );
    }

    #[test]
    fn insert_user_succeeds() {
        let connection = get_test_connection();
        let email = Email::new("foo@bar.baz").unwrap();
        let password_hash = PasswordHash::new_unchecked("hunter2");

        let user = create_user(&email, password_hash.clone(), &connection).unwrap();

        assert!(user.id.as_i64() > 0);
        assert_eq!(user.email, "foo@bar.baz");
        assert_eq!(user.password_hash, password_hash);
    }

    #[test]
    fn insert_duplicate_email_fails() {
        let connection = get_test_connection();
        let email = Email::new("foo@bar.baz").unwrap();
        create_user(&email, PasswordHash::new_unchecked("hunter2"), &connection).unwrap();

        let duplicate = create_user(
            &Email::new("FOO@bar.baz").unwrap(),
            PasswordHash::new_unchecked("hunter3"),
            &connection,
        );

        assert_eq!(duplicate, Err(Error::DuplicateEmail));
    }

    #[test]
    fn get_user_fails_with_non_existent_id() {
        let connection = get_test_connection();

        assert_eq!(
            get_user_by_id(UserID::new(42), &connection),
            Err(Error::NotFound)
        );
    }

    #[test]
    fn get_user_by_email_ignores_case() {
        let connection = get_test_connection();
        let user = create_user(
            &Email::new("foo@bar.baz").unwrap(),
            PasswordHash::new_unchecked("hunter2"),
            &connection,
        )
        .unwrap();

        let got = get_user_by_email("Foo@Bar.Baz", &connection).unwrap();

        assert_eq!(got, user);
    }

    #[test]
    fn update_password_replaces_hash() {
        let connection = get_test_connection();
        let user = create_user(
            &Email::new("foo@bar.baz").unwrap(),
            PasswordHash::new_unchecked("hunter2"),
            &connection,
        )
        .unwrap();
        let new_hash = PasswordHash::new_unchecked("hunter3");

        update_password(user.id, &new_hash, &connection).unwrap();

        let got = get_user_by_id(user.id, &connection).unwrap();
        assert_eq!(got.password_hash, new_hash);
    }

    #[test]
    fn update_password_fails_for_missing_user() {
        let connection = get_test_connection();

        let result = update_password(
            UserID::new(42),
            &PasswordHash::new_unchecked("hunter3"),
            &connection,
        );

        assert_eq!(result, Err(Error::NotFound));
    }

    #[test]
    fn delete_user_removes_user() {
        let connection = get_test_connection();
        let user = create_user(
            &Email::new("foo@bar.baz").unwrap(),
            PasswordHash::new_unchecked("hunter2"),
            &connection,
        )
        .unwrap();

        delete_user(user.id, &connection).unwrap();

        assert_eq!(count_users(&connection), Ok(0));
        assert_eq!(delete_user(user.id, &connection), Err(Error::NotFound));
    }

    #[test]
    fn ids_of_deleted_users_are_not_reused() {
        let connection = get_test_connection();
        let deleted = create_user(
            &Email::new("foo@bar.baz").unwrap(),
            PasswordHash::new_unchecked("hunter2"),
            &connection,
        )
        .unwrap();
        delete_user(deleted.id, &connection).unwrap();

        let next = create_user(
            &Email::new("qux@bar.baz").unwrap(),
            PasswordHash::new_unchecked("hunter2"),
            &connection,
        )
        .unwrap();

        assert_ne!(next.id, deleted.id);
    }
}
