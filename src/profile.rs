//! User profiles: display name and display preferences.
//!
//! Every registered user has exactly one profile, created at registration.

use std::{fmt::Display, str::FromStr};

use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};

use crate::{Error, auth::UserID};

/// The currency amounts are displayed in. Amounts are never converted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    #[default]
    Brl,
    Usd,
    Eur,
}

impl Currency {
    /// All currencies in the order they are offered to the user.
    pub const ALL: [Currency; 3] = [Currency::Brl, Currency::Usd, Currency::Eur];

    /// The ISO 4217 code, e.g. "BRL".
    pub fn code(self) -> &'static str {
        match self {
            Currency::Brl => "BRL",
            Currency::Usd => "USD",
            Currency::Eur => "EUR",
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Currency::Brl => "R$",
            Currency::Usd => "$",
            Currency::Eur => "€",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Currency::Brl => "Brazilian Real (R$)",
            Currency::Usd => "US Dollar ($)",
            Currency::Eur => "Euro (€)",
        }
    }
}

impl FromStr for Currency {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "BRL" => Ok(Currency::Brl),
            "USD" => Ok(Currency::Usd),
            "EUR" => Ok(Currency::Eur),
            _ => Err(Error::InvalidLabel(s.to_owned())),
        }
    }
}

impl Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// The first day of the week in calendar views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeekStart {
    Sunday,
    #[default]
    Monday,
}

impl WeekStart {
    pub const ALL: [WeekStart; 2] = [WeekStart::Sunday, WeekStart::Monday];

    pub fn as_str(self) -> &'static str {
        match self {
            WeekStart::Sunday => "sunday",
            WeekStart::Monday => "monday",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            WeekStart::Sunday => "Sunday",
            WeekStart::Monday => "Monday",
        }
    }
}

impl FromStr for WeekStart {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sunday" => Ok(WeekStart::Sunday),
            "monday" => Ok(WeekStart::Monday),
            _ => Err(Error::InvalidLabel(s.to_owned())),
        }
    }
}

/// A user's profile joined with their email address.
#[derive(Debug, Clone, PartialEq)]
pub struct Profile {
    pub user_id: UserID,
    pub name: String,
    pub email: String,
    pub currency: Currency,
    /// Whether success and info notifications are shown. Errors are always shown.
    pub notifications: bool,
    pub week_starts_on: WeekStart,
}

/// Validated changes to a profile.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileUpdate {
    name: String,
    currency: Currency,
    notifications: bool,
    week_starts_on: WeekStart,
}

impl ProfileUpdate {
    /// # Errors
    ///
    /// Returns [Error::EmptyName] if `name` is blank.
    pub fn new(
        name: &str,
        currency: Currency,
        notifications: bool,
        week_starts_on: WeekStart,
    ) -> Result<Self, Error> {
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::EmptyName);
        }

        Ok(Self {
            name: name.to_owned(),
            currency,
            notifications,
            week_starts_on,
        })
    }
}

pub fn create_profile_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS profile (
                user_id INTEGER PRIMARY KEY,
                name TEXT NOT NULL,
                currency TEXT NOT NULL DEFAULT 'BRL',
                notifications INTEGER NOT NULL DEFAULT 1,
                week_starts_on TEXT NOT NULL DEFAULT 'monday',
                FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
                )",
        (),
    )?;

    Ok(())
}

/// Create the default profile for a newly registered user.
///
/// # Errors
///
/// Returns [Error::EmptyName] for a blank name or [Error::SqlError] if the
/// user does not exist or already has a profile.
pub fn create_profile(user_id: UserID, name: &str, connection: &Connection) -> Result<Profile, Error> {
    let update = ProfileUpdate::new(
        name,
        Currency::default(),
        true,
        WeekStart::default(),
    )?;

    connection.execute(
        "INSERT INTO profile (user_id, name, currency, notifications, week_starts_on)
            VALUES (?1, ?2, ?3, ?4, ?5)",
        (
            user_id.as_i64(),
            &update.name,
            update.currency.code(),
            update.notifications,
            update.week_starts_on.as_str(),
        ),
    )?;

    get_profile(user_id, connection)
}

fn map_profile_row(row: &Row) -> Result<Profile, rusqlite::Error> {
    let raw_currency: String = row.get(3)?;
    let raw_week_start: String = row.get(5)?;

    Ok(Profile {
        user_id: UserID::new(row.get(0)?),
        name: row.get(1)?,
        email: row.get(2)?,
        currency: raw_currency.parse().unwrap_or_default(),
        notifications: row.get(4)?,
        week_starts_on: raw_week_start.parse().unwrap_or_default(),
    })
}

/// # Errors
///
/// Returns [Error::NotFound] if the user has no profile.
pub fn get_profile(user_id: UserID, connection: &Connection) -> Result<Profile, Error> {
    connection
        .prepare(
            "SELECT profile.user_id, profile.name, user.email, profile.currency,
                profile.notifications, profile.week_starts_on
            FROM profile INNER JOIN user ON user.id = profile.user_id
            WHERE profile.user_id = :user_id",
        )?
        .query_row(&[(":user_id", &user_id.as_i64())], map_profile_row)
        .map_err(|error| error.into())
}

/// # Errors
///
/// Returns [Error::UpdateMissingProfile] if the user has no profile.
pub fn update_profile(
    user_id: UserID,
    update: &ProfileUpdate,
    connection: &Connection,
) -> Result<Profile, Error> {
    let rows_affected = connection.execute(
        "UPDATE profile SET name = ?1, currency = ?2, notifications = ?3, week_starts_on = ?4
            WHERE user_id = ?5",
        (
            &update.name,
            update.currency.code(),
            update.notifications,
            update.week_starts_on.as_str(),
            user_id.as_i64(),
        ),
    )?;

    if rows_affected == 0 {
        return Err(Error::UpdateMissingProfile);
    }

    get_profile(user_id, connection)
}
