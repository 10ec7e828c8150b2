//! Defines the goal model and the database queries for goals.

use std::str::FromStr;

use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};

use crate::{Error, auth::UserID, database_id::GoalId, timezone::iso_date};

/// What a user is saving towards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GoalCategory {
    Emergency,
    Retirement,
    House,
    Car,
    Travel,
    Education,
    Investment,
    #[default]
    Other,
}

impl GoalCategory {
    pub const ALL: [GoalCategory; 8] = [
        GoalCategory::Emergency,
        GoalCategory::Retirement,
        GoalCategory::House,
        GoalCategory::Car,
        GoalCategory::Travel,
        GoalCategory::Education,
        GoalCategory::Investment,
        GoalCategory::Other,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            GoalCategory::Emergency => "emergency",
            GoalCategory::Retirement => "retirement",
            GoalCategory::House => "house",
            GoalCategory::Car => "car",
            GoalCategory::Travel => "travel",
            GoalCategory::Education => "education",
            GoalCategory::Investment => "investment",
            GoalCategory::Other => "other",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            GoalCategory::Emergency => "Emergency Fund",
            GoalCategory::Retirement => "Retirement",
            GoalCategory::House => "House",
            GoalCategory::Car => "Car",
            GoalCategory::Travel => "Travel",
            GoalCategory::Education => "Education",
            GoalCategory::Investment => "Investment",
            GoalCategory::Other => "Other",
        }
    }
}

impl FromStr for GoalCategory {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        GoalCategory::ALL
            .into_iter()
            .find(|category| category.as_str() == s)
            .ok_or_else(|| Error::InvalidLabel(s.to_owned()))
    }
}

/// Where a goal is at. Only ever changed by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GoalStatus {
    #[default]
    InProgress,
    Completed,
    Cancelled,
}

impl GoalStatus {
    pub const ALL: [GoalStatus; 3] = [
        GoalStatus::InProgress,
        GoalStatus::Completed,
        GoalStatus::Cancelled,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            GoalStatus::InProgress => "in_progress",
            GoalStatus::Completed => "completed",
            GoalStatus::Cancelled => "cancelled",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            GoalStatus::InProgress => "In Progress",
            GoalStatus::Completed => "Completed",
            GoalStatus::Cancelled => "Cancelled",
        }
    }
}

impl FromStr for GoalStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        GoalStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| Error::InvalidLabel(s.to_owned()))
    }
}

/// How far `current` is towards `target` as a percentage, capped at 100.
///
/// A target that is not positive gives 0.
pub fn progress_percent(current: f64, target: f64) -> f64 {
    if !target.is_finite() || target <= 0.0 {
        return 0.0;
    }

    (current / target * 100.0).clamp(0.0, 100.0)
}

/// A savings goal.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Goal {
    pub id: GoalId,
    pub user_id: UserID,
    pub title: String,
    /// Always greater than zero.
    pub target_amount: f64,
    pub current_amount: f64,
    pub category: GoalCategory,
    #[serde(with = "iso_date::option")]
    pub deadline: Option<Date>,
    pub status: GoalStatus,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl Goal {
    pub fn progress_percent(&self) -> f64 {
        progress_percent(self.current_amount, self.target_amount)
    }
}

/// A validated goal that is ready to be written to the database.
#[derive(Debug, Clone, PartialEq)]
pub struct NewGoal {
    title: String,
    target_amount: f64,
    current_amount: f64,
    category: GoalCategory,
    deadline: Option<Date>,
    status: GoalStatus,
}

impl NewGoal {
    /// Validate the fields of a goal. Surrounding whitespace is trimmed from `title`.
    ///
    /// # Errors
    ///
    /// Returns:
    /// - [Error::EmptyTitle] if `title` is empty or only whitespace,
    /// - [Error::InvalidGoalTarget] if `target_amount` is not a number greater than zero,
    /// - [Error::InvalidAmount] if `current_amount` is negative or not finite.
    pub fn new(
        title: &str,
        target_amount: f64,
        current_amount: f64,
        category: GoalCategory,
        deadline: Option<Date>,
        status: GoalStatus,
    ) -> Result<Self, Error> {
        let title = title.trim();
        if title.is_empty() {
            return Err(Error::EmptyTitle);
        }

        if !target_amount.is_finite() || target_amount <= 0.0 {
            return Err(Error::InvalidGoalTarget(target_amount));
        }

        if !current_amount.is_finite() || current_amount < 0.0 {
            return Err(Error::InvalidAmount(current_amount));
        }

        Ok(Self {
            title: title.to_owned(),
            target_amount,
            current_amount,
            category,
            deadline,
            status,
        })
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn target_amount(&self) -> f64 {
        self.target_amount
    }

    pub fn current_amount(&self) -> f64 {
        self.current_amount
    }
}

pub fn create_goal_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS goal (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL,
                title TEXT NOT NULL,
                target_amount REAL NOT NULL CHECK (target_amount > 0),
                current_amount REAL NOT NULL CHECK (current_amount >= 0),
                category TEXT NOT NULL,
                deadline TEXT,
                status TEXT NOT NULL,
                created_at TEXT NOT NULL,
                FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
                )",
        (),
    )?;

    Ok(())
}

const GOAL_COLUMNS: &str =
    "id, user_id, title, target_amount, current_amount, category, deadline, status, created_at";

fn map_goal_row(row: &Row) -> Result<Goal, rusqlite::Error> {
    let raw_category: String = row.get(5)?;
    let raw_status: String = row.get(7)?;

    Ok(Goal {
        id: row.get(0)?,
        user_id: UserID::new(row.get(1)?),
        title: row.get(2)?,
        target_amount: row.get(3)?,
        current_amount: row.get(4)?,
        category: raw_category.parse().unwrap_or_default(),
        deadline: row.get(6)?,
        status: raw_status.parse().unwrap_or_default(),
        created_at: row.get(8)?,
    })
}

/// Create a new goal for `user_id`.
///
/// # Errors
/// Returns [Error::SqlError] if `user_id` does not exist or there is some other SQL error.
pub fn create_goal(
    user_id: UserID,
    new_goal: &NewGoal,
    connection: &Connection,
) -> Result<Goal, Error> {
    let goal = connection
        .prepare(&format!(
            "INSERT INTO goal (user_id, title, target_amount, current_amount, category, deadline, status, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
             RETURNING {GOAL_COLUMNS}"
        ))?
        .query_row(
            (
                user_id.as_i64(),
                &new_goal.title,
                new_goal.target_amount,
                new_goal.current_amount,
                new_goal.category.as_str(),
                new_goal.deadline,
                new_goal.status.as_str(),
                OffsetDateTime::now_utc(),
            ),
            map_goal_row,
        )?;

    Ok(goal)
}

/// Retrieve the goal `id` if it belongs to `user_id`.
///
/// # Errors
/// Returns [Error::NotFound] if `id` does not refer to a goal owned by `user_id`.
pub fn get_goal(id: GoalId, user_id: UserID, connection: &Connection) -> Result<Goal, Error> {
    let goal = connection
        .prepare(&format!(
            "SELECT {GOAL_COLUMNS} FROM goal WHERE id = ?1 AND user_id = ?2"
        ))?
        .query_row((id, user_id.as_i64()), map_goal_row)?;

    Ok(goal)
}

/// Get every goal of `user_id`, most recently created first.
pub fn get_goals(user_id: UserID, connection: &Connection) -> Result<Vec<Goal>, Error> {
    connection
        .prepare(&format!(
            "SELECT {GOAL_COLUMNS} FROM goal WHERE user_id = ?1 ORDER BY created_at DESC, id DESC"
        ))?
        .query_map((user_id.as_i64(),), map_goal_row)?
        .map(|goal_result| goal_result.map_err(Error::SqlError))
        .collect()
}

/// Replace the fields of goal `id` owned by `user_id`.
///
/// # Errors
/// Returns [Error::UpdateMissingGoal] if `id` does not refer to a goal owned by `user_id`.
pub fn update_goal(
    id: GoalId,
    user_id: UserID,
    goal: &NewGoal,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "UPDATE goal
        SET title = ?1, target_amount = ?2, current_amount = ?3, category = ?4, deadline = ?5, status = ?6
        WHERE id = ?7 AND user_id = ?8",
        (
            &goal.title,
            goal.target_amount,
            goal.current_amount,
            goal.category.as_str(),
            goal.deadline,
            goal.status.as_str(),
            id,
            user_id.as_i64(),
        ),
    )?;

    if rows_affected == 0 {
        return Err(Error::UpdateMissingGoal);
    }

    Ok(())
}

/// Delete goal `id` owned by `user_id`.
///
/// # Errors
/// Returns [Error::DeleteMissingGoal] if `id` does not refer to a goal owned by `user_id`.
pub fn delete_goal(id: GoalId, user_id: UserID, connection: &Connection) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "DELETE FROM goal WHERE id = ?1 AND user_id = ?2",
        (id, user_id.as_i64()),
    )?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingGoal);
    }

    Ok(())
}

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
        GoalCategory, GoalStatus, NewGoal, create_goal, delete_goal, get_goal, get_goals,
        progress_percent, update_goal,
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

    fn emergency_fund() -> NewGoal {
        NewGoal::new(
            " Emergency fund ",
            10_000.0,
            2_500.0,
            GoalCategory::Emergency,
            Some(date!(2025 - 12 - 31)),
            GoalStatus::InProgress,
        )
        .unwrap()
    }

    #[test]
    fn progress_is_capped_at_100() {
        assert_eq!(progress_percent(2_500.0, 10_000.0), 25.0);
        assert_eq!(progress_percent(15_000.0, 10_000.0), 100.0);
        assert_eq!(progress_percent(0.0, 10_000.0), 0.0);
    }

    #[test]
    fn progress_of_non_positive_target_is_zero() {
        assert_eq!(progress_percent(100.0, 0.0), 0.0);
        assert_eq!(progress_percent(100.0, -5.0), 0.0);
    }

    #[test]
    fn new_goal_rejects_zero_target() {
        let result = NewGoal::new(
            "Car",
            0.0,
            0.0,
            GoalCategory::Car,
            None,
            GoalStatus::InProgress,
        );

        assert_eq!(result, Err(Error::InvalidGoalTarget(0.0)));
    }

    #[test]
    fn new_goal_rejects_empty_title() {
        let result = NewGoal::new(
            "   ",
            100.0,
            0.0,
            GoalCategory::Car,
            None,
            GoalStatus::InProgress,
        );

        assert_eq!(result, Err(Error::EmptyTitle));
    }

    #[test]
    fn new_goal_rejects_negative_current_amount() {
        let result = NewGoal::new(
            "Car",
            100.0,
            -1.0,
            GoalCategory::Car,
            None,
            GoalStatus::InProgress,
        );

        assert_eq!(result, Err(Error::InvalidAmount(-1.0)));
    }

    #[test]
    fn create_and_get_goal() {
        let (connection, user_id) = get_test_connection();

        let goal = create_goal(user_id, &emergency_fund(), &connection).unwrap();

        assert_eq!(goal.title, "Emergency fund");
        assert_eq!(goal.target_amount, 10_000.0);
        assert_eq!(goal.current_amount, 2_500.0);
        assert_eq!(goal.category, GoalCategory::Emergency);
        assert_eq!(goal.deadline, Some(date!(2025 - 12 - 31)));
        assert_eq!(goal.status, GoalStatus::InProgress);
        assert_eq!(goal.progress_percent(), 25.0);
        assert_eq!(get_goal(goal.id, user_id, &connection), Ok(goal));
    }

    #[test]
    fn reaching_target_does_not_complete_goal() {
        let (connection, user_id) = get_test_connection();
        let goal = create_goal(user_id, &emergency_fund(), &connection).unwrap();
        let funded = NewGoal::new(
            "Emergency fund",
            10_000.0,
            12_000.0,
            GoalCategory::Emergency,
            None,
            GoalStatus::InProgress,
        )
        .unwrap();

        update_goal(goal.id, user_id, &funded, &connection).unwrap();

        let got = get_goal(goal.id, user_id, &connection).unwrap();
        assert_eq!(got.status, GoalStatus::InProgress);
        assert_eq!(got.progress_percent(), 100.0);
        assert_eq!(got.deadline, None);
    }

    #[test]
    fn goals_are_listed_newest_first() {
        let (connection, user_id) = get_test_connection();
        let first = create_goal(user_id, &emergency_fund(), &connection).unwrap();
        let second = create_goal(user_id, &emergency_fund(), &connection).unwrap();

        let goals = get_goals(user_id, &connection).unwrap();

        let ids: Vec<_> = goals.iter().map(|goal| goal.id).collect();
        assert_eq!(ids, vec![second.id, first.id]);
    }

    #[test]
    fn other_users_cannot_change_goal() {
        let (connection, user_id) = get_test_connection();
        let goal = create_goal(user_id, &emergency_fund(), &connection).unwrap();
        let other_user_id = UserID::new(user_id.as_i64() + 1);

        assert_eq!(
            get_goal(goal.id, other_user_id, &connection),
            Err(Error::NotFound)
        );
        assert_eq!(
            update_goal(goal.id, other_user_id, &emergency_fund(), &connection),
            Err(Error::UpdateMissingGoal)
        );
        assert_eq!(
            delete_goal(goal.id, other_user_id, &connection),
            Err(Error::DeleteMissingGoal)
        );
    }

    #[test]
    fn delete_removes_goal() {
        let (connection, user_id) = get_test_connection();
        let goal = create_goal(user_id, &emergency_fund(), &connection).unwrap();

        delete_goal(goal.id, user_id, &connection).unwrap();

        assert_eq!(get_goals(user_id, &connection), Ok(Vec::new()));
    }

    #[test]
    fn deleting_user_deletes_goals() {
        let (connection, user_id) = get_test_connection();
        create_goal(user_id, &emergency_fund(), &connection).unwrap();

        delete_user(user_id, &connection).unwrap();

        assert_eq!(get_goals(user_id, &connection), Ok(Vec::new()));
    }
}
