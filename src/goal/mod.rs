//! Savings goals: a target amount a user is working towards.

use std::sync::{Arc, Mutex};

use axum::extract::FromRef;
use rusqlite::Connection;

use crate::{AppState, notification::NotificationQueue};

mod core;
mod create_endpoint;
mod create_page;
mod delete_endpoint;
mod edit_endpoint;
mod edit_page;
mod form;
mod goals_page;

pub use core::{
    Goal, GoalCategory, GoalStatus, NewGoal, create_goal, create_goal_table, get_goals,
};
pub use create_endpoint::create_goal_endpoint;
pub use create_page::get_create_goal_page;
pub use delete_endpoint::delete_goal_endpoint;
pub use edit_endpoint::edit_goal_endpoint;
pub use edit_page::get_edit_goal_page;
pub use goals_page::get_goals_page;

/// The state needed by the goal pages and endpoints.
#[derive(Debug, Clone)]
pub struct GoalState {
    pub db_connection: Arc<Mutex<Connection>>,
    pub notifications: NotificationQueue,
}

impl FromRef<AppState> for GoalState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            notifications: state.notifications.clone(),
        }
    }
}
