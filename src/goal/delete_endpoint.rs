//! Defines the endpoint for deleting a goal.

use axum::{
    Extension,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::{
    Error,
    auth::UserID,
    database_id::GoalId,
    goal::{GoalState, core::delete_goal},
};

/// A route handler for deleting a goal.
///
/// Responds with 200 OK and an empty body so that htmx removes the goal card.
pub async fn delete_goal_endpoint(
    State(state): State<GoalState>,
    Extension(user_id): Extension<UserID>,
    Path(goal_id): Path<GoalId>,
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

    match delete_goal(goal_id, user_id, &connection) {
        Ok(()) => StatusCode::OK.into_response(),
        Err(error) => {
            tracing::error!("could not delete goal {goal_id}: {error}");
            error.into_alert_response()
        }
    }
}
