//! Defines the endpoint for updating a goal.

use axum::{
    Extension,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::Form;
use axum_htmx::HxRedirect;

use crate::{
    Error,
    alert::Alert,
    auth::UserID,
    database_id::GoalId,
    endpoints,
    goal::{GoalState, core::update_goal, form::GoalForm},
};

pub async fn edit_goal_endpoint(
    State(state): State<GoalState>,
    Extension(user_id): Extension<UserID>,
    Path(goal_id): Path<GoalId>,
    Form(form): Form<GoalForm>,
) -> Response {
    let new_goal = match form.validate() {
        Ok(new_goal) => new_goal,
        Err(error) => {
            tracing::warn!("rejected edit of goal {goal_id}: {error}");
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

    if let Err(error) = update_goal(goal_id, user_id, &new_goal, &connection) {
        tracing::error!("could not update goal {goal_id}: {error}");
        return error.into_alert_response();
    }

    state
        .notifications
        .push(user_id, Alert::success("Goal updated", "Your changes have been saved."));

    (
        HxRedirect(endpoints::GOALS_VIEW.to_owned()),
        StatusCode::SEE_OTHER,
    )
        .into_response()
}
