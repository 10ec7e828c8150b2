//! Defines the endpoint for creating a new goal.

use axum::{
    Extension,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::Form;
use axum_htmx::HxRedirect;

use crate::{
    Error,
    alert::Alert,
    auth::UserID,
    endpoints,
    goal::{GoalState, core::create_goal, form::GoalForm},
};

/// A route handler for creating a new goal, redirects to the goals view on success.
pub async fn create_goal_endpoint(
    State(state): State<GoalState>,
    Extension(user_id): Extension<UserID>,
    Form(form): Form<GoalForm>,
) -> Response {
    let new_goal = match form.validate() {
        Ok(new_goal) => new_goal,
        Err(error) => {
            tracing::warn!("rejected goal form from user {user_id}: {error}");
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

    if let Err(error) = create_goal(user_id, &new_goal, &connection) {
        tracing::error!("could not create goal for user {user_id}: {error}");
        return error.into_alert_response();
    }

    state.notifications.push(
        user_id,
        Alert::success("Goal created", &format!("\"{}\" has been added.", new_goal.title())),
    );

    (
        HxRedirect(endpoints::GOALS_VIEW.to_owned()),
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

    use crate::{
        endpoints,
        goal::{GoalState, form::GoalForm, get_goals},
        test_utils::{assert_hx_redirect, test_state_with_user},
    };

    use super::create_goal_endpoint;

    fn form(target_amount: f64) -> GoalForm {
        GoalForm {
            title: "House deposit".to_owned(),
            target_amount,
            current_amount: Some(500.0),
            category: Some("house".to_owned()),
            deadline: None,
            status: None,
        }
    }

    #[tokio::test]
    async fn can_create_goal() {
        let (app_state, user_id) = test_state_with_user();

        let response = create_goal_endpoint(
            State(GoalState::from_ref(&app_state)),
            Extension(user_id),
            Form(form(50_000.0)),
        )
        .await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_hx_redirect(&response, endpoints::GOALS_VIEW);
        let goals = get_goals(user_id, &app_state.db_connection.lock().unwrap()).unwrap();
        assert_eq!(goals.len(), 1);
        assert_eq!(goals[0].title, "House deposit");
        assert_eq!(app_state.notifications.drain(user_id).len(), 1);
    }

    #[tokio::test]
    async fn zero_target_is_rejected() {
        let (app_state, user_id) = test_state_with_user();

        let response = create_goal_endpoint(
            State(GoalState::from_ref(&app_state)),
            Extension(user_id),
            Form(form(0.0)),
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(
            get_goals(user_id, &app_state.db_connection.lock().unwrap())
                .unwrap()
                .is_empty()
        );
    }
}
