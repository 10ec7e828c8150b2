//! Defines the route handler for the page for editing a goal.

use axum::{
    Extension,
    extract::{Path, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};

use crate::{
    Error,
    alert::Alert,
    auth::UserID,
    database_id::GoalId,
    endpoints::{self, format_endpoint},
    goal::{
        GoalState,
        core::{Goal, get_goal},
        form::goal_form_fields,
    },
    html::{
        BUTTON_PRIMARY_STYLE, FORM_CONTAINER_STYLE, base_with_alerts, currency_input_styles,
        loading_spinner,
    },
    navigation::NavBar,
    profile::{Currency, get_profile},
};

fn edit_goal_view(goal: &Goal, currency: Currency, alerts: &[Alert]) -> Markup {
    let nav_bar = NavBar::new(endpoints::EDIT_GOAL_VIEW).into_html();

    let content = html! {
        (nav_bar)

        div class=(FORM_CONTAINER_STYLE)
        {
            form
                hx-put=(format_endpoint(endpoints::GOAL, goal.id))
                hx-target-error="#alert-container"
                hx-disabled-elt="#submit-button"
                class="w-full space-y-4 md:space-y-6"
            {
                h2 class="text-xl font-bold" { "Edit Goal" }

                (goal_form_fields(Some(goal)))

                button type="submit" id="submit-button" tabindex="0" class=(BUTTON_PRIMARY_STYLE)
                {
                    span id="indicator" class="inline htmx-indicator"
                    {
                        (loading_spinner())
                    }
                    " Save Changes"
                }
            }
        }
    };

    base_with_alerts(
        "Edit Goal",
        &[currency_input_styles(currency)],
        &content,
        alerts,
    )
}

/// Renders the page for editing a goal, or the 404 page if the user has no
/// such goal.
pub async fn get_edit_goal_page(
    State(state): State<GoalState>,
    Extension(user_id): Extension<UserID>,
    Path(goal_id): Path<GoalId>,
) -> Result<Response, Error> {
    let (goal, profile) = {
        let connection = state
            .db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;

        (
            get_goal(goal_id, user_id, &connection)?,
            get_profile(user_id, &connection)?,
        )
    };
    let alerts = state
        .notifications
        .drain_visible(user_id, profile.notifications);

    Ok(edit_goal_view(&goal, profile.currency, &alerts).into_response())
}
