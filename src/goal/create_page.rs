//! Defines the route handler for the page for creating a new goal.

use axum::{
    Extension,
    extract::State,
    response::{IntoResponse, Response},
};
use maud::{Markup, html};

use crate::{
    Error,
    alert::Alert,
    auth::UserID,
    endpoints,
    goal::{GoalState, form::goal_form_fields},
    html::{
        BUTTON_PRIMARY_STYLE, FORM_CONTAINER_STYLE, base_with_alerts, currency_input_styles,
        loading_spinner,
    },
    navigation::NavBar,
    profile::{Currency, get_profile},
};

fn create_goal_view(currency: Currency, alerts: &[Alert]) -> Markup {
    let nav_bar = NavBar::new(endpoints::NEW_GOAL_VIEW).into_html();

    let content = html! {
        (nav_bar)

        div class=(FORM_CONTAINER_STYLE)
        {
            form
                hx-post=(endpoints::GOALS_API)
                hx-target-error="#alert-container"
                hx-disabled-elt="#submit-button"
                class="w-full space-y-4 md:space-y-6"
            {
                h2 class="text-xl font-bold" { "New Goal" }

                (goal_form_fields(None))

                button type="submit" id="submit-button" tabindex="0" class=(BUTTON_PRIMARY_STYLE)
                {
                    span id="indicator" class="inline htmx-indicator"
                    {
                        (loading_spinner())
                    }
                    " Create Goal"
                }
            }
        }
    };

    base_with_alerts(
        "Create Goal",
        &[currency_input_styles(currency)],
        &content,
        alerts,
    )
}

pub async fn get_create_goal_page(
    State(state): State<GoalState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let profile = {
        let connection = state
            .db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;

        get_profile(user_id, &connection)?
    };
    let alerts = state
        .notifications
        .drain_visible(user_id, profile.notifications);

    Ok(create_goal_view(profile.currency, &alerts).into_response())
}

#[cfg(test)]
mod tests {
    use axum::{
        Extension,
        extract::{FromRef, State},
    };

    use crate::{
        endpoints,
        goal::GoalState,
        test_utils::{
            assert_form_input, assert_form_submit_button, assert_hx_endpoint, assert_status_ok,
            assert_valid_html, must_get_form, parse_html_document, test_state_with_user,
        },
    };

    use super::get_create_goal_page;

    #[tokio::test]
    async fn new_goal_page_returns_form() {
        let (app_state, user_id) = test_state_with_user();

        let response =
            get_create_goal_page(State(GoalState::from_ref(&app_state)), Extension(user_id))
                .await
                .unwrap();

        assert_status_ok(&response);
        let document = parse_html_document(response).await;
        assert_valid_html(&document);
        let form = must_get_form(&document);
        assert_hx_endpoint(&form, endpoints::GOALS_API, "hx-post");
        assert_form_input(&form, "title", "text");
        assert_form_input(&form, "target_amount", "number");
        assert_form_submit_button(&form);
    }
}
