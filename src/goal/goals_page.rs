//! Defines the page that lists a user's goals with their progress.

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
    endpoints::{self, format_endpoint},
    goal::{
        GoalState,
        core::{Goal, GoalStatus, get_goals},
    },
    html::{
        BADGE_STYLE, CARD_STYLE, LINK_STYLE, PAGE_CONTAINER_STYLE, base_with_alerts,
        edit_delete_action_links, format_currency,
    },
    navigation::NavBar,
    profile::{Currency, get_profile},
};

fn status_badge_style(status: GoalStatus) -> &'static str {
    match status {
        GoalStatus::InProgress => "bg-blue-100 text-blue-800 dark:bg-blue-900 dark:text-blue-300",
        GoalStatus::Completed => "bg-green-100 text-green-800 dark:bg-green-900 dark:text-green-300",
        GoalStatus::Cancelled => "bg-gray-100 text-gray-800 dark:bg-gray-700 dark:text-gray-300",
    }
}

fn progress_bar(percent: f64) -> Markup {
    let rounded = percent.round();

    html! {
        div class="flex items-center gap-3"
        {
            div
                class="w-full h-2.5 bg-gray-200 rounded-full dark:bg-gray-700"
                role="progressbar"
                aria-valuemin="0"
                aria-valuemax="100"
                aria-valuenow=(rounded)
            {
                div class="h-2.5 bg-blue-600 rounded-full" style={ "width: " (rounded) "%" } {}
            }

            span data-progress-label="true" class="text-sm font-medium tabular-nums"
            {
                (rounded) "%"
            }
        }
    }
}

fn goal_card(goal: &Goal, currency: Currency) -> Markup {
    let confirm_message = format!(
        "Are you sure you want to delete the goal '{}'? This cannot be undone.",
        goal.title
    );

    html! {
        article class={ (CARD_STYLE) " space-y-3" } data-goal-card="true"
        {
            div class="flex justify-between items-start gap-2"
            {
                h2 class="text-lg font-semibold" { (goal.title) }

                span class={ (BADGE_STYLE) " " (status_badge_style(goal.status)) }
                {
                    (goal.status.label())
                }
            }

            p class="text-sm text-gray-500 dark:text-gray-400" { (goal.category.label()) }

            p class="tabular-nums"
            {
                (format_currency(goal.current_amount, currency))
                " of "
                (format_currency(goal.target_amount, currency))
            }

            (progress_bar(goal.progress_percent()))

            @if let Some(deadline) = goal.deadline {
                p class="text-sm text-gray-500 dark:text-gray-400"
                {
                    "Deadline: " time datetime=(deadline) { (deadline) }
                }
            }

            div class="flex gap-4"
            {
                (edit_delete_action_links(
                    &format_endpoint(endpoints::EDIT_GOAL_VIEW, goal.id),
                    &format_endpoint(endpoints::GOAL, goal.id),
                    &confirm_message,
                    "closest article",
                    "delete",
                ))
            }
        }
    }
}

fn goals_view(goals: &[Goal], currency: Currency, alerts: &[Alert]) -> Markup {
    let nav_bar = NavBar::new(endpoints::GOALS_VIEW).into_html();

    let content = html! {
        (nav_bar)

        div class=(PAGE_CONTAINER_STYLE)
        {
            div class="flex justify-between flex-wrap items-end gap-4"
            {
                h1 class="text-xl font-bold" { "Goals" }

                a href=(endpoints::NEW_GOAL_VIEW) class=(LINK_STYLE) { "New Goal" }
            }

            @if goals.is_empty() {
                p data-empty-state="true" class="text-center"
                {
                    "You have no goals yet. "
                    a href=(endpoints::NEW_GOAL_VIEW) class=(LINK_STYLE) { "Create your first goal" }
                    "."
                }
            } @else {
                div class="grid w-full gap-4 md:grid-cols-2 xl:grid-cols-3"
                {
                    @for goal in goals {
                        (goal_card(goal, currency))
                    }
                }
            }
        }
    };

    base_with_alerts("Goals", &[], &content, alerts)
}

/// Renders the user's goals, most recently created first.
pub async fn get_goals_page(
    State(state): State<GoalState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let (goals, profile) = {
        let connection = state
            .db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;

        let goals = get_goals(user_id, &connection)
            .inspect_err(|error| tracing::error!("could not get goals for user {user_id}: {error}"))?;
        let profile = get_profile(user_id, &connection)?;

        (goals, profile)
    };
    let alerts = state
        .notifications
        .drain_visible(user_id, profile.notifications);

    Ok(goals_view(&goals, profile.currency, &alerts).into_response())
}
