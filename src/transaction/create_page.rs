//! Defines the route handler for the page for creating a new transaction.

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
    html::{
        BUTTON_PRIMARY_STYLE, FORM_CONTAINER_STYLE, base_with_alerts, currency_input_styles,
        loading_spinner,
    },
    navigation::NavBar,
    profile::{Profile, get_profile},
    timezone::local_today,
    transaction::{
        TransactionState,
        form::{TransactionFormDefaults, transaction_form_fields},
    },
};

fn create_transaction_view(
    defaults: &TransactionFormDefaults<'_>,
    profile: &Profile,
    alerts: &[Alert],
) -> Markup {
    let nav_bar = NavBar::new(endpoints::NEW_TRANSACTION_VIEW).into_html();

    let content = html! {
        (nav_bar)

        div class=(FORM_CONTAINER_STYLE)
        {
            form
                hx-post=(endpoints::TRANSACTIONS_API)
                hx-target-error="#alert-container"
                hx-disabled-elt="#submit-button"
                class="w-full space-y-4 md:space-y-6"
            {
                h2 class="text-xl font-bold" { "New Transaction" }

                (transaction_form_fields(defaults))

                button type="submit" id="submit-button" tabindex="0" class=(BUTTON_PRIMARY_STYLE)
                {
                    span id="indicator" class="inline htmx-indicator"
                    {
                        (loading_spinner())
                    }
                    " Create Transaction"
                }
            }
        }
    };

    base_with_alerts(
        "Create Transaction",
        &[currency_input_styles(profile.currency)],
        &content,
        alerts,
    )
}

/// Renders the page for creating a transaction.
pub async fn get_create_transaction_page(
    State(state): State<TransactionState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let today = local_today(&state.local_timezone)?;

    let profile = {
        let connection = state
            .db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;

        get_profile(user_id, &connection)
            .inspect_err(|error| tracing::error!("could not get profile of user {user_id}: {error}"))?
    };
    let alerts = state
        .notifications
        .drain_visible(user_id, profile.notifications);

    Ok(create_transaction_view(
        &TransactionFormDefaults::new_transaction(today),
        &profile,
        &alerts,
    )
    .into_response())
}
