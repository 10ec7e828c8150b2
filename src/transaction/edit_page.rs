//! Defines the route handler for the page for editing a transaction.

use axum::{
    Extension,
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use serde::Deserialize;

use crate::{
    Error,
    alert::Alert,
    auth::{UserID, normalize_redirect_url},
    database_id::TransactionId,
    endpoints::{self, format_endpoint},
    html::{
        BUTTON_PRIMARY_STYLE, FORM_CONTAINER_STYLE, base_with_alerts, currency_input_styles,
        loading_spinner,
    },
    navigation::NavBar,
    profile::{Profile, get_profile},
    transaction::{
        Transaction, TransactionState,
        core::get_transaction,
        form::{TransactionFormDefaults, transaction_form_fields},
    },
};

/// The page to go back to after saving, e.g. the dashboard.
#[derive(Debug, Default, Deserialize)]
pub struct RedirectQuery {
    pub redirect_url: Option<String>,
}

/// The endpoint the edit form submits to, carrying `redirect_url` along if
/// it is a safe local path.
fn edit_transaction_endpoint_url(transaction_id: TransactionId, redirect_url: Option<&str>) -> String {
    let endpoint = format_endpoint(endpoints::TRANSACTION, transaction_id);

    match redirect_url.and_then(normalize_redirect_url) {
        Some(redirect_url) => {
            let query = serde_urlencoded::to_string([("redirect_url", redirect_url)])
                .unwrap_or_default();
            format!("{endpoint}?{query}")
        }
        None => endpoint,
    }
}

fn edit_transaction_view(
    transaction: &Transaction,
    redirect_url: Option<&str>,
    profile: &Profile,
    alerts: &[Alert],
) -> Markup {
    let nav_bar = NavBar::new(endpoints::EDIT_TRANSACTION_VIEW).into_html();
    let defaults = TransactionFormDefaults::from_transaction(transaction);

    let content = html! {
        (nav_bar)

        div class=(FORM_CONTAINER_STYLE)
        {
            form
                hx-put=(edit_transaction_endpoint_url(transaction.id, redirect_url))
                hx-target-error="#alert-container"
                hx-disabled-elt="#submit-button"
                class="w-full space-y-4 md:space-y-6"
            {
                h2 class="text-xl font-bold" { "Edit Transaction" }

                (transaction_form_fields(&defaults))

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
        "Edit Transaction",
        &[currency_input_styles(profile.currency)],
        &content,
        alerts,
    )
}

/// Renders the page for editing a transaction.
///
/// Responds with the 404 page if the transaction does not exist or belongs to
/// another user.
pub async fn get_edit_transaction_page(
    State(state): State<TransactionState>,
    Extension(user_id): Extension<UserID>,
    Path(transaction_id): Path<TransactionId>,
    Query(query): Query<RedirectQuery>,
) -> Result<Response, Error> {
    let (transaction, profile) = {
        let connection = state
            .db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;

        let transaction = get_transaction(transaction_id, user_id, &connection).inspect_err(
            |error| {
                if *error != Error::NotFound {
                    tracing::error!("could not get transaction {transaction_id}: {error}");
                }
            },
        )?;
        let profile = get_profile(user_id, &connection)?;

        (transaction, profile)
    };
    let alerts = state
        .notifications
        .drain_visible(user_id, profile.notifications);

    Ok(edit_transaction_view(
        &transaction,
        query.redirect_url.as_deref(),
        &profile,
        &alerts,
    )
    .into_response())
}
