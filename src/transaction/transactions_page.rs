//! Defines the page that lists a user's transactions and the endpoint that
//! refreshes the list when the filters change.

use axum::{
    Extension,
    extract::State,
    response::{IntoResponse, Response},
};
use axum_extra::extract::Form;
use maud::{Markup, html};
use serde::Deserialize;
use time::Date;

use crate::{
    Error,
    alert::Alert,
    auth::UserID,
    endpoints,
    html::{
        FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, LINK_STYLE, PAGE_CONTAINER_STYLE,
        base_with_alerts,
    },
    navigation::NavBar,
    profile::{Currency, get_profile},
    sequence::{SEQUENCE_HX_VALS, SequencedView, stale_response},
    timezone::iso_date,
    transaction::{
        Category, Transaction, TransactionState, TransactionType,
        filter::{category_filter_select, type_filter_select},
        query::{SortOrder, TransactionQuery, query_transactions},
        table::{RowActions, transactions_table},
    },
};

const EMPTY_MESSAGE: &str = "No transactions match these filters.";

/// The filters sent by the transactions page.
#[derive(Debug, Default, Deserialize)]
pub struct TransactionFilterForm {
    #[serde(rename = "type", default)]
    pub transaction_type: Option<TransactionType>,
    #[serde(default)]
    pub category: Option<Category>,
    #[serde(default, with = "iso_date::option")]
    pub date_from: Option<Date>,
    #[serde(default, with = "iso_date::option")]
    pub date_to: Option<Date>,
    #[serde(default)]
    pub sort: Option<SortOrder>,
    /// The client's sequence number for this request.
    #[serde(default)]
    pub seq: Option<u64>,
}

impl TransactionFilterForm {
    /// An open-ended side of the date range is unbounded.
    fn to_query(&self) -> TransactionQuery {
        let date_range = match (self.date_from, self.date_to) {
            (None, None) => None,
            (from, to) => Some(from.unwrap_or(Date::MIN)..=to.unwrap_or(Date::MAX)),
        };

        TransactionQuery {
            date_range,
            transaction_type: self.transaction_type,
            category: self.category,
            sort_order: self.sort.unwrap_or_default(),
        }
    }
}

fn filter_form_view() -> Markup {
    html! {
        form
            hx-post=(endpoints::TRANSACTIONS_FILTER)
            hx-trigger="change"
            hx-target="#transactions-table"
            hx-target-error="#alert-container"
            hx-swap="innerHTML"
            hx-sync="this:replace"
            hx-vals=(SEQUENCE_HX_VALS)
            class="grid grid-cols-2 gap-4 lg:grid-cols-5"
        {
            (type_filter_select(None))
            (category_filter_select(None))

            div
            {
                label for="date-from" class=(FORM_LABEL_STYLE) { "From" }
                input type="date" name="date_from" id="date-from" class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label for="date-to" class=(FORM_LABEL_STYLE) { "To" }
                input type="date" name="date_to" id="date-to" class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label for="sort" class=(FORM_LABEL_STYLE) { "Sort" }

                select name="sort" id="sort" class=(FORM_TEXT_INPUT_STYLE)
                {
                    option value=(SortOrder::Descending.as_str()) selected { "Newest first" }
                    option value=(SortOrder::Ascending.as_str()) { "Oldest first" }
                }
            }
        }
    }
}

fn transactions_view(transactions: &[Transaction], currency: Currency, alerts: &[Alert]) -> Markup {
    let nav_bar = NavBar::new(endpoints::TRANSACTIONS_VIEW).into_html();

    let content = html! {
        (nav_bar)

        div class=(PAGE_CONTAINER_STYLE)
        {
            div class="flex justify-between flex-wrap items-end gap-4"
            {
                h1 class="text-xl font-bold" { "Transactions" }

                a href=(endpoints::NEW_TRANSACTION_VIEW) class=(LINK_STYLE)
                {
                    "New Transaction"
                }
            }

            section class="w-full" { (filter_form_view()) }

            section id="transactions-table" class="w-full"
            {
                (transactions_table(transactions, currency, RowActions::Show, EMPTY_MESSAGE))
            }
        }
    };

    base_with_alerts("Transactions", &[], &content, alerts)
}

/// Renders every transaction of the user, newest first.
pub async fn get_transactions_page(
    State(state): State<TransactionState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let (transactions, profile) = {
        let connection = state
            .db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;

        let transactions =
            query_transactions(user_id, &TransactionQuery::default(), &connection)
                .inspect_err(|error| {
                    tracing::error!("could not get transactions for user {user_id}: {error}")
                })?;
        let profile = get_profile(user_id, &connection)?;

        (transactions, profile)
    };
    let alerts = state
        .notifications
        .drain_visible(user_id, profile.notifications);

    Ok(transactions_view(&transactions, profile.currency, &alerts).into_response())
}

/// Renders the transactions table for the submitted filters.
///
/// Requests with an out-of-date sequence number get a response that leaves
/// the page untouched.
pub async fn filter_transactions_endpoint(
    State(state): State<TransactionState>,
    Extension(user_id): Extension<UserID>,
    Form(form): Form<TransactionFilterForm>,
) -> Response {
    if let Some(seq) = form.seq
        && !state
            .sequences
            .admit(user_id, SequencedView::Transactions, seq)
    {
        return stale_response();
    }

    let connection = match state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)
    {
        Ok(connection) => connection,
        Err(error) => return error.into_alert_response(),
    };

    let result = query_transactions(user_id, &form.to_query(), &connection)
        .and_then(|transactions| {
            get_profile(user_id, &connection).map(|profile| (transactions, profile))
        });

    let response = match result {
        Ok((transactions, profile)) => transactions_table(
            &transactions,
            profile.currency,
            RowActions::Show,
            EMPTY_MESSAGE,
        )
        .into_response(),
        Err(error) => {
            tracing::error!("could not filter transactions for user {user_id}: {error}");
            error.into_alert_response()
        }
    };

    state
        .sequences
        .respond_if_latest(user_id, SequencedView::Transactions, form.seq, response)
}
