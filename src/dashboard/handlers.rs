//! Dashboard HTTP handlers and view rendering.

use axum::{
    Extension,
    extract::State,
    response::{IntoResponse, Response},
};
use axum_extra::extract::Form;
use maud::{Markup, html};
use rusqlite::Connection;
use serde::Deserialize;

use crate::{
    Error,
    aggregation::{category_breakdown, daily_average, top_n, totals},
    alert::Alert,
    auth::UserID,
    dashboard::{
        DashboardState,
        cards::{insights_view, summary_cards_view},
    },
    endpoints,
    html::{PAGE_CONTAINER_STYLE, base_with_alerts, link},
    navigation::NavBar,
    profile::{Currency, get_profile},
    sequence::{SEQUENCE_HX_VALS, SequencedView, stale_response},
    transaction::{
        Category, RowActions, Transaction, TransactionQuery, TransactionType,
        category_filter_select, query_transactions, transactions_table, type_filter_select,
    },
};

/// How many of the most recent transactions are listed.
const RECENT_TRANSACTION_COUNT: usize = 10;
/// How many categories are listed in the insights.
const TOP_CATEGORY_COUNT: usize = 3;

/// The filters sent by the dashboard.
#[derive(Debug, Default, Deserialize)]
pub struct DashboardFilterForm {
    #[serde(rename = "type", default)]
    pub transaction_type: Option<TransactionType>,
    #[serde(default)]
    pub category: Option<Category>,
    /// The client's sequence number for this request.
    #[serde(default)]
    pub seq: Option<u64>,
}

impl DashboardFilterForm {
    fn matches(&self, transaction: &Transaction) -> bool {
        self.transaction_type
            .is_none_or(|transaction_type| transaction.transaction_type == transaction_type)
            && self
                .category
                .is_none_or(|category| transaction.category == category)
    }
}

/// All of the user's transactions, newest first.
fn get_all_transactions(
    user_id: UserID,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    query_transactions(user_id, &TransactionQuery::default(), connection).inspect_err(|error| {
        tracing::error!("could not get transactions for user {user_id}: {error}")
    })
}

/// The cards, insights and recent transactions of the dashboard.
///
/// The cards always cover every transaction in `all`. The filters only narrow
/// the insights and the recent transactions. `all` must be sorted newest first.
fn dashboard_content(
    all: &[Transaction],
    filter: &DashboardFilterForm,
    currency: Currency,
) -> Markup {
    let totals = totals(all);
    let filtered: Vec<Transaction> = all
        .iter()
        .filter(|transaction| filter.matches(transaction))
        .cloned()
        .collect();
    let breakdown = category_breakdown(&filtered, None);
    let recent = &filtered[..filtered.len().min(RECENT_TRANSACTION_COUNT)];

    html! {
        (summary_cards_view(&totals, currency))

        (insights_view(top_n(&breakdown, TOP_CATEGORY_COUNT), daily_average(&filtered), currency))

        section class="w-full space-y-2"
        {
            h2 class="text-lg font-semibold" { "Recent Transactions" }

            (transactions_table(
                recent,
                currency,
                RowActions::Show,
                "No transactions match these filters.",
            ))
        }
    }
}

fn empty_dashboard_view(alerts: &[Alert]) -> Markup {
    let nav_bar = NavBar::new(endpoints::DASHBOARD_VIEW).into_html();
    let new_transaction_link = link(endpoints::NEW_TRANSACTION_VIEW, "adding a transaction");

    let content = html!(
        (nav_bar)

        div class=(PAGE_CONTAINER_STYLE) data-empty-state="true"
        {
            h2 class="text-xl font-bold" { "Nothing here yet..." }

            p
            {
                "Your income, expenses and insights will show up here once you
                have some transactions. Get started by " (new_transaction_link) "."
            }
        }
    );

    base_with_alerts("Dashboard", &[], &content, alerts)
}

fn dashboard_view(transactions: &[Transaction], currency: Currency, alerts: &[Alert]) -> Markup {
    let nav_bar = NavBar::new(endpoints::DASHBOARD_VIEW).into_html();

    let content = html!(
        (nav_bar)

        div class={ (PAGE_CONTAINER_STYLE) " max-w-screen-xl gap-6" }
        {
            div class="flex justify-between flex-wrap items-end gap-4 w-full"
            {
                h1 class="text-xl font-bold" { "Dashboard" }

                form
                    hx-post=(endpoints::DASHBOARD_FILTER)
                    hx-trigger="change"
                    hx-target="#dashboard-content"
                    hx-target-error="#alert-container"
                    hx-swap="innerHTML"
                    hx-sync="this:replace"
                    hx-vals=(SEQUENCE_HX_VALS)
                    class="flex gap-4"
                {
                    (type_filter_select(None))
                    (category_filter_select(None))
                }
            }

            div id="dashboard-content" class="flex flex-col w-full gap-6"
            {
                (dashboard_content(transactions, &DashboardFilterForm::default(), currency))
            }
        }
    );

    base_with_alerts("Dashboard", &[], &content, alerts)
}

/// Renders the dashboard with totals, insights and the latest transactions
/// across all of the user's transactions.
pub async fn get_dashboard_page(
    State(state): State<DashboardState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let (transactions, profile) = {
        let connection = state
            .db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;

        (
            get_all_transactions(user_id, &connection)?,
            get_profile(user_id, &connection)?,
        )
    };
    let alerts = state
        .notifications
        .drain_visible(user_id, profile.notifications);

    if transactions.is_empty() {
        return Ok(empty_dashboard_view(&alerts).into_response());
    }

    Ok(dashboard_view(&transactions, profile.currency, &alerts).into_response())
}

/// Renders the dashboard content for the submitted filters.
pub async fn filter_dashboard_endpoint(
    State(state): State<DashboardState>,
    Extension(user_id): Extension<UserID>,
    Form(form): Form<DashboardFilterForm>,
) -> Response {
    if let Some(seq) = form.seq
        && !state.sequences.admit(user_id, SequencedView::Dashboard, seq)
    {
        return stale_response();
    }

    let result = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)
        .and_then(|connection| {
            let transactions = get_all_transactions(user_id, &connection)?;
            let profile = get_profile(user_id, &connection)?;
            Ok((transactions, profile))
        });

    let response = match result {
        Ok((transactions, profile)) => {
            dashboard_content(&transactions, &form, profile.currency).into_response()
        }
        Err(error) => error.into_alert_response(),
    };

    state
        .sequences
        .respond_if_latest(user_id, SequencedView::Dashboard, form.seq, response)
}
