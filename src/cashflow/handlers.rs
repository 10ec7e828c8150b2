//! Route handlers for the cash flow page, its partial updates and CSV export.

use axum::{
    Extension,
    extract::{Query, State},
    response::{IntoResponse, Response},
};
use axum_extra::extract::Form;
use maud::{Markup, html};
use rusqlite::Connection;
use serde::Deserialize;

use crate::{
    Error,
    aggregation::{Granularity, Totals, bucket_by, category_breakdown, percentage_change, totals},
    alert::Alert,
    auth::UserID,
    cashflow::{
        CashflowState,
        period::{MonthPeriod, month_name},
    },
    chart::{PageChart, category_pie_chart, charts_view, daily_cashflow_chart, echarts_script},
    endpoints,
    export::{CSV_CONTENT_TYPE, attachment_response, transactions_csv},
    html::{
        EXPENSE_TEXT_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, INCOME_TEXT_STYLE,
        LINK_STYLE, PAGE_CONTAINER_STYLE, base_with_alerts, format_currency, format_percent,
        summary_card,
    },
    navigation::NavBar,
    profile::{Currency, get_profile},
    sequence::{SEQUENCE_HX_VALS, SequencedView, stale_response},
    timezone::local_today,
    transaction::{
        RowActions, SortOrder, Transaction, TransactionQuery, TransactionType,
        query_transactions, transactions_table,
    },
};

/// How many years before the current one can be selected.
const PREVIOUS_YEARS_SHOWN: i32 = 4;

/// The month selected on the cash flow page. Missing values default to the
/// current year and month.
#[derive(Debug, Default, Deserialize)]
pub struct CashflowQuery {
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub month: Option<u8>,
    /// The client's sequence number for this request.
    #[serde(default)]
    pub seq: Option<u64>,
}

impl CashflowQuery {
    fn to_period(&self, local_timezone: &str) -> Result<MonthPeriod, Error> {
        let current = MonthPeriod::containing(local_today(local_timezone)?);

        MonthPeriod::new(
            self.year.unwrap_or(current.year()),
            self.month.unwrap_or(current.month_number()),
        )
    }
}

/// The transactions of a month and the totals of the month before it.
struct MonthData {
    period: MonthPeriod,
    transactions: Vec<Transaction>,
    previous_totals: Totals,
}

fn get_month_data(
    user_id: UserID,
    period: MonthPeriod,
    connection: &Connection,
) -> Result<MonthData, Error> {
    let query = |period: MonthPeriod| -> Result<Vec<Transaction>, Error> {
        query_transactions(
            user_id,
            &TransactionQuery {
                date_range: Some(period.date_range()?),
                sort_order: SortOrder::Ascending,
                ..Default::default()
            },
            connection,
        )
        .inspect_err(|error| {
            tracing::error!("could not get cash flow transactions for user {user_id}: {error}")
        })
    };

    let transactions = query(period)?;
    let previous_totals = totals(&query(period.previous())?);

    Ok(MonthData {
        period,
        transactions,
        previous_totals,
    })
}

fn change_footnote(current: f64, previous: f64) -> String {
    match percentage_change(current, previous) {
        Some(change) if change > 0.0 => format!("+{} vs previous month", format_percent(change)),
        Some(change) => format!("{} vs previous month", format_percent(change)),
        None => "No data for the previous month".to_owned(),
    }
}

fn export_url(period: MonthPeriod) -> String {
    format!(
        "{}?year={}&month={}",
        endpoints::CASHFLOW_EXPORT,
        period.year(),
        period.month_number()
    )
}

fn cashflow_content(data: &MonthData, currency: Currency) -> Markup {
    let current = totals(&data.transactions);
    let previous = data.previous_totals;
    let daily = bucket_by(&data.transactions, Granularity::Day);
    let charts = [
        PageChart {
            id: "daily-cashflow-chart",
            options: daily_cashflow_chart(&daily, data.period.days(), currency).to_string(),
        },
        PageChart {
            id: "income-category-chart",
            options: category_pie_chart(
                "Income by Category",
                &category_breakdown(&data.transactions, Some(TransactionType::Income)),
                currency,
            )
            .to_string(),
        },
        PageChart {
            id: "expense-category-chart",
            options: category_pie_chart(
                "Expenses by Category",
                &category_breakdown(&data.transactions, Some(TransactionType::Expense)),
                currency,
            )
            .to_string(),
        },
    ];
    let balance_class = if current.balance() >= 0.0 {
        INCOME_TEXT_STYLE
    } else {
        EXPENSE_TEXT_STYLE
    };

    html! {
        div class="flex justify-between items-baseline w-full"
        {
            h2 class="text-lg font-semibold"
            {
                (month_name(data.period.month_number())) " " (data.period.year())
            }

            a href=(export_url(data.period)) class=(LINK_STYLE) download { "Export CSV" }
        }

        section class="grid w-full grid-cols-1 gap-4 md:grid-cols-3"
        {
            (summary_card(
                "Income",
                &format_currency(current.income, currency),
                INCOME_TEXT_STYLE,
                Some(&change_footnote(current.income, previous.income)),
            ))
            (summary_card(
                "Expenses",
                &format_currency(current.expense, currency),
                EXPENSE_TEXT_STYLE,
                Some(&change_footnote(current.expense, previous.expense)),
            ))
            (summary_card(
                "Balance",
                &format_currency(current.balance(), currency),
                balance_class,
                Some(&change_footnote(current.balance(), previous.balance())),
            ))
        }

        (charts_view(&charts))

        section class="w-full"
        {
            (transactions_table(
                &data.transactions,
                currency,
                RowActions::Hide,
                "No transactions in this month.",
            ))
        }
    }
}

fn period_selectors(period: MonthPeriod, current_year: i32) -> Markup {
    let mut years: Vec<i32> = (current_year - PREVIOUS_YEARS_SHOWN..=current_year).rev().collect();
    if !years.contains(&period.year()) {
        years.push(period.year());
        years.sort_unstable_by(|a, b| b.cmp(a));
    }

    html! {
        form
            hx-post=(endpoints::CASHFLOW_API)
            hx-trigger="change"
            hx-target="#cashflow-content"
            hx-target-error="#alert-container"
            hx-swap="innerHTML"
            hx-sync="this:replace"
            hx-vals=(SEQUENCE_HX_VALS)
            class="flex gap-4"
        {
            div
            {
                label for="year" class=(FORM_LABEL_STYLE) { "Year" }

                select name="year" id="year" class=(FORM_TEXT_INPUT_STYLE)
                {
                    @for year in years {
                        option value=(year) selected[year == period.year()] { (year) }
                    }
                }
            }

            div
            {
                label for="month" class=(FORM_LABEL_STYLE) { "Month" }

                select name="month" id="month" class=(FORM_TEXT_INPUT_STYLE)
                {
                    @for month in 1..=12u8 {
                        option value=(month) selected[month == period.month_number()]
                        {
                            (month_name(month))
                        }
                    }
                }
            }
        }
    }
}

fn cashflow_view(data: &MonthData, current_year: i32, currency: Currency, alerts: &[Alert]) -> Markup {
    let nav_bar = NavBar::new(endpoints::CASHFLOW_VIEW).into_html();

    let content = html! {
        (nav_bar)

        div class={ (PAGE_CONTAINER_STYLE) " max-w-screen-xl gap-6" }
        {
            div class="flex justify-between flex-wrap items-end gap-4 w-full"
            {
                h1 class="text-xl font-bold" { "Cash Flow" }

                (period_selectors(data.period, current_year))
            }

            div id="cashflow-content" class="flex flex-col w-full gap-6"
            {
                (cashflow_content(data, currency))
            }
        }
    };

    base_with_alerts("Cash Flow", &[echarts_script()], &content, alerts)
}

/// Renders the cash flow of the month in the query, or the current month.
pub async fn get_cashflow_page(
    State(state): State<CashflowState>,
    Extension(user_id): Extension<UserID>,
    Query(query): Query<CashflowQuery>,
) -> Result<Response, Error> {
    let current_year = local_today(&state.local_timezone)?.year();
    let period = query.to_period(&state.local_timezone)?;

    let (data, profile) = {
        let connection = state
            .db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;

        (
            get_month_data(user_id, period, &connection)?,
            get_profile(user_id, &connection)?,
        )
    };
    let alerts = state
        .notifications
        .drain_visible(user_id, profile.notifications);

    Ok(cashflow_view(&data, current_year, profile.currency, &alerts).into_response())
}

/// Renders the cash flow content for the selected month.
pub async fn update_cashflow_endpoint(
    State(state): State<CashflowState>,
    Extension(user_id): Extension<UserID>,
    Form(form): Form<CashflowQuery>,
) -> Response {
    if let Some(seq) = form.seq
        && !state.sequences.admit(user_id, SequencedView::Cashflow, seq)
    {
        return stale_response();
    }

    let period = match form.to_period(&state.local_timezone) {
        Ok(period) => period,
        Err(error) => return error.into_alert_response(),
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

    let result = get_month_data(user_id, period, &connection)
        .and_then(|data| get_profile(user_id, &connection).map(|profile| (data, profile)));

    let response = match result {
        Ok((data, profile)) => cashflow_content(&data, profile.currency).into_response(),
        Err(error) => error.into_alert_response(),
    };

    state
        .sequences
        .respond_if_latest(user_id, SequencedView::Cashflow, form.seq, response)
}

/// Downloads the month's transactions as CSV, oldest first.
pub async fn export_cashflow_csv(
    State(state): State<CashflowState>,
    Extension(user_id): Extension<UserID>,
    Query(query): Query<CashflowQuery>,
) -> Result<Response, Error> {
    let period = query.to_period(&state.local_timezone)?;

    let data = {
        let connection = state
            .db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;

        get_month_data(user_id, period, &connection)?
    };

    let csv = transactions_csv(&data.transactions)
        .inspect_err(|error| tracing::error!("could not write cash flow CSV: {error}"))?;
    let filename = format!(
        "fluxo-de-caixa-{}-{}.csv",
        period.year(),
        period.month_number()
    );

    Ok(attachment_response(CSV_CONTENT_TYPE, &filename, csv))
}
