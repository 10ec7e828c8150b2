//! Route handlers for the analysis page, report updates and report export.

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
    aggregation::{Bucket, expense_ratio, savings_rate, top_n, totals},
    alert::Alert,
    analysis::{
        AnalysisState,
        report::{REPORT_TOP_CATEGORIES, ReportPeriod, period_label, report_buckets},
    },
    auth::UserID,
    cashflow::MonthPeriod,
    endpoints,
    export::{CSV_CONTENT_TYPE, attachment_response, report_csv},
    html::{
        BADGE_STYLE, EXPENSE_TEXT_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE,
        INCOME_TEXT_STYLE, LINK_STYLE, PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE,
        TABLE_HEADER_STYLE, TABLE_ROW_STYLE, base_with_alerts, format_currency, format_percent,
        summary_card,
    },
    navigation::NavBar,
    profile::{Currency, get_profile},
    sequence::{SEQUENCE_HX_VALS, SequencedView, stale_response},
    timezone::local_today,
    transaction::{Transaction, TransactionQuery, query_transactions},
};

#[derive(Debug, Default, Deserialize)]
pub struct ReportQuery {
    #[serde(default)]
    pub period: Option<ReportPeriod>,
    #[serde(default)]
    pub seq: Option<u64>,
}

fn get_transactions(
    user_id: UserID,
    query: &TransactionQuery,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    query_transactions(user_id, query, connection).inspect_err(|error| {
        tracing::error!("could not get transactions for the analysis of user {user_id}: {error}")
    })
}

fn report_table(buckets: &[Bucket], currency: Currency) -> Markup {
    html! {
        div class="w-full overflow-x-auto rounded shadow-md"
        {
            table class="w-full text-sm text-left rtl:text-right text-gray-500 dark:text-gray-400"
            {
                thead class=(TABLE_HEADER_STYLE)
                {
                    tr
                    {
                        th scope="col" class=(TABLE_CELL_STYLE) { "Period" }
                        th scope="col" class="px-6 py-3 text-right" { "Income" }
                        th scope="col" class="px-6 py-3 text-right" { "Expenses" }
                        th scope="col" class="px-6 py-3 text-right" { "Balance" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Top Categories" }
                    }
                }

                tbody
                {
                    @for bucket in buckets {
                        @let balance = bucket.totals.balance();
                        @let balance_class = if balance >= 0.0 { INCOME_TEXT_STYLE } else { EXPENSE_TEXT_STYLE };

                        tr class=(TABLE_ROW_STYLE) data-report-row=(bucket.key.to_string())
                        {
                            th scope="row" class=(TABLE_CELL_STYLE) { (period_label(bucket.key)) }
                            td class={ "px-6 py-4 text-right tabular-nums " (INCOME_TEXT_STYLE) }
                            {
                                (format_currency(bucket.totals.income, currency))
                            }
                            td class={ "px-6 py-4 text-right tabular-nums " (EXPENSE_TEXT_STYLE) }
                            {
                                (format_currency(bucket.totals.expense, currency))
                            }
                            td class={ "px-6 py-4 text-right tabular-nums " (balance_class) }
                            {
                                (format_currency(balance, currency))
                            }
                            td class=(TABLE_CELL_STYLE)
                            {
                                div class="flex flex-wrap gap-1"
                                {
                                    @for category in top_n(&bucket.categories, REPORT_TOP_CATEGORIES) {
                                        span class=(BADGE_STYLE) data-top-category=(category.category.as_str())
                                        {
                                            (category.category.label())
                                        }
                                    }
                                }
                            }
                        }
                    }

                    @if buckets.is_empty() {
                        tr class=(TABLE_ROW_STYLE)
                        {
                            td colspan="5" data-empty-state="true" class="px-6 py-4 text-center"
                            {
                                "No transactions to report yet."
                            }
                        }
                    }
                }
            }
        }
    }
}

fn report_content(buckets: &[Bucket], period: ReportPeriod, currency: Currency) -> Markup {
    let export_url = format!("{}?period={}", endpoints::ANALYSIS_EXPORT, period.as_str());

    html! {
        div class="flex justify-end w-full"
        {
            a href=(export_url) class=(LINK_STYLE) download { "Export CSV" }
        }

        (report_table(buckets, currency))
    }
}

fn period_selector(selected: ReportPeriod) -> Markup {
    html! {
        form
            hx-post=(endpoints::ANALYSIS_REPORT_API)
            hx-trigger="change"
            hx-target="#analysis-report"
            hx-target-error="#alert-container"
            hx-swap="innerHTML"
            hx-sync="this:replace"
            hx-vals=(SEQUENCE_HX_VALS)
        {
            label for="period" class=(FORM_LABEL_STYLE) { "Group by" }

            select name="period" id="period" class=(FORM_TEXT_INPUT_STYLE)
            {
                @for period in ReportPeriod::ALL {
                    option value=(period.as_str()) selected[period == selected]
                    {
                        (period.label())
                    }
                }
            }
        }
    }
}

struct AnalysisData {
    month_transactions: Vec<Transaction>,
    buckets: Vec<Bucket>,
    period: ReportPeriod,
}

fn analysis_view(data: &AnalysisData, currency: Currency, alerts: &[Alert]) -> Markup {
    let nav_bar = NavBar::new(endpoints::ANALYSIS_VIEW).into_html();
    let month_totals = totals(&data.month_transactions);

    let content = html! {
        (nav_bar)

        div class={ (PAGE_CONTAINER_STYLE) " max-w-screen-xl gap-6" }
        {
            h1 class="text-xl font-bold w-full" { "Analysis" }

            section class="grid w-full grid-cols-1 gap-4 md:grid-cols-2"
            {
                (summary_card(
                    "Savings Rate",
                    &format_percent(savings_rate(&month_totals)),
                    INCOME_TEXT_STYLE,
                    Some("Share of this month's income that was kept"),
                ))
                (summary_card(
                    "Expense Ratio",
                    &format_percent(expense_ratio(&month_totals)),
                    EXPENSE_TEXT_STYLE,
                    Some("Share of this month's income that was spent"),
                ))
            }

            section class="flex flex-col w-full gap-4"
            {
                div class="flex justify-between items-end w-full"
                {
                    h2 class="text-lg font-semibold" { "Financial Report" }

                    (period_selector(data.period))
                }

                div id="analysis-report" class="flex flex-col w-full gap-2"
                {
                    (report_content(&data.buckets, data.period, currency))
                }
            }
        }
    };

    base_with_alerts("Analysis", &[], &content, alerts)
}

/// Renders the savings indicators and the monthly report.
pub async fn get_analysis_page(
    State(state): State<AnalysisState>,
    Extension(user_id): Extension<UserID>,
    Query(query): Query<ReportQuery>,
) -> Result<Response, Error> {
    let this_month = MonthPeriod::containing(local_today(&state.local_timezone)?);
    let period = query.period.unwrap_or_default();

    let (data, profile) = {
        let connection = state
            .db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;

        let month_transactions = get_transactions(
            user_id,
            &TransactionQuery {
                date_range: Some(this_month.date_range()?),
                ..Default::default()
            },
            &connection,
        )?;
        let all_transactions = get_transactions(user_id, &TransactionQuery::default(), &connection)?;
        let data = AnalysisData {
            month_transactions,
            buckets: report_buckets(&all_transactions, period),
            period,
        };

        (data, get_profile(user_id, &connection)?)
    };
    let alerts = state
        .notifications
        .drain_visible(user_id, profile.notifications);

    Ok(analysis_view(&data, profile.currency, &alerts).into_response())
}

/// Renders the report for the selected period length.
pub async fn update_report_endpoint(
    State(state): State<AnalysisState>,
    Extension(user_id): Extension<UserID>,
    Form(form): Form<ReportQuery>,
) -> Response {
    if let Some(seq) = form.seq
        && !state
            .sequences
            .admit(user_id, SequencedView::AnalysisReport, seq)
    {
        return stale_response();
    }

    let period = form.period.unwrap_or_default();

    let connection = match state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)
    {
        Ok(connection) => connection,
        Err(error) => return error.into_alert_response(),
    };

    let result = get_transactions(user_id, &TransactionQuery::default(), &connection)
        .and_then(|transactions| {
            get_profile(user_id, &connection).map(|profile| (transactions, profile))
        });

    let response = match result {
        Ok((transactions, profile)) => {
            report_content(&report_buckets(&transactions, period), period, profile.currency)
                .into_response()
        }
        Err(error) => error.into_alert_response(),
    };

    state
        .sequences
        .respond_if_latest(user_id, SequencedView::AnalysisReport, form.seq, response)
}

/// Downloads the report for the requested period length as CSV, newest period first.
pub async fn export_report_csv(
    State(state): State<AnalysisState>,
    Extension(user_id): Extension<UserID>,
    Query(query): Query<ReportQuery>,
) -> Result<Response, Error> {
    let today = local_today(&state.local_timezone)?;
    let period = query.period.unwrap_or_default();

    let transactions = {
        let connection = state
            .db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;

        get_transactions(user_id, &TransactionQuery::default(), &connection)?
    };

    let csv = report_csv(&report_buckets(&transactions, period))
        .inspect_err(|error| tracing::error!("could not write report CSV: {error}"))?;

    Ok(attachment_response(
        CSV_CONTENT_TYPE,
        &format!("relatorio-financeiro-{today}.csv"),
        csv,
    ))
}
