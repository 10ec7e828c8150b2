//! Summary cards and insights shown at the top of the dashboard.

use maud::{Markup, html};

use crate::{
    aggregation::{CategoryTotal, Totals, savings_rate},
    html::{
        CARD_STYLE, EXPENSE_TEXT_STYLE, INCOME_TEXT_STYLE, format_currency, format_percent,
        summary_card,
    },
    profile::Currency,
};

/// Colour a signed figure green when it is zero or more, red otherwise.
pub(super) fn signed_class(value: f64) -> &'static str {
    if value >= 0.0 {
        INCOME_TEXT_STYLE
    } else {
        EXPENSE_TEXT_STYLE
    }
}

pub(super) fn summary_cards_view(totals: &Totals, currency: Currency) -> Markup {
    let balance = totals.balance();
    let savings_rate = savings_rate(totals);

    html! {
        section class="grid w-full grid-cols-1 gap-4 md:grid-cols-2 xl:grid-cols-4"
        {
            (summary_card("Total Income", &format_currency(totals.income, currency), INCOME_TEXT_STYLE, None))
            (summary_card("Total Expenses", &format_currency(totals.expense, currency), EXPENSE_TEXT_STYLE, None))
            (summary_card("Balance", &format_currency(balance, currency), signed_class(balance), None))
            (summary_card(
                "Savings Rate",
                &format_percent(savings_rate),
                signed_class(savings_rate),
                Some("Share of income left after expenses"),
            ))
        }
    }
}

pub(super) fn insights_view(
    top_categories: &[CategoryTotal],
    daily_average: f64,
    currency: Currency,
) -> Markup {
    html! {
        section class="grid w-full grid-cols-1 gap-4 md:grid-cols-2"
        {
            div class=(CARD_STYLE)
            {
                h3 class="text-sm font-medium text-gray-500 dark:text-gray-400" { "Top Categories" }

                @if top_categories.is_empty() {
                    p class="mt-2 text-sm" { "No transactions to rank." }
                } @else {
                    ol class="mt-2 space-y-2" data-top-categories="true"
                    {
                        @for category_total in top_categories {
                            li class="flex justify-between"
                            {
                                span { (category_total.category.label()) }
                                span class="tabular-nums"
                                {
                                    (format_currency(category_total.amount, currency))
                                }
                            }
                        }
                    }
                }
            }

            (summary_card(
                "Daily Average",
                &format_currency(daily_average, currency),
                "",
                Some("Total amount per day with transactions"),
            ))
        }
    }
}
