//! The transactions table used by the transactions, dashboard and cash flow pages.

use maud::{Markup, html};

use crate::{
    endpoints::{self, format_endpoint},
    html::{
        BADGE_STYLE, DESCRIPTION_DISPLAY_LIMIT, EXPENSE_TEXT_STYLE, INCOME_TEXT_STYLE,
        TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE, edit_delete_action_links,
        format_currency, truncate_description,
    },
    profile::Currency,
    transaction::core::{Transaction, TransactionType},
};

/// Whether rows get edit and delete actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowActions {
    Show,
    Hide,
}

fn amount_class(transaction_type: TransactionType) -> &'static str {
    match transaction_type {
        TransactionType::Income => INCOME_TEXT_STYLE,
        TransactionType::Expense => EXPENSE_TEXT_STYLE,
    }
}

/// Expenses are shown with a minus sign so the direction is clear without colour.
fn signed_amount(transaction: &Transaction) -> f64 {
    match transaction.transaction_type {
        TransactionType::Income => transaction.amount,
        TransactionType::Expense => -transaction.amount,
    }
}

fn transaction_row_view(
    transaction: &Transaction,
    currency: Currency,
    actions: RowActions,
) -> Markup {
    let description = truncate_description(&transaction.description, DESCRIPTION_DISPLAY_LIMIT);
    let tooltip = (description != transaction.description).then_some(&transaction.description);
    let confirm_message = format!(
        "Are you sure you want to delete the transaction '{}'? This cannot be undone.",
        transaction.description
    );

    html! {
        tr class=(TABLE_ROW_STYLE) data-transaction-row="true"
        {
            td class=(TABLE_CELL_STYLE)
            {
                time datetime=(transaction.date) { (transaction.date) }
            }
            td class=(TABLE_CELL_STYLE) title=[tooltip] { (description) }
            td class=(TABLE_CELL_STYLE)
            {
                span class=(BADGE_STYLE) { (transaction.category.label()) }
            }
            td class={ "px-6 py-4 text-right tabular-nums " (amount_class(transaction.transaction_type)) }
            {
                (format_currency(signed_amount(transaction), currency))
            }
            @if actions == RowActions::Show {
                td class=(TABLE_CELL_STYLE)
                {
                    div class="flex gap-4"
                    {
                        (edit_delete_action_links(
                            &format_endpoint(endpoints::EDIT_TRANSACTION_VIEW, transaction.id),
                            &format_endpoint(endpoints::TRANSACTION, transaction.id),
                            &confirm_message,
                            "closest tr",
                            "delete",
                        ))
                    }
                }
            }
        }
    }
}

/// Render `transactions` in the given order, or `empty_message` if there are none.
pub fn transactions_table(
    transactions: &[Transaction],
    currency: Currency,
    actions: RowActions,
    empty_message: &str,
) -> Markup {
    let column_count = if actions == RowActions::Show { 5 } else { 4 };

    html! {
        div class="w-full overflow-x-auto rounded shadow-md"
        {
            table class="w-full text-sm text-left rtl:text-right text-gray-500 dark:text-gray-400"
            {
                thead class=(TABLE_HEADER_STYLE)
                {
                    tr
                    {
                        th scope="col" class=(TABLE_CELL_STYLE) { "Date" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Description" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Category" }
                        th scope="col" class="px-6 py-3 text-right" { "Amount" }
                        @if actions == RowActions::Show {
                            th scope="col" class=(TABLE_CELL_STYLE) { "Actions" }
                        }
                    }
                }

                tbody
                {
                    @for transaction in transactions {
                        (transaction_row_view(transaction, currency, actions))
                    }

                    @if transactions.is_empty() {
                        tr class=(TABLE_ROW_STYLE)
                        {
                            td
                                colspan=(column_count)
                                data-empty-state="true"
                                class="px-6 py-4 text-center"
                            {
                                (empty_message)
                            }
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use scraper::{Html, Selector};
    use time::{OffsetDateTime, macros::date};

    use crate::{
        auth::UserID,
        profile::Currency,
        transaction::core::{Category, Transaction, TransactionType},
    };

    use super::{RowActions, transactions_table};

    fn expense() -> Transaction {
        Transaction {
            id: 7,
            user_id: UserID::new(1),
            amount: 300.0,
            transaction_type: TransactionType::Expense,
            category: Category::Food,
            description: "Groceries".to_owned(),
            date: date!(2024 - 01 - 10),
            created_at: OffsetDateTime::UNIX_EPOCH,
        }
    }

    fn render(transactions: &[Transaction], actions: RowActions) -> Html {
        let markup = transactions_table(transactions, Currency::Brl, actions, "Nothing here");
        Html::parse_fragment(&markup.into_string())
    }

    #[test]
    fn rows_link_to_edit_and_delete() {
        let html = render(&[expense()], RowActions::Show);

        let edit = html
            .select(&Selector::parse("tr[data-transaction-row] a").unwrap())
            .next()
            .expect("edit link missing");
        assert_eq!(edit.value().attr("href"), Some("/transactions/7/edit"));

        let delete = html
            .select(&Selector::parse("tr[data-transaction-row] button").unwrap())
            .next()
            .expect("delete button missing");
        assert_eq!(delete.value().attr("hx-delete"), Some("/api/transactions/7"));
    }

    #[test]
    fn expenses_are_shown_as_negative() {
        let html = render(&[expense()], RowActions::Hide);

        let text = html.root_element().text().collect::<String>();
        assert!(text.contains("-R$300.00"), "got {text}");
        assert!(
            html.select(&Selector::parse("button").unwrap())
                .next()
                .is_none()
        );
    }

    #[test]
    fn shows_empty_message() {
        let html = render(&[], RowActions::Show);

        let cell = html
            .select(&Selector::parse("td[data-empty-state]").unwrap())
            .next()
            .expect("empty state missing");
        assert_eq!(cell.text().collect::<String>(), "Nothing here");
        assert_eq!(cell.value().attr("colspan"), Some("5"));
    }
}
