//! The form fields shared by the create and edit transaction pages.

use maud::{Markup, html};
use serde::Deserialize;
use time::Date;

use crate::{
    Error,
    html::{
        FORM_LABEL_STYLE, FORM_RADIO_GROUP_STYLE, FORM_RADIO_INPUT_STYLE, FORM_RADIO_LABEL_STYLE,
        FORM_TEXT_INPUT_STYLE,
    },
    timezone::iso_date,
    transaction::core::{Category, NewTransaction, Transaction, TransactionType},
};

/// The values the form fields start with.
pub struct TransactionFormDefaults<'a> {
    pub transaction_type: TransactionType,
    pub amount: Option<f64>,
    pub category: Category,
    pub date: Date,
    pub description: Option<&'a str>,
    pub autofocus_amount: bool,
}

impl<'a> TransactionFormDefaults<'a> {
    /// Defaults for a new expense dated `today`.
    pub fn new_transaction(today: Date) -> Self {
        Self {
            transaction_type: TransactionType::default(),
            amount: None,
            category: Category::default(),
            date: today,
            description: None,
            autofocus_amount: true,
        }
    }

    /// Prefill the fields with an existing transaction.
    pub fn from_transaction(transaction: &'a Transaction) -> Self {
        Self {
            transaction_type: transaction.transaction_type,
            amount: Some(transaction.amount),
            category: transaction.category,
            date: transaction.date,
            description: Some(&transaction.description),
            autofocus_amount: false,
        }
    }
}

pub fn transaction_form_fields(defaults: &TransactionFormDefaults<'_>) -> Markup {
    let amount_str = defaults.amount.map(|amount| format!("{amount:.2}"));

    html! {
        fieldset class="space-y-2"
        {
            legend class=(FORM_LABEL_STYLE) { "Transaction type" }

            div class=(FORM_RADIO_GROUP_STYLE)
            {
                @for transaction_type in TransactionType::ALL {
                    @let id = format!("transaction-type-{}", transaction_type.as_str());

                    div class="flex items-center gap-3"
                    {
                        input
                            name="type"
                            id=(id)
                            type="radio"
                            value=(transaction_type.as_str())
                            checked[transaction_type == defaults.transaction_type]
                            required
                            tabindex="0"
                            class=(FORM_RADIO_INPUT_STYLE);

                        label for=(id) class=(FORM_RADIO_LABEL_STYLE)
                        {
                            (transaction_type.label())
                        }
                    }
                }
            }
        }

        div
        {
            label for="amount" class=(FORM_LABEL_STYLE) { "Amount" }

            // w-full needed to ensure input takes the full width when prefilled with a value
            div class="input-wrapper w-full"
            {
                input
                    name="amount"
                    id="amount"
                    type="number"
                    step="0.01"
                    min="0.01"
                    placeholder="0.00"
                    required
                    value=[amount_str.as_deref()]
                    autofocus[defaults.autofocus_amount]
                    class=(FORM_TEXT_INPUT_STYLE);
            }
        }

        div
        {
            label for="category" class=(FORM_LABEL_STYLE) { "Category" }

            select name="category" id="category" class=(FORM_TEXT_INPUT_STYLE)
            {
                @for category in Category::ALL {
                    option
                        value=(category.as_str())
                        selected[category == defaults.category]
                    {
                        (category.label())
                    }
                }
            }
        }

        div
        {
            label for="date" class=(FORM_LABEL_STYLE) { "Date" }

            input
                name="date"
                id="date"
                type="date"
                value=(defaults.date)
                required
                class=(FORM_TEXT_INPUT_STYLE);
        }

        div
        {
            label for="description" class=(FORM_LABEL_STYLE) { "Description" }

            input
                name="description"
                id="description"
                type="text"
                placeholder="e.g. Monthly salary"
                value=[defaults.description]
                class=(FORM_TEXT_INPUT_STYLE);
        }
    }
}

/// The raw form data for creating or editing a transaction.
///
/// Labels are kept as strings so that unknown values produce an alert instead
/// of a bare rejection.
#[derive(Debug, Deserialize)]
pub struct TransactionForm {
    pub amount: f64,
    #[serde(rename = "type", default)]
    pub transaction_type: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(with = "iso_date")]
    pub date: Date,
}

impl TransactionForm {
    /// Validate the form data. Missing type and category labels use the defaults.
    ///
    /// # Errors
    ///
    /// Returns [Error::InvalidLabel] for an unknown type or category, or
    /// [Error::InvalidAmount] for a negative or non-finite amount.
    pub fn validate(&self) -> Result<NewTransaction, Error> {
        let transaction_type = match self.transaction_type.as_deref() {
            None | Some("") => TransactionType::default(),
            Some(raw) => raw.parse()?,
        };
        let category = match self.category.as_deref() {
            None | Some("") => Category::default(),
            Some(raw) => raw.parse()?,
        };

        NewTransaction::new(
            self.amount,
            transaction_type,
            category,
            &self.description,
            self.date,
        )
    }
}
