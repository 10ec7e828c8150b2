//! Select inputs for filtering transactions by type and category.

use maud::{Markup, html};

use crate::{
    html::{FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE},
    transaction::core::{Category, TransactionType},
};

/// A select for the transaction type, where the empty value means any type.
pub fn type_filter_select(selected: Option<TransactionType>) -> Markup {
    html! {
        div
        {
            label for="filter-type" class=(FORM_LABEL_STYLE) { "Type" }

            select name="type" id="filter-type" class=(FORM_TEXT_INPUT_STYLE)
            {
                option value="" selected[selected.is_none()] { "All types" }

                @for transaction_type in TransactionType::ALL {
                    option
                        value=(transaction_type.as_str())
                        selected[selected == Some(transaction_type)]
                    {
                        (transaction_type.label())
                    }
                }
            }
        }
    }
}

/// A select for the category, where the empty value means any category.
pub fn category_filter_select(selected: Option<Category>) -> Markup {
    html! {
        div
        {
            label for="filter-category" class=(FORM_LABEL_STYLE) { "Category" }

            select name="category" id="filter-category" class=(FORM_TEXT_INPUT_STYLE)
            {
                option value="" selected[selected.is_none()] { "All categories" }

                @for category in Category::ALL {
                    option value=(category.as_str()) selected[selected == Some(category)]
                    {
                        (category.label())
                    }
                }
            }
        }
    }
}
