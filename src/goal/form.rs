//! The form fields shared by the create and edit goal pages.

use maud::{Markup, html};
use serde::Deserialize;
use time::Date;

use crate::{
    Error,
    goal::core::{Goal, GoalCategory, GoalStatus, NewGoal},
    html::{FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE},
    timezone::iso_date,
};

/// Render the goal fields, prefilled with `goal` when editing.
pub fn goal_form_fields(goal: Option<&Goal>) -> Markup {
    let target_str = goal.map(|goal| format!("{:.2}", goal.target_amount));
    let current_str = goal.map_or_else(|| "0.00".to_owned(), |goal| format!("{:.2}", goal.current_amount));
    let category = goal.map(|goal| goal.category).unwrap_or_default();
    let status = goal.map(|goal| goal.status).unwrap_or_default();
    let deadline = goal.and_then(|goal| goal.deadline);

    html! {
        div
        {
            label for="title" class=(FORM_LABEL_STYLE) { "Title" }

            input
                name="title"
                id="title"
                type="text"
                placeholder="e.g. Emergency fund"
                required
                autofocus[goal.is_none()]
                value=[goal.map(|goal| goal.title.as_str())]
                class=(FORM_TEXT_INPUT_STYLE);
        }

        div class="grid grid-cols-2 gap-4"
        {
            div
            {
                label for="target_amount" class=(FORM_LABEL_STYLE) { "Target" }

                div class="input-wrapper w-full"
                {
                    input
                        name="target_amount"
                        id="target_amount"
                        type="number"
                        step="0.01"
                        min="0.01"
                        placeholder="0.00"
                        required
                        value=[target_str.as_deref()]
                        class=(FORM_TEXT_INPUT_STYLE);
                }
            }

            div
            {
                label for="current_amount" class=(FORM_LABEL_STYLE) { "Saved so far" }

                div class="input-wrapper w-full"
                {
                    input
                        name="current_amount"
                        id="current_amount"
                        type="number"
                        step="0.01"
                        min="0"
                        required
                        value=(current_str)
                        class=(FORM_TEXT_INPUT_STYLE);
                }
            }
        }

        div
        {
            label for="category" class=(FORM_LABEL_STYLE) { "Category" }

            select name="category" id="category" class=(FORM_TEXT_INPUT_STYLE)
            {
                @for option in GoalCategory::ALL {
                    option value=(option.as_str()) selected[option == category] { (option.label()) }
                }
            }
        }

        div
        {
            label for="deadline" class=(FORM_LABEL_STYLE) { "Deadline (optional)" }

            input
                name="deadline"
                id="deadline"
                type="date"
                value=[deadline]
                class=(FORM_TEXT_INPUT_STYLE);
        }

        div
        {
            label for="status" class=(FORM_LABEL_STYLE) { "Status" }

            select name="status" id="status" class=(FORM_TEXT_INPUT_STYLE)
            {
                @for option in GoalStatus::ALL {
                    option value=(option.as_str()) selected[option == status] { (option.label()) }
                }
            }
        }
    }
}

/// The raw form data for creating or editing a goal.
#[derive(Debug, Deserialize)]
pub struct GoalForm {
    #[serde(default)]
    pub title: String,
    pub target_amount: f64,
    #[serde(default)]
    pub current_amount: Option<f64>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default, with = "iso_date::option")]
    pub deadline: Option<Date>,
    #[serde(default)]
    pub status: Option<String>,
}

impl GoalForm {
    /// Validate the form data. Missing labels use the defaults and a missing
    /// current amount is zero.
    ///
    /// # Errors
    ///
    /// Returns the errors of [NewGoal::new], or [Error::InvalidLabel] for an
    /// unknown category or status.
    pub fn validate(&self) -> Result<NewGoal, Error> {
        let category = match self.category.as_deref() {
            None | Some("") => GoalCategory::default(),
            Some(raw) => raw.parse()?,
        };
        let status = match self.status.as_deref() {
            None | Some("") => GoalStatus::default(),
            Some(raw) => raw.parse()?,
        };

        NewGoal::new(
            &self.title,
            self.target_amount,
            self.current_amount.unwrap_or(0.0),
            category,
            self.deadline,
            status,
        )
    }
}
