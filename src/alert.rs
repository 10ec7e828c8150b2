//! Alert system for displaying success, error and info messages to users.
//!
//! Alerts are rendered into the fixed alert container of the base page, either
//! directly on page load or by htmx when a request fails. They dismiss
//! themselves after [ALERT_DISMISS_MILLIS].

use maud::{Markup, html};

/// How long an alert stays on screen before it removes itself.
pub const ALERT_DISMISS_MILLIS: u32 = 3000;

/// Alert message types for styling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertKind {
    Success,
    Error,
    Info,
}

/// A message for the user with a short summary and optional details.
#[derive(Debug, Clone, PartialEq)]
pub struct Alert {
    pub kind: AlertKind,
    pub message: String,
    pub details: String,
}

impl Alert {
    /// Create a new success alert
    pub fn success(message: &str, details: &str) -> Self {
        Self::new(AlertKind::Success, message, details)
    }

    /// Create a new error alert
    pub fn error(message: &str, details: &str) -> Self {
        Self::new(AlertKind::Error, message, details)
    }

    /// Create a new info alert
    pub fn info(message: &str, details: &str) -> Self {
        Self::new(AlertKind::Info, message, details)
    }

    fn new(kind: AlertKind, message: &str, details: &str) -> Self {
        Self {
            kind,
            message: message.to_owned(),
            details: details.to_owned(),
        }
    }

    pub fn into_html(self) -> Markup {
        let style = match self.kind {
            AlertKind::Success => {
                "text-green-800 bg-green-50 border-green-300 \
                dark:bg-gray-800 dark:text-green-400 dark:border-green-800"
            }
            AlertKind::Error => {
                "text-red-800 bg-red-50 border-red-300 \
                dark:bg-gray-800 dark:text-red-400 dark:border-red-800"
            }
            AlertKind::Info => {
                "text-blue-800 bg-blue-50 border-blue-300 \
                dark:bg-gray-800 dark:text-blue-400 dark:border-blue-800"
            }
        };
        let role = match self.kind {
            AlertKind::Error => "alert",
            AlertKind::Success | AlertKind::Info => "status",
        };

        html! {
            div
                role=(role)
                data-dismiss-after=(ALERT_DISMISS_MILLIS)
                class={"flex items-start gap-3 p-4 mb-2 text-sm border rounded-lg shadow " (style)}
            {
                div class="flex-1"
                {
                    p class="font-semibold" { (self.message) }

                    @if !self.details.is_empty() {
                        p class="mt-1" { (self.details) }
                    }
                }

                button
                    type="button"
                    aria-label="Dismiss"
                    onclick="this.parentElement.remove()"
                    class="font-bold leading-none"
                {
                    "×"
                }
            }
        }
    }
}

/// Render a list of alerts, e.g. the pending notifications of a user.
pub fn alerts_view(alerts: &[Alert]) -> Markup {
    html! {
        @for alert in alerts {
            (alert.clone().into_html())
        }
    }
}

#[cfg(test)]
mod tests {
    use scraper::{Html, Selector};

    use super::{ALERT_DISMISS_MILLIS, Alert};

    #[test]
    fn error_alert_uses_alert_role_and_dismisses() {
        let html = Alert::error("Could not save", "Try again").into_html();
        let fragment = Html::parse_fragment(&html.into_string());

        let alert = fragment
            .select(&Selector::parse("div[role=alert]").unwrap())
            .next()
            .expect("no alert element");

        assert_eq!(
            alert.value().attr("data-dismiss-after"),
            Some(ALERT_DISMISS_MILLIS.to_string().as_str())
        );
        let text = alert.text().collect::<String>();
        assert!(text.contains("Could not save"));
        assert!(text.contains("Try again"));
    }

    #[test]
    fn success_alert_omits_empty_details() {
        let html = Alert::success("Saved", "").into_html();
        let fragment = Html::parse_fragment(&html.into_string());

        let paragraphs = fragment.select(&Selector::parse("p").unwrap()).count();

        assert_eq!(paragraphs, 1);
    }
}
