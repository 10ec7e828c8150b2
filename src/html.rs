use maud::{DOCTYPE, Markup, PreEscaped, html};

use std::sync::OnceLock;

use numfmt::{Formatter, Precision};
use unicode_segmentation::UnicodeSegmentation;

use crate::{
    alert::{Alert, alerts_view},
    profile::Currency,
    sequence::sequence_script,
};

// Link styles
pub const LINK_STYLE: &str = "text-blue-600 hover:text-blue-500 \
    dark:text-blue-500 dark:hover:text-blue-400 underline";

// Button styles
pub const BUTTON_PRIMARY_STYLE: &str = "w-full px-4 py-2 bg-blue-500
    dark:bg-blue-600 disabled:bg-blue-700 hover:enabled:bg-blue-600 \
    hover:enabled:dark:bg-blue-700 text-white rounded";

pub const BUTTON_DELETE_STYLE: &str = "text-red-600 hover:text-red-500 \
    dark:text-red-500 dark:hover:text-red-400 underline bg-transparent \
    border-none cursor-pointer";

pub const BUTTON_DANGER_STYLE: &str = "w-full px-4 py-2 bg-red-600 \
    hover:bg-red-700 dark:bg-red-600 dark:hover:bg-red-700 text-white rounded";

// Form styles
pub const FORM_CONTAINER_STYLE: &str = "flex flex-col items-center px-6 py-8 \
    mx-auto lg:py-0 max-w-md text-gray-900 dark:text-white";
pub const FORM_LABEL_STYLE: &str = "block mb-2 text-sm font-medium text-gray-900 dark:text-white";
pub const FORM_TEXT_INPUT_STYLE: &str = "block w-full p-2.5 rounded text-sm \
    text-gray-900 dark:text-white disabled:text-gray-500 bg-gray-50 \
    dark:bg-gray-700 border border-gray-300 dark:border-gray-600 \
    dark:placeholder-gray-400 focus:ring-blue-600 focus:border-blue-600 \
    focus:dark:border-blue-500 focus:dark:ring-blue-500";
pub const FORM_RADIO_GROUP_STYLE: &str = "flex flex-col gap-2";
pub const FORM_RADIO_INPUT_STYLE: &str = "peer h-4 w-4 shrink-0 cursor-pointer \
    text-blue-600 border-gray-300 dark:border-gray-600 focus-visible:ring-2 \
    focus-visible:ring-blue-500 focus-visible:ring-offset-2 \
    focus-visible:ring-offset-white focus-visible:dark:ring-offset-gray-900";
pub const FORM_RADIO_LABEL_STYLE: &str = "flex-1 rounded border border-gray-300 \
    dark:border-gray-600 bg-white dark:bg-gray-700 px-3 py-2 text-sm font-medium \
    text-gray-700 dark:text-white cursor-pointer transition \
    hover:border-gray-400 hover:bg-gray-50 hover:text-gray-900 \
    hover:dark:border-gray-500 hover:dark:bg-gray-600 active:scale-[0.99] \
    peer-checked:border-blue-600 peer-checked:bg-blue-50 peer-checked:text-blue-700 \
    peer-checked:shadow-sm peer-checked:dark:border-blue-500 \
    peer-checked:dark:bg-blue-600/20 peer-checked:dark:text-blue-200";

// Table styles
pub const TABLE_HEADER_STYLE: &str = "text-xs text-gray-700 uppercase \
    bg-gray-50 dark:bg-gray-700 dark:text-gray-400";

pub const TABLE_ROW_STYLE: &str = "bg-white border-b dark:bg-gray-800 dark:border-gray-700";

pub const TABLE_CELL_STYLE: &str = "px-6 py-4";

// Badge for categories and statuses
pub const BADGE_STYLE: &str = "inline-flex items-center px-2.5 py-0.5 \
    text-xs font-semibold text-blue-800 bg-blue-100 rounded-full \
    dark:bg-blue-900 dark:text-blue-300";

// Cards
pub const CARD_STYLE: &str = "bg-white dark:bg-gray-800 border border-gray-200 \
    dark:border-gray-700 rounded-lg p-4 shadow-md";

// Amount colours
pub const INCOME_TEXT_STYLE: &str = "text-green-600 dark:text-green-400";
pub const EXPENSE_TEXT_STYLE: &str = "text-red-600 dark:text-red-400";

// Page container
pub const PAGE_CONTAINER_STYLE: &str =
    "flex flex-col items-center px-6 py-8 mx-auto lg:py-5 text-gray-900 dark:text-white";

/// How many characters of a description to show in tables.
pub const DESCRIPTION_DISPLAY_LIMIT: usize = 40;

pub enum HeadElement {
    /// The file path or URL to a JavaScript script.
    ScriptLink(String),
    /// JavaScript source code.
    ScriptSource(PreEscaped<String>),
    Style(PreEscaped<String>),
}

pub fn base(title: &str, head_elements: &[HeadElement], content: &Markup) -> Markup {
    base_with_alerts(title, head_elements, content, &[])
}

/// The base page with `alerts` rendered into the alert container.
///
/// Used for pages that show the user's pending notifications.
pub fn base_with_alerts(
    title: &str,
    head_elements: &[HeadElement],
    content: &Markup,
    alerts: &[Alert],
) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en"
        {
            head
            {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) " - Zard Finance" }
                link rel="icon" type="image/png" href="/static/favicon-32x32.png" sizes="32x32";
                link rel="icon" type="image/png" href="/static/favicon-128x128.png" sizes="128x128";
                link href="/static/main.css" rel="stylesheet";

                script src="/static/htmx-2.0.8-min.js" integrity="sha384-/TgkGk7p307TH7EXJDuUlgG3Ce1UVolAOFopFekQkkXihi5u/6OCvVKyz1W+idaz" {}
                script src="/static/htmx-ext-response-targets-2.0.4.js" integrity="sha384-T41oglUPvXLGBVyRdZsVRxNWnOOqCynaPubjUVjxhsjFTKrFJGEMm3/0KGmNQ+Pg" {}

                style
                {
                    r#"
                    #indicator.htmx-indicator {
                        display: none;
                    }

                    #indicator.htmx-request .htmx-indicator {
                        display: inline;
                    }

                    #indicator.htmx-request.htmx-indicator {
                        display: inline;
                    }

                    /* Keep chart tooltips below the fixed bottom nav, but above page content. */
                    .echarts-tooltip {
                        z-index: 30 !important;
                    }
                    "#
                }

                (sequence_script())

                script
                {
                    (PreEscaped(
                        "function dismissAlerts(root) {
                            root.querySelectorAll('[data-dismiss-after]').forEach((alert) => {
                                setTimeout(() => alert.remove(), Number(alert.dataset.dismissAfter));
                            });
                        }
                        document.addEventListener('DOMContentLoaded', () => dismissAlerts(document));
                        document.addEventListener('htmx:afterSwap', (event) => dismissAlerts(event.detail.target));"
                    ))
                }

                @for element in head_elements
                {
                    @match element
                    {
                        HeadElement::ScriptSource(text) => script { (text) }
                        HeadElement::ScriptLink(path) => script src=(path) {}
                        HeadElement::Style(text) => style { (text) }
                    }
                }
            }

            body
                hx-ext="response-targets"
                class="container max-w-full min-h-screen bg-gray-50 dark:bg-gray-900 pb-[calc(5rem+env(safe-area-inset-bottom))] lg:pb-0"
            {
                (content)

                div
                    id="alert-container"
                    class="w-full max-w-md px-4"
                    style="position: fixed; bottom: 1rem; left: 50%; transform: translateX(-50%); z-index: 9999;"
                {
                    (alerts_view(alerts))
                }
            }
        }
    }
}

pub fn error_view(title: &str, header: &str, description: &str, fix: &str) -> Markup {
    // Template adapted from https://flowbite.com/blocks/marketing/404/
    let content = html!(
        section class="bg-white dark:bg-gray-900"
        {
            div class="py-8 px-4 mx-auto max-w-screen-xl lg:py-16 lg:px-6"
            {
                div class="mx-auto max-w-screen-sm text-center"
                {
                    h1
                        class="mb-4 text-7xl tracking-tight font-extrabold
                            lg:text-9xl text-blue-600 dark:text-blue-500"
                    {
                        (header)
                    }

                    p
                        class="mb-4 text-3xl md:text-4xl tracking-tight
                            font-bold text-gray-900 dark:text-white"
                    {
                        (description)
                    }

                    p
                        class="mb-4 text-1xl md:text-2xl tracking-tight
                            text-gray-900 dark:text-white"
                    {
                        (fix)
                    }

                    a
                        href="/"
                        class="inline-flex text-white bg-blue-600
                            hover:bg-blue-800 focus:ring-4 focus:outline-hidden
                            focus:ring-blue-300 font-medium rounded text-sm px-5
                            py-2.5 text-center dark:focus:ring-blue-900 my-4"
                    {
                        "Back to Homepage"
                    }
                }
            }
        }
    );

    base(title, &[], &content)
}

/// The card layout shared by the log-in, registration and password pages.
pub fn log_in_register(form_title: &str, form: &Markup) -> Markup {
    html! {
        div class="flex flex-col items-center justify-center px-6 py-8 mx-auto"
        {
            a href="#" class="flex items-center mb-6 text-2xl font-semibold text-gray-900 dark:text-white"
            {
                img class="w-8 h-8 mr-2" src="/static/favicon-128x128.png" alt="logo";
                "Zard Finance"
            }

            div class="w-full bg-white rounded-lg shadow dark:border md:mt-0 sm:max-w-md xl:p-0 dark:bg-gray-800 dark:border-gray-700"
            {
                div class="p-6 space-y-4 md:space-y-6 sm:p-8"
                {
                    h1 class="text-xl font-bold leading-tight tracking-tight text-gray-900 md:text-2xl dark:text-white"
                    {
                        (form_title)
                    }

                    (form)
                }
            }
        }
    }
}

/// A labelled password input.
///
/// `name` is used for both the input name and ID, so it must be unique within the page.
pub struct PasswordInput<'a> {
    pub name: &'a str,
    pub label: &'a str,
    pub value: &'a str,
    pub min_length: u8,
    pub autofocus: bool,
    pub error_message: Option<&'a str>,
}

pub fn password_input(input: PasswordInput<'_>) -> Markup {
    html! {
        div
        {
            label
                for=(input.name)
                class=(FORM_LABEL_STYLE)
            {
                (input.label)
            }

            input
                type="password"
                name=(input.name)
                id=(input.name)
                placeholder="••••••••"
                class=(FORM_TEXT_INPUT_STYLE)
                required
                autofocus[input.autofocus]
                value=(input.value)
                minlength=(input.min_length);

            @if let Some(error_message) = input.error_message
            {
                p class="text-red-500 text-base" { (error_message) }
            }
        }
    }
}

pub fn loading_spinner() -> Markup {
    // Spinner SVG adapted from https://flowbite.com/docs/components/spinner/
    html! {
        svg
            aria-hidden="true"
            role="status"
            class="inline text-white w-4 h-4 me-2 mb-1 animate-spin"
            viewBox="0 0 100 101"
            fill="none"
            xmlns="http://www.w3.org/2000/svg"
        {
            path
                d="M100 50.5908C100 78.2051 77.6142 100.591 50 100.591C22.3858 100.591 0 78.2051 0 50.5908C0 22.9766 22.3858 0.59082 50 0.59082C77.6142 0.59082 100 22.9766 100 50.5908ZM9.08144 50.5908C9.08144 73.1895 27.4013 91.5094 50 91.5094C72.5987 91.5094 90.9186 73.1895 90.9186 50.5908C90.9186 27.9921 72.5987 9.67226 50 9.67226C27.4013 9.67226 9.08144 27.9921 9.08144 50.5908Z"
                fill="#E5E7EB" {}
            path
                d="M93.9676 39.0409C96.393 38.4038 97.8624 35.9116 97.0079 33.5539C95.2932 28.8227 92.871 24.3692 89.8167 20.348C85.8452 15.1192 80.8826 10.7238 75.2124 7.41289C69.5422 4.10194 63.2754 1.94025 56.7698 1.05124C51.7666 0.367541 46.6976 0.446843 41.7345 1.27873C39.2613 1.69328 37.813 4.19778 38.4501 6.62326C39.0873 9.04874 41.5694 10.4717 44.0505 10.1071C47.8511 9.54855 51.7191 9.52689 55.5402 10.0491C60.8642 10.7766 65.9928 12.5457 70.6331 15.2552C75.2735 17.9648 79.3347 21.5619 82.5849 25.841C84.9175 28.9121 86.7997 32.2913 88.1811 35.8758C89.083 38.2158 91.5421 39.6781 93.9676 39.0409Z"
                fill="currentColor" {}
        }
    }
}

/// Returns the CSS styles for adding the currency symbol as a prefix to number inputs.
pub fn currency_input_styles(currency: Currency) -> HeadElement {
    HeadElement::Style(PreEscaped(format!(
        r#"
        .input-wrapper {{
            position: relative;
            display: inline-block;
        }}
        .input-wrapper input[type="number"] {{
            padding-left: 2.2rem;
        }}
        .input-wrapper::before {{
            content: '{}';
            position: absolute;
            left: 0.6rem;
            top: 50%;
            transform: translateY(-50%);
            pointer-events: none;
        }}
        "#,
        currency.symbol()
    )))
}

fn currency_formatter(currency: Currency) -> &'static Formatter {
    static BRL_FMT: OnceLock<Formatter> = OnceLock::new();
    static USD_FMT: OnceLock<Formatter> = OnceLock::new();
    static EUR_FMT: OnceLock<Formatter> = OnceLock::new();

    let cell = match currency {
        Currency::Brl => &BRL_FMT,
        Currency::Usd => &USD_FMT,
        Currency::Eur => &EUR_FMT,
    };

    cell.get_or_init(|| {
        Formatter::currency(currency.symbol())
            .unwrap()
            .precision(Precision::Decimals(2))
    })
}

/// Format `number` as an amount of money in `currency` with two decimal places.
pub fn format_currency(number: f64, currency: Currency) -> String {
    let magnitude = number.abs();

    // Zero is hardcoded as "0", so we must specify the formatted string for zero
    let mut formatted_string = if magnitude == 0.0 {
        format!("{}0.00", currency.symbol())
    } else {
        currency_formatter(currency).fmt_string(magnitude)
    };

    // numfmt omits trailing zeros, e.g. "12.30" is rendered as "12.3" and
    // "12.00" as "12".
    match formatted_string.rfind('.') {
        None => formatted_string.push_str(".00"),
        Some(point) if formatted_string.len() - point == 2 => formatted_string.push('0'),
        Some(_) => {}
    }

    if number < 0.0 && magnitude != 0.0 {
        format!("-{formatted_string}")
    } else {
        formatted_string
    }
}

/// Format a percentage with one decimal place, avoiding "-0.0%".
pub fn format_percent(value: f64) -> String {
    let rounded = (value * 10.0).round() / 10.0;

    if rounded == 0.0 {
        "0.0%".to_owned()
    } else {
        format!("{rounded:.1}%")
    }
}

/// Shorten `description` to at most `limit` user-perceived characters, adding
/// an ellipsis if anything was cut off.
pub fn truncate_description(description: &str, limit: usize) -> String {
    let mut graphemes = description.graphemes(true);
    let truncated: String = graphemes.by_ref().take(limit).collect();

    if graphemes.next().is_some() {
        format!("{truncated}…")
    } else {
        truncated
    }
}

/// A link with blue text for use in a <p> tag.
pub fn link(url: &str, text: &str) -> Markup {
    html! (
        a href=(url) class=(LINK_STYLE)
        {
          (text)
        }
    )
}

/// A card with a single headline figure, e.g. total income.
///
/// `value_class` colours the figure and `footnote` is shown underneath in small text.
pub fn summary_card(title: &str, value: &str, value_class: &str, footnote: Option<&str>) -> Markup {
    html! {
        div class=(CARD_STYLE) data-summary-card=(title)
        {
            h3 class="text-sm font-medium text-gray-500 dark:text-gray-400" { (title) }

            p class={ "mt-2 text-2xl font-bold tabular-nums " (value_class) } data-value="true"
            {
                (value)
            }

            @if let Some(footnote) = footnote {
                p class="mt-1 text-xs text-gray-500 dark:text-gray-400" { (footnote) }
            }
        }
    }
}

/// An edit link and a delete button for a table row or card.
///
/// The delete button asks for confirmation with `confirm_message`, then
/// removes the element matched by `hx_target` on success. Errors go to the
/// alert container.
pub fn edit_delete_action_links(
    edit_url: &str,
    delete_url: &str,
    confirm_message: &str,
    hx_target: &str,
    hx_swap: &str,
) -> Markup {
    html! {
        a href=(edit_url) class=(LINK_STYLE)
        {
            "Edit"
        }

        button
            hx-delete=(delete_url)
            hx-confirm=(confirm_message)
            hx-target=(hx_target)
            hx-target-error="#alert-container"
            hx-swap=(hx_swap)
            class=(BUTTON_DELETE_STYLE)
        {
            "Delete"
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        html::{format_currency, format_percent, truncate_description},
        profile::Currency,
    };

    #[test]
    fn format_currency_keeps_two_decimals() {
        let formatted = format_currency(12.3, Currency::Usd);

        assert!(formatted.starts_with('$'), "got {formatted}");
        assert!(formatted.ends_with("12.30"), "got {formatted}");
    }

    #[test]
    fn format_currency_zero() {
        assert_eq!(format_currency(0.0, Currency::Brl), "R$0.00");
    }

    #[test]
    fn format_currency_negative_has_leading_minus() {
        let formatted = format_currency(-5.0, Currency::Eur);

        assert!(formatted.starts_with("-€"), "got {formatted}");
        assert!(formatted.ends_with(".00"), "got {formatted}");
    }

    #[test]
    fn format_percent_rounds_to_one_decimal() {
        assert_eq!(format_percent(70.0), "70.0%");
        assert_eq!(format_percent(33.333), "33.3%");
        assert_eq!(format_percent(-0.01), "0.0%");
    }

    #[test]
    fn truncate_description_respects_graphemes() {
        assert_eq!(truncate_description("café au lait", 4), "café…");
        assert_eq!(truncate_description("short", 10), "short");
    }
}
