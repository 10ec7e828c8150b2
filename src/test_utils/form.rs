//! Assertions on the forms rendered by the pages.

use scraper::{ElementRef, Html, Selector};

fn select<'a>(element: &ElementRef<'a>, selector: &str) -> Vec<ElementRef<'a>> {
    let selector = Selector::parse(selector).expect("invalid selector");
    element.select(&selector).collect()
}

/// The first form on the page.
#[track_caller]
pub(crate) fn must_get_form(html: &Html) -> ElementRef<'_> {
    let selector = Selector::parse("form").expect("invalid selector");
    html.select(&selector).next().expect("page has no form")
}

#[track_caller]
pub(crate) fn assert_hx_endpoint(form: &ElementRef<'_>, endpoint: &str, attribute: &str) {
    assert_eq!(
        form.value().attr(attribute),
        Some(endpoint),
        "form should send requests with {attribute}=\"{endpoint}\""
    );
}

/// The required input called `name`, which must have the given `type`.
#[track_caller]
fn required_input<'a>(form: &ElementRef<'a>, name: &str, type_: &str) -> ElementRef<'a> {
    let input = select(form, "input")
        .into_iter()
        .find(|input| input.value().attr("name") == Some(name))
        .unwrap_or_else(|| panic!("form has no input named {name:?}"));

    assert_eq!(
        input.value().attr("type"),
        Some(type_),
        "input {name:?} has the wrong type"
    );
    assert!(
        input.value().attr("required").is_some(),
        "input {name:?} should be required"
    );

    input
}

#[track_caller]
pub(crate) fn assert_form_input(form: &ElementRef<'_>, name: &str, type_: &str) {
    required_input(form, name, type_);
}

#[track_caller]
pub(crate) fn assert_form_input_with_value(
    form: &ElementRef<'_>,
    name: &str,
    type_: &str,
    value: &str,
) {
    let input = required_input(form, name, type_);

    assert_eq!(
        input.value().attr("value"),
        Some(value),
        "input {name:?} has the wrong value"
    );
}

#[track_caller]
pub(crate) fn assert_form_submit_button(form: &ElementRef<'_>) {
    let has_submit = select(form, "button")
        .iter()
        .any(|button| button.value().attr("type") == Some("submit"));

    assert!(has_submit, "form has no submit button");
}
