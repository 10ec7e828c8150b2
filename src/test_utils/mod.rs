#![allow(missing_docs)]

mod form;
mod response;
mod state;

pub(crate) use form::{
    assert_form_input, assert_form_input_with_value, assert_form_submit_button,
    assert_hx_endpoint, must_get_form,
};
pub(crate) use response::{
    assert_content_type, assert_hx_redirect, assert_status_ok, assert_valid_html, get_header,
    parse_html_document, parse_html_fragment,
};
pub(crate) use state::{insert_transaction, test_state_with_user};
