//! The API endpoints URIs.
//!
//! For endpoints that take a parameter, e.g., '/goals/{goal_id}/edit', use [format_endpoint].

/// The root route which redirects to the dashboard or log in page.
pub const ROOT: &str = "/";
/// The landing page for logged in users.
pub const DASHBOARD_VIEW: &str = "/dashboard";
/// The page for displaying a user's transactions.
pub const TRANSACTIONS_VIEW: &str = "/transactions";
/// The page for creating a new transaction.
pub const NEW_TRANSACTION_VIEW: &str = "/transactions/new";
/// The page for editing an existing transaction.
pub const EDIT_TRANSACTION_VIEW: &str = "/transactions/{transaction_id}/edit";
/// The page for displaying a user's savings goals.
pub const GOALS_VIEW: &str = "/goals";
/// The page for creating a new goal.
pub const NEW_GOAL_VIEW: &str = "/goals/new";
/// The page for editing an existing goal.
pub const EDIT_GOAL_VIEW: &str = "/goals/{goal_id}/edit";
/// The page showing the cash flow for a single month.
pub const CASHFLOW_VIEW: &str = "/cashflow";
/// Download the transactions of a single month as CSV.
pub const CASHFLOW_EXPORT: &str = "/cashflow/export";
/// The page showing savings rates and the financial report.
pub const ANALYSIS_VIEW: &str = "/analysis";
/// Download the financial report as CSV.
pub const ANALYSIS_EXPORT: &str = "/analysis/export";
/// The page for the user's profile and account settings.
pub const SETTINGS_VIEW: &str = "/settings";
/// Download all of the user's data as JSON.
pub const SETTINGS_EXPORT: &str = "/settings/export";
/// The page for changing the password of the logged in user.
pub const RESET_PASSWORD_VIEW: &str = "/reset_password";
/// The route for getting the registration page.
pub const REGISTER_VIEW: &str = "/register";
/// The route for getting the log in page.
pub const LOG_IN_VIEW: &str = "/log_in";
/// The route for instructions for resetting the user's password.
pub const FORGOT_PASSWORD_VIEW: &str = "/forgot_password";
/// The page to display when an internal server error occurs.
pub const INTERNAL_ERROR_VIEW: &str = "/error";
/// The route for static files.
pub const STATIC: &str = "/static";

/// The route for logging in a user.
pub const LOG_IN_API: &str = "/api/log_in";
/// The route for the client to log out the current user.
pub const LOG_OUT: &str = "/api/log_out";
/// The route to register users.
pub const USERS: &str = "/api/users";
/// The route to change the password of the logged in user.
pub const PASSWORD_API: &str = "/api/password";
/// The route to create transactions.
pub const TRANSACTIONS_API: &str = "/api/transactions";
/// The route to update or delete a single transaction.
pub const TRANSACTION: &str = "/api/transactions/{transaction_id}";
/// The route for filtering the transactions table.
pub const TRANSACTIONS_FILTER: &str = "/api/transactions/filter";
/// The route to create goals.
pub const GOALS_API: &str = "/api/goals";
/// The route to update or delete a single goal.
pub const GOAL: &str = "/api/goals/{goal_id}";
/// The route for filtering the dashboard.
pub const DASHBOARD_FILTER: &str = "/api/dashboard/filter";
/// The route for switching the month shown on the cash flow page.
pub const CASHFLOW_API: &str = "/api/cashflow";
/// The route for switching the period of the financial report.
pub const ANALYSIS_REPORT_API: &str = "/api/analysis/report";
/// The route to update the user's profile.
pub const PROFILE_API: &str = "/api/profile";
/// The route to delete the user's account and all of their data.
pub const ACCOUNT_API: &str = "/api/account";

/// Replace the parameter in `endpoint_path` with `id`.
///
/// A parameter is a string that starts with a left brace, followed by
/// lowercase letters or underscores, and ends with a right brace.
/// For example, in the endpoint path '/goals/{goal_id}', '{goal_id}' is the parameter.
///
/// This function assumes that an endpoint path only contains ASCII characters
/// and a single parameter.
///
/// If no parameter is found in `endpoint_path`, the function returns the
/// the original `endpoint_path`.
pub fn format_endpoint(endpoint_path: &str, id: i64) -> String {
    let Some(param_start) = endpoint_path.find('{') else {
        return endpoint_path.to_owned();
    };

    let param_end = endpoint_path[param_start..]
        .find('}')
        .map(|offset| param_start + offset + 1)
        .unwrap_or(endpoint_path.len());

    format!(
        "{}{}{}",
        &endpoint_path[..param_start],
        id,
        &endpoint_path[param_end..]
    )
}
