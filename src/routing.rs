//! Application router configuration with protected and unprotected route definitions.

use axum::{
    Router, middleware,
    response::Redirect,
    routing::{delete, get, post, put},
};
use tower_http::services::ServeDir;

use crate::{
    AppState,
    analysis::{export_report_csv, get_analysis_page, update_report_endpoint},
    auth::{
        auth_guard, auth_guard_hx, get_forgot_password_page, get_log_in_page, get_log_out,
        get_register_page, get_reset_password_page, guest_guard, post_log_in, put_password,
        register_user,
    },
    cashflow::{export_cashflow_csv, get_cashflow_page, update_cashflow_endpoint},
    dashboard::{filter_dashboard_endpoint, get_dashboard_page},
    endpoints,
    error_page::{get_404_not_found, get_internal_server_error_page},
    goal::{
        create_goal_endpoint, delete_goal_endpoint, edit_goal_endpoint, get_create_goal_page,
        get_edit_goal_page, get_goals_page,
    },
    settings::{
        delete_account_endpoint, export_data_endpoint, get_settings_page,
        update_profile_endpoint,
    },
    transaction::{
        create_transaction_endpoint, delete_transaction_endpoint, edit_transaction_endpoint,
        filter_transactions_endpoint, get_create_transaction_page, get_edit_transaction_page,
        get_transactions_page,
    },
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    let guest_routes = Router::new()
        .route(endpoints::LOG_IN_VIEW, get(get_log_in_page))
        .route(endpoints::REGISTER_VIEW, get(get_register_page))
        .route(
            endpoints::FORGOT_PASSWORD_VIEW,
            get(get_forgot_password_page),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), guest_guard));

    let unprotected_routes = Router::new()
        .route(endpoints::ROOT, get(get_index_page))
        .route(endpoints::LOG_IN_API, post(post_log_in))
        .route(endpoints::LOG_OUT, get(get_log_out))
        .route(endpoints::USERS, post(register_user))
        .route(
            endpoints::INTERNAL_ERROR_VIEW,
            get(get_internal_server_error_page),
        );

    let protected_routes = Router::new()
        .route(endpoints::DASHBOARD_VIEW, get(get_dashboard_page))
        .route(endpoints::TRANSACTIONS_VIEW, get(get_transactions_page))
        .route(
            endpoints::NEW_TRANSACTION_VIEW,
            get(get_create_transaction_page),
        )
        .route(
            endpoints::EDIT_TRANSACTION_VIEW,
            get(get_edit_transaction_page),
        )
        .route(endpoints::GOALS_VIEW, get(get_goals_page))
        .route(endpoints::NEW_GOAL_VIEW, get(get_create_goal_page))
        .route(endpoints::EDIT_GOAL_VIEW, get(get_edit_goal_page))
        .route(endpoints::CASHFLOW_VIEW, get(get_cashflow_page))
        .route(endpoints::CASHFLOW_EXPORT, get(export_cashflow_csv))
        .route(endpoints::ANALYSIS_VIEW, get(get_analysis_page))
        .route(endpoints::ANALYSIS_EXPORT, get(export_report_csv))
        .route(endpoints::SETTINGS_VIEW, get(get_settings_page))
        .route(endpoints::SETTINGS_EXPORT, get(export_data_endpoint))
        .route(endpoints::RESET_PASSWORD_VIEW, get(get_reset_password_page))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth_guard));

    // htmx requests need the HX-Redirect header for auth redirects to navigate the whole page.
    let protected_api_routes = Router::new()
        .route(
            endpoints::TRANSACTIONS_API,
            post(create_transaction_endpoint),
        )
        .route(
            endpoints::TRANSACTION,
            put(edit_transaction_endpoint).delete(delete_transaction_endpoint),
        )
        .route(
            endpoints::TRANSACTIONS_FILTER,
            post(filter_transactions_endpoint),
        )
        .route(endpoints::GOALS_API, post(create_goal_endpoint))
        .route(
            endpoints::GOAL,
            put(edit_goal_endpoint).delete(delete_goal_endpoint),
        )
        .route(endpoints::DASHBOARD_FILTER, post(filter_dashboard_endpoint))
        .route(endpoints::CASHFLOW_API, post(update_cashflow_endpoint))
        .route(endpoints::ANALYSIS_REPORT_API, post(update_report_endpoint))
        .route(endpoints::PROFILE_API, put(update_profile_endpoint))
        .route(endpoints::ACCOUNT_API, delete(delete_account_endpoint))
        .route(endpoints::PASSWORD_API, put(put_password))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth_guard_hx));

    protected_routes
        .merge(protected_api_routes)
        .merge(guest_routes)
        .merge(unprotected_routes)
        .nest_service(endpoints::STATIC, ServeDir::new("static/"))
        .fallback(get_404_not_found)
        .with_state(state)
}

/// The root path '/' redirects to the dashboard page, which sends logged out
/// users on to the log-in page.
async fn get_index_page() -> Redirect {
    Redirect::to(endpoints::DASHBOARD_VIEW)
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use rusqlite::Connection;

    use crate::{
        AppState,
        auth::{COOKIE_TOKEN, Email, PasswordHash, create_user},
        endpoints,
        profile::create_profile,
    };

    use super::build_router;

    const PASSWORD: &str = "correcthorsebatterystaple";

    fn get_test_server() -> TestServer {
        get_test_server_and_state().0
    }

    fn get_test_server_and_state() -> (TestServer, AppState) {
        let connection = Connection::open_in_memory().unwrap();
        let state = AppState::new(connection, "foobar", "Etc/UTC").unwrap();
        {
            let connection = state.db_connection.lock().unwrap();
            let user = create_user(
                &Email::new("maria@example.com").unwrap(),
                PasswordHash::from_raw_password(PASSWORD, 4).unwrap(),
                &connection,
            )
            .unwrap();
            create_profile(user.id, "Maria", &connection).unwrap();
        }

        let server =
            TestServer::try_new(build_router(state.clone())).expect("Could not create test server.");

        (server, state)
    }

    fn log_in_location(target: &str) -> String {
        let query = serde_urlencoded::to_string([("redirect_url", target)]).unwrap();
        format!("{}?{}", endpoints::LOG_IN_VIEW, query)
    }

    #[tokio::test]
    async fn root_redirects_to_dashboard() {
        let server = get_test_server();

        let response = server.get(endpoints::ROOT).await;

        response.assert_status(StatusCode::SEE_OTHER);
        assert_eq!(response.header("location"), endpoints::DASHBOARD_VIEW);
    }

    #[tokio::test]
    async fn protected_pages_redirect_to_log_in() {
        let server = get_test_server();

        for page in [
            endpoints::DASHBOARD_VIEW,
            endpoints::TRANSACTIONS_VIEW,
            endpoints::GOALS_VIEW,
            endpoints::CASHFLOW_VIEW,
            endpoints::ANALYSIS_VIEW,
            endpoints::SETTINGS_VIEW,
            endpoints::RESET_PASSWORD_VIEW,
        ] {
            let response = server.get(page).await;

            response.assert_status(StatusCode::SEE_OTHER);
            assert_eq!(response.header("location"), log_in_location(page));
        }
    }

    #[tokio::test]
    async fn api_without_session_sends_hx_redirect() {
        let server = get_test_server();

        let response = server
            .post(endpoints::TRANSACTIONS_API)
            .add_header("hx-request", "true")
            .add_header("hx-current-url", "http://localhost/transactions/new")
            .await;

        assert_eq!(
            response.header("hx-redirect"),
            log_in_location(endpoints::NEW_TRANSACTION_VIEW)
        );
    }

    #[tokio::test]
    async fn logged_in_user_can_view_pages_and_skips_log_in() {
        let server = get_test_server();
        let token = server
            .post(endpoints::LOG_IN_API)
            .form(&[("email", "maria@example.com"), ("password", PASSWORD)])
            .await
            .cookie(COOKIE_TOKEN);

        for page in [
            endpoints::DASHBOARD_VIEW,
            endpoints::TRANSACTIONS_VIEW,
            endpoints::NEW_TRANSACTION_VIEW,
            endpoints::GOALS_VIEW,
            endpoints::NEW_GOAL_VIEW,
            endpoints::CASHFLOW_VIEW,
            endpoints::ANALYSIS_VIEW,
            endpoints::SETTINGS_VIEW,
        ] {
            server
                .get(page)
                .add_cookie(token.clone())
                .await
                .assert_status_ok();
        }

        let response = server
            .get(endpoints::LOG_IN_VIEW)
            .add_cookie(token)
            .await;
        response.assert_status(StatusCode::SEE_OTHER);
        assert_eq!(response.header("location"), endpoints::DASHBOARD_VIEW);
    }

    #[tokio::test]
    async fn guest_pages_are_open_without_session() {
        let server = get_test_server();

        for page in [
            endpoints::LOG_IN_VIEW,
            endpoints::REGISTER_VIEW,
            endpoints::FORGOT_PASSWORD_VIEW,
        ] {
            server.get(page).await.assert_status_ok();
        }
    }

    #[tokio::test]
    async fn unknown_route_is_not_found() {
        let server = get_test_server();

        server
            .get("/does-not-exist")
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn old_session_does_not_open_account_registered_after_deletion() {
        let (server, state) = get_test_server_and_state();
        let token = server
            .post(endpoints::LOG_IN_API)
            .form(&[("email", "maria@example.com"), ("password", PASSWORD)])
            .await
            .cookie(COOKIE_TOKEN);
        server
            .delete(endpoints::ACCOUNT_API)
            .add_header("hx-request", "true")
            .add_cookie(token.clone())
            .await
            .assert_status(StatusCode::SEE_OTHER);
        {
            let connection = state.db_connection.lock().unwrap();
            let stranger = create_user(
                &Email::new("stranger@example.com").unwrap(),
                PasswordHash::new_unchecked("hunter2"),
                &connection,
            )
            .unwrap();
            create_profile(stranger.id, "Stranger", &connection).unwrap();
        }

        let response = server.get(endpoints::SETTINGS_VIEW).add_cookie(token).await;

        response.assert_status(StatusCode::SEE_OTHER);
        assert_eq!(
            response.header("location"),
            log_in_location(endpoints::SETTINGS_VIEW)
        );
        assert!(!response.text().contains("stranger@example.com"));
    }
}
