//! Route guards that validate the session cookie, extend sessions, and handle redirects.

use axum::{
    extract::{FromRef, FromRequestParts, Request, State},
    http::{StatusCode, header::SET_COOKIE},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};
use axum_htmx::HxRedirect;
use std::sync::{Arc, Mutex};

use rusqlite::Connection;
use time::Duration;

use crate::{
    AppState, Error,
    auth::{
        UserID,
        cookie::{
            current_user, extend_auth_cookie_duration_if_needed, get_token_from_cookies,
            invalidate_auth_cookie,
        },
        get_user_by_id,
        redirect::{build_log_in_redirect_url, build_log_in_redirect_url_from_target},
    },
    endpoints,
    timezone::get_local_offset,
};

/// How far each authenticated request pushes out the session expiry.
const SLIDING_SESSION_WINDOW: Duration = Duration::minutes(5);

/// The state needed for the auth middleware
#[derive(Clone)]
pub struct AuthState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
    /// The local timezone as a canonical timezone name, e.g. "America/Sao_Paulo".
    pub local_timezone: String,
    /// Used to check that the user in a session still exists.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for AuthState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            local_timezone: state.local_timezone.clone(),
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Whether `user_id` still belongs to a registered user.
///
/// A session outlives its account when the account is deleted, so the cookie
/// alone is not enough.
fn user_exists(state: &AuthState, user_id: UserID) -> bool {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return false;
        }
    };

    match get_user_by_id(user_id, &connection) {
        Ok(_) => true,
        Err(Error::NotFound) => {
            tracing::warn!("rejected session of deleted user {user_id}");
            false
        }
        Err(error) => {
            tracing::error!("could not look up user {user_id}: {error}");
            false
        }
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<AuthState> for Key {
    fn from_ref(state: &AuthState) -> Self {
        state.cookie_key.clone()
    }
}

/// How a guard turns away a request without a valid session.
#[derive(Debug, Clone, Copy)]
enum Rejection {
    /// A plain `303 See Other` for full page loads.
    Redirect,
    /// `HX-Redirect`, so htmx navigates the whole page instead of swapping in the log-in page.
    HxRedirect,
}

impl Rejection {
    fn respond(self, log_in_url: String) -> Response {
        match self {
            Rejection::Redirect => Redirect::to(&log_in_url).into_response(),
            Rejection::HxRedirect => (HxRedirect(log_in_url), StatusCode::OK).into_response(),
        }
    }
}

/// The log-in page URL that sends the user back to where `request` was going.
fn log_in_url_for(request: &Request) -> String {
    build_log_in_redirect_url(request)
        .or_else(|| {
            tracing::warn!("could not build redirect URL from request, falling back to dashboard");
            build_log_in_redirect_url_from_target(endpoints::DASHBOARD_VIEW)
        })
        .unwrap_or_else(|| endpoints::LOG_IN_VIEW.to_owned())
}

/// Copy the session cookie onto `response` unless the handler set a cookie itself.
///
/// Handlers that log the user out set their own cookie, which must win.
fn attach_session_cookie(response: Response, jar: PrivateCookieJar) -> Response {
    let (mut parts, body) = response.into_parts();

    if !parts.headers.contains_key(SET_COOKIE) {
        for value in jar.into_response().headers().get_all(SET_COOKIE) {
            parts.headers.append(SET_COOKIE, value.to_owned());
        }
    }

    Response::from_parts(parts, body)
}

async fn guard(state: AuthState, request: Request, next: Next, rejection: Rejection) -> Response {
    let log_in_url = log_in_url_for(&request);
    let Some(local_offset) = get_local_offset(&state.local_timezone) else {
        tracing::error!("invalid timezone {}, sending user to log in", state.local_timezone);
        return rejection.respond(log_in_url);
    };

    let (mut parts, body) = request.into_parts();
    let jar = match PrivateCookieJar::from_request_parts(&mut parts, &state).await {
        Ok(jar) => jar,
        Err(error) => {
            tracing::error!("could not read cookie jar: {error:?}");
            return rejection.respond(log_in_url);
        }
    };
    let Ok(token) = get_token_from_cookies(&jar) else {
        return rejection.respond(log_in_url);
    };
    if !user_exists(&state, token.user_id) {
        return (invalidate_auth_cookie(jar), rejection.respond(log_in_url)).into_response();
    }

    parts.extensions.insert(token.user_id);
    let response = next.run(Request::from_parts(parts, body)).await;

    let jar =
        extend_auth_cookie_duration_if_needed(jar.clone(), SLIDING_SESSION_WINDOW, local_offset)
            .unwrap_or_else(|error| {
                tracing::error!("could not extend session of user {}: {error}", token.user_id);
                jar
            });

    attach_session_cookie(response, jar)
}

/// Middleware function that checks for a valid authorization cookie.
///
/// The user ID is placed into the request and the request is executed
/// normally if the cookie is valid, otherwise a redirect to the log-in page is
/// returned.
///
/// **Note**: Route handlers can use the function argument `Extension(user_id): Extension<UserID>` to receive the user ID.
pub async fn auth_guard(State(state): State<AuthState>, request: Request, next: Next) -> Response {
    guard(state, request, next, Rejection::Redirect).await
}

/// Same as [auth_guard], but responds to unauthenticated htmx requests with
/// an `HX-Redirect` so the whole page navigates to the log-in page.
pub async fn auth_guard_hx(
    State(state): State<AuthState>,
    request: Request,
    next: Next,
) -> Response {
    guard(state, request, next, Rejection::HxRedirect).await
}

/// Middleware for pages that only make sense when logged out, e.g. the
/// log-in page. Logged in users are sent to the dashboard instead.
pub async fn guest_guard(
    State(state): State<AuthState>,
    jar: PrivateCookieJar,
    request: Request,
    next: Next,
) -> Response {
    if current_user(&jar).is_some_and(|user_id| user_exists(&state, user_id)) {
        return Redirect::to(endpoints::DASHBOARD_VIEW).into_response();
    }

    next.run(request).await
}
