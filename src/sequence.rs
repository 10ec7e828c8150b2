//! Discards out-of-date responses to partial page updates.
//!
//! Filter and period selectors send a client-side sequence number with each
//! request. A request is admitted on arrival only if its sequence number is
//! newer than any seen for the same user and view, and its response is only
//! swapped in if no newer request was admitted while it waited for the
//! database. A slow response to an old filter can never overwrite the result
//! of a newer one.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_htmx::{HxReswap, SwapOption};
use maud::{Markup, PreEscaped, html};

use crate::auth::UserID;

/// The views that send sequenced requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SequencedView {
    Dashboard,
    Transactions,
    Cashflow,
    AnalysisReport,
}

/// Tracks the latest sequence number applied for each user and view.
#[derive(Debug, Clone, Default)]
pub struct SequenceGate {
    latest: Arc<Mutex<HashMap<(UserID, SequencedView), u64>>>,
}

impl SequenceGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `seq` as applied and return `true` if it is newer than every
    /// sequence number seen before for `user_id` and `view`.
    ///
    /// Returns `false` for stale or repeated sequence numbers. If the lock is
    /// poisoned, the request is let through since showing a possibly stale
    /// result is better than showing nothing.
    pub fn admit(&self, user_id: UserID, view: SequencedView, seq: u64) -> bool {
        let mut latest = match self.latest.lock() {
            Ok(latest) => latest,
            Err(error) => {
                tracing::error!("could not acquire sequence lock: {error}");
                return true;
            }
        };

        match latest.get(&(user_id, view)) {
            Some(&applied) if seq <= applied => {
                tracing::debug!(
                    "Discarding stale {view:?} request {seq} for user {user_id}, latest is {applied}"
                );
                false
            }
            _ => {
                latest.insert((user_id, view), seq);
                true
            }
        }
    }

    /// Whether `seq` is still the newest sequence number admitted for
    /// `user_id` and `view`.
    ///
    /// If the lock is poisoned, the response is let through as in [Self::admit].
    pub fn is_latest(&self, user_id: UserID, view: SequencedView, seq: u64) -> bool {
        match self.latest.lock() {
            Ok(latest) => latest
                .get(&(user_id, view))
                .is_none_or(|&newest| newest == seq),
            Err(error) => {
                tracing::error!("could not acquire sequence lock: {error}");
                true
            }
        }
    }

    /// Send `response` unless a request newer than `seq` was admitted while
    /// it was being prepared. Requests without a sequence number always go through.
    pub fn respond_if_latest(
        &self,
        user_id: UserID,
        view: SequencedView,
        seq: Option<u64>,
        response: Response,
    ) -> Response {
        match seq {
            Some(seq) if !self.is_latest(user_id, view, seq) => {
                tracing::debug!(
                    "Discarding {view:?} response {seq} for user {user_id}, a newer request was admitted"
                );
                stale_response()
            }
            _ => response,
        }
    }
}

/// The response for a request that lost the race to a newer one.
///
/// htmx leaves the page untouched when told not to swap.
pub fn stale_response() -> Response {
    (HxReswap(SwapOption::None), StatusCode::OK).into_response()
}

/// Attributes a form needs to send a sequence number, for use with `hx-vals`.
pub const SEQUENCE_HX_VALS: &str = "js:{seq: nextRequestSequence()}";

/// Script that generates increasing sequence numbers in the browser.
///
/// Uses the current time so that numbers keep increasing across page loads.
pub fn sequence_script() -> Markup {
    html! {
        script {
            (PreEscaped(
                "let lastRequestSequence = 0;
                function nextRequestSequence() {
                    lastRequestSequence = Math.max(Date.now(), lastRequestSequence + 1);
                    return lastRequestSequence;
                }"
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::response::IntoResponse;
    use axum_htmx::HX_RESWAP;

    use crate::auth::UserID;

    use super::{SequenceGate, SequencedView, stale_response};

    #[test]
    fn admits_increasing_sequence_numbers() {
        let gate = SequenceGate::new();
        let user_id = UserID::new(1);

        assert!(gate.admit(user_id, SequencedView::Dashboard, 1));
        assert!(gate.admit(user_id, SequencedView::Dashboard, 2));
        assert!(gate.admit(user_id, SequencedView::Dashboard, 10));
    }

    #[test]
    fn rejects_stale_and_repeated_sequence_numbers() {
        let gate = SequenceGate::new();
        let user_id = UserID::new(1);
        gate.admit(user_id, SequencedView::Cashflow, 5);

        assert!(!gate.admit(user_id, SequencedView::Cashflow, 4));
        assert!(!gate.admit(user_id, SequencedView::Cashflow, 5));
    }

    #[test]
    fn views_and_users_are_tracked_separately() {
        let gate = SequenceGate::new();
        gate.admit(UserID::new(1), SequencedView::Cashflow, 5);

        assert!(gate.admit(UserID::new(1), SequencedView::Dashboard, 1));
        assert!(gate.admit(UserID::new(2), SequencedView::Cashflow, 1));
    }

    #[test]
    fn earlier_request_is_not_latest_once_a_newer_one_is_admitted() {
        let gate = SequenceGate::new();
        let user_id = UserID::new(1);

        assert!(gate.admit(user_id, SequencedView::Transactions, 1));
        assert!(gate.is_latest(user_id, SequencedView::Transactions, 1));
        assert!(gate.admit(user_id, SequencedView::Transactions, 2));

        assert!(!gate.is_latest(user_id, SequencedView::Transactions, 1));
        assert!(gate.is_latest(user_id, SequencedView::Transactions, 2));
    }

    #[test]
    fn respond_if_latest_replaces_superseded_response() {
        let gate = SequenceGate::new();
        let user_id = UserID::new(1);
        gate.admit(user_id, SequencedView::Dashboard, 1);
        gate.admit(user_id, SequencedView::Dashboard, 2);

        let view = SequencedView::Dashboard;

        let superseded = gate.respond_if_latest(user_id, view, Some(1), "old".into_response());
        let newest = gate.respond_if_latest(user_id, view, Some(2), "new".into_response());
        let unsequenced = gate.respond_if_latest(user_id, view, None, "any".into_response());

        assert_eq!(superseded.headers().get(HX_RESWAP).unwrap(), "none");
        assert!(newest.headers().get(HX_RESWAP).is_none());
        assert!(unsequenced.headers().get(HX_RESWAP).is_none());
    }

    #[test]
    fn stale_response_disables_swap() {
        let response = stale_response();

        assert_eq!(response.headers().get(HX_RESWAP).unwrap(), "none");
    }
}
