//! A queue of pending notifications for each user.
//!
//! Handlers push alerts onto the queue after a mutation (e.g. "Goal saved")
//! and the next page the user loads drains the queue into its alert container.
//! The queue lives in [crate::AppState] and reaches handlers through their
//! sub-states, so there is no ambient global.

use std::{
    collections::{HashMap, VecDeque},
    sync::{Arc, Mutex},
};

use crate::{
    alert::{Alert, AlertKind},
    auth::UserID,
};

/// The most notifications kept for a single user, older ones are dropped first.
const MAX_PENDING_NOTIFICATIONS: usize = 10;

/// Pending notifications keyed by user.
#[derive(Debug, Clone, Default)]
pub struct NotificationQueue {
    pending: Arc<Mutex<HashMap<UserID, VecDeque<Alert>>>>,
}

impl NotificationQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `alert` to the end of the queue for `user_id`.
    pub fn push(&self, user_id: UserID, alert: Alert) {
        let mut pending = match self.pending.lock() {
            Ok(pending) => pending,
            Err(error) => {
                tracing::error!("could not acquire notification lock: {error}");
                return;
            }
        };

        let queue = pending.entry(user_id).or_default();
        if queue.len() == MAX_PENDING_NOTIFICATIONS {
            queue.pop_front();
        }
        queue.push_back(alert);
    }

    /// Remove and return every pending notification for `user_id`, oldest first.
    pub fn drain(&self, user_id: UserID) -> Vec<Alert> {
        match self.pending.lock() {
            Ok(mut pending) => pending
                .remove(&user_id)
                .map(Vec::from)
                .unwrap_or_default(),
            Err(error) => {
                tracing::error!("could not acquire notification lock: {error}");
                Vec::new()
            }
        }
    }

    /// Drain the queue for `user_id`, keeping only errors if the user has
    /// turned notifications off.
    pub fn drain_visible(&self, user_id: UserID, notifications_enabled: bool) -> Vec<Alert> {
        self.drain(user_id)
            .into_iter()
            .filter(|alert| notifications_enabled || alert.kind == AlertKind::Error)
            .collect()
    }
}
