//! Dashboard module
//!
//! Provides an overview page with totals, insights and the most recent
//! transactions, filterable by transaction type and category.

use std::sync::{Arc, Mutex};

use axum::extract::FromRef;
use rusqlite::Connection;

use crate::{AppState, notification::NotificationQueue, sequence::SequenceGate};

mod cards;
mod handlers;

pub use handlers::{filter_dashboard_endpoint, get_dashboard_page};

/// The state needed for displaying the dashboard page.
#[derive(Debug, Clone)]
pub struct DashboardState {
    /// The database connection for reading transactions.
    pub db_connection: Arc<Mutex<Connection>>,
    pub notifications: NotificationQueue,
    pub sequences: SequenceGate,
}

impl FromRef<AppState> for DashboardState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            notifications: state.notifications.clone(),
            sequences: state.sequences.clone(),
        }
    }
}
