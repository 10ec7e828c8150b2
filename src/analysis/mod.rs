//! The analysis page: savings indicators for the current month and a
//! financial report grouped by month or year.

use std::sync::{Arc, Mutex};

use axum::extract::FromRef;
use rusqlite::Connection;

use crate::{AppState, notification::NotificationQueue, sequence::SequenceGate};

mod handlers;
mod report;

pub use handlers::{export_report_csv, get_analysis_page, update_report_endpoint};

#[derive(Debug, Clone)]
pub struct AnalysisState {
    pub db_connection: Arc<Mutex<Connection>>,
    pub local_timezone: String,
    pub notifications: NotificationQueue,
    pub sequences: SequenceGate,
}

impl FromRef<AppState> for AnalysisState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
            notifications: state.notifications.clone(),
            sequences: state.sequences.clone(),
        }
    }
}
