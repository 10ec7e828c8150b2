//! The cash flow page: a month's income and expenses, with charts, a
//! comparison against the previous month and a CSV export.

use std::sync::{Arc, Mutex};

use axum::extract::FromRef;
use rusqlite::Connection;

use crate::{AppState, notification::NotificationQueue, sequence::SequenceGate};

mod handlers;
mod period;

pub use handlers::{export_cashflow_csv, get_cashflow_page, update_cashflow_endpoint};
pub use period::{MonthPeriod, month_name};

#[derive(Debug, Clone)]
pub struct CashflowState {
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, used to pick the current month.
    pub local_timezone: String,
    pub notifications: NotificationQueue,
    pub sequences: SequenceGate,
}

impl FromRef<AppState> for CashflowState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
            notifications: state.notifications.clone(),
            sequences: state.sequences.clone(),
        }
    }
}
