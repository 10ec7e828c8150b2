//! The settings page: profile preferences, data export and account deletion.

use std::sync::{Arc, Mutex};

use axum::extract::FromRef;
use rusqlite::Connection;

use crate::{AppState, notification::NotificationQueue};

mod delete_endpoint;
mod export_endpoint;
mod profile_endpoint;
mod settings_page;

pub use delete_endpoint::delete_account_endpoint;
pub use export_endpoint::export_data_endpoint;
pub use profile_endpoint::update_profile_endpoint;
pub use settings_page::get_settings_page;

#[derive(Debug, Clone)]
pub struct SettingsState {
    pub db_connection: Arc<Mutex<Connection>>,
    pub local_timezone: String,
    pub notifications: NotificationQueue,
}

impl FromRef<AppState> for SettingsState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
            notifications: state.notifications.clone(),
        }
    }
}
