//! Transactions: the income and expenses a user records.
//!
//! This module contains:
//! - The `Transaction` model, `NewTransaction` DTO and the store functions
//! - Filtered reads used by the pages and reports
//! - The transactions table shared with the dashboard and cash flow pages
//! - Route handlers for listing, creating, editing and deleting transactions

use std::sync::{Arc, Mutex};

use axum::extract::FromRef;
use rusqlite::Connection;

use crate::{AppState, notification::NotificationQueue, sequence::SequenceGate};

mod core;
mod create_endpoint;
mod create_page;
mod delete_endpoint;
mod edit_endpoint;
mod edit_page;
mod filter;
mod form;
mod query;
mod table;
mod transactions_page;

pub use core::{
    Category, NewTransaction, Transaction, TransactionType, create_transaction,
    create_transaction_table,
};
pub use create_endpoint::create_transaction_endpoint;
pub use create_page::get_create_transaction_page;
pub use delete_endpoint::delete_transaction_endpoint;
pub use edit_endpoint::edit_transaction_endpoint;
pub use edit_page::get_edit_transaction_page;
pub use filter::{category_filter_select, type_filter_select};
pub use query::{SortOrder, TransactionQuery, query_transactions};
pub use table::{RowActions, transactions_table};
pub use transactions_page::{filter_transactions_endpoint, get_transactions_page};

#[cfg(test)]
pub use core::count_transactions;

/// The state needed by the transaction pages and endpoints.
#[derive(Debug, Clone)]
pub struct TransactionState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "America/Sao_Paulo".
    pub local_timezone: String,
    pub notifications: NotificationQueue,
    pub sequences: SequenceGate,
}

impl FromRef<AppState> for TransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
            notifications: state.notifications.clone(),
            sequences: state.sequences.clone(),
        }
    }
}
