//! Downloads everything the user has recorded as JSON.

use axum::{
    Extension,
    extract::State,
    response::Response,
};
use time::OffsetDateTime;

use crate::{
    Error,
    auth::UserID,
    export::{DataExport, ExportUser, JSON_CONTENT_TYPE, attachment_response},
    goal::get_goals,
    profile::get_profile,
    settings::SettingsState,
    timezone::local_today,
    transaction::{TransactionQuery, query_transactions},
};

pub async fn export_data_endpoint(
    State(state): State<SettingsState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let today = local_today(&state.local_timezone)?;

    let (profile, transactions, goals) = {
        let connection = state
            .db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;

        let profile = get_profile(user_id, &connection)?;
        let transactions = query_transactions(user_id, &TransactionQuery::default(), &connection)
            .inspect_err(|error| {
                tracing::error!("could not get transactions of user {user_id}: {error}")
            })?;
        let goals = get_goals(user_id, &connection)
            .inspect_err(|error| tracing::error!("could not get goals of user {user_id}: {error}"))?;

        (profile, transactions, goals)
    };

    let json = DataExport {
        transactions: &transactions,
        goals: &goals,
        export_date: OffsetDateTime::now_utc(),
        user: ExportUser {
            name: &profile.name,
            email: &profile.email,
        },
    }
    .to_json()
    .inspect_err(|error| tracing::error!("could not export data of user {user_id}: {error}"))?;

    Ok(attachment_response(
        JSON_CONTENT_TYPE,
        &format!("zard-finance-export-{today}.json"),
        json,
    ))
}
