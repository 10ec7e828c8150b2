//! Saves changes to the user's profile.

use axum::{
    Extension,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::Form;
use axum_htmx::HxRedirect;
use serde::Deserialize;

use crate::{
    Error,
    alert::Alert,
    auth::UserID,
    endpoints,
    profile::{Currency, ProfileUpdate, WeekStart, update_profile},
    settings::SettingsState,
};

/// The raw profile form. An unchecked checkbox is not sent at all.
#[derive(Debug, Deserialize)]
pub struct ProfileForm {
    pub name: String,
    pub currency: String,
    #[serde(default)]
    pub notifications: Option<String>,
    #[serde(default)]
    pub week_starts_on: Option<String>,
}

impl ProfileForm {
    fn validate(&self) -> Result<ProfileUpdate, Error> {
        let currency: Currency = self.currency.parse()?;
        let week_starts_on = match self.week_starts_on.as_deref() {
            None | Some("") => WeekStart::default(),
            Some(raw) => raw.parse()?,
        };

        ProfileUpdate::new(
            &self.name,
            currency,
            self.notifications.is_some(),
            week_starts_on,
        )
    }
}

pub async fn update_profile_endpoint(
    State(state): State<SettingsState>,
    Extension(user_id): Extension<UserID>,
    Form(form): Form<ProfileForm>,
) -> Response {
    let update = match form.validate() {
        Ok(update) => update,
        Err(error) => {
            tracing::warn!("rejected profile update for user {user_id}: {error}");
            return error.into_alert_response();
        }
    };

    let connection = match state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)
    {
        Ok(connection) => connection,
        Err(error) => return error.into_alert_response(),
    };

    if let Err(error) = update_profile(user_id, &update, &connection) {
        tracing::error!("could not update profile of user {user_id}: {error}");
        return error.into_alert_response();
    }

    state.notifications.push(
        user_id,
        Alert::success("Settings saved", "Your preferences have been updated."),
    );

    (
        HxRedirect(endpoints::SETTINGS_VIEW.to_owned()),
        StatusCode::SEE_OTHER,
    )
        .into_response()
}
