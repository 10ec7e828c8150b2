//! Renders the settings page.

use axum::{
    Extension,
    extract::State,
    response::{IntoResponse, Response},
};
use maud::{Markup, html};

use crate::{
    Error,
    alert::Alert,
    auth::UserID,
    endpoints,
    html::{
        BUTTON_DANGER_STYLE, BUTTON_PRIMARY_STYLE, CARD_STYLE, FORM_LABEL_STYLE,
        FORM_TEXT_INPUT_STYLE, LINK_STYLE, PAGE_CONTAINER_STYLE, base_with_alerts,
        loading_spinner,
    },
    navigation::NavBar,
    profile::{Currency, Profile, WeekStart, get_profile},
    settings::SettingsState,
};

fn profile_form(profile: &Profile) -> Markup {
    html! {
        form
            hx-put=(endpoints::PROFILE_API)
            hx-target-error="#alert-container"
            hx-disabled-elt="#save-profile-button"
            class="space-y-4"
        {
            h2 class="text-lg font-semibold" { "Profile" }

            div
            {
                label for="name" class=(FORM_LABEL_STYLE) { "Name" }

                input
                    name="name"
                    id="name"
                    type="text"
                    value=(profile.name)
                    required
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label for="email" class=(FORM_LABEL_STYLE) { "Email" }

                input
                    id="email"
                    type="email"
                    value=(profile.email)
                    disabled
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label for="currency" class=(FORM_LABEL_STYLE) { "Currency" }

                select name="currency" id="currency" class=(FORM_TEXT_INPUT_STYLE)
                {
                    @for currency in Currency::ALL {
                        option value=(currency.code()) selected[currency == profile.currency]
                        {
                            (currency.label())
                        }
                    }
                }
            }

            div
            {
                label for="week_starts_on" class=(FORM_LABEL_STYLE) { "Week starts on" }

                select name="week_starts_on" id="week_starts_on" class=(FORM_TEXT_INPUT_STYLE)
                {
                    @for week_start in WeekStart::ALL {
                        option
                            value=(week_start.as_str())
                            selected[week_start == profile.week_starts_on]
                        {
                            (week_start.label())
                        }
                    }
                }
            }

            div class="flex items-center gap-3"
            {
                input
                    name="notifications"
                    id="notifications"
                    type="checkbox"
                    value="on"
                    checked[profile.notifications]
                    class="h-4 w-4 rounded border-gray-300";

                label for="notifications" class="text-sm text-gray-900 dark:text-white"
                {
                    "Show success notifications"
                }
            }

            button type="submit" id="save-profile-button" class=(BUTTON_PRIMARY_STYLE)
            {
                span class="inline htmx-indicator" { (loading_spinner()) }
                " Save"
            }
        }
    }
}

fn settings_view(profile: &Profile, alerts: &[Alert]) -> Markup {
    let nav_bar = NavBar::new(endpoints::SETTINGS_VIEW).into_html();

    let content = html! {
        (nav_bar)

        div class={ (PAGE_CONTAINER_STYLE) " max-w-screen-md gap-6" }
        {
            h1 class="text-xl font-bold w-full" { "Settings" }

            section class={ (CARD_STYLE) " w-full" }
            {
                (profile_form(profile))
            }

            section class={ (CARD_STYLE) " w-full space-y-2" }
            {
                h2 class="text-lg font-semibold" { "Security" }

                a href=(endpoints::RESET_PASSWORD_VIEW) class=(LINK_STYLE) { "Change password" }
            }

            section class={ (CARD_STYLE) " w-full space-y-2" }
            {
                h2 class="text-lg font-semibold" { "Your data" }

                p class="text-sm" { "Download your transactions and goals as a JSON file." }

                a href=(endpoints::SETTINGS_EXPORT) class=(LINK_STYLE) download { "Export data" }
            }

            section class={ (CARD_STYLE) " w-full space-y-2" }
            {
                h2 class="text-lg font-semibold text-red-600" { "Delete account" }

                p class="text-sm"
                {
                    "Deleting your account removes your profile, transactions and goals for good."
                }

                button
                    hx-delete=(endpoints::ACCOUNT_API)
                    hx-confirm="Are you sure you want to delete your account? This cannot be undone."
                    hx-target-error="#alert-container"
                    class=(BUTTON_DANGER_STYLE)
                {
                    "Delete account"
                }
            }
        }
    };

    base_with_alerts("Settings", &[], &content, alerts)
}

/// Renders the settings page for the logged in user.
pub async fn get_settings_page(
    State(state): State<SettingsState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let profile = {
        let connection = state
            .db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;

        get_profile(user_id, &connection)
            .inspect_err(|error| tracing::error!("could not get profile of user {user_id}: {error}"))?
    };
    let alerts = state
        .notifications
        .drain_visible(user_id, profile.notifications);

    Ok(settings_view(&profile, &alerts).into_response())
}

#[cfg(test)]
mod tests {
    use axum::{
        Extension,
        extract::{FromRef, State},
    };
    use scraper::Selector;

    use crate::{
        endpoints,
        settings::SettingsState,
        test_utils::{
            assert_hx_endpoint, assert_status_ok, assert_valid_html, must_get_form,
            parse_html_document, test_state_with_user,
        },
    };

    use super::get_settings_page;

    #[tokio::test]
    async fn page_shows_profile_form_with_current_values() {
        let (app_state, user_id) = test_state_with_user();

        let response = get_settings_page(
            State(SettingsState::from_ref(&app_state)),
            Extension(user_id),
        )
        .await
        .unwrap();

        assert_status_ok(&response);
        let document = parse_html_document(response).await;
        assert_valid_html(&document);
        let form = must_get_form(&document);
        assert_hx_endpoint(&form, endpoints::PROFILE_API, "hx-put");

        let name = document
            .select(&Selector::parse("input[name=name]").unwrap())
            .next()
            .and_then(|input| input.value().attr("value"));
        assert_eq!(name, Some("Maria"));
        let currency = document
            .select(&Selector::parse("select[name=currency] option[selected]").unwrap())
            .next()
            .and_then(|option| option.value().attr("value"));
        assert_eq!(currency, Some("BRL"));
        assert!(
            document
                .select(&Selector::parse("input[name=notifications][checked]").unwrap())
                .next()
                .is_some()
        );
    }

    #[tokio::test]
    async fn page_links_to_export_and_account_deletion() {
        let (app_state, user_id) = test_state_with_user();

        let response = get_settings_page(
            State(SettingsState::from_ref(&app_state)),
            Extension(user_id),
        )
        .await
        .unwrap();

        let document = parse_html_document(response).await;
        let export = document
            .select(&Selector::parse("a[download]").unwrap())
            .next()
            .and_then(|link| link.value().attr("href"));
        assert_eq!(export, Some(endpoints::SETTINGS_EXPORT));
        let delete = document
            .select(&Selector::parse("button[hx-delete]").unwrap())
            .next()
            .and_then(|button| button.value().attr("hx-delete"));
        assert_eq!(delete, Some(endpoints::ACCOUNT_API));
    }
}
