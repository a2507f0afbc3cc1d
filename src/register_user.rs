//! The sign-up page and the endpoint for creating a new account.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::{Form, PrivateCookieJar, cookie::Key};
use axum_htmx::HxRedirect;
use maud::{Markup, html};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use time::Duration;

use crate::{
    AppState, Error, PasswordHash, ValidatedPassword,
    auth::{invalidate_auth_cookie, set_auth_cookie},
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, base, link, loading_spinner,
        log_in_sign_up, password_input, text_input,
    },
    password::MIN_PASSWORD_LENGTH,
    user::create_user,
};

/// The values the user has entered so far, fed back into the form when
/// validation fails so nothing has to be retyped.
#[derive(Debug, Default)]
struct SignUpFormData {
    display_name: String,
    email: String,
    display_name_error: Option<String>,
    email_error: Option<String>,
    password_error: Option<String>,
    confirm_password_error: Option<String>,
}

fn sign_up_form(data: &SignUpFormData) -> Markup {
    let spinner = loading_spinner();

    html! {
        form
            hx-post=(endpoints::USERS)
            hx-indicator="#indicator"
            hx-disabled-elt="#display_name, #email, #password, #confirm_password, #submit-button"
            class="space-y-4 md:space-y-6"
        {
            (text_input(
                "display_name",
                "Full Name",
                "text",
                &data.display_name,
                "e.g. Ava Smith",
                data.display_name_error.as_deref(),
            ))
            (text_input(
                "email",
                "Email",
                "email",
                &data.email,
                "you@example.com",
                data.email_error.as_deref(),
            ))
            (password_input(
                "password",
                "Password",
                MIN_PASSWORD_LENGTH as u8,
                data.password_error.as_deref(),
            ))
            (confirm_password_input(data.confirm_password_error.as_deref()))

            button type="submit" id="submit-button" tabindex="0" class=(BUTTON_PRIMARY_STYLE)
            {
                span class="inline htmx-indicator" id="indicator" { (spinner) }
                "Sign up"
            }

            p class="text-sm font-light text-gray-500 dark:text-gray-400"
            {
                "Already have an account? "
                (link(endpoints::LOG_IN_VIEW, "Log in here"))
            }
        }
    }
}

fn confirm_password_input(error_message: Option<&str>) -> Markup {
    html! {
        div
        {
            label
                for="confirm_password"
                class=(FORM_LABEL_STYLE)
            {
                "Confirm Password"
            }

            input
                type="password"
                name="confirm_password"
                id="confirm_password"
                placeholder="••••••••"
                class=(FORM_TEXT_INPUT_STYLE)
                required
                minlength=(MIN_PASSWORD_LENGTH)
                autofocus[error_message.is_some()];

            @if let Some(error_message) = error_message
            {
                p class="text-red-500 text-base" { (error_message) }
            }
        }
    }
}

fn sign_up_view(data: &SignUpFormData) -> Markup {
    let form = sign_up_form(data);
    let content = log_in_sign_up(
        "Create an account",
        "Track your income and expenses in one place.",
        &form,
    );

    base("Sign up", &[], &content)
}

/// Display the sign-up page.
pub async fn get_sign_up_page() -> Response {
    sign_up_view(&SignUpFormData::default()).into_response()
}

/// The state needed for creating a new user.
#[derive(Debug, Clone)]
pub struct RegistrationState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
    /// The duration for which cookies used for authentication are valid.
    pub cookie_duration: Duration,
    /// The database connection for creating users.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for RegistrationState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            cookie_duration: state.cookie_duration,
            db_connection: state.db_connection.clone(),
        }
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<RegistrationState> for Key {
    fn from_ref(state: &RegistrationState) -> Self {
        state.cookie_key.clone()
    }
}

/// The raw data entered by the user in the sign-up form.
#[derive(Clone, Serialize, Deserialize)]
pub struct RegisterForm {
    /// The name shown in greetings on the dashboard.
    pub display_name: String,
    /// The email address the user will sign in with.
    pub email: String,
    /// The chosen password.
    pub password: String,
    /// Confirmation of the chosen password, must match `password`.
    pub confirm_password: String,
}

/// Handler for sign-up requests via the POST method.
///
/// All validation runs before anything touches the database. On success the
/// user is created, logged in with an auth cookie, and redirected to the
/// dashboard. On failure the form is re-rendered with field errors and the
/// entered name and email preserved.
pub async fn register_user(
    State(state): State<RegistrationState>,
    jar: PrivateCookieJar,
    Form(user_data): Form<RegisterForm>,
) -> Response {
    let display_name = user_data.display_name.trim();
    let email = user_data.email.trim();

    let mut form_data = SignUpFormData {
        display_name: display_name.to_owned(),
        email: email.to_owned(),
        ..Default::default()
    };

    if display_name.is_empty() {
        form_data.display_name_error = Some(Error::EmptyField("full name").to_string());
        return sign_up_error_response(&form_data);
    }

    if email.is_empty() || !email.contains('@') {
        form_data.email_error = Some("Enter a valid email address.".to_owned());
        return sign_up_error_response(&form_data);
    }

    let validated_password = match ValidatedPassword::new(&user_data.password) {
        Ok(password) => password,
        Err(error) => {
            form_data.password_error = Some(error.to_string());
            return sign_up_error_response(&form_data);
        }
    };

    if user_data.password != user_data.confirm_password {
        form_data.confirm_password_error = Some("Passwords do not match.".to_owned());
        return sign_up_error_response(&form_data);
    }

    let password_hash = match PasswordHash::new(validated_password, PasswordHash::DEFAULT_COST) {
        Ok(hash) => hash,
        Err(error) => {
            tracing::error!("could not hash password: {error}");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                HxRedirect(endpoints::INTERNAL_ERROR_VIEW.to_owned()),
                (),
            )
                .into_response();
        }
    };

    let user = {
        let connection = match state.db_connection.lock() {
            Ok(connection) => connection,
            Err(error) => {
                tracing::error!("could not acquire database lock: {error}");
                return (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    HxRedirect(endpoints::INTERNAL_ERROR_VIEW.to_owned()),
                    (),
                )
                    .into_response();
            }
        };

        match create_user(email, display_name, password_hash, &connection) {
            Ok(user) => user,
            Err(Error::DuplicateEmail) => {
                form_data.email_error = Some(Error::DuplicateEmail.to_string());
                return sign_up_error_response(&form_data);
            }
            Err(error) => {
                tracing::error!("could not create user: {error}");
                return (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    HxRedirect(endpoints::INTERNAL_ERROR_VIEW.to_owned()),
                    (),
                )
                    .into_response();
            }
        }
    };

    set_auth_cookie(jar.clone(), user.id, state.cookie_duration)
        .map(|updated_jar| {
            (
                StatusCode::SEE_OTHER,
                HxRedirect(endpoints::DASHBOARD_VIEW.to_owned()),
                updated_jar,
            )
        })
        .map_err(|err| {
            tracing::error!("Error setting auth cookie: {err}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                HxRedirect(endpoints::INTERNAL_ERROR_VIEW.to_owned()),
                invalidate_auth_cookie(jar),
            )
        })
        .into_response()
}

fn sign_up_error_response(form_data: &SignUpFormData) -> Response {
    (StatusCode::OK, sign_up_form(form_data)).into_response()
}
