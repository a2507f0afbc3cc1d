//! The log-in page and the handler for log-in requests.
//!
//! The auth module handles the lower level cookie and token logic, this
//! module only verifies credentials and renders the form.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Query, State},
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
    AppState, Error,
    auth::{invalidate_auth_cookie, normalize_redirect_url, set_auth_cookie},
    endpoints,
    html::{BUTTON_PRIMARY_STYLE, base, link, loading_spinner, log_in_sign_up, password_input, text_input},
    user::{User, get_user_by_email},
};

pub const INVALID_CREDENTIALS_ERROR_MSG: &str = "Incorrect email or password.";

fn log_in_form(email: &str, redirect_url: Option<&str>, error_message: Option<&str>) -> Markup {
    let spinner = loading_spinner();

    html! {
        form
            hx-post=(endpoints::LOG_IN_API)
            hx-indicator="#indicator"
            hx-disabled-elt="#email, #password, #submit-button"
            class="space-y-4 md:space-y-6"
        {
            (text_input("email", "Email", "email", email, "you@example.com", None))
            (password_input("password", "Password", 0, error_message))

            @if let Some(redirect_url) = redirect_url {
                input type="hidden" name="redirect_url" value=(redirect_url);
            }

            button type="submit" id="submit-button" tabindex="0" class=(BUTTON_PRIMARY_STYLE)
            {
                span class="inline htmx-indicator" id="indicator" { (spinner) }
                "Log in"
            }

            p class="text-sm font-light text-gray-500 dark:text-gray-400"
            {
                "Don't have an account yet? "
                (link(endpoints::SIGN_UP_VIEW, "Sign up here"))
            }
        }
    }
}

fn log_in_view(email: &str, redirect_url: Option<&str>, error_message: Option<&str>) -> Markup {
    let form = log_in_form(email, redirect_url, error_message);
    let content = log_in_sign_up("Log in to your account", "Welcome back!", &form);

    base("Log in", &[], &content)
}

/// The query parameters for the log-in page.
#[derive(Debug, Default, Deserialize)]
pub struct LogInQuery {
    /// Where to send the user after a successful log-in. Set by the auth
    /// middleware when an unauthenticated request is redirected here.
    pub redirect_url: Option<String>,
}

/// Display the log-in page.
pub async fn get_log_in_page(Query(query): Query<LogInQuery>) -> Response {
    let redirect_url = query
        .redirect_url
        .as_deref()
        .and_then(normalize_redirect_url);

    log_in_view("", redirect_url.as_deref(), None).into_response()
}

/// The state needed to perform a log-in.
#[derive(Debug, Clone)]
pub struct LogInState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
    /// The duration for which cookies used for authentication are valid.
    pub cookie_duration: Duration,
    /// The database connection for looking up users.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for LogInState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            cookie_duration: state.cookie_duration,
            db_connection: state.db_connection.clone(),
        }
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<LogInState> for Key {
    fn from_ref(state: &LogInState) -> Self {
        state.cookie_key.clone()
    }
}

/// The raw data entered by the user in the log-in form.
///
/// The email and password are stored as plain strings. There is no need for
/// validation here since they will be compared against the email and password
/// in the database, which have been verified.
#[derive(Clone, Serialize, Deserialize)]
pub struct LogInData {
    /// Email entered during log-in.
    pub email: String,
    /// Password entered during log-in.
    pub password: String,
    /// Where to redirect after a successful log-in, if the user was sent to
    /// the log-in page from a protected route.
    pub redirect_url: Option<String>,
}

/// Handler for log-in requests via the POST method.
///
/// On a successful log-in the auth cookie is set and the client is redirected
/// to the page they originally requested, or the dashboard. Otherwise the
/// form is re-rendered with a generic error message so the user can retry.
pub async fn post_log_in(
    State(state): State<LogInState>,
    jar: PrivateCookieJar,
    Form(user_data): Form<LogInData>,
) -> Response {
    let redirect_url = user_data
        .redirect_url
        .as_deref()
        .and_then(normalize_redirect_url);

    let user: User = {
        let connection = match state.db_connection.lock() {
            Ok(connection) => connection,
            Err(error) => {
                tracing::error!("could not acquire database lock: {error}");
                return log_in_error_response(&user_data.email, redirect_url.as_deref(), INTERNAL_ERROR_MSG);
            }
        };

        match get_user_by_email(&user_data.email, &connection) {
            Ok(user) => user,
            Err(Error::NotFound) => {
                return log_in_error_response(
                    &user_data.email,
                    redirect_url.as_deref(),
                    INVALID_CREDENTIALS_ERROR_MSG,
                );
            }
            Err(error) => {
                tracing::error!("Unhandled error while verifying credentials: {error}");
                return log_in_error_response(&user_data.email, redirect_url.as_deref(), INTERNAL_ERROR_MSG);
            }
        }
    };

    let is_password_valid = match user.password_hash.verify(&user_data.password) {
        Ok(is_password_valid) => is_password_valid,
        Err(error) => {
            tracing::error!("Unhandled error while verifying credentials: {error}");
            return log_in_error_response(&user_data.email, redirect_url.as_deref(), INTERNAL_ERROR_MSG);
        }
    };

    if !is_password_valid {
        return log_in_error_response(
            &user_data.email,
            redirect_url.as_deref(),
            INVALID_CREDENTIALS_ERROR_MSG,
        );
    }

    let redirect_target = redirect_url.unwrap_or_else(|| endpoints::DASHBOARD_VIEW.to_owned());

    set_auth_cookie(jar.clone(), user.id, state.cookie_duration)
        .map(|updated_jar| (StatusCode::SEE_OTHER, HxRedirect(redirect_target), updated_jar))
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

const INTERNAL_ERROR_MSG: &str = "An internal error occurred. Please try again later.";

fn log_in_error_response(email: &str, redirect_url: Option<&str>, error_message: &str) -> Response {
    (
        StatusCode::OK,
        log_in_form(email, redirect_url, Some(error_message)),
    )
        .into_response()
}

#[cfg(test)]
mod log_in_page_tests {
    use axum::extract::Query;
    use scraper::{Html, Selector};

    use crate::endpoints;

    use super::{LogInQuery, get_log_in_page};

    async fn get_page_document(query: LogInQuery) -> Html {
        let response = get_log_in_page(Query(query)).await;
        let body = response.into_body();
        let body = axum::body::to_bytes(body, usize::MAX).await.unwrap();
        let text = String::from_utf8_lossy(&body).to_string();

        Html::parse_document(&text)
    }

    #[tokio::test]
    async fn log_in_page_displays_form() {
        let document = get_page_document(LogInQuery::default()).await;

        let form_selector = Selector::parse("form").unwrap();
        let forms: Vec<_> = document.select(&form_selector).collect();
        assert_eq!(forms.len(), 1, "want 1 form, got {}", forms.len());

        let form = forms[0];
        assert_eq!(form.value().attr("hx-post"), Some(endpoints::LOG_IN_API));

        for selector_string in ["input[type=email]", "input[type=password]", "button[type=submit]"]
        {
            let selector = Selector::parse(selector_string).unwrap();
            assert_eq!(
                form.select(&selector).count(),
                1,
                "want 1 element matching {selector_string}"
            );
        }

        let link_selector = Selector::parse("a[href]").unwrap();
        let hrefs: Vec<_> = form
            .select(&link_selector)
            .filter_map(|a| a.attr("href"))
            .collect();
        assert!(
            hrefs.contains(&endpoints::SIGN_UP_VIEW),
            "missing sign-up link in {hrefs:?}"
        );
    }

    #[tokio::test]
    async fn log_in_page_embeds_safe_redirect_url() {
        let document = get_page_document(LogInQuery {
            redirect_url: Some("/transactions?search=rent".to_owned()),
        })
        .await;

        let selector = Selector::parse("input[name=redirect_url]").unwrap();
        let input = document
            .select(&selector)
            .next()
            .expect("missing hidden redirect_url input");
        assert_eq!(input.value().attr("value"), Some("/transactions?search=rent"));
    }

    #[tokio::test]
    async fn log_in_page_drops_unsafe_redirect_url() {
        let document = get_page_document(LogInQuery {
            redirect_url: Some("https://evil.example.com/".to_owned()),
        })
        .await;

        let selector = Selector::parse("input[name=redirect_url]").unwrap();
        assert!(
            document.select(&selector).next().is_none(),
            "unsafe redirect URL must not be embedded in the form"
        );
    }
}

#[cfg(test)]
mod log_in_tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        body::Body,
        extract::State,
        http::{Response, StatusCode},
    };
    use axum_extra::extract::{Form, PrivateCookieJar};
    use axum_htmx::HX_REDIRECT;
    use rusqlite::Connection;
    use sha2::{Digest, Sha512};
    use time::Duration;

    use crate::{
        PasswordHash, ValidatedPassword,
        auth::COOKIE_TOKEN,
        endpoints,
        user::{create_user, create_user_table},
    };

    use super::{INVALID_CREDENTIALS_ERROR_MSG, LogInData, LogInState, post_log_in};

    const TEST_PASSWORD: &str = "hunter2";

    fn get_test_state(with_user: bool) -> LogInState {
        let connection =
            Connection::open_in_memory().expect("Could not open in-memory SQLite database");
        create_user_table(&connection).expect("Could not create user table");

        if with_user {
            let password_hash =
                PasswordHash::new(ValidatedPassword::new_unchecked(TEST_PASSWORD), 4)
                    .expect("Could not hash test password");
            create_user("test@test.com", "Test", password_hash, &connection)
                .expect("Could not create test user");
        }

        LogInState {
            cookie_key: axum_extra::extract::cookie::Key::from(&Sha512::digest("foobar")),
            cookie_duration: Duration::minutes(5),
            db_connection: Arc::new(Mutex::new(connection)),
        }
    }

    async fn new_log_in_request(state: LogInState, form: LogInData) -> Response<Body> {
        let jar = PrivateCookieJar::new(state.cookie_key.clone());

        post_log_in(State(state), jar, Form(form)).await
    }

    #[tokio::test]
    async fn log_in_succeeds_with_valid_credentials() {
        let state = get_test_state(true);

        let response = new_log_in_request(
            state,
            LogInData {
                email: "test@test.com".to_string(),
                password: TEST_PASSWORD.to_string(),
                redirect_url: None,
            },
        )
        .await;

        assert_hx_redirect(&response, endpoints::DASHBOARD_VIEW);
        assert_set_cookie(&response);
    }

    #[tokio::test]
    async fn log_in_honors_safe_redirect_url() {
        let state = get_test_state(true);

        let response = new_log_in_request(
            state,
            LogInData {
                email: "test@test.com".to_string(),
                password: TEST_PASSWORD.to_string(),
                redirect_url: Some("/transactions?kind=expense".to_owned()),
            },
        )
        .await;

        assert_hx_redirect(&response, "/transactions?kind=expense");
    }

    #[tokio::test]
    async fn log_in_ignores_unsafe_redirect_url() {
        let state = get_test_state(true);

        let response = new_log_in_request(
            state,
            LogInData {
                email: "test@test.com".to_string(),
                password: TEST_PASSWORD.to_string(),
                redirect_url: Some("https://evil.example.com/".to_owned()),
            },
        )
        .await;

        assert_hx_redirect(&response, endpoints::DASHBOARD_VIEW);
    }

    #[tokio::test]
    async fn log_in_fails_with_incorrect_email() {
        let state = get_test_state(false);

        let response = new_log_in_request(
            state,
            LogInData {
                email: "wrong@email.com".to_string(),
                password: TEST_PASSWORD.to_string(),
                redirect_url: None,
            },
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_body_contains_message(response, INVALID_CREDENTIALS_ERROR_MSG).await;
    }

    #[tokio::test]
    async fn log_in_fails_with_incorrect_password() {
        let state = get_test_state(true);

        let response = new_log_in_request(
            state,
            LogInData {
                email: "test@test.com".to_string(),
                password: "wrongpassword".to_string(),
                redirect_url: None,
            },
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_body_contains_message(response, INVALID_CREDENTIALS_ERROR_MSG).await;
    }

    #[track_caller]
    fn assert_hx_redirect(response: &Response<Body>, want_location: &str) {
        let redirect_location = response.headers().get(HX_REDIRECT).unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(redirect_location, want_location);
    }

    #[track_caller]
    fn assert_set_cookie(response: &Response<Body>) {
        let found = response
            .headers()
            .get_all(axum::http::header::SET_COOKIE)
            .iter()
            .any(|header| {
                header
                    .to_str()
                    .map(|value| value.starts_with(COOKIE_TOKEN))
                    .unwrap_or(false)
            });

        assert!(found, "could not find '{COOKIE_TOKEN}' cookie in response");
    }

    async fn assert_body_contains_message(response: Response<Body>, message: &str) {
        let body = response.into_body();
        let body = axum::body::to_bytes(body, usize::MAX).await.unwrap();
        let text = String::from_utf8_lossy(&body).to_string();

        assert!(
            text.contains(message),
            "response body should contain the text '{message}' but got {text}"
        );
    }
}
