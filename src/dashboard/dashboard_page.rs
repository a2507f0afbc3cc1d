//! The route handler and views for the dashboard page.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    dashboard::{
        aggregation::{expenses_by_category, monthly_series, summarize},
        cards::summary_cards_view,
        charts::{
            DashboardChart, charts_script, charts_view, expense_breakdown_chart,
            monthly_overview_chart,
        },
    },
    endpoints,
    html::{HeadElement, base, link},
    navigation::NavBar,
    transaction::get_transactions_for_user,
    user::{UserId, get_user_by_id},
};

/// The state needed for displaying the dashboard page.
#[derive(Debug, Clone)]
pub struct DashboardState {
    /// The database connection for reading transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DashboardState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Display an overview of the user's finances: summary cards and charts
/// derived from their full transaction history.
///
/// All aggregates are recomputed from the current database snapshot on every
/// request, so the page is always consistent with the stored transactions.
pub async fn get_dashboard_page(
    State(state): State<DashboardState>,
    Extension(user_id): Extension<UserId>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let user = get_user_by_id(user_id, &connection)?;
    let transactions = get_transactions_for_user(user_id, &connection)?;

    let nav_bar = NavBar::new(endpoints::DASHBOARD_VIEW);

    if transactions.is_empty() {
        return Ok(dashboard_no_data_view(nav_bar, &user.display_name).into_response());
    }

    let totals = summarize(&transactions);
    let series = monthly_series(&transactions);
    let breakdown = expenses_by_category(&transactions);

    let charts = [
        DashboardChart {
            id: "monthly-overview-chart",
            options: monthly_overview_chart(&series).to_string(),
        },
        DashboardChart {
            id: "expense-breakdown-chart",
            options: expense_breakdown_chart(&breakdown).to_string(),
        },
    ];

    Ok(dashboard_view(nav_bar, &user.display_name, summary_cards_view(&totals), &charts)
        .into_response())
}

fn greeting(display_name: &str) -> Markup {
    html!(
        h1 class="text-2xl font-bold mb-4 w-full"
        {
            "Welcome back, " (display_name) "!"
        }
    )
}

/// Renders the dashboard page when the user has no transactions yet.
fn dashboard_no_data_view(nav_bar: NavBar, display_name: &str) -> Markup {
    let nav_bar = nav_bar.into_html();
    let new_transaction_link = link(endpoints::NEW_TRANSACTION_VIEW, "manually");
    let import_transaction_link = link(endpoints::IMPORT_VIEW, "importing");

    let content = html!(
        (nav_bar)

        div class="flex flex-col items-center px-6 py-8 mx-auto text-gray-900 dark:text-white"
        {
            (greeting(display_name))

            h2 class="text-xl font-bold"
            {
                "Nothing here yet..."
            }

            p
            {
                "Totals and charts will show up here once you add some
                transactions. You can add transactions " (new_transaction_link) "
                or by " (import_transaction_link) " a CSV file."
            }
        }
    );

    base("Dashboard", &[], &content)
}

/// Renders the dashboard with summary cards and charts.
fn dashboard_view(
    nav_bar: NavBar,
    display_name: &str,
    summary_cards: Markup,
    charts: &[DashboardChart],
) -> Markup {
    let nav_bar = nav_bar.into_html();

    let content = html!(
        (nav_bar)

        div
            id="dashboard-content"
            class="flex flex-col items-center px-2 lg:px-6 lg:py-8 mx-auto
                max-w-screen-xl text-gray-900 dark:text-white"
        {
            (greeting(display_name))

            (summary_cards)

            (charts_view(charts))
        }
    );

    let scripts = [
        HeadElement::ScriptLink("/static/echarts.6.0.0.min.js".to_owned()),
        charts_script(charts),
    ];

    base("Dashboard", &scripts, &content)
}

#[cfg(test)]
mod dashboard_page_tests {
    use std::sync::{Arc, Mutex};

    use axum::{Extension, body::Body, extract::State, http::StatusCode, response::Response};
    use rusqlite::Connection;
    use scraper::{Html, Selector};
    use time::macros::date;

    use crate::{
        PasswordHash, endpoints,
        db::initialize,
        transaction::{Transaction, TransactionKind, create_transaction},
        user::{UserId, create_user},
    };

    use super::{DashboardState, get_dashboard_page};

    fn get_test_state() -> (DashboardState, UserId) {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();

        let user = create_user(
            "ava@example.com",
            "Ava",
            PasswordHash::new_unchecked("hunter2"),
            &conn,
        )
        .unwrap();

        (
            DashboardState {
                db_connection: Arc::new(Mutex::new(conn)),
            },
            user.id,
        )
    }

    async fn parse_html(response: Response<Body>) -> Html {
        let body = response.into_body();
        let body = axum::body::to_bytes(body, usize::MAX)
            .await
            .expect("Could not get response body");
        let text = String::from_utf8_lossy(&body).to_string();

        Html::parse_document(&text)
    }

    #[tokio::test]
    async fn dashboard_without_transactions_prompts_user() {
        let (state, user_id) = get_test_state();

        let response = get_dashboard_page(State(state), Extension(user_id))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let document = parse_html(response).await;

        let text = document.root_element().text().collect::<String>();
        assert!(text.contains("Welcome back, Ava!"), "missing greeting in {text}");
        assert!(text.contains("Nothing here yet"), "missing empty state in {text}");

        let link_selector = Selector::parse("a[href]").unwrap();
        let hrefs: Vec<_> = document
            .select(&link_selector)
            .filter_map(|a| a.attr("href"))
            .collect();
        assert!(hrefs.contains(&endpoints::NEW_TRANSACTION_VIEW));
        assert!(hrefs.contains(&endpoints::IMPORT_VIEW));
    }

    #[tokio::test]
    async fn dashboard_with_transactions_shows_cards_and_charts() {
        let (state, user_id) = get_test_state();
        {
            let connection = state.db_connection.lock().unwrap();
            create_transaction(
                Transaction::build(
                    "Salary",
                    100.0,
                    TransactionKind::Income,
                    "Work",
                    date!(2024 - 01 - 05),
                ),
                user_id,
                &connection,
            )
            .unwrap();
            create_transaction(
                Transaction::build(
                    "Groceries",
                    40.0,
                    TransactionKind::Expense,
                    "Food",
                    date!(2024 - 01 - 10),
                ),
                user_id,
                &connection,
            )
            .unwrap();
        }

        let response = get_dashboard_page(State(state), Extension(user_id))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let document = parse_html(response).await;

        let text = document.root_element().text().collect::<String>();
        assert!(text.contains("$100.00"), "missing income total in {text}");
        assert!(text.contains("$40.00"), "missing expense total in {text}");
        assert!(text.contains("$60.00"), "missing balance in {text}");

        for container_id in ["monthly-overview-chart", "expense-breakdown-chart"] {
            let selector = Selector::parse(&format!("div#{container_id}")).unwrap();
            assert!(
                document.select(&selector).next().is_some(),
                "missing chart container {container_id}"
            );
        }
    }

    #[tokio::test]
    async fn dashboard_only_aggregates_own_transactions() {
        let (state, user_id) = get_test_state();
        {
            let connection = state.db_connection.lock().unwrap();
            create_transaction(
                Transaction::build(
                    "Salary",
                    999.0,
                    TransactionKind::Income,
                    "Work",
                    date!(2024 - 01 - 05),
                ),
                UserId::new(42),
                &connection,
            )
            .unwrap();
        }

        let response = get_dashboard_page(State(state), Extension(user_id))
            .await
            .unwrap();

        let document = parse_html(response).await;
        let text = document.root_element().text().collect::<String>();
        assert!(
            text.contains("Nothing here yet"),
            "another user's transactions leaked into the dashboard: {text}"
        );
    }
}
