//! Defines the endpoint for downloading transactions as a CSV file.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, Query, State},
    http::header::{CONTENT_DISPOSITION, CONTENT_TYPE},
    response::{IntoResponse, Response},
};
use rusqlite::Connection;
use time::OffsetDateTime;

use crate::{
    AppState, Error,
    csv_import::write_csv,
    user::UserId,
};

use super::{
    core::get_transactions_for_user,
    filter::{TableQuery, apply_table_query},
};

/// The state needed to export transactions.
#[derive(Debug, Clone)]
pub struct ExportTransactionsState {
    /// The database connection for reading transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for ExportTransactionsState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler that responds with a CSV file of the user's transactions.
///
/// The query string uses the same format as the transactions page, so the
/// export contains exactly the rows the user is looking at, in the same
/// order.
pub async fn export_transactions_endpoint(
    State(state): State<ExportTransactionsState>,
    Extension(user_id): Extension<UserId>,
    Query(query): Query<TableQuery>,
) -> Result<Response, Error> {
    let transactions = {
        let connection = state
            .db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;

        get_transactions_for_user(user_id, &connection)?
    };

    let transactions = apply_table_query(transactions, &query);
    let csv = write_csv(&transactions)?;

    let file_name = format!("transactions-{}.csv", OffsetDateTime::now_utc().date());

    Ok((
        [
            (CONTENT_TYPE, "text/csv; charset=utf-8".to_owned()),
            (
                CONTENT_DISPOSITION,
                format!("attachment; filename=\"{file_name}\""),
            ),
        ],
        csv,
    )
        .into_response())
}
