//! Defines the endpoint for importing transactions from uploaded CSV files.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, Multipart, State, multipart::Field},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    alert::Alert,
    csv_import::csv::parse_csv,
    transaction::{TransactionBuilder, create_transaction},
    user::UserId,
};

/// The state needed for importing transactions.
#[derive(Debug, Clone)]
pub struct ImportState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for ImportState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Route handler for importing transactions from CSV files.
///
/// All rows from all uploaded files are inserted in one SQL transaction so a
/// failure part way through leaves the database unchanged.
pub async fn import_transactions(
    State(state): State<ImportState>,
    Extension(user_id): Extension<UserId>,
    mut multipart: Multipart,
) -> Result<Response, Response> {
    let mut builders: Vec<TransactionBuilder> = Vec::new();
    let mut skipped_rows = 0;

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(error) => {
                tracing::error!("Could not read multipart form: {error}");
                return Err(Error::MultipartError(error.to_string()).into_alert_response());
            }
        };

        let csv_data = parse_multipart_field(field)
            .await
            .map_err(|error| error.into_alert_response())?;

        let outcome = parse_csv(&csv_data)
            .inspect_err(|error| tracing::debug!("Failed to parse CSV: {error}"))
            .map_err(|error| error.into_alert_response())?;

        builders.extend(outcome.transactions);
        skipped_rows += outcome.skipped_rows;
    }

    if builders.is_empty() {
        return Ok((
            StatusCode::BAD_REQUEST,
            Alert::ErrorSimple {
                message: "No valid transactions found in CSV.".to_owned(),
            }
            .into_html(),
        )
            .into_response());
    }

    let imported_count = builders.len();

    let connection = state.db_connection.lock().map_err(|error| {
        tracing::error!("could not acquire database lock: {error}");
        Error::DatabaseLockError.into_alert_response()
    })?;

    let tx = connection
        .unchecked_transaction()
        .inspect_err(|error| tracing::error!("could not start transaction: {error}"))
        .map_err(|_| {
            Alert::ErrorSimple {
                message: "Could not import transactions".to_owned(),
            }
            .into_response()
        })?;

    for builder in builders {
        create_transaction(builder, user_id, &tx)
            .inspect_err(|error| tracing::error!("Failed to import transactions: {error}"))
            .map_err(|_| {
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Alert::Error {
                        message: "Import failed".to_owned(),
                        details: "An unexpected error occurred, no transactions were imported."
                            .to_owned(),
                    }
                    .into_html(),
                )
                    .into_response()
            })?;
    }

    tx.commit()
        .inspect_err(|error| tracing::error!("could not commit transaction: {error}"))
        .map_err(|_| {
            Alert::ErrorSimple {
                message: "Could not import transactions".to_owned(),
            }
            .into_response()
        })?;

    let details = if skipped_rows == 0 {
        format!("Imported {imported_count} transactions.")
    } else {
        format!("Imported {imported_count} transactions, skipped {skipped_rows} invalid rows.")
    };

    Ok((
        StatusCode::CREATED,
        Alert::Success {
            message: "Import complete".to_owned(),
            details,
        }
        .into_html(),
    )
        .into_response())
}

async fn parse_multipart_field(field: Field<'_>) -> Result<String, Error> {
    if field.content_type() != Some("text/csv") {
        return Err(Error::NotCsv);
    }

    let file_name = match field.file_name() {
        Some(file_name) => file_name.to_owned(),
        None => {
            tracing::error!("Could not get file name from multipart form field: {field:#?}");
            return Err(Error::MultipartError(
                "Could not get file name from multipart form field".to_owned(),
            ));
        }
    };
    let data = match field.text().await {
        Ok(data) => data,
        Err(error) => {
            tracing::error!("Could not read data from multipart form field: {error}");
            return Err(Error::MultipartError(
                "Could not read data from multipart form field.".to_owned(),
            ));
        }
    };

    tracing::debug!("Received file '{}' that is {} bytes", file_name, data.len());

    Ok(data)
}
