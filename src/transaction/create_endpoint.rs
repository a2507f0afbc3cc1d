//! Defines the endpoint for recording a new transaction.
use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
// Must use axum_extra's Form since that parses an empty string as None instead
// of crashing like axum::Form.
use axum_extra::extract::Form;
use axum_htmx::HxRedirect;
use rusqlite::Connection;
use serde::Deserialize;
use time::Date;

use crate::{
    AppState, Error, endpoints,
    transaction::{Transaction, TransactionKind, core::create_transaction},
    user::UserId,
};

/// The state needed to record a transaction.
#[derive(Debug, Clone)]
pub struct CreateTransactionState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CreateTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The form data for recording a transaction.
#[derive(Debug, Deserialize)]
pub struct TransactionForm {
    /// A short label for what the transaction was.
    pub name: String,
    /// The value of the transaction in dollars.
    pub amount: f64,
    /// Whether money was earned or spent.
    pub kind: TransactionKind,
    /// A free text grouping label.
    pub category: String,
    /// The date when the transaction occurred.
    pub date: Date,
}

/// A route handler for recording a new transaction, redirects to the
/// transactions view on success.
pub async fn create_transaction_endpoint(
    State(state): State<CreateTransactionState>,
    Extension(user_id): Extension<UserId>,
    Form(form): Form<TransactionForm>,
) -> Response {
    if form.name.trim().is_empty() {
        return Error::EmptyField("name").into_alert_response();
    }

    if form.category.trim().is_empty() {
        return Error::EmptyField("category").into_alert_response();
    }

    let builder = Transaction::build(
        form.name.trim(),
        form.amount,
        form.kind,
        form.category.trim(),
        form.date,
    );

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    if let Err(error) = create_transaction(builder, user_id, &connection) {
        tracing::error!("could not create transaction: {error}");

        return error.into_alert_response();
    }

    (
        HxRedirect(endpoints::TRANSACTIONS_VIEW.to_owned()),
        StatusCode::SEE_OTHER,
    )
        .into_response()
}
