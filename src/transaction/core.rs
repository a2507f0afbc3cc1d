//! Defines the core data models and database queries for transactions.

use std::fmt::Display;

use rusqlite::{
    Connection, Row,
    types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef},
};
use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};

use crate::{
    Error,
    database_id::TransactionId,
    user::UserId,
};

// ============================================================================
// MODELS
// ============================================================================

/// Whether a transaction adds to or subtracts from the user's balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Income,
    Expense,
}

impl TransactionKind {
    /// The string stored in the database and used in CSV files.
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Income => "income",
            TransactionKind::Expense => "expense",
        }
    }

    /// Parse a kind from its lowercase string form.
    pub fn from_str_opt(value: &str) -> Option<Self> {
        match value {
            "income" => Some(TransactionKind::Income),
            "expense" => Some(TransactionKind::Expense),
            _ => None,
        }
    }
}

impl Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl ToSql for TransactionKind {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for TransactionKind {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let text = value.as_str()?;

        TransactionKind::from_str_opt(text)
            .ok_or_else(|| FromSqlError::Other(format!("unknown transaction kind {text}").into()))
    }
}

/// An event where money was either spent or earned.
///
/// To create a new `Transaction`, use [Transaction::build].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// The ID of the transaction.
    pub id: TransactionId,
    /// The ID of the user who recorded this transaction.
    pub user_id: UserId,
    /// A short label for what the transaction was, e.g. "Rent", "Salary".
    pub name: String,
    /// The amount of money spent or earned in this transaction.
    ///
    /// Always zero or greater. The direction of the money flow is carried by
    /// `kind`, not by the sign of the amount.
    pub amount: f64,
    /// Whether the transaction is income or an expense.
    pub kind: TransactionKind,
    /// A free text grouping label, e.g. "Groceries", "Transport".
    pub category: String,
    /// When the transaction happened.
    pub date: Date,
    /// When the transaction was recorded. Used to order listings so that the
    /// most recently recorded transaction comes first.
    pub created_at: OffsetDateTime,
}

impl Transaction {
    /// Create a new transaction.
    ///
    /// Shortcut for [TransactionBuilder] for discoverability.
    pub fn build(
        name: &str,
        amount: f64,
        kind: TransactionKind,
        category: &str,
        date: Date,
    ) -> TransactionBuilder {
        TransactionBuilder {
            name: name.to_owned(),
            amount,
            kind,
            category: category.to_owned(),
            date,
        }
    }
}

/// A builder holding the user supplied fields of a [Transaction] before it is
/// inserted into the database.
///
/// The ID and creation timestamp are assigned by [create_transaction].
#[derive(Debug, PartialEq, Clone)]
pub struct TransactionBuilder {
    /// A short label for what the transaction was.
    pub name: String,
    /// The monetary amount of the transaction. Must be zero or greater.
    pub amount: f64,
    /// Whether the transaction is income or an expense.
    pub kind: TransactionKind,
    /// A free text grouping label.
    pub category: String,
    /// The date when the transaction occurred.
    pub date: Date,
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

/// Create a new transaction in the database from a builder.
///
/// # Errors
/// This function will return a:
/// - [Error::NegativeAmount] if the builder's amount is below zero,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_transaction(
    builder: TransactionBuilder,
    user_id: UserId,
    connection: &Connection,
) -> Result<Transaction, Error> {
    if builder.amount < 0.0 {
        return Err(Error::NegativeAmount(builder.amount));
    }

    let transaction = connection
        .prepare(
            "INSERT INTO \"transaction\" (user_id, name, amount, kind, category, date, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
             RETURNING id, user_id, name, amount, kind, category, date, created_at",
        )?
        .query_row(
            (
                user_id.as_i64(),
                builder.name,
                builder.amount,
                builder.kind,
                builder.category,
                builder.date,
                OffsetDateTime::now_utc(),
            ),
            map_transaction_row,
        )?;

    Ok(transaction)
}

/// Retrieve all transactions recorded by `user_id`, most recently recorded
/// first.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is some SQL error.
pub fn get_transactions_for_user(
    user_id: UserId,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    connection
        .prepare(
            "SELECT id, user_id, name, amount, kind, category, date, created_at
             FROM \"transaction\" WHERE user_id = :user_id
             ORDER BY created_at DESC, id DESC",
        )?
        .query_map(&[(":user_id", &user_id.as_i64())], map_transaction_row)?
        .map(|row| row.map_err(Error::from))
        .collect()
}

/// Delete the transaction with `id` if it was recorded by `user_id`.
///
/// Scoping the delete to the user prevents one user from deleting another
/// user's transactions by guessing IDs.
///
/// # Errors
/// This function will return a:
/// - [Error::DeleteMissingTransaction] if no matching transaction exists,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn delete_transaction(
    id: TransactionId,
    user_id: UserId,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_deleted = connection.execute(
        "DELETE FROM \"transaction\" WHERE id = ?1 AND user_id = ?2",
        (id, user_id.as_i64()),
    )?;

    match rows_deleted {
        0 => Err(Error::DeleteMissingTransaction),
        _ => Ok(()),
    }
}

/// Create the transaction table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS \"transaction\" (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL,
                name TEXT NOT NULL,
                amount REAL NOT NULL,
                kind TEXT NOT NULL,
                category TEXT NOT NULL,
                date TEXT NOT NULL,
                created_at TEXT NOT NULL,
                FOREIGN KEY(user_id) REFERENCES user(id) ON DELETE CASCADE
                )",
        (),
    )?;

    // Ensure the sequence starts at 1
    connection.execute(
        "INSERT OR IGNORE INTO sqlite_sequence (name, seq) VALUES ('transaction', 0)",
        (),
    )?;

    // Index used by the listing and dashboard queries.
    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_transaction_user_created
            ON \"transaction\"(user_id, created_at);",
        (),
    )?;

    Ok(())
}

/// Map a database row to a Transaction.
pub fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    let id = row.get(0)?;
    let raw_user_id: i64 = row.get(1)?;
    let name = row.get(2)?;
    let amount = row.get(3)?;
    let kind = row.get(4)?;
    let category = row.get(5)?;
    let date = row.get(6)?;
    let created_at = row.get(7)?;

    Ok(Transaction {
        id,
        user_id: UserId::new(raw_user_id),
        name,
        amount,
        kind,
        category,
        date,
        created_at,
    })
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod database_tests {
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        Error,
        db::initialize,
        transaction::{
            Transaction, TransactionKind, create_transaction, delete_transaction,
            get_transactions_for_user,
        },
        user::UserId,
    };

    fn get_test_connection() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        conn
    }

    #[test]
    fn create_succeeds() {
        let conn = get_test_connection();
        let amount = 12.3;

        let result = create_transaction(
            Transaction::build(
                "Lunch",
                amount,
                TransactionKind::Expense,
                "Food",
                date!(2025 - 10 - 05),
            ),
            UserId::new(1),
            &conn,
        );

        match result {
            Ok(transaction) => {
                assert_eq!(transaction.amount, amount);
                assert_eq!(transaction.kind, TransactionKind::Expense);
                assert_eq!(transaction.user_id, UserId::new(1));
            }
            Err(error) => panic!("Unexpected error: {error}"),
        }
    }

    #[test]
    fn create_fails_on_negative_amount() {
        let conn = get_test_connection();

        let result = create_transaction(
            Transaction::build(
                "Refund",
                -5.0,
                TransactionKind::Income,
                "Misc",
                date!(2025 - 10 - 05),
            ),
            UserId::new(1),
            &conn,
        );

        assert_eq!(result, Err(Error::NegativeAmount(-5.0)));
    }

    #[test]
    fn create_allows_future_date() {
        let conn = get_test_connection();

        let result = create_transaction(
            Transaction::build(
                "Upcoming rent",
                1200.0,
                TransactionKind::Expense,
                "Housing",
                date!(2099 - 01 - 01),
            ),
            UserId::new(1),
            &conn,
        );

        assert!(result.is_ok());
    }

    #[test]
    fn get_transactions_returns_most_recently_recorded_first() {
        let conn = get_test_connection();
        let user_id = UserId::new(1);
        let first = create_transaction(
            Transaction::build(
                "Salary",
                100.0,
                TransactionKind::Income,
                "Work",
                date!(2025 - 10 - 05),
            ),
            user_id,
            &conn,
        )
        .unwrap();
        let second = create_transaction(
            Transaction::build(
                "Lunch",
                12.5,
                TransactionKind::Expense,
                "Food",
                date!(2025 - 10 - 01),
            ),
            user_id,
            &conn,
        )
        .unwrap();

        let transactions = get_transactions_for_user(user_id, &conn).unwrap();

        assert_eq!(transactions, vec![second, first]);
    }

    #[test]
    fn get_transactions_excludes_other_users() {
        let conn = get_test_connection();
        create_transaction(
            Transaction::build(
                "Salary",
                100.0,
                TransactionKind::Income,
                "Work",
                date!(2025 - 10 - 05),
            ),
            UserId::new(1),
            &conn,
        )
        .unwrap();

        let transactions = get_transactions_for_user(UserId::new(2), &conn).unwrap();

        assert!(transactions.is_empty());
    }

    #[test]
    fn delete_succeeds_for_own_transaction() {
        let conn = get_test_connection();
        let user_id = UserId::new(1);
        let transaction = create_transaction(
            Transaction::build(
                "Lunch",
                12.5,
                TransactionKind::Expense,
                "Food",
                date!(2025 - 10 - 05),
            ),
            user_id,
            &conn,
        )
        .unwrap();

        delete_transaction(transaction.id, user_id, &conn).unwrap();

        assert!(get_transactions_for_user(user_id, &conn).unwrap().is_empty());
    }

    #[test]
    fn delete_fails_for_missing_transaction() {
        let conn = get_test_connection();

        let result = delete_transaction(999, UserId::new(1), &conn);

        assert_eq!(result, Err(Error::DeleteMissingTransaction));
    }

    #[test]
    fn delete_fails_for_other_users_transaction() {
        let conn = get_test_connection();
        let owner = UserId::new(1);
        let transaction = create_transaction(
            Transaction::build(
                "Lunch",
                12.5,
                TransactionKind::Expense,
                "Food",
                date!(2025 - 10 - 05),
            ),
            owner,
            &conn,
        )
        .unwrap();

        let result = delete_transaction(transaction.id, UserId::new(2), &conn);

        assert_eq!(result, Err(Error::DeleteMissingTransaction));
        assert_eq!(get_transactions_for_user(owner, &conn).unwrap().len(), 1);
    }
}
