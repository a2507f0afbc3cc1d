//! Reading and writing the application's CSV format for transactions.
//!
//! The format is a five column file with the header
//! `Name,Amount,Type,Category,Date`. Reading is lenient: rows that cannot be
//! turned into a valid transaction are skipped and counted rather than
//! failing the whole file.

use csv::{ReaderBuilder, Writer};
use serde::{Deserialize, Serialize};
use time::{Date, format_description::BorrowedFormatItem, macros::format_description};

use crate::{
    Error,
    transaction::{Transaction, TransactionBuilder, TransactionKind},
};

/// Date format used in CSV files, e.g. "2024-01-15".
const CSV_DATE_FORMAT: &[BorrowedFormatItem] = format_description!("[year]-[month]-[day]");

/// The result of parsing a CSV file.
#[derive(Debug, PartialEq)]
pub struct ParseOutcome {
    /// Builders for the rows that parsed cleanly.
    pub transactions: Vec<TransactionBuilder>,
    /// The number of rows dropped because a field was missing or invalid.
    pub skipped_rows: usize,
}

/// A raw CSV row before validation. All fields are read as text so that a
/// single bad value drops one row instead of failing the whole file.
#[derive(Debug, Deserialize)]
struct CsvRow {
    #[serde(rename = "Name")]
    name: String,
    #[serde(rename = "Amount")]
    amount: String,
    #[serde(rename = "Type")]
    kind: String,
    #[serde(rename = "Category")]
    category: String,
    #[serde(rename = "Date")]
    date: String,
}

#[derive(Debug, Serialize)]
struct CsvRecord<'a> {
    #[serde(rename = "Name")]
    name: &'a str,
    #[serde(rename = "Amount")]
    amount: f64,
    #[serde(rename = "Type")]
    kind: &'a str,
    #[serde(rename = "Category")]
    category: &'a str,
    #[serde(rename = "Date")]
    date: String,
}

/// Parse transactions from CSV text.
///
/// Rows are dropped (and counted in [ParseOutcome::skipped_rows]) when:
/// - any of the five fields is empty,
/// - the amount is not a number or is negative,
/// - the type is neither "income" nor "expense" (case-insensitive),
/// - the date is not of the form YYYY-MM-DD.
///
/// # Errors
/// Returns an [Error::InvalidCsv] if the file has no usable header row.
pub fn parse_csv(text: &str) -> Result<ParseOutcome, Error> {
    let mut reader = ReaderBuilder::new().flexible(true).from_reader(text.as_bytes());

    let headers = reader
        .headers()
        .map_err(|error| Error::InvalidCsv(error.to_string()))?;

    for expected in ["Name", "Amount", "Type", "Category", "Date"] {
        if !headers.iter().any(|header| header == expected) {
            return Err(Error::InvalidCsv(format!(
                "missing column \"{expected}\" in header row"
            )));
        }
    }

    let mut transactions = Vec::new();
    let mut skipped_rows = 0;

    for row in reader.deserialize::<CsvRow>() {
        let row = match row {
            Ok(row) => row,
            Err(error) => {
                tracing::debug!("Skipping malformed CSV row: {error}");
                skipped_rows += 1;
                continue;
            }
        };

        match validate_row(row) {
            Some(builder) => transactions.push(builder),
            None => skipped_rows += 1,
        }
    }

    Ok(ParseOutcome {
        transactions,
        skipped_rows,
    })
}

fn validate_row(row: CsvRow) -> Option<TransactionBuilder> {
    let name = row.name.trim();
    let category = row.category.trim();

    if name.is_empty() || category.is_empty() {
        return None;
    }

    let amount: f64 = row.amount.trim().parse().ok()?;
    if !amount.is_finite() || amount < 0.0 {
        return None;
    }

    let kind = TransactionKind::from_str_opt(&row.kind.trim().to_lowercase())?;
    let date = Date::parse(row.date.trim(), CSV_DATE_FORMAT).ok()?;

    Some(Transaction::build(name, amount, kind, category, date))
}

/// Write `transactions` as CSV text with the header
/// `Name,Amount,Type,Category,Date`.
///
/// # Errors
/// Returns an [Error::InvalidCsv] if a row cannot be written, which should
/// only happen if the formatted date is somehow invalid.
pub fn write_csv(transactions: &[Transaction]) -> Result<String, Error> {
    let mut writer = Writer::from_writer(Vec::new());

    for transaction in transactions {
        let date = transaction
            .date
            .format(CSV_DATE_FORMAT)
            .map_err(|error| Error::InvalidCsv(error.to_string()))?;

        writer
            .serialize(CsvRecord {
                name: &transaction.name,
                amount: transaction.amount,
                kind: transaction.kind.as_str(),
                category: &transaction.category,
                date,
            })
            .map_err(|error| Error::InvalidCsv(error.to_string()))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|error| Error::InvalidCsv(error.to_string()))?;

    String::from_utf8(bytes).map_err(|error| Error::InvalidCsv(error.to_string()))
}
