//! Filtering and sorting of the transactions table.
//!
//! The table state lives entirely in the URL query string so that filtered
//! views can be bookmarked and shared, and so the export endpoint can apply
//! the same filters the user is looking at.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::transaction::{Transaction, TransactionKind};

/// Which transactions to show in the table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KindFilter {
    #[default]
    All,
    Income,
    Expense,
}

impl KindFilter {
    fn matches(&self, kind: TransactionKind) -> bool {
        match self {
            KindFilter::All => true,
            KindFilter::Income => kind == TransactionKind::Income,
            KindFilter::Expense => kind == TransactionKind::Expense,
        }
    }
}

/// The column the table is sorted by.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortColumn {
    Name,
    Amount,
    #[default]
    Date,
}

impl SortColumn {
    /// The name this column has in the query string.
    pub fn as_str(&self) -> &'static str {
        match self {
            SortColumn::Name => "name",
            SortColumn::Amount => "amount",
            SortColumn::Date => "date",
        }
    }
}

/// The direction the sort column is ordered in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Ascending,
    #[default]
    Descending,
}

impl SortOrder {
    /// The opposite direction, used to toggle a column header.
    pub fn reversed(&self) -> Self {
        match self {
            SortOrder::Ascending => SortOrder::Descending,
            SortOrder::Descending => SortOrder::Ascending,
        }
    }

    /// The name this direction has in the query string.
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Ascending => "ascending",
            SortOrder::Descending => "descending",
        }
    }
}

/// The full table state parsed from the query string.
///
/// Every field has a default so a bare `/transactions` URL shows all
/// transactions sorted by date with the newest first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableQuery {
    /// Case-insensitive substring to match against transaction names.
    #[serde(default)]
    pub search: String,
    #[serde(default)]
    pub kind: KindFilter,
    #[serde(default)]
    pub sort: SortColumn,
    #[serde(default)]
    pub order: SortOrder,
}

/// Apply the search text and kind filter in `query` to `transactions`,
/// then sort the survivors.
///
/// The search and kind filters compose: a transaction must match both to be
/// kept. Ties in the sort column fall back to the most recently recorded
/// transaction first, so the ordering is stable across requests.
pub fn apply_table_query(
    transactions: Vec<Transaction>,
    query: &TableQuery,
) -> Vec<Transaction> {
    let search = query.search.to_lowercase();

    let mut filtered: Vec<Transaction> = transactions
        .into_iter()
        .filter(|transaction| {
            query.kind.matches(transaction.kind)
                && (search.is_empty() || transaction.name.to_lowercase().contains(&search))
        })
        .collect();

    filtered.sort_by(|a, b| {
        let ordering = match query.sort {
            SortColumn::Name => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
            SortColumn::Amount => a.amount.partial_cmp(&b.amount).unwrap_or(Ordering::Equal),
            SortColumn::Date => a.date.cmp(&b.date),
        };

        let ordering = match query.order {
            SortOrder::Ascending => ordering,
            SortOrder::Descending => ordering.reverse(),
        };

        ordering.then_with(|| b.created_at.cmp(&a.created_at))
    });

    filtered
}
