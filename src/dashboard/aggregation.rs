//! Pure aggregation functions over a user's transactions.
//!
//! Everything in this module is a stateless transform from a slice of
//! [Transaction]s to derived totals and groupings. The dashboard re-runs
//! these on every page render, so they must be cheap, side-effect free, and
//! independent of the order transactions arrive in.

use std::collections::HashMap;

use time::{Date, Month};

use crate::transaction::{Transaction, TransactionKind};

/// The headline numbers shown in the dashboard summary cards.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub(super) struct Totals {
    /// Sum of all income amounts.
    pub total_income: f64,
    /// Sum of all expense amounts.
    pub total_expense: f64,
    /// Income minus expenses. May be negative.
    pub balance: f64,
    /// How many income transactions contributed to the total.
    pub income_count: usize,
    /// How many expense transactions contributed to the total.
    pub expense_count: usize,
}

/// Sum income and expenses over `transactions`.
///
/// The balance is computed as `total_income - total_expense`, so the identity
/// between the three numbers holds exactly for any input. Negative amounts
/// are not expected but accumulate arithmetically if present.
pub(super) fn summarize(transactions: &[Transaction]) -> Totals {
    let mut totals = Totals::default();

    for transaction in transactions {
        match transaction.kind {
            TransactionKind::Income => {
                totals.total_income += transaction.amount;
                totals.income_count += 1;
            }
            TransactionKind::Expense => {
                totals.total_expense += transaction.amount;
                totals.expense_count += 1;
            }
        }
    }

    totals.balance = totals.total_income - totals.total_expense;

    totals
}

/// Income and expense sums for one calendar month.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(super) struct MonthTotals {
    /// The month, stored as its first day so months sort chronologically and
    /// the same month in different years stays distinct.
    pub month: Date,
    /// Sum of income amounts in this month.
    pub income: f64,
    /// Sum of expense amounts in this month.
    pub expense: f64,
}

/// Group `transactions` by calendar month and sum income and expenses per
/// group, in chronological order.
///
/// Months are keyed by year and month, so a January in 2023 and a January in
/// 2024 produce two entries instead of silently merging. Months with no
/// transactions are not materialized.
pub(super) fn monthly_series(transactions: &[Transaction]) -> Vec<MonthTotals> {
    let mut totals: HashMap<Date, (f64, f64)> = HashMap::new();

    for transaction in transactions {
        let month = transaction.date.replace_day(1).unwrap();
        let entry = totals.entry(month).or_insert((0.0, 0.0));

        match transaction.kind {
            TransactionKind::Income => entry.0 += transaction.amount,
            TransactionKind::Expense => entry.1 += transaction.amount,
        }
    }

    let mut series: Vec<MonthTotals> = totals
        .into_iter()
        .map(|(month, (income, expense))| MonthTotals {
            month,
            income,
            expense,
        })
        .collect();
    series.sort_by_key(|entry| entry.month);

    series
}

/// Format the months of `series` as chart axis labels.
///
/// Labels are three letter month names, e.g. "Jan". When the series spans
/// more than one calendar year the year is appended, e.g. "Jan 2024", so
/// that repeated month names stay distinguishable.
pub(super) fn month_labels(series: &[MonthTotals]) -> Vec<String> {
    let spans_multiple_years = match (series.first(), series.last()) {
        (Some(first), Some(last)) => first.month.year() != last.month.year(),
        _ => false,
    };

    series
        .iter()
        .map(|entry| {
            if spans_multiple_years {
                format!(
                    "{} {}",
                    short_month_name(entry.month.month()),
                    entry.month.year()
                )
            } else {
                short_month_name(entry.month.month()).to_owned()
            }
        })
        .collect()
}

fn short_month_name(month: Month) -> &'static str {
    match month {
        Month::January => "Jan",
        Month::February => "Feb",
        Month::March => "Mar",
        Month::April => "Apr",
        Month::May => "May",
        Month::June => "Jun",
        Month::July => "Jul",
        Month::August => "Aug",
        Month::September => "Sep",
        Month::October => "Oct",
        Month::November => "Nov",
        Month::December => "Dec",
    }
}

/// The accumulated expenses for one category.
#[derive(Debug, Clone, PartialEq)]
pub(super) struct CategoryTotal {
    /// The category label as the user entered it.
    pub category: String,
    /// Sum of expense amounts in this category. Never zero, since categories
    /// without expenses are not materialized.
    pub total: f64,
}

/// Group expense transactions by category and sum amounts per group.
///
/// Income transactions are ignored. Categories match case-sensitively, so
/// "Food" and "food" are two groups. The output is sorted by descending
/// total (ties broken alphabetically) so the pie chart renders the same way
/// regardless of input order.
pub(super) fn expenses_by_category(transactions: &[Transaction]) -> Vec<CategoryTotal> {
    let mut totals: HashMap<&str, f64> = HashMap::new();

    for transaction in transactions {
        if transaction.kind == TransactionKind::Expense {
            *totals.entry(transaction.category.as_str()).or_insert(0.0) += transaction.amount;
        }
    }

    let mut breakdown: Vec<CategoryTotal> = totals
        .into_iter()
        .map(|(category, total)| CategoryTotal {
            category: category.to_owned(),
            total,
        })
        .collect();

    breakdown.sort_by(|a, b| {
        b.total
            .partial_cmp(&a.total)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.category.cmp(&b.category))
    });

    breakdown
}
