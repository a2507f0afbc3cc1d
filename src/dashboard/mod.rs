//! The dashboard: totals, a monthly overview chart, and an expense breakdown
//! chart derived from the user's transactions.

mod aggregation;
mod cards;
mod charts;
mod dashboard_page;

pub use dashboard_page::get_dashboard_page;
