//! Transaction management for the finance tracker.
//!
//! This module contains everything related to transactions:
//! - The `Transaction` model and `TransactionBuilder` for recording transactions
//! - Database functions for storing, querying, and deleting transactions
//! - Filtering and sorting for the transactions table
//! - View handlers for transaction-related web pages and the CSV export

mod core;
mod create_endpoint;
mod delete_endpoint;
mod export_endpoint;
pub(crate) mod filter;
mod new_transaction_page;
mod transactions_page;
mod view;

pub use core::{
    Transaction, TransactionBuilder, TransactionKind, create_transaction, create_transaction_table,
    delete_transaction, get_transactions_for_user,
};
pub use create_endpoint::create_transaction_endpoint;
pub use delete_endpoint::delete_transaction_endpoint;
pub use export_endpoint::export_transactions_endpoint;
pub use new_transaction_page::get_new_transaction_page;
pub use transactions_page::get_transactions_page;
