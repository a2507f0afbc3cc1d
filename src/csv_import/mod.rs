//! Importing transactions from CSV files and the shared CSV format.

mod csv;
mod import_page;
mod import_transactions;

pub use csv::{parse_csv, write_csv};
pub use import_page::get_import_page;
pub use import_transactions::import_transactions;
