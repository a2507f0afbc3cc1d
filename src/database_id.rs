//! Database ID type definition.

/// Alias for the integer type used for mapping to database IDs.
pub type DatabaseId = i64;

/// Alias for transaction IDs in route parameters and database queries.
pub type TransactionId = DatabaseId;
