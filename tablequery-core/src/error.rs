use thiserror::Error;

/// Failures raised by [`TableQuery`](crate::TableQuery) itself.
///
/// They travel inside [`crate::Error`], recover them with
/// `error.downcast_ref::<TableQueryError>()`. Errors coming from the
/// connection are never wrapped into this type.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TableQueryError {
    /// The bound table does not exist in the store.
    #[error("Table `{table}` does not exist")]
    TableNotFound { table: String },

    /// The fetched row does not carry the primary key column.
    #[error("Primary key `{primary_key}` is not found in the row fetched from `{table}`")]
    PrimaryKeyMissing { table: String, primary_key: String },

    /// The primary key value cannot be used in an integer delete predicate.
    #[error("Primary key `{primary_key}` of `{table}` has the non numeric value `{value}`")]
    NonNumericPrimaryKey {
        table: String,
        primary_key: String,
        value: String,
    },
}
