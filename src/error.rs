use thiserror::Error;

/// Rejections raised while turning raw user input into a [`NewExpense`].
///
/// [`NewExpense`]: crate::models::NewExpense
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub(crate) enum ValidationError {
    #[error("description must not be empty")]
    EmptyDescription,
    #[error("category must not be empty")]
    EmptyCategory,
    #[error("invalid amount: '{0}'")]
    InvalidAmount(String),
    #[error("amount must be greater than zero (got {0})")]
    NonPositiveAmount(String),
    #[error("invalid date: '{0}' (expected YYYY-MM-DD)")]
    InvalidDate(String),
}

#[derive(Debug, Error)]
pub(crate) enum StoreError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("expense #{0} not found")]
    NotFound(i64),
    #[error("expense #{id} has a corrupt {field} column")]
    Corrupt { id: i64, field: &'static str },
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
}

pub(crate) type StoreResult<T> = std::result::Result<T, StoreError>;

#[derive(Debug, Error)]
pub(crate) enum ExportError {
    #[error("cannot write {path}: {source}")]
    Io {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
}
