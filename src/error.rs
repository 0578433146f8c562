use thiserror::Error;

#[derive(Error, Debug)]
pub enum SheetError {
    #[error("Invalid column address '{0}': expected letters A-Z only")]
    InvalidAddress(String),

    #[error("Column {letter} (index {index}) is out of range for a table with {column_count} columns")]
    OutOfRange {
        letter: String,
        index: usize,
        column_count: usize,
    },

    #[error("Invalid table input: {0}")]
    InvalidInput(String),

    #[error("No column could be used as a chronological axis")]
    NoDateColumn,

    #[error("Unknown column: {0}")]
    UnknownColumn(String),

    #[error("Unknown time window label: {0}")]
    UnknownWindow(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl SheetError {
    /// Recoverable conditions have a documented degraded mode instead of aborting the request.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, SheetError::NoDateColumn)
    }
}

pub type Result<T> = std::result::Result<T, SheetError>;
