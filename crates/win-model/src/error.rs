//! Model error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ModelError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Bad bin specification: {0}")]
    Bins(String),

    #[error("Bad table file {file}: {reason}")]
    Table { file: String, reason: String },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
