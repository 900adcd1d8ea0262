use thiserror::Error;

/// User-facing failure categories. Every one of them aborts the run.
#[derive(Debug, Error)]
pub enum PlotError {
    /// Malformed delimited input
    #[error("failed to read {source_name}: {message}")]
    Ingest {
        source_name: String,
        message: String,
    },

    /// Unknown column name or out-of-range column index
    #[error("{0}")]
    Selection(String),

    /// Inconsistent or malformed options
    #[error("{0}")]
    Configuration(String),

    #[error("{0} is not implemented")]
    NotImplemented(&'static str),
}

impl PlotError {
    pub fn config(message: impl Into<String>) -> Self {
        PlotError::Configuration(message.into())
    }

    pub fn selection(message: impl Into<String>) -> Self {
        PlotError::Selection(message.into())
    }
}
