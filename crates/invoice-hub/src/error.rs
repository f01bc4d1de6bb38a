//! Error types for invoice-hub

use thiserror::Error;

/// Result type alias using [`Error`]
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while generating invoices
#[derive(Debug, Error)]
pub enum Error {
    /// One or more of source, template and output directory were not given
    #[error("missing required inputs: {}", .0.join(", "))]
    MissingInputs(Vec<&'static str>),

    /// Source file extension is not a supported table format
    #[error("Unsupported source format: {0}")]
    UnsupportedFormat(String),

    /// Layout file could not be parsed
    #[error("Invalid layout: {0}")]
    InvalidLayout(String),

    /// Amount text is not a non-negative decimal
    #[error("Unparseable amount: {0:?}")]
    UnparseableAmount(String),

    /// XLSX error
    #[error(transparent)]
    Xlsx(#[from] invoice_hub_xlsx::XlsxError),

    /// CSV error
    #[error(transparent)]
    Csv(#[from] invoice_hub_csv::CsvError),

    /// Core error
    #[error(transparent)]
    Core(#[from] invoice_hub_core::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
