use std::path::PathBuf;

use thiserror::Error;

/// Fatal errors. Everything else in the pipeline degrades in-band: bad cells
/// become nulls, absent columns are skipped, short series shrink their
/// decomposition period, and undefined ratios propagate as non-finite values.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("dataset not found: '{0}' (no match under the input mount or at the literal path)")]
    NotFound(PathBuf),

    #[error("failed to read dataset: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse CSV: {0}")]
    Csv(#[from] csv::Error),
}
