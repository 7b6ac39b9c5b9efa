//! Typed failure taxonomy for the Rscript bridge.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum GgError {
    /// The configured Rscript command could not be started at all.
    #[error("'{command}' is not a valid Rscript command: {source}")]
    InterpreterNotFound {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// Rscript exited non-zero. The payload carries everything needed to
    /// reproduce the run by hand.
    #[error("{0}")]
    ExternalProcess(crate::render::ProcessFailure),

    /// The expected output file is absent after the interpreter returned.
    #[error("graph file not found at '{}'; perhaps Rscript failed to produce the graph", path.display())]
    ArtifactNotFound { path: PathBuf },

    #[error("unsupported output format '{0}'")]
    UnsupportedFormat(String),

    #[error("row {row} has {got} cells but the table has {expected} columns")]
    RaggedRow {
        row: usize,
        got: usize,
        expected: usize,
    },

    #[error("'{0}' is not a valid R package name")]
    BadLibraryName(String),

    #[error("'{0}' is not a valid R identifier for a data frame")]
    BadTableName(String),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
