use std::io;
use std::path::PathBuf;

/// Why a single cell could not be turned into a canonical timestamp.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParseError {
    #[error("invalid number: {0}")]
    InvalidNumber(String),
    #[error("epoch value {0} is out of range")]
    OutOfRange(f64),
    #[error("unrecognized date/time format")]
    UnrecognizedFormat,
}

#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error("no columns to parse from file")]
    Empty,
}

/// Failures scoped to one dataset. None of these abort a batch.
#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    #[error("no timestamp column could be determined")]
    Selection,
    #[error("column '{0}' does not exist")]
    UnknownColumn(String),
    #[error("failed to read {}: {source}", .path.display())]
    SourceRead {
        path: PathBuf,
        #[source]
        source: SourceError,
    },
    #[error("failed to write {}: {source}", .path.display())]
    Destination {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl DatasetError {
    pub(crate) fn source_read(path: impl Into<PathBuf>, source: impl Into<SourceError>) -> Self {
        DatasetError::SourceRead {
            path: path.into(),
            source: source.into(),
        }
    }

    pub(crate) fn destination(path: impl Into<PathBuf>, source: impl Into<io::Error>) -> Self {
        DatasetError::Destination {
            path: path.into(),
            source: source.into(),
        }
    }
}
