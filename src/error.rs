use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot parse {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("cannot write report: {0}")]
    Csv(#[from] csv::Error),

    #[error("cannot load dictionary {path}: {source}")]
    Dictionary {
        path: PathBuf,
        #[source]
        source: vibrato::errors::VibratoError,
    },

    #[error("timestamp out of range: {0} µs")]
    InvalidTimestamp(i64),

    #[error("game marker {0:?} starts outside the representable time range")]
    InvalidGameMarker(String),

    #[error("no chat messages to aggregate")]
    EmptyInput,

    #[error("window length must be positive, got {0} seconds")]
    InvalidWindow(i64),
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }

    pub fn json(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        Error::Json {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
