use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Failed to access {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Unsupported year {year}: expected {min}..={max}")]
    UnsupportedYear { year: i32, min: i32, max: i32 },

    #[error("Invalid timestamp '{timestamp}' for client {client}: {source}")]
    InvalidTimestamp {
        client: String,
        timestamp: String,
        #[source]
        source: chrono::ParseError,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
