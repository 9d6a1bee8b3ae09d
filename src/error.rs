use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors surfaced to the caller of a counting run.
#[derive(Error, Debug)]
pub enum Error {
    /// The input could not be opened for reading. No count is produced.
    #[error("cannot open input `{}`: {source}", .path.display())]
    InputUnavailable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A tunable is outside of its accepted range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, Error>;
