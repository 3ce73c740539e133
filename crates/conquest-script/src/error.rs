//! Error types for conquest-script

use crate::config::EngineVersion;
use thiserror::Error;

/// Map loading error type
///
/// Everything past reading the file names the map, and the game once its
/// name is known.
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("map name: '{map}', RON parse error: {source}")]
    Document {
        map: String,
        #[source]
        source: ron::error::SpannedError,
    },

    #[error("map name: '{map}', game name: '{game}', {message}")]
    Parse {
        map: String,
        game: String,
        message: String,
        #[source]
        source: Option<conquest_core::Error>,
    },

    #[error(
        "map name: '{map}', game name: '{game}', current engine version {current} is not \
         compatible with version {required} required by the map"
    )]
    EngineVersion {
        map: String,
        game: String,
        current: EngineVersion,
        required: EngineVersion,
    },
}

impl Error {
    /// The underlying model error, if loading failed on one.
    pub fn model_error(&self) -> Option<&conquest_core::Error> {
        match self {
            Error::Parse { source, .. } => source.as_ref(),
            _ => None,
        }
    }
}

/// The error returned by every loading entry point.
pub type LoadError = Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
