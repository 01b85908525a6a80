use std::path::PathBuf;

use thiserror::Error;

/// Failures while reading the metamodel or a diagram from disk.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("{} ({})", .source, .path.display())]
    NotFound {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not read {}: {}", .path.display(), .source)]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{} is not valid JSON: {}", .path.display(), .source)]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("{} is not a supported image: {}", .path.display(), .source)]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

impl LoadError {
    pub(crate) fn from_io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::NotFound {
            LoadError::NotFound { path, source }
        } else {
            LoadError::Io { path, source }
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, LoadError::NotFound { .. })
    }
}

/// The generative model call failed or returned nothing usable.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("request to model service failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("model service returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("could not decode model response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("model response contained no text")]
    EmptyResponse,
}

#[derive(Debug, Error)]
pub enum WriteError {
    #[error("{}: {}", .path.display(), .source)]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("'{0}' environment variable not set")]
    MissingApiKey(&'static str),

    #[error("failed to load dotenv file at {}: {}", .path.display(), .source)]
    Dotenv {
        path: PathBuf,
        #[source]
        source: dotenvy::Error,
    },

    #[error("failed to load settings from {}: {}", .path.display(), .message)]
    Settings { path: PathBuf, message: String },
}
