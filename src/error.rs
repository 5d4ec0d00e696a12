use std::{io, path::PathBuf};
use thiserror::Error;

pub type Result<T, E = ArchiveError> = std::result::Result<T, E>;

#[derive(Error, Debug)]
pub enum ArchiveError {
    /// The fetched page does not have the structure the site extractor expects.
    #[error("malformed page {url}: {reason}")]
    MalformedPage { url: String, reason: String },

    #[error("request to {url} failed: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("i/o error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("template not found: {}", .0.display())]
    TemplateNotFound(PathBuf),

    #[error("malformed template {name}: {reason}")]
    MalformedTemplate { name: String, reason: String },

    #[error("rendering {name} failed: {source}")]
    Render {
        name: String,
        #[source]
        source: minijinja::Error,
    },

    #[error("no site handles {0}")]
    UnsupportedSite(String),
}

impl ArchiveError {
    pub fn malformed(url: impl ToString, reason: impl Into<String>) -> Self {
        ArchiveError::MalformedPage {
            url: url.to_string(),
            reason: reason.into(),
        }
    }

    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        ArchiveError::Io {
            path: path.into(),
            source,
        }
    }

    pub fn network(url: impl ToString, source: reqwest::Error) -> Self {
        ArchiveError::Network {
            url: url.to_string(),
            source,
        }
    }
}
