//! Error taxonomy for the registry and query engine

use std::path::{Path, PathBuf};
use thiserror::Error;

pub type Result<T, E = NebulaError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum NebulaError {
    /// No record with the requested id exists
    #[error("{resource} not found: {id}")]
    NotFound { resource: &'static str, id: String },

    /// The connection `type` has no adapter
    #[error("unsupported connection type: {0}")]
    UnsupportedType(String),

    /// A key the adapter requires is absent from the connection config
    #[error("{kind} connection missing {key}")]
    MissingConfig { kind: &'static str, key: &'static str },

    /// The data-source file is not a valid database image
    #[error("failed to load database {}: {message}", path.display())]
    Load { path: PathBuf, message: String },

    /// The statement failed inside the embedded engine
    #[error("{0}")]
    Execution(String),

    #[error("io error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("serialization: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl NebulaError {
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        NebulaError::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    pub fn connection_not_found(id: impl Into<String>) -> Self {
        NebulaError::NotFound {
            resource: "connection",
            id: id.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = NebulaError::connection_not_found("42");
        assert_eq!(err.to_string(), "connection not found: 42");

        let err = NebulaError::MissingConfig {
            kind: "sqlite",
            key: "path",
        };
        assert_eq!(err.to_string(), "sqlite connection missing path");

        let err = NebulaError::UnsupportedType("postgres".to_string());
        assert!(err.to_string().contains("postgres"));
    }

    #[test]
    fn test_io_error_keeps_source() {
        use std::error::Error as _;

        let err = NebulaError::io(
            "/tmp/nope",
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        assert!(err.to_string().contains("/tmp/nope"));
        assert!(err.source().is_some());
    }
}
