//! Error types for stack construction

use stacksynth_core::GraphError;
use std::path::PathBuf;

/// Errors building or loading a stack
#[derive(Debug, thiserror::Error)]
pub enum StackError {
    /// Config file could not be read
    #[error("failed to read {path}: {source}")]
    Io {
        /// File path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid TOML for [`crate::StackConfig`]
    #[error("invalid stack config: {0}")]
    Toml(#[from] toml::de::Error),

    /// Node declaration failed
    #[error("graph error: {0}")]
    Graph(#[from] GraphError),
}
