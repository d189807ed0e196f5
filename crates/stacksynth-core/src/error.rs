//! Error types for stacksynth core
//!
//! Provides error handling for:
//! - Graph construction (duplicate / unknown names)
//! - Reference resolution (unresolved targets, cycles)
//! - Run lifecycle violations
//! - Document emission and sink writes

use crate::run::RunFailure;
use crate::state_machine::RunState;
use crate::value::Reference;
use std::fmt;
use std::path::PathBuf;

/// Errors raised while building, resolving or ordering a graph
///
/// Every variant carries the logical name(s) of the offending node(s).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    /// A node with this logical name is already registered
    DuplicateName {
        /// The colliding logical name
        name: String,
    },

    /// No node with this logical name is registered
    UnknownNode {
        /// The missing logical name
        name: String,
    },

    /// A reference points at a node or attribute that is not declared
    UnresolvedReference {
        /// Node holding the reference
        source: String,
        /// Logical name of the referenced node
        target: String,
        /// `target.attribute.path` that failed to resolve
        target_path: String,
    },

    /// References form a cycle
    CyclicReference {
        /// Nodes along the cycle, first and last entries are the same node
        cycle_path: Vec<String>,
    },
}

impl fmt::Display for GraphError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateName { name } => write!(f, "duplicate node name: '{name}'"),
            Self::UnknownNode { name } => write!(f, "unknown node: '{name}'"),
            Self::UnresolvedReference {
                source,
                target_path,
                ..
            } => write!(f, "unresolved reference in '{source}': '{target_path}'"),
            Self::CyclicReference { cycle_path } => {
                write!(f, "cyclic reference: {}", cycle_path.join(" -> "))
            }
        }
    }
}

// `source` here is a node name, not an error chain.
impl std::error::Error for GraphError {}

impl GraphError {
    /// Create an unresolved reference error for `reference` held by `source`
    pub fn unresolved(source: impl Into<String>, reference: &Reference) -> Self {
        Self::UnresolvedReference {
            source: source.into(),
            target: reference.target().to_owned(),
            target_path: reference.to_string(),
        }
    }

    /// Logical names of every node involved in the error
    #[must_use]
    pub fn node_names(&self) -> Vec<&str> {
        match self {
            Self::DuplicateName { name } | Self::UnknownNode { name } => vec![name.as_str()],
            Self::UnresolvedReference { source, target, .. } => {
                vec![source.as_str(), target.as_str()]
            }
            Self::CyclicReference { cycle_path } => {
                let mut names: Vec<&str> = cycle_path.iter().map(String::as_str).collect();
                names.sort_unstable();
                names.dedup();
                names
            }
        }
    }
}

/// Synthesis run lifecycle errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RunError {
    /// Transition not permitted by the run state machine
    #[error("illegal run transition: {from:?} -> {to:?}")]
    IllegalTransition {
        /// Current state
        from: RunState,
        /// Requested state
        to: RunState,
    },

    /// Nodes can only be registered while the run is building
    #[error("registration closed: run is {state:?}")]
    RegistrationClosed {
        /// State at the time of the attempt
        state: RunState,
    },

    /// The run already failed and cannot be resumed
    #[error("run already failed during {failure}")]
    AlreadyFailed {
        /// The original failure
        failure: RunFailure,
    },
}

/// Document serialization and sink errors
#[derive(Debug, thiserror::Error)]
pub enum EmitError {
    /// JSON serialization failed
    #[error("json serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML serialization failed
    #[error("yaml serialization failed: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Writing the document to its destination failed
    #[error("io error writing {path}: {source}")]
    Io {
        /// Destination path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },
}

impl EmitError {
    /// Create IO error for path
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Umbrella error for a synthesis run
#[derive(Debug, thiserror::Error)]
pub enum SynthError {
    /// Graph construction or resolution failed
    #[error("graph error: {0}")]
    Graph(#[from] GraphError),

    /// Run lifecycle violated
    #[error("run error: {0}")]
    Run(#[from] RunError),

    /// Emission failed
    #[error("emit error: {0}")]
    Emit(#[from] EmitError),
}

impl SynthError {
    /// The graph error, if this failure came from the graph
    #[inline]
    #[must_use]
    pub fn as_graph_error(&self) -> Option<&GraphError> {
        match self {
            Self::Graph(e) => Some(e),
            _ => None,
        }
    }
}
