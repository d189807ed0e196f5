//! stacksynth core
//!
//! Declarative resource-graph synthesis in four steps:
//! 1. **Registry**: declare named nodes with attributes and references
//! 2. **Resolver**: substitute literals, leave engine-computed values symbolic
//! 3. **Orderer**: topological sort, stable by registration order
//! 4. **Emitter**: serialize to an ordered `{ name, kind, attributes }` list
//!
//! # Quick Start
//!
//! ```rust
//! use stacksynth_core::prelude::*;
//!
//! let mut run = SynthesisRun::new(SynthConfig::default());
//! let role = run
//!     .register_spec(NodeSpec::new("role", "role").attr("name", "iam_for_lambda"))
//!     .unwrap();
//! run.register_spec(NodeSpec::new("fn", "function").attr("role", role.attr("arn")))
//!     .unwrap();
//!
//! let doc = run.synthesize().unwrap();
//! assert_eq!(doc.position("role"), Some(0));
//! assert_eq!(doc.get("fn").unwrap().attributes["role"], "${role.role.arn}");
//! ```

pub mod arn;
pub mod config;
mod cycle;
pub mod emitter;
pub mod error;
pub mod node;
pub mod orderer;
pub mod policy;
pub mod registry;
pub mod resolver;
pub mod run;
pub mod sink;
pub mod state_machine;
pub mod value;

// Re-exports
pub use arn::{Arn, ArnError};
pub use config::{kinds, InterpolationSyntax, SynthConfig};
pub use emitter::{
    emit, emit_with, DocumentFormat, DocumentRecord, Interpolator, OutputDocument,
    PlainInterpolator, TerraformInterpolator,
};
pub use error::{EmitError, GraphError, RunError, SynthError};
pub use node::{Node, NodeHandle, NodeSpec};
pub use orderer::{order, OrderedGraph};
pub use policy::{Effect, PolicyDocument, PolicyStatement, Principal};
pub use registry::Graph;
pub use resolver::{resolve, Placeholder, ResolvedGraph, ResolvedNode, ResolvedValue};
pub use run::{RunFailure, SynthesisRun};
pub use sink::DocumentSink;
pub use state_machine::RunState;
pub use value::{AttrPath, AttributeMap, Reference, Value};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for declaring and synthesizing a graph
    pub use crate::{
        DocumentFormat, DocumentSink, Graph, GraphError, NodeHandle, NodeSpec, OutputDocument,
        Reference, RunState, SynthConfig, SynthError, SynthesisRun, Value,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
