//! stacksynth-aws
//!
//! A serverless function deployment declared on top of `stacksynth-core`:
//! an execution role with a log policy, a packaged source archive, the
//! function itself, a public URL and a stack output.
//!
//! ```rust
//! use stacksynth_aws::{LambdaStack, StackConfig};
//! use stacksynth_core::prelude::*;
//!
//! let config = StackConfig::default().with_prefix("demo-");
//! let graph = LambdaStack::build(&config, SynthConfig::default()).unwrap();
//! let doc = SynthesisRun::from_graph(graph).synthesize().unwrap();
//!
//! assert!(doc.position("demo-iam_for_lambda") < doc.position("demo-test_lambda"));
//! ```

pub mod config;
pub mod error;
pub mod stack;

pub use config::{FunctionSettings, StackConfig};
pub use error::StackError;
pub use stack::{LambdaStack, OUTPUT_NAME, POLICY_VERSION};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
