//! Synthesis run
//!
//! [`SynthesisRun`] owns one [`Graph`] and drives it through
//! resolve → order → emit, enforcing the transitions in
//! [`crate::state_machine`]. A failure at any phase is terminal; callers
//! rebuild the graph from scratch to retry.

use crate::config::SynthConfig;
use crate::emitter::{emit, OutputDocument};
use crate::error::{GraphError, RunError, SynthError};
use crate::node::{NodeHandle, NodeSpec};
use crate::orderer::{order, OrderedGraph};
use crate::registry::Graph;
use crate::resolver::resolve;
use crate::sink::DocumentSink;
use crate::state_machine::{validate_transition, RunState};
use crate::value::AttributeMap;
use std::fmt;

/// Why a run failed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunFailure {
    /// State the run was in when the error occurred
    pub phase: RunState,
    /// Rendered originating error
    pub reason: String,
    /// The originating error when it came from the graph
    pub graph_error: Option<GraphError>,
}

impl RunFailure {
    fn from_error(phase: RunState, error: &SynthError) -> Self {
        Self {
            phase,
            reason: error.to_string(),
            graph_error: error.as_graph_error().cloned(),
        }
    }
}

impl fmt::Display for RunFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}: {}", self.phase, self.reason)
    }
}

/// A single build → resolve → order → emit cycle
#[derive(Debug)]
pub struct SynthesisRun {
    state: RunState,
    graph: Graph,
    failure: Option<RunFailure>,
}

impl SynthesisRun {
    /// Start a run with an empty graph
    #[must_use]
    pub fn new(config: SynthConfig) -> Self {
        Self::from_graph(Graph::new(config))
    }

    /// Start a run over an already-populated graph
    #[must_use]
    pub fn from_graph(graph: Graph) -> Self {
        Self {
            state: RunState::Building,
            graph,
            failure: None,
        }
    }

    /// Current phase
    #[inline]
    #[must_use]
    pub fn state(&self) -> RunState {
        self.state
    }

    /// Failure details once the run is `Failed`
    #[inline]
    #[must_use]
    pub fn failure(&self) -> Option<&RunFailure> {
        self.failure.as_ref()
    }

    /// The graph under construction
    ///
    /// Empty once resolution has begun.
    #[inline]
    #[must_use]
    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    /// Register a node from its parts
    pub fn register(
        &mut self,
        name: impl Into<String>,
        kind: impl Into<String>,
        attributes: AttributeMap,
    ) -> Result<NodeHandle, SynthError> {
        self.register_spec(NodeSpec::new(name, kind).attributes(attributes))
    }

    /// Register a node from a builder
    ///
    /// Only allowed while `Building`. A duplicate name fails the run.
    pub fn register_spec(&mut self, spec: NodeSpec) -> Result<NodeHandle, SynthError> {
        self.ensure_not_failed()?;
        if self.state != RunState::Building {
            return Err(RunError::RegistrationClosed { state: self.state }.into());
        }

        self.graph
            .register_spec(spec)
            .map_err(|e| self.fail(e.into()))
    }

    /// Resolve, order and emit the document
    pub fn synthesize(&mut self) -> Result<OutputDocument, SynthError> {
        let ordered = self.prepare()?;
        let document = emit(ordered);
        self.finish(&document)?;
        Ok(document)
    }

    /// Resolve, order, emit, then write the document through `sink`
    ///
    /// A sink failure fails the run and leaves no partial file behind.
    pub fn synthesize_to(&mut self, sink: &DocumentSink) -> Result<OutputDocument, SynthError> {
        let ordered = self.prepare()?;
        let document = emit(ordered);
        if let Err(e) = sink.write(&document) {
            return Err(self.fail(e.into()));
        }
        self.finish(&document)?;
        Ok(document)
    }

    fn prepare(&mut self) -> Result<OrderedGraph, SynthError> {
        self.ensure_not_failed()?;
        self.advance(RunState::Resolving)?;

        let graph = std::mem::take(&mut self.graph);
        let resolved = resolve(graph).map_err(|e| self.fail(e.into()))?;

        self.advance(RunState::Ordering)?;
        order(resolved).map_err(|e| self.fail(e.into()))
    }

    fn finish(&mut self, document: &OutputDocument) -> Result<(), SynthError> {
        self.advance(RunState::Emitted)?;
        match document.digest() {
            Ok(digest) => tracing::info!(records = document.len(), %digest, "synthesis emitted"),
            Err(e) => tracing::warn!(error = %e, "could not digest emitted document"),
        }
        Ok(())
    }

    fn ensure_not_failed(&self) -> Result<(), RunError> {
        match &self.failure {
            Some(failure) => Err(RunError::AlreadyFailed {
                failure: failure.clone(),
            }),
            None => Ok(()),
        }
    }

    fn advance(&mut self, to: RunState) -> Result<(), RunError> {
        validate_transition(self.state, to)?;
        tracing::debug!(from = ?self.state, to = ?to, "run transition");
        self.state = to;
        Ok(())
    }

    fn fail(&mut self, error: SynthError) -> SynthError {
        tracing::error!(phase = ?self.state, error = %error, "synthesis failed");
        self.failure = Some(RunFailure::from_error(self.state, &error));
        self.state = RunState::Failed;
        error
    }
}
