//! Document Emitter
//!
//! Serializes an [`OrderedGraph`] into the [`OutputDocument`] handed to the
//! provisioning engine. Emission performs no I/O; see [`crate::sink`] for
//! writing the result out.

use crate::config::InterpolationSyntax;
use crate::error::EmitError;
use crate::orderer::OrderedGraph;
use crate::resolver::{Placeholder, ResolvedValue};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};
use sha2::{Digest, Sha256};
use std::str::FromStr;

/// Renders placeholders into engine-specific interpolation strings
pub trait Interpolator {
    /// Interpolation string for `placeholder`
    fn render(&self, placeholder: &Placeholder) -> String;
}

/// `${kind.name.path}`
#[derive(Debug, Clone, Copy, Default)]
pub struct TerraformInterpolator;

impl Interpolator for TerraformInterpolator {
    fn render(&self, placeholder: &Placeholder) -> String {
        format!(
            "${{{}.{}.{}}}",
            placeholder.kind(),
            placeholder.target(),
            placeholder.path()
        )
    }
}

/// `((name.path))`
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainInterpolator;

impl Interpolator for PlainInterpolator {
    fn render(&self, placeholder: &Placeholder) -> String {
        format!("(({}.{}))", placeholder.target(), placeholder.path())
    }
}

/// One node in the output document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentRecord {
    /// Logical name
    pub name: String,
    /// Kind tag
    pub kind: String,
    /// Attributes with placeholders rendered as strings
    pub attributes: Map<String, JsonValue>,
}

/// Ordered list of resolved node definitions
///
/// Serializes as a bare JSON/YAML list of records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OutputDocument {
    records: Vec<DocumentRecord>,
}

impl OutputDocument {
    /// Records in dependency order
    #[inline]
    #[must_use]
    pub fn records(&self) -> &[DocumentRecord] {
        &self.records
    }

    /// Number of records
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True when the document has no records
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Record by logical name
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&DocumentRecord> {
        self.records.iter().find(|r| r.name == name)
    }

    /// Index of a record by logical name
    #[must_use]
    pub fn position(&self, name: &str) -> Option<usize> {
        self.records.iter().position(|r| r.name == name)
    }

    /// Pretty-printed JSON
    pub fn to_json_string(&self) -> Result<String, EmitError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// YAML
    pub fn to_yaml_string(&self) -> Result<String, EmitError> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Render in the requested format
    pub fn render(&self, format: DocumentFormat) -> Result<String, EmitError> {
        match format {
            DocumentFormat::Json => self.to_json_string(),
            DocumentFormat::Yaml => self.to_yaml_string(),
        }
    }

    /// SHA-256 of the compact JSON form, hex encoded
    pub fn digest(&self) -> Result<String, EmitError> {
        let canonical = serde_json::to_vec(self)?;
        Ok(hex::encode(Sha256::digest(&canonical)))
    }
}

/// Serialized document format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DocumentFormat {
    /// Pretty JSON
    #[default]
    Json,
    /// YAML
    Yaml,
}

impl DocumentFormat {
    /// Conventional file extension
    #[must_use]
    pub fn extension(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Yaml => "yaml",
        }
    }
}

impl FromStr for DocumentFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "yaml" | "yml" => Ok(Self::Yaml),
            other => Err(format!("unknown document format: '{other}'")),
        }
    }
}

/// Emit using the interpolation syntax from the graph's config
#[must_use]
pub fn emit(ordered: OrderedGraph) -> OutputDocument {
    match ordered.config().interpolation {
        InterpolationSyntax::Terraform => emit_with(ordered, &TerraformInterpolator),
        InterpolationSyntax::Plain => emit_with(ordered, &PlainInterpolator),
    }
}

/// Emit with a caller-supplied interpolator
#[must_use]
pub fn emit_with(ordered: OrderedGraph, interpolator: &dyn Interpolator) -> OutputDocument {
    let records: Vec<DocumentRecord> = ordered
        .nodes
        .into_iter()
        .map(|node| DocumentRecord {
            attributes: node
                .attributes
                .iter()
                .map(|(key, value)| (key.clone(), to_json(value, interpolator)))
                .collect(),
            name: node.name,
            kind: node.kind,
        })
        .collect();

    tracing::debug!(records = records.len(), "emitted document");
    OutputDocument { records }
}

fn to_json(value: &ResolvedValue, interpolator: &dyn Interpolator) -> JsonValue {
    match value {
        ResolvedValue::Null => JsonValue::Null,
        ResolvedValue::Bool(b) => JsonValue::Bool(*b),
        ResolvedValue::Number(n) => JsonValue::Number(n.clone()),
        ResolvedValue::String(s) => JsonValue::String(s.clone()),
        ResolvedValue::List(items) => JsonValue::Array(
            items
                .iter()
                .map(|item| to_json(item, interpolator))
                .collect(),
        ),
        ResolvedValue::Map(entries) => JsonValue::Object(
            entries
                .iter()
                .map(|(k, v)| (k.clone(), to_json(v, interpolator)))
                .collect(),
        ),
        ResolvedValue::Placeholder(p) => JsonValue::String(interpolator.render(p)),
    }
}
