//! Synthesis configuration
//!
//! Everything a run needs beyond the declared nodes is passed in explicitly
//! through [`SynthConfig`]. Nothing is read from globals, so independent runs
//! (e.g. one per account) never share state.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Kind tags understood by the default computed-attribute catalog
pub mod kinds {
    /// Engine provider block
    pub const PROVIDER: &str = "provider";
    /// Execution role
    pub const ROLE: &str = "role";
    /// Inline policy attached to a role
    pub const ROLE_POLICY: &str = "role-policy";
    /// Policy document data source
    pub const POLICY_DOCUMENT: &str = "policy-document";
    /// Packaged source archive data source
    pub const ARCHIVE: &str = "archive";
    /// Serverless function
    pub const FUNCTION: &str = "function";
    /// Public invocation endpoint for a function
    pub const FUNCTION_URL: &str = "function-url";
    /// Stack output
    pub const OUTPUT: &str = "output";
}

/// Attribute every node exposes once the engine has created it
pub const UNIVERSAL_COMPUTED: &str = "id";

/// How placeholders for engine-computed attributes are rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InterpolationSyntax {
    /// `${kind.name.path}`
    #[default]
    Terraform,
    /// `((name.path))`
    Plain,
}

/// Configuration for one synthesis run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SynthConfig {
    /// Stack name, used in logs
    pub stack_name: String,
    /// Placeholder rendering
    pub interpolation: InterpolationSyntax,
    /// Attributes known only after the engine runs, by kind
    pub computed: BTreeMap<String, Vec<String>>,
}

impl SynthConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With stack name
    #[inline]
    #[must_use]
    pub fn with_stack_name(mut self, name: impl Into<String>) -> Self {
        self.stack_name = name.into();
        self
    }

    /// With placeholder syntax
    #[inline]
    #[must_use]
    pub fn with_interpolation(mut self, syntax: InterpolationSyntax) -> Self {
        self.interpolation = syntax;
        self
    }

    /// Register additional computed attributes for a kind
    #[must_use]
    pub fn with_computed<I, S>(mut self, kind: impl Into<String>, attrs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let entry = self.computed.entry(kind.into()).or_default();
        for attr in attrs {
            let attr = attr.into();
            if !entry.contains(&attr) {
                entry.push(attr);
            }
        }
        self
    }

    /// Whether `attr` is engine-computed for nodes of `kind`
    #[must_use]
    pub fn is_computed(&self, kind: &str, attr: &str) -> bool {
        attr == UNIVERSAL_COMPUTED
            || self
                .computed
                .get(kind)
                .is_some_and(|attrs| attrs.iter().any(|a| a == attr))
    }
}

impl Default for SynthConfig {
    fn default() -> Self {
        let catalog: [(&str, &[&str]); 8] = [
            (kinds::PROVIDER, &[]),
            (kinds::ROLE, &["arn", "unique_id"]),
            (kinds::ROLE_POLICY, &[]),
            (kinds::POLICY_DOCUMENT, &["json"]),
            (
                kinds::ARCHIVE,
                &["output_base64sha256", "output_md5", "output_size"],
            ),
            (
                kinds::FUNCTION,
                &["arn", "invoke_arn", "qualified_arn", "version"],
            ),
            (kinds::FUNCTION_URL, &["function_url", "url_id"]),
            (kinds::OUTPUT, &[]),
        ];

        Self {
            stack_name: "stack".to_owned(),
            interpolation: InterpolationSyntax::default(),
            computed: catalog
                .into_iter()
                .map(|(kind, attrs)| {
                    (
                        kind.to_owned(),
                        attrs.iter().map(|a| (*a).to_owned()).collect(),
                    )
                })
                .collect(),
        }
    }
}
