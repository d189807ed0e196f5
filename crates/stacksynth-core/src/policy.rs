//! Structured policy documents
//!
//! A [`PolicyDocument`] is declared as a `policy-document` node; roles and role
//! policies reference its engine-computed `json` attribute.

use crate::config::kinds;
use crate::node::NodeSpec;
use crate::value::{AttributeMap, Value};

/// Statement effect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Effect {
    /// Grant
    #[default]
    Allow,
    /// Explicit denial
    Deny,
}

impl Effect {
    /// Wire form
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Allow => "Allow",
            Self::Deny => "Deny",
        }
    }
}

/// Principal a statement applies to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    /// Principal type, e.g. `Service`
    pub kind: String,
    /// Identifiers, e.g. `lambda.amazonaws.com`
    pub identifiers: Vec<String>,
}

impl Principal {
    /// `Service` principal
    pub fn service(identifier: impl Into<String>) -> Self {
        Self {
            kind: "Service".to_owned(),
            identifiers: vec![identifier.into()],
        }
    }
}

/// One policy statement
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PolicyStatement {
    /// Allow or deny
    pub effect: Effect,
    /// Actions, e.g. `logs:CreateLogGroup`
    pub actions: Vec<String>,
    /// Resource ARNs
    pub resources: Vec<String>,
    /// Principals
    pub principals: Vec<Principal>,
}

impl PolicyStatement {
    /// Allow statement over `actions`
    pub fn allow<I, S>(actions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            effect: Effect::Allow,
            actions: actions.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// With resources
    #[must_use]
    pub fn on<I, S>(mut self, resources: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: ToString,
    {
        self.resources = resources.into_iter().map(|r| r.to_string()).collect();
        self
    }

    /// With a principal
    #[must_use]
    pub fn principal(mut self, principal: Principal) -> Self {
        self.principals.push(principal);
        self
    }

    fn to_value(&self) -> Value {
        let mut map = AttributeMap::new();
        map.insert("effect".to_owned(), self.effect.as_str().into());
        map.insert("actions".to_owned(), Value::list(self.actions.iter()));
        if !self.resources.is_empty() {
            map.insert("resources".to_owned(), Value::list(self.resources.iter()));
        }
        if !self.principals.is_empty() {
            map.insert(
                "principals".to_owned(),
                Value::list(self.principals.iter().map(|p| {
                    Value::map([
                        ("type", Value::from(p.kind.as_str())),
                        ("identifiers", Value::list(p.identifiers.iter())),
                    ])
                })),
            );
        }
        Value::Map(map)
    }
}

/// Policy document declared as a data source
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PolicyDocument {
    /// Policy language version, e.g. `2012-10-17`
    pub version: Option<String>,
    /// Statements
    pub statements: Vec<PolicyStatement>,
}

impl PolicyDocument {
    /// Document with the given statements
    #[must_use]
    pub fn new(statements: Vec<PolicyStatement>) -> Self {
        Self {
            version: None,
            statements,
        }
    }

    /// With policy language version
    #[must_use]
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Attribute map for the document node
    #[must_use]
    pub fn to_attributes(&self) -> AttributeMap {
        let mut attrs = AttributeMap::new();
        if let Some(version) = &self.version {
            attrs.insert("version".to_owned(), version.as_str().into());
        }
        attrs.insert(
            "statement".to_owned(),
            Value::list(self.statements.iter().map(PolicyStatement::to_value)),
        );
        attrs
    }

    /// Node declaration for this document
    #[must_use]
    pub fn into_spec(self, name: impl Into<String>) -> NodeSpec {
        NodeSpec::new(name, kinds::POLICY_DOCUMENT).attributes(self.to_attributes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assume_role_statement_shape() {
        let doc = PolicyDocument::new(vec![PolicyStatement::allow(["sts:AssumeRole"])
            .principal(Principal::service("lambda.amazonaws.com"))]);

        let attrs = doc.to_attributes();
        assert!(!attrs.contains_key("version"));
        assert_eq!(
            attrs["statement"],
            Value::list([Value::map([
                ("effect", Value::from("Allow")),
                ("actions", Value::list(["sts:AssumeRole"])),
                (
                    "principals",
                    Value::list([Value::map([
                        ("type", Value::from("Service")),
                        ("identifiers", Value::list(["lambda.amazonaws.com"])),
                    ])]),
                ),
            ])])
        );
    }

    #[test]
    fn versioned_document_with_resources() {
        let doc = PolicyDocument::new(vec![
            PolicyStatement::allow(["logs:CreateLogGroup"]).on(["arn:aws:logs:r:a:*"])
        ])
        .with_version("2012-10-17");

        let spec = doc.into_spec("doc");
        assert_eq!(spec.kind, kinds::POLICY_DOCUMENT);
        assert_eq!(spec.attributes["version"], Value::from("2012-10-17"));
        let keys: Vec<&str> = spec.attributes.keys().map(String::as_str).collect();
        assert_eq!(keys, ["version", "statement"]);
    }
}
