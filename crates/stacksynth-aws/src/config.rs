//! Stack configuration
//!
//! Loaded from TOML. Every field has a default, so a file only needs the keys
//! it overrides.
//!
//! ```toml
//! prefix = "prod-"
//! region = "us-east-1"
//! account_id = "123456789012"
//!
//! [function]
//! name = "billing"
//! runtime = "nodejs18.x"
//! ```

use crate::error::StackError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Settings for the deployed function and its package
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FunctionSettings {
    /// Function name as the provider sees it
    pub name: String,
    /// Entry point, e.g. `index.handler`
    pub handler: String,
    /// Runtime identifier
    pub runtime: String,
    /// Directory packaged into the archive
    ///
    /// A relative path read by [`StackConfig::from_path`] is taken relative to
    /// the config file's directory. The built-in default `dist` is left
    /// relative to the working directory.
    pub source_dir: String,
    /// Where the archive is written, and what the function uploads
    pub archive_path: String,
    /// Environment variables
    pub environment: BTreeMap<String, String>,
    /// URL authorization type
    pub url_auth_type: String,
}

impl Default for FunctionSettings {
    fn default() -> Self {
        Self {
            name: "dale_test_auto".to_owned(),
            handler: "index.handler".to_owned(),
            runtime: "nodejs16.x".to_owned(),
            source_dir: "dist".to_owned(),
            archive_path: "lambda_function_payload.zip".to_owned(),
            environment: BTreeMap::from([("foo".to_owned(), "bar".to_owned())]),
            url_auth_type: "NONE".to_owned(),
        }
    }
}

/// Configuration for [`crate::LambdaStack`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StackConfig {
    /// Prepended to every prefixed node name
    pub prefix: String,
    /// Deployment region
    pub region: String,
    /// Only account the provider may act in
    pub account_id: String,
    /// Provider-wide tags. Empty means no tag block.
    pub default_tags: BTreeMap<String, String>,
    /// Function whose log group the role may write to
    pub log_group_function: String,
    /// Function settings
    pub function: FunctionSettings,
}

impl StackConfig {
    /// Default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the name prefix
    #[inline]
    #[must_use]
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Set region
    #[inline]
    #[must_use]
    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = region.into();
        self
    }

    /// Set account id
    #[inline]
    #[must_use]
    pub fn with_account_id(mut self, account_id: impl Into<String>) -> Self {
        self.account_id = account_id.into();
        self
    }

    /// Add or replace one default tag
    #[inline]
    #[must_use]
    pub fn with_tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.default_tags.insert(key.into(), value.into());
        self
    }

    /// Parse from TOML text
    pub fn from_toml_str(text: &str) -> Result<Self, StackError> {
        Ok(toml::from_str(text)?)
    }

    /// Load from a TOML file
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, StackError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| StackError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!(path = %path.display(), "loaded stack config");

        let mut config = Self::from_toml_str(&text)?;
        let base = path.parent().filter(|p| !p.as_os_str().is_empty());
        if let Some(base) = base {
            let source_dir = Path::new(&config.function.source_dir);
            if source_dir.is_relative() {
                let joined = base.join(source_dir).to_string_lossy().into_owned();
                config.function.source_dir = joined;
            }
        }
        Ok(config)
    }

    /// `prefix` + `name`
    #[must_use]
    pub fn prefixed(&self, name: &str) -> String {
        format!("{}{name}", self.prefix)
    }
}

impl Default for StackConfig {
    fn default() -> Self {
        let prefix = "dale-test-".to_owned();
        let default_tags = BTreeMap::from([
            ("name".to_owned(), format!("{prefix}lambda-stack")),
            ("version".to_owned(), "1.0".to_owned()),
        ]);
        Self {
            prefix,
            region: "eu-west-2".to_owned(),
            account_id: "<account-id>".to_owned(),
            default_tags,
            log_group_function: "dale-test-manual".to_owned(),
            function: FunctionSettings::default(),
        }
    }
}
