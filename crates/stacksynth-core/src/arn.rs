//! Structured resource names
//!
//! ARNs are built from typed parts instead of string templates, so a missing
//! region or account is a construction error rather than a malformed string
//! discovered by the engine.

use crate::value::Value;
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// Partition used when none is given
pub const DEFAULT_PARTITION: &str = "aws";

/// `arn:<partition>:<service>:<region>:<account>:<resource>`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Arn {
    partition: String,
    service: String,
    region: String,
    account_id: String,
    resource: String,
}

impl Arn {
    /// Create an ARN in the default partition
    pub fn new(
        service: impl Into<String>,
        region: impl Into<String>,
        account_id: impl Into<String>,
        resource: impl Into<String>,
    ) -> Self {
        Self {
            partition: DEFAULT_PARTITION.to_owned(),
            service: service.into(),
            region: region.into(),
            account_id: account_id.into(),
            resource: resource.into(),
        }
    }

    /// With a non-default partition
    #[inline]
    #[must_use]
    pub fn with_partition(mut self, partition: impl Into<String>) -> Self {
        self.partition = partition.into();
        self
    }

    /// Partition segment
    #[inline]
    #[must_use]
    pub fn partition(&self) -> &str {
        &self.partition
    }

    /// Service segment
    #[inline]
    #[must_use]
    pub fn service(&self) -> &str {
        &self.service
    }

    /// Region segment
    #[inline]
    #[must_use]
    pub fn region(&self) -> &str {
        &self.region
    }

    /// Account segment
    #[inline]
    #[must_use]
    pub fn account_id(&self) -> &str {
        &self.account_id
    }

    /// Resource segment (may itself contain `:`)
    #[inline]
    #[must_use]
    pub fn resource(&self) -> &str {
        &self.resource
    }
}

impl Display for Arn {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "arn:{}:{}:{}:{}:{}",
            self.partition, self.service, self.region, self.account_id, self.resource
        )
    }
}

/// Errors parsing an ARN string
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ArnError {
    /// Does not start with `arn:`
    #[error("missing 'arn' prefix: '{0}'")]
    MissingPrefix(String),

    /// Fewer than six `:`-separated segments
    #[error("expected 6 segments, found {found}: '{input}'")]
    WrongSegmentCount {
        /// Input string
        input: String,
        /// Segments present
        found: usize,
    },

    /// Partition, service or resource segment is empty
    #[error("empty {segment} segment: '{input}'")]
    EmptySegment {
        /// Input string
        input: String,
        /// Name of the empty segment
        segment: &'static str,
    },
}

impl FromStr for Arn {
    type Err = ArnError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.splitn(6, ':').collect();
        if parts.len() != 6 {
            return Err(ArnError::WrongSegmentCount {
                input: s.to_owned(),
                found: parts.len(),
            });
        }
        if parts[0] != "arn" {
            return Err(ArnError::MissingPrefix(s.to_owned()));
        }

        for (segment, value) in [
            ("partition", parts[1]),
            ("service", parts[2]),
            ("resource", parts[5]),
        ] {
            if value.is_empty() {
                return Err(ArnError::EmptySegment {
                    input: s.to_owned(),
                    segment,
                });
            }
        }

        Ok(Self {
            partition: parts[1].to_owned(),
            service: parts[2].to_owned(),
            region: parts[3].to_owned(),
            account_id: parts[4].to_owned(),
            resource: parts[5].to_owned(),
        })
    }
}

impl From<Arn> for Value {
    fn from(arn: Arn) -> Self {
        Value::String(arn.to_string())
    }
}

impl From<&Arn> for Value {
    fn from(arn: &Arn) -> Self {
        Value::String(arn.to_string())
    }
}
