//! Extensible attributes attached to IPAM objects.
//!
//! Resources carry their extensible attributes as a JSON object encoded in a
//! single string field. One key, [`TENANT_ID_ATTR`], is reserved: its value
//! scopes every connector call made on behalf of the resource.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{IpamError, IpamResult};

/// Attribute name that carries the tenant scope.
pub const TENANT_ID_ATTR: &str = "Tenant ID";

/// Parsed extensible attributes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExtAttrs(BTreeMap<String, Value>);

impl ExtAttrs {
    /// Create an empty attribute set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse the JSON-encoded form of the attributes.
    ///
    /// An empty string or JSON `null` yields an empty set.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the text is not a JSON object.
    pub fn parse(json: &str) -> IpamResult<Self> {
        if json.is_empty() {
            return Ok(Self::new());
        }
        serde_json::from_str::<Option<BTreeMap<String, Value>>>(json)
            .map(|attrs| Self(attrs.unwrap_or_default()))
            .map_err(|e| IpamError::config(format!("cannot process 'ext_attrs' field: {e}")))
    }

    /// The tenant scope, or an empty string when absent or not a string.
    #[must_use]
    pub fn tenant_id(&self) -> &str {
        self.0
            .get(TENANT_ID_ATTR)
            .and_then(Value::as_str)
            .unwrap_or_default()
    }

    /// Insert an attribute, returning the previous value.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(name.into(), value.into())
    }

    /// Look up an attribute.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    /// Number of attributes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if there are no attributes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
