//! Resource schemas.
//!
//! A [`Schema`] lists the options a resource recognizes. It is used to
//! check configuration handed over by the host and to fill in defaults.

use std::collections::BTreeMap;

use ibx_common::{IpamError, IpamResult};
use serde::Serialize;
use serde_json::{Map, Value};

/// Option names of the network container resources.
pub mod attr {
    /// Target network view.
    pub const NETWORK_VIEW: &str = "network_view";
    /// Parent block for allocation mode.
    pub const PARENT_CIDR: &str = "parent_cidr";
    /// Explicit address block.
    pub const CIDR: &str = "cidr";
    /// Prefix length to allocate.
    pub const ALLOCATE_PREFIX_LEN: &str = "allocate_prefix_len";
    /// Free-text comment.
    pub const COMMENT: &str = "comment";
    /// JSON-encoded extensible attributes.
    pub const EXT_ATTRS: &str = "ext_attrs";
}

/// Value type of an attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AttributeType {
    /// UTF-8 string.
    String,
    /// Signed integer.
    Int,
}

impl AttributeType {
    const fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Int => "int",
        }
    }

    fn accepts(self, value: &Value) -> bool {
        match self {
            Self::String => value.is_string(),
            Self::Int => value.as_i64().is_some(),
        }
    }
}

/// Description of one attribute.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Attribute {
    /// Value type.
    #[serde(rename = "type")]
    pub kind: AttributeType,
    /// Whether the attribute must be present.
    pub required: bool,
    /// Value used when the attribute is absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    /// Human-readable description.
    pub description: String,
}

impl Attribute {
    /// A required string attribute.
    pub fn required_string(description: impl Into<String>) -> Self {
        Self {
            kind: AttributeType::String,
            required: true,
            default: None,
            description: description.into(),
        }
    }

    /// An optional string attribute.
    pub fn optional_string(description: impl Into<String>) -> Self {
        Self {
            kind: AttributeType::String,
            required: false,
            default: None,
            description: description.into(),
        }
    }

    /// An optional integer attribute.
    pub fn optional_int(description: impl Into<String>) -> Self {
        Self {
            kind: AttributeType::Int,
            required: false,
            default: None,
            description: description.into(),
        }
    }

    /// Set the default value.
    #[must_use]
    pub fn with_default(mut self, default: impl Into<Value>) -> Self {
        self.default = Some(default.into());
        self
    }
}

/// The set of attributes a resource recognizes.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Schema {
    /// Attributes keyed by name.
    pub attributes: BTreeMap<String, Attribute>,
}

impl Schema {
    /// Create an empty schema.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an attribute.
    #[must_use]
    pub fn with_attribute(mut self, name: impl Into<String>, attribute: Attribute) -> Self {
        self.attributes.insert(name.into(), attribute);
        self
    }

    /// Look up an attribute.
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.get(name)
    }

    /// Check a configuration against the schema and fill in defaults.
    ///
    /// `null` values are treated as absent.
    ///
    /// # Errors
    ///
    /// Unknown or wrongly typed attributes are configuration errors; missing
    /// required attributes are validation errors.
    pub fn apply(&self, config: &Map<String, Value>) -> IpamResult<Map<String, Value>> {
        if let Some(name) = config.keys().find(|k| !self.attributes.contains_key(*k)) {
            return Err(IpamError::config(format!(
                "an argument named '{name}' is not expected here"
            )));
        }

        let mut resolved = Map::new();
        for (name, attribute) in &self.attributes {
            match config.get(name).filter(|v| !v.is_null()) {
                Some(value) if attribute.kind.accepts(value) => {
                    resolved.insert(name.clone(), value.clone());
                }
                Some(value) => {
                    return Err(IpamError::config(format!(
                        "attribute '{name}' must be of type {}, got {value}",
                        attribute.kind.as_str()
                    )));
                }
                None if attribute.required => {
                    return Err(IpamError::validation(format!(
                        "the argument '{name}' is required, but no definition was found"
                    )));
                }
                None => {
                    if let Some(default) = &attribute.default {
                        resolved.insert(name.clone(), default.clone());
                    }
                }
            }
        }
        Ok(resolved)
    }
}

/// Schema shared by the IPv4 and IPv6 network container resources.
#[must_use]
pub fn network_container_schema() -> Schema {
    Schema::new()
        .with_attribute(
            attr::NETWORK_VIEW,
            Attribute::required_string("The name of network view for the network container."),
        )
        .with_attribute(
            attr::PARENT_CIDR,
            Attribute::optional_string(
                "The parent network container block in cidr format to allocate from.",
            ),
        )
        .with_attribute(
            attr::CIDR,
            Attribute::required_string("The network container's address, in CIDR format."),
        )
        .with_attribute(
            attr::ALLOCATE_PREFIX_LEN,
            Attribute::optional_int(
                "Set the parameter's value > 0 to allocate next available network with \
                 corresponding prefix length from the network container defined by 'parent_cidr'",
            )
            .with_default(0),
        )
        .with_attribute(
            attr::COMMENT,
            Attribute::optional_string("A description of the network container.").with_default(""),
        )
        .with_attribute(
            attr::EXT_ATTRS,
            Attribute::optional_string(
                "The Extensible attributes of the network container to be added/updated, \
                 as a map in JSON format",
            )
            .with_default(""),
        )
}
