//! Resource manifests.
//!
//! A manifest declares network container resources for the CLI:
//!
//! ```yaml
//! resources:
//!   - name: core
//!     type: infoblox_ipv4_network_container
//!     config:
//!       network_view: default
//!       cidr: 10.0.0.0/24
//! ```

use std::fs;
use std::path::Path;

use ibx_common::{IpamError, IpamResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A set of declared resources.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    /// Declared resources, in file order.
    #[serde(default)]
    pub resources: Vec<ResourceSpec>,
}

/// One declared resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceSpec {
    /// Local name of the resource.
    pub name: String,
    /// Resource type (e.g. `infoblox_ipv4_network_container`).
    #[serde(rename = "type")]
    pub resource_type: String,
    /// Resource configuration.
    #[serde(default = "empty_object")]
    pub config: Value,
}

fn empty_object() -> Value {
    Value::Object(serde_json::Map::new())
}

impl Manifest {
    /// Parse from any supported format (auto-detected by extension).
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> IpamResult<Self> {
        let content = fs::read_to_string(path)?;

        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("yaml");

        match ext.to_lowercase().as_str() {
            "toml" => Self::from_toml(&content),
            "json" => Self::from_json(&content),
            _ => Self::from_yaml(&content),
        }
    }

    /// Parse from YAML.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for invalid YAML.
    pub fn from_yaml(content: &str) -> IpamResult<Self> {
        serde_yaml::from_str(content)
            .map_err(|e| IpamError::config(format!("Failed to parse YAML manifest: {e}")))
    }

    /// Parse from TOML.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for invalid TOML.
    pub fn from_toml(content: &str) -> IpamResult<Self> {
        toml::from_str(content)
            .map_err(|e| IpamError::config(format!("Failed to parse TOML manifest: {e}")))
    }

    /// Parse from JSON.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for invalid JSON.
    pub fn from_json(content: &str) -> IpamResult<Self> {
        serde_json::from_str(content)
            .map_err(|e| IpamError::config(format!("Failed to parse JSON manifest: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_yaml() {
        let manifest = Manifest::from_yaml(
            r#"
resources:
  - name: core
    type: infoblox_ipv4_network_container
    config:
      network_view: default
      parent_cidr: 10.0.0.0/16
      cidr: ""
      allocate_prefix_len: 24
      ext_attrs: '{"Tenant ID": "acme"}'
"#,
        )
        .unwrap();
        assert_eq!(manifest.resources.len(), 1);
        let spec = &manifest.resources[0];
        assert_eq!(spec.resource_type, "infoblox_ipv4_network_container");
        assert_eq!(spec.config["allocate_prefix_len"], 24);
        assert_eq!(spec.config["ext_attrs"], r#"{"Tenant ID": "acme"}"#);
    }

    #[test]
    fn parse_toml() {
        let manifest = Manifest::from_toml(
            r#"
[[resources]]
name = "v6"
type = "infoblox_ipv6_network_container"

[resources.config]
network_view = "default"
cidr = "2001:db8::/48"
"#,
        )
        .unwrap();
        assert_eq!(manifest.resources[0].config["cidr"], "2001:db8::/48");
    }

    #[test]
    fn missing_config_defaults_to_empty_object() {
        let manifest = Manifest::from_json(
            r#"{"resources": [{"name": "x", "type": "infoblox_ipv4_network_container"}]}"#,
        )
        .unwrap();
        assert!(manifest.resources[0].config.as_object().unwrap().is_empty());
    }

    #[test]
    fn invalid_yaml_is_config_error() {
        let err = Manifest::from_yaml("resources: [").unwrap_err();
        assert!(matches!(err, IpamError::Config { .. }));
    }
}
