//! Provider registry.

use std::collections::BTreeMap;

use ibx_common::{AddressFamily, IpamError, IpamResult};

use crate::network_container::NetworkContainerResource;
use crate::schema::{Schema, network_container_schema};

/// Resource type name of IPv4 network containers.
pub const IPV4_NETWORK_CONTAINER: &str = "infoblox_ipv4_network_container";

/// Resource type name of IPv6 network containers.
pub const IPV6_NETWORK_CONTAINER: &str = "infoblox_ipv6_network_container";

/// The resource types this provider manages.
#[derive(Debug, Clone)]
pub struct Provider {
    resources: BTreeMap<&'static str, NetworkContainerResource>,
}

impl Default for Provider {
    fn default() -> Self {
        Self::new()
    }
}

impl Provider {
    /// Provider with the IPv4 and IPv6 network container resources.
    #[must_use]
    pub fn new() -> Self {
        let resources = BTreeMap::from([
            (
                IPV4_NETWORK_CONTAINER,
                NetworkContainerResource::new(AddressFamily::Ipv4),
            ),
            (
                IPV6_NETWORK_CONTAINER,
                NetworkContainerResource::new(AddressFamily::Ipv6),
            ),
        ]);
        Self { resources }
    }

    /// Resolve a resource type name.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for unknown resource types.
    pub fn resource(&self, resource_type: &str) -> IpamResult<NetworkContainerResource> {
        self.resources.get(resource_type).copied().ok_or_else(|| {
            IpamError::config(format!(
                "the provider does not support resource type '{resource_type}'"
            ))
        })
    }

    /// Schema of a resource type.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for unknown resource types.
    pub fn schema(&self, resource_type: &str) -> IpamResult<Schema> {
        self.resource(resource_type)?;
        Ok(network_container_schema())
    }

    /// Names of all resource types.
    pub fn resource_types(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.resources.keys().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_both_families() {
        let provider = Provider::new();
        assert_eq!(
            provider.resource(IPV4_NETWORK_CONTAINER).unwrap().family(),
            AddressFamily::Ipv4
        );
        assert_eq!(
            provider.resource(IPV6_NETWORK_CONTAINER).unwrap().family(),
            AddressFamily::Ipv6
        );
    }

    #[test]
    fn unknown_type_is_config_error() {
        let err = Provider::new().resource("infoblox_network").unwrap_err();
        assert!(matches!(err, IpamError::Config { .. }));
    }

    #[test]
    fn lists_resource_types() {
        let types: Vec<_> = Provider::new().resource_types().collect();
        assert_eq!(types, [IPV4_NETWORK_CONTAINER, IPV6_NETWORK_CONTAINER]);
    }
}
