//! Connector capability.
//!
//! The connector performs authenticated calls against the IPAM management
//! API. The provider never talks HTTP itself: it goes through a
//! [`Connector`] bound to one tenant scope by an [`ObjectManager`].

use async_trait::async_trait;
use ibx_common::{AddressFamily, ConnectorError, ExtAttrs, ObjectRef};
use serde::{Deserialize, Serialize};

/// Caller identity attached to every request.
pub const CALLER_IDENTITY: &str = "Terraform";

/// Identity and tenant a request is issued under.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestScope {
    /// Fixed caller name (see [`CALLER_IDENTITY`]).
    pub caller: String,
    /// Tenant the request belongs to; empty for the default scope.
    pub tenant_id: String,
}

impl RequestScope {
    /// Scope for a tenant under the provider's caller identity.
    pub fn for_tenant(tenant_id: impl Into<String>) -> Self {
        Self {
            caller: CALLER_IDENTITY.to_string(),
            tenant_id: tenant_id.into(),
        }
    }
}

/// A network container as returned by the management API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkContainer {
    /// Reference assigned by the remote system.
    pub reference: ObjectRef,
    /// Network view the container lives in.
    pub network_view: String,
    /// Address block, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cidr: Option<String>,
    /// Address family.
    pub family: AddressFamily,
    /// Free-text comment.
    #[serde(default)]
    pub comment: String,
    /// Extensible attributes.
    #[serde(default)]
    pub ext_attrs: ExtAttrs,
}

/// Request to create a container at an explicit address block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateContainerRequest {
    /// Target network view.
    pub network_view: String,
    /// Address block to create.
    pub cidr: String,
    /// Address family.
    pub family: AddressFamily,
    /// Free-text comment.
    pub comment: String,
    /// Extensible attributes.
    pub ext_attrs: ExtAttrs,
}

/// Request to allocate the next available block from a parent container.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocateContainerRequest {
    /// Target network view.
    pub network_view: String,
    /// Parent block to allocate from.
    pub parent_cidr: String,
    /// Address family.
    pub family: AddressFamily,
    /// Prefix length of the block to allocate.
    pub prefix_len: u8,
    /// Free-text comment.
    pub comment: String,
    /// Extensible attributes.
    pub ext_attrs: ExtAttrs,
}

/// Operations the management API exposes for network containers.
#[async_trait]
pub trait Connector: Send + Sync {
    /// Create a container at an explicit address block.
    async fn create_network_container(
        &self,
        scope: &RequestScope,
        request: &CreateContainerRequest,
    ) -> Result<NetworkContainer, ConnectorError>;

    /// Look up a container by view, address block and family.
    async fn get_network_container(
        &self,
        scope: &RequestScope,
        network_view: &str,
        cidr: &str,
        family: AddressFamily,
    ) -> Result<NetworkContainer, ConnectorError>;

    /// Allocate the next available block inside a parent container.
    async fn allocate_network_container(
        &self,
        scope: &RequestScope,
        request: &AllocateContainerRequest,
    ) -> Result<NetworkContainer, ConnectorError>;

    /// Fetch a container by reference.
    async fn get_network_container_by_ref(
        &self,
        scope: &RequestScope,
        reference: &ObjectRef,
    ) -> Result<NetworkContainer, ConnectorError>;

    /// Replace a container's attributes and comment.
    async fn update_network_container(
        &self,
        scope: &RequestScope,
        reference: &ObjectRef,
        ext_attrs: &ExtAttrs,
        comment: &str,
    ) -> Result<NetworkContainer, ConnectorError>;

    /// Delete a container, returning the reference of the removed object.
    async fn delete_network_container(
        &self,
        scope: &RequestScope,
        reference: &ObjectRef,
    ) -> Result<ObjectRef, ConnectorError>;
}

/// A connector bound to a single request scope.
pub struct ObjectManager<'a, C: ?Sized> {
    connector: &'a C,
    scope: RequestScope,
}

impl<'a, C: Connector + ?Sized> ObjectManager<'a, C> {
    /// Bind `connector` to the given tenant.
    pub fn new(connector: &'a C, tenant_id: impl Into<String>) -> Self {
        Self {
            connector,
            scope: RequestScope::for_tenant(tenant_id),
        }
    }

    /// The scope requests are issued under.
    pub const fn scope(&self) -> &RequestScope {
        &self.scope
    }

    /// Create a container at an explicit address block.
    pub async fn create_network_container(
        &self,
        request: &CreateContainerRequest,
    ) -> Result<NetworkContainer, ConnectorError> {
        self.connector
            .create_network_container(&self.scope, request)
            .await
    }

    /// Look up a container by view, address block and family.
    pub async fn get_network_container(
        &self,
        network_view: &str,
        cidr: &str,
        family: AddressFamily,
    ) -> Result<NetworkContainer, ConnectorError> {
        self.connector
            .get_network_container(&self.scope, network_view, cidr, family)
            .await
    }

    /// Allocate the next available block inside a parent container.
    pub async fn allocate_network_container(
        &self,
        request: &AllocateContainerRequest,
    ) -> Result<NetworkContainer, ConnectorError> {
        self.connector
            .allocate_network_container(&self.scope, request)
            .await
    }

    /// Fetch a container by reference.
    pub async fn get_network_container_by_ref(
        &self,
        reference: &ObjectRef,
    ) -> Result<NetworkContainer, ConnectorError> {
        self.connector
            .get_network_container_by_ref(&self.scope, reference)
            .await
    }

    /// Replace a container's attributes and comment.
    pub async fn update_network_container(
        &self,
        reference: &ObjectRef,
        ext_attrs: &ExtAttrs,
        comment: &str,
    ) -> Result<NetworkContainer, ConnectorError> {
        self.connector
            .update_network_container(&self.scope, reference, ext_attrs, comment)
            .await
    }

    /// Delete a container.
    pub async fn delete_network_container(
        &self,
        reference: &ObjectRef,
    ) -> Result<ObjectRef, ConnectorError> {
        self.connector
            .delete_network_container(&self.scope, reference)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scope_uses_caller_identity() {
        let scope = RequestScope::for_tenant("acme");
        assert_eq!(scope.caller, "Terraform");
        assert_eq!(scope.tenant_id, "acme");
    }

    #[test]
    fn container_json_omits_unknown_cidr() {
        let container = NetworkContainer {
            reference: ObjectRef::new("networkcontainer/abc").unwrap(),
            network_view: "default".to_string(),
            cidr: None,
            family: AddressFamily::Ipv6,
            comment: String::new(),
            ext_attrs: ExtAttrs::new(),
        };
        let json = serde_json::to_value(&container).unwrap();
        assert!(json.get("cidr").is_none());
        assert_eq!(json["family"], "ipv6");
    }
}
