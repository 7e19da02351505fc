//! Network container lifecycle.
//!
//! A network container is created in one of two ways:
//!
//! - **Direct**: the container is created at the configured `cidr`.
//! - **From parent**: when `allocate_prefix_len` is at least
//!   [`ALLOCATE_FROM_PARENT_MIN_PREFIX_LEN`], the next available block of
//!   that size is allocated inside the container at `parent_cidr`.
//!
//! The IPv4 and IPv6 resources share this logic; the address family is a
//! parameter of [`NetworkContainerResource`].

use ibx_common::{AddressFamily, ExtAttrs, IpamError, IpamResult, ObjectRef};

use crate::connector::{
    AllocateContainerRequest, Connector, CreateContainerRequest, NetworkContainer, ObjectManager,
};
use crate::resource_data::ResourceData;
use crate::schema::attr;

/// Smallest nonzero prefix length accepted.
pub const MIN_PREFIX_LEN: i64 = 2;

/// Prefix lengths from this value up select allocation from the parent.
pub const ALLOCATE_FROM_PARENT_MIN_PREFIX_LEN: i64 = 7;

/// Typed view of a network container's configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkContainerConfig {
    /// Target network view.
    pub network_view: String,
    /// Parent block for allocation mode.
    pub parent_cidr: String,
    /// Explicit address block.
    pub cidr: String,
    /// Requested prefix length; zero when unset.
    pub allocate_prefix_len: i64,
    /// Free-text comment.
    pub comment: String,
    /// JSON-encoded extensible attributes.
    pub ext_attrs: String,
}

/// How a container will be created.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AllocationMode {
    /// Create at the configured address block.
    Direct,
    /// Allocate a block of the given prefix length from the parent.
    FromParent {
        /// Prefix length to allocate.
        prefix_len: u8,
    },
}

impl NetworkContainerConfig {
    /// Read the configuration from host-provided resource data.
    pub fn from_resource_data<D: ResourceData + ?Sized>(data: &D) -> Self {
        Self {
            network_view: data.get_str(attr::NETWORK_VIEW),
            parent_cidr: data.get_str(attr::PARENT_CIDR),
            cidr: data.get_str(attr::CIDR),
            allocate_prefix_len: data.get_int(attr::ALLOCATE_PREFIX_LEN),
            comment: data.get_str(attr::COMMENT),
            ext_attrs: data.get_str(attr::EXT_ATTRS),
        }
    }

    /// Decode the extensible attributes.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the JSON is malformed.
    pub fn parsed_ext_attrs(&self) -> IpamResult<ExtAttrs> {
        ExtAttrs::parse(&self.ext_attrs)
    }

    /// Decide how the container will be created.
    ///
    /// # Errors
    ///
    /// Returns a validation error for nonzero prefix lengths below
    /// [`MIN_PREFIX_LEN`] or too large to be a prefix length.
    pub fn allocation_mode(&self) -> IpamResult<AllocationMode> {
        let prefix_len = self.allocate_prefix_len;
        if prefix_len != 0 && prefix_len < MIN_PREFIX_LEN {
            return Err(IpamError::validation("prefixLen is less than 2"));
        }
        if prefix_len < ALLOCATE_FROM_PARENT_MIN_PREFIX_LEN {
            return Ok(AllocationMode::Direct);
        }
        let prefix_len = u8::try_from(prefix_len).map_err(|_| {
            IpamError::validation(format!("prefixLen {prefix_len} is out of range"))
        })?;
        Ok(AllocationMode::FromParent { prefix_len })
    }

    /// Run the local checks of `create`, in the order `create` applies them.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for malformed attributes, or a
    /// validation error for a bad prefix length or an empty network view.
    pub fn validate_for_create(&self) -> IpamResult<(ExtAttrs, AllocationMode)> {
        let ext_attrs = self.parsed_ext_attrs()?;
        let mode = self.allocation_mode()?;
        if self.network_view.is_empty() {
            return Err(IpamError::validation(
                "network view's name is required to create a network container",
            ));
        }
        Ok((ext_attrs, mode))
    }
}

fn stored_id<D: ResourceData + ?Sized>(data: &D) -> IpamResult<ObjectRef> {
    data.id()
        .cloned()
        .ok_or_else(|| IpamError::validation("resource has no persisted identifier"))
}

/// Lifecycle operations for a network container of one address family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NetworkContainerResource {
    family: AddressFamily,
}

impl NetworkContainerResource {
    /// Engine for the given address family.
    #[must_use]
    pub const fn new(family: AddressFamily) -> Self {
        Self { family }
    }

    /// Engine for IPv4 containers.
    #[must_use]
    pub const fn ipv4() -> Self {
        Self::new(AddressFamily::Ipv4)
    }

    /// Engine for IPv6 containers.
    #[must_use]
    pub const fn ipv6() -> Self {
        Self::new(AddressFamily::Ipv6)
    }

    /// The address family this engine manages.
    #[must_use]
    pub const fn family(&self) -> AddressFamily {
        self.family
    }

    /// Create the container and persist its reference.
    ///
    /// # Errors
    ///
    /// Configuration and validation errors are raised before any connector
    /// call. Connector failures are wrapped as remote errors.
    pub async fn create<C, D>(&self, connector: &C, data: &mut D) -> IpamResult<ObjectRef>
    where
        C: Connector + ?Sized,
        D: ResourceData + ?Sized,
    {
        let config = NetworkContainerConfig::from_resource_data(data);
        let (ext_attrs, mode) = config.validate_for_create()?;

        let manager = ObjectManager::new(connector, ext_attrs.tenant_id());
        let network_view = config.network_view.as_str();

        let container = match mode {
            AllocationMode::Direct => {
                tracing::debug!(
                    network_view,
                    cidr = %config.cidr,
                    is_ipv6 = self.family.is_ipv6(),
                    "Creating network container"
                );
                let request = CreateContainerRequest {
                    network_view: config.network_view.clone(),
                    cidr: config.cidr.clone(),
                    family: self.family,
                    comment: config.comment.clone(),
                    ext_attrs,
                };
                manager
                    .create_network_container(&request)
                    .await
                    .map_err(|e| {
                        tracing::warn!(network_view, error = %e, "Network container creation failed");
                        IpamError::remote(
                            format!(
                                "creation of network container block failed in network view '{network_view}'"
                            ),
                            e,
                        )
                    })?
            }
            AllocationMode::FromParent { prefix_len } => {
                let parent_cidr = config.parent_cidr.as_str();
                tracing::debug!(
                    network_view,
                    parent_cidr,
                    prefix_len,
                    is_ipv6 = self.family.is_ipv6(),
                    "Allocating network container from parent"
                );
                manager
                    .get_network_container(network_view, parent_cidr, self.family)
                    .await
                    .map_err(|e| {
                        tracing::warn!(network_view, parent_cidr, error = %e, "Parent container lookup failed");
                        IpamError::remote(
                            format!(
                                "allocation of network block within network container \
                                 '{parent_cidr}' under network view '{network_view}' failed"
                            ),
                            e,
                        )
                    })?;

                let request = AllocateContainerRequest {
                    network_view: config.network_view.clone(),
                    parent_cidr: config.parent_cidr.clone(),
                    family: self.family,
                    prefix_len,
                    comment: config.comment.clone(),
                    ext_attrs,
                };
                manager
                    .allocate_network_container(&request)
                    .await
                    .map_err(|e| {
                        tracing::warn!(network_view, parent_cidr, error = %e, "Network block allocation failed");
                        IpamError::remote(
                            format!(
                                "allocation of network block failed in network view '{network_view}'"
                            ),
                            e,
                        )
                    })?
            }
        };

        tracing::info!(
            reference = %container.reference,
            network_view,
            tenant = manager.scope().tenant_id.as_str(),
            "Network container created"
        );
        data.set_id(container.reference.clone());
        Ok(container.reference)
    }

    /// Refresh the container by its persisted reference.
    ///
    /// A missing object is reported as a remote error; the host decides
    /// whether that means the resource is gone.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for malformed attributes and a remote
    /// error if the fetch fails.
    pub async fn read<C, D>(&self, connector: &C, data: &mut D) -> IpamResult<NetworkContainer>
    where
        C: Connector + ?Sized,
        D: ResourceData + ?Sized,
    {
        let ext_attrs = ExtAttrs::parse(&data.get_str(attr::EXT_ATTRS))?;
        let id = stored_id(data)?;
        let manager = ObjectManager::new(connector, ext_attrs.tenant_id());

        let container = manager
            .get_network_container_by_ref(&id)
            .await
            .map_err(|e| IpamError::remote("failed to retrieve network container", e))?;

        tracing::debug!(reference = %container.reference, "Network container refreshed");
        data.set_id(container.reference.clone());
        Ok(container)
    }

    /// Push comment and attribute changes to the container.
    ///
    /// The address block is not sent; only attributes and comment change.
    ///
    /// # Errors
    ///
    /// Changing `network_view` or leaving `cidr`/`network_view` empty is a
    /// validation error. Connector failures are wrapped as remote errors.
    pub async fn update<C, D>(&self, connector: &C, data: &mut D) -> IpamResult<ObjectRef>
    where
        C: Connector + ?Sized,
        D: ResourceData + ?Sized,
    {
        if data.has_change(attr::NETWORK_VIEW) {
            return Err(IpamError::validation(
                "changing the value of 'network_view' field is not allowed",
            ));
        }
        let config = NetworkContainerConfig::from_resource_data(data);
        let ext_attrs = config.parsed_ext_attrs()?;
        if config.cidr.is_empty() || config.network_view.is_empty() {
            return Err(IpamError::validation(
                "network view's name and CIDR are required to update a network container",
            ));
        }
        let id = stored_id(data)?;
        let manager = ObjectManager::new(connector, ext_attrs.tenant_id());

        let comment = data
            .get_ok(attr::COMMENT)
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string();

        let network_view = config.network_view.as_str();
        let container = manager
            .update_network_container(&id, &ext_attrs, &comment)
            .await
            .map_err(|e| {
                tracing::warn!(network_view, reference = %id, error = %e, "Network container update failed");
                IpamError::remote(
                    format!(
                        "failed to update the network container in network view '{network_view}'"
                    ),
                    e,
                )
            })?;

        tracing::info!(reference = %container.reference, network_view, "Network container updated");
        data.set_id(container.reference.clone());
        Ok(container.reference)
    }

    /// Delete the container. The host clears the identifier on success.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for malformed attributes and a remote
    /// error if the deletion fails.
    pub async fn delete<C, D>(&self, connector: &C, data: &D) -> IpamResult<()>
    where
        C: Connector + ?Sized,
        D: ResourceData + ?Sized,
    {
        let ext_attrs = ExtAttrs::parse(&data.get_str(attr::EXT_ATTRS))?;
        let id = stored_id(data)?;
        let manager = ObjectManager::new(connector, ext_attrs.tenant_id());

        manager
            .delete_network_container(&id)
            .await
            .map_err(|e| IpamError::remote("deletion of the network container failed", e))?;

        tracing::info!(reference = %id, tenant = manager.scope().tenant_id.as_str(), "Network container deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(prefix_len: i64) -> NetworkContainerConfig {
        NetworkContainerConfig {
            network_view: "default".to_string(),
            parent_cidr: "10.0.0.0/16".to_string(),
            cidr: "10.0.0.0/24".to_string(),
            allocate_prefix_len: prefix_len,
            comment: String::new(),
            ext_attrs: String::new(),
        }
    }

    #[test]
    fn unset_prefix_is_direct() {
        assert_eq!(config(0).allocation_mode().unwrap(), AllocationMode::Direct);
    }

    #[test]
    fn small_prefixes_are_direct() {
        for len in 2..7 {
            assert_eq!(config(len).allocation_mode().unwrap(), AllocationMode::Direct);
        }
    }

    #[test]
    fn prefix_of_seven_allocates() {
        assert_eq!(
            config(7).allocation_mode().unwrap(),
            AllocationMode::FromParent { prefix_len: 7 }
        );
    }

    #[test]
    fn prefix_below_minimum_rejected() {
        for len in [1, -1, -24] {
            let err = config(len).allocation_mode().unwrap_err();
            assert!(matches!(err, IpamError::Validation { .. }), "{len}");
        }
    }

    #[test]
    fn oversized_prefix_rejected() {
        let err = config(300).allocation_mode().unwrap_err();
        assert!(matches!(err, IpamError::Validation { .. }));
    }

    #[test]
    fn ext_attrs_checked_before_prefix() {
        let mut bad = config(1);
        bad.ext_attrs = "{".to_string();
        let err = bad.validate_for_create().unwrap_err();
        assert!(matches!(err, IpamError::Config { .. }));
    }

    #[test]
    fn empty_view_rejected_for_create() {
        let mut cfg = config(0);
        cfg.network_view.clear();
        let err = cfg.validate_for_create().unwrap_err();
        assert!(matches!(err, IpamError::Validation { .. }));
    }

    #[test]
    fn engine_family() {
        assert_eq!(NetworkContainerResource::ipv4().family(), AddressFamily::Ipv4);
        assert_eq!(NetworkContainerResource::ipv6().family(), AddressFamily::Ipv6);
    }
}
