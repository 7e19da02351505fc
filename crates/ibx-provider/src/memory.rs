//! In-memory connector.
//!
//! Stands in for the management API in tests and in `plan` dry-runs. Every
//! call is recorded together with the scope it was issued under, and
//! failures can be injected per call kind.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use ibx_common::{AddressFamily, ConnectorError, ExtAttrs, ObjectRef};
use parking_lot::Mutex;

use crate::connector::{
    AllocateContainerRequest, Connector, CreateContainerRequest, NetworkContainer, RequestScope,
};

/// Kind of connector call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CallKind {
    /// Create at an explicit block.
    Create,
    /// Look up by view and block.
    Lookup,
    /// Allocate from a parent.
    Allocate,
    /// Fetch by reference.
    Fetch,
    /// Update attributes and comment.
    Update,
    /// Delete by reference.
    Delete,
}

/// A recorded connector call.
#[derive(Debug, Clone, PartialEq)]
pub enum ConnectorCall {
    /// `create_network_container`.
    Create {
        /// Request scope.
        scope: RequestScope,
        /// Request payload.
        request: CreateContainerRequest,
    },
    /// `get_network_container`.
    Lookup {
        /// Request scope.
        scope: RequestScope,
        /// Network view searched.
        network_view: String,
        /// Block searched.
        cidr: String,
        /// Address family searched.
        family: AddressFamily,
    },
    /// `allocate_network_container`.
    Allocate {
        /// Request scope.
        scope: RequestScope,
        /// Request payload.
        request: AllocateContainerRequest,
    },
    /// `get_network_container_by_ref`.
    Fetch {
        /// Request scope.
        scope: RequestScope,
        /// Target reference.
        reference: ObjectRef,
    },
    /// `update_network_container`.
    Update {
        /// Request scope.
        scope: RequestScope,
        /// Target reference.
        reference: ObjectRef,
        /// New attributes.
        ext_attrs: ExtAttrs,
        /// New comment.
        comment: String,
    },
    /// `delete_network_container`.
    Delete {
        /// Request scope.
        scope: RequestScope,
        /// Target reference.
        reference: ObjectRef,
    },
}

impl ConnectorCall {
    /// The kind of call.
    #[must_use]
    pub const fn kind(&self) -> CallKind {
        match self {
            Self::Create { .. } => CallKind::Create,
            Self::Lookup { .. } => CallKind::Lookup,
            Self::Allocate { .. } => CallKind::Allocate,
            Self::Fetch { .. } => CallKind::Fetch,
            Self::Update { .. } => CallKind::Update,
            Self::Delete { .. } => CallKind::Delete,
        }
    }

    /// The scope the call was issued under.
    #[must_use]
    pub const fn scope(&self) -> &RequestScope {
        match self {
            Self::Create { scope, .. }
            | Self::Lookup { scope, .. }
            | Self::Allocate { scope, .. }
            | Self::Fetch { scope, .. }
            | Self::Update { scope, .. }
            | Self::Delete { scope, .. } => scope,
        }
    }
}

#[derive(Debug, Default)]
struct Inner {
    containers: BTreeMap<ObjectRef, NetworkContainer>,
    calls: Vec<ConnectorCall>,
    failures: HashMap<CallKind, ConnectorError>,
}

/// Connector that keeps network containers in memory.
#[derive(Debug, Default)]
pub struct MemoryConnector {
    inner: Mutex<Inner>,
    dry_run: bool,
}

fn generate_reference(label: &str, network_view: &str) -> ObjectRef {
    let uuid = uuid::Uuid::new_v4();
    let key = hex::encode(&uuid.as_bytes()[..6]);
    ObjectRef::new_unchecked(format!("networkcontainer/{key}:{label}/{network_view}"))
}

impl MemoryConnector {
    /// Create an empty connector.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a connector that accepts any parent container on lookup.
    #[must_use]
    pub fn dry_run() -> Self {
        Self {
            dry_run: true,
            ..Self::default()
        }
    }

    /// Store a container at `cidr`, returning its reference.
    pub fn seed(&self, network_view: &str, cidr: &str, family: AddressFamily) -> ObjectRef {
        let reference = generate_reference(cidr, network_view);
        let container = NetworkContainer {
            reference: reference.clone(),
            network_view: network_view.to_string(),
            cidr: Some(cidr.to_string()),
            family,
            comment: String::new(),
            ext_attrs: ExtAttrs::new(),
        };
        self.inner.lock().containers.insert(reference.clone(), container);
        reference
    }

    /// Make every call of `kind` fail with `error`.
    pub fn fail_on(&self, kind: CallKind, error: ConnectorError) {
        self.inner.lock().failures.insert(kind, error);
    }

    /// All calls issued so far, in order.
    #[must_use]
    pub fn calls(&self) -> Vec<ConnectorCall> {
        self.inner.lock().calls.clone()
    }

    /// The kinds of all calls issued so far, in order.
    #[must_use]
    pub fn call_kinds(&self) -> Vec<CallKind> {
        self.inner.lock().calls.iter().map(ConnectorCall::kind).collect()
    }

    /// Forget recorded calls.
    pub fn clear_calls(&self) {
        self.inner.lock().calls.clear();
    }

    /// Look up a stored container.
    #[must_use]
    pub fn container(&self, reference: &ObjectRef) -> Option<NetworkContainer> {
        self.inner.lock().containers.get(reference).cloned()
    }

    /// Number of stored containers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.lock().containers.len()
    }

    /// Returns `true` if no containers are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.lock().containers.is_empty()
    }

    fn record(&self, call: ConnectorCall) -> Result<(), ConnectorError> {
        let mut inner = self.inner.lock();
        let kind = call.kind();
        inner.calls.push(call);
        inner.failures.get(&kind).cloned().map_or(Ok(()), Err)
    }
}

fn find_by_cidr<'a>(
    containers: &'a BTreeMap<ObjectRef, NetworkContainer>,
    network_view: &str,
    cidr: &str,
    family: AddressFamily,
) -> Option<&'a NetworkContainer> {
    containers.values().find(|c| {
        c.network_view == network_view && c.cidr.as_deref() == Some(cidr) && c.family == family
    })
}

#[async_trait]
impl Connector for MemoryConnector {
    async fn create_network_container(
        &self,
        scope: &RequestScope,
        request: &CreateContainerRequest,
    ) -> Result<NetworkContainer, ConnectorError> {
        self.record(ConnectorCall::Create {
            scope: scope.clone(),
            request: request.clone(),
        })?;

        let mut inner = self.inner.lock();
        if find_by_cidr(
            &inner.containers,
            &request.network_view,
            &request.cidr,
            request.family,
        )
        .is_some()
        {
            return Err(ConnectorError::Api {
                status: 400,
                message: format!(
                    "network container {} already exists in network view {}",
                    request.cidr, request.network_view
                ),
            });
        }

        let container = NetworkContainer {
            reference: generate_reference(&request.cidr, &request.network_view),
            network_view: request.network_view.clone(),
            cidr: Some(request.cidr.clone()),
            family: request.family,
            comment: request.comment.clone(),
            ext_attrs: request.ext_attrs.clone(),
        };
        inner
            .containers
            .insert(container.reference.clone(), container.clone());
        Ok(container)
    }

    async fn get_network_container(
        &self,
        scope: &RequestScope,
        network_view: &str,
        cidr: &str,
        family: AddressFamily,
    ) -> Result<NetworkContainer, ConnectorError> {
        self.record(ConnectorCall::Lookup {
            scope: scope.clone(),
            network_view: network_view.to_string(),
            cidr: cidr.to_string(),
            family,
        })?;

        let inner = self.inner.lock();
        if let Some(container) = find_by_cidr(&inner.containers, network_view, cidr, family) {
            return Ok(container.clone());
        }
        if self.dry_run {
            return Ok(NetworkContainer {
                reference: generate_reference(cidr, network_view),
                network_view: network_view.to_string(),
                cidr: Some(cidr.to_string()),
                family,
                comment: String::new(),
                ext_attrs: ExtAttrs::new(),
            });
        }
        Err(ConnectorError::not_found(format!(
            "network container '{cidr}' in network view '{network_view}'"
        )))
    }

    async fn allocate_network_container(
        &self,
        scope: &RequestScope,
        request: &AllocateContainerRequest,
    ) -> Result<NetworkContainer, ConnectorError> {
        self.record(ConnectorCall::Allocate {
            scope: scope.clone(),
            request: request.clone(),
        })?;

        let label = format!("next-available/{}", request.prefix_len);
        let container = NetworkContainer {
            reference: generate_reference(&label, &request.network_view),
            network_view: request.network_view.clone(),
            cidr: None,
            family: request.family,
            comment: request.comment.clone(),
            ext_attrs: request.ext_attrs.clone(),
        };
        self.inner
            .lock()
            .containers
            .insert(container.reference.clone(), container.clone());
        Ok(container)
    }

    async fn get_network_container_by_ref(
        &self,
        scope: &RequestScope,
        reference: &ObjectRef,
    ) -> Result<NetworkContainer, ConnectorError> {
        self.record(ConnectorCall::Fetch {
            scope: scope.clone(),
            reference: reference.clone(),
        })?;

        self.inner
            .lock()
            .containers
            .get(reference)
            .cloned()
            .ok_or_else(|| ConnectorError::not_found(reference.to_string()))
    }

    async fn update_network_container(
        &self,
        scope: &RequestScope,
        reference: &ObjectRef,
        ext_attrs: &ExtAttrs,
        comment: &str,
    ) -> Result<NetworkContainer, ConnectorError> {
        self.record(ConnectorCall::Update {
            scope: scope.clone(),
            reference: reference.clone(),
            ext_attrs: ext_attrs.clone(),
            comment: comment.to_string(),
        })?;

        let mut inner = self.inner.lock();
        let container = inner
            .containers
            .get_mut(reference)
            .ok_or_else(|| ConnectorError::not_found(reference.to_string()))?;
        container.ext_attrs = ext_attrs.clone();
        container.comment = comment.to_string();
        Ok(container.clone())
    }

    async fn delete_network_container(
        &self,
        scope: &RequestScope,
        reference: &ObjectRef,
    ) -> Result<ObjectRef, ConnectorError> {
        self.record(ConnectorCall::Delete {
            scope: scope.clone(),
            reference: reference.clone(),
        })?;

        self.inner
            .lock()
            .containers
            .remove(reference)
            .map(|c| c.reference)
            .ok_or_else(|| ConnectorError::not_found(reference.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scope() -> RequestScope {
        RequestScope::for_tenant("")
    }

    #[tokio::test]
    async fn lookup_finds_seeded_parent() {
        let connector = MemoryConnector::new();
        let parent = connector.seed("default", "10.0.0.0/16", AddressFamily::Ipv4);

        let found = connector
            .get_network_container(&scope(), "default", "10.0.0.0/16", AddressFamily::Ipv4)
            .await
            .unwrap();
        assert_eq!(found.reference, parent);

        let err = connector
            .get_network_container(&scope(), "default", "10.0.0.0/16", AddressFamily::Ipv6)
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn dry_run_accepts_any_parent() {
        let connector = MemoryConnector::dry_run();
        let found = connector
            .get_network_container(&scope(), "default", "192.168.0.0/16", AddressFamily::Ipv4)
            .await
            .unwrap();
        assert_eq!(found.cidr.as_deref(), Some("192.168.0.0/16"));
        assert!(connector.is_empty());
    }

    #[tokio::test]
    async fn duplicate_create_rejected() {
        let connector = MemoryConnector::new();
        let request = CreateContainerRequest {
            network_view: "default".to_string(),
            cidr: "10.1.0.0/24".to_string(),
            family: AddressFamily::Ipv4,
            comment: String::new(),
            ext_attrs: ExtAttrs::new(),
        };
        let created = connector
            .create_network_container(&scope(), &request)
            .await
            .unwrap();
        assert_eq!(created.reference.object_type(), "networkcontainer");

        let err = connector
            .create_network_container(&scope(), &request)
            .await
            .unwrap_err();
        assert!(matches!(err, ConnectorError::Api { status: 400, .. }));
        assert_eq!(connector.len(), 1);
    }

    #[tokio::test]
    async fn injected_failure_is_recorded() {
        let connector = MemoryConnector::new();
        connector.fail_on(
            CallKind::Delete,
            ConnectorError::Transport {
                message: "connection reset".to_string(),
            },
        );
        let reference = connector.seed("default", "10.2.0.0/24", AddressFamily::Ipv4);

        let err = connector
            .delete_network_container(&scope(), &reference)
            .await
            .unwrap_err();
        assert!(matches!(err, ConnectorError::Transport { .. }));
        assert_eq!(connector.call_kinds(), [CallKind::Delete]);
        assert!(connector.container(&reference).is_some());
    }

    #[tokio::test]
    async fn update_and_delete_round() {
        let connector = MemoryConnector::new();
        let reference = connector.seed("default", "10.3.0.0/24", AddressFamily::Ipv4);
        let mut attrs = ExtAttrs::new();
        attrs.insert("Site", "nyc");

        let updated = connector
            .update_network_container(&scope(), &reference, &attrs, "core")
            .await
            .unwrap();
        assert_eq!(updated.comment, "core");
        assert_eq!(updated.ext_attrs, attrs);

        let deleted = connector
            .delete_network_container(&scope(), &reference)
            .await
            .unwrap();
        assert_eq!(deleted, reference);
        assert!(connector.is_empty());
    }
}
