//! # ibx-provider
//!
//! Network container resources for IPAM infrastructure-as-code.
//!
//! This crate provides:
//! - The network container lifecycle engine (create, read, update, delete)
//! - The connector capability used to reach the management API
//! - The host capability used to read configuration and persist identity
//! - Resource schemas and the provider registry
//! - An in-memory connector for tests and dry-runs
//! - Manifest loading for the `ibx-provider` CLI

#![warn(missing_docs)]

pub mod cli;
pub mod connector;
pub mod manifest;
pub mod memory;
pub mod network_container;
pub mod provider;
pub mod resource_data;
pub mod schema;

pub use connector::{
    AllocateContainerRequest, CALLER_IDENTITY, Connector, CreateContainerRequest,
    NetworkContainer, ObjectManager, RequestScope,
};
pub use manifest::{Manifest, ResourceSpec};
pub use memory::{CallKind, ConnectorCall, MemoryConnector};
pub use network_container::{AllocationMode, NetworkContainerConfig, NetworkContainerResource};
pub use provider::{IPV4_NETWORK_CONTAINER, IPV6_NETWORK_CONTAINER, Provider};
pub use resource_data::{ResourceData, ResourceState};
pub use schema::{Attribute, AttributeType, Schema, network_container_schema};
