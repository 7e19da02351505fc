//! # ibx-common
//!
//! Shared types for the ibx IPAM provider.
//!
//! This crate provides common functionality used across the ibx crates:
//! - Remote object references
//! - Address family selection
//! - Extensible attribute parsing and tenant scoping
//! - Common error types

#![warn(missing_docs)]

pub mod error;
pub mod ext_attrs;
pub mod family;
pub mod reference;

pub use error::{ConnectorError, ErrorKind, IpamError, IpamResult};
pub use ext_attrs::{ExtAttrs, TENANT_ID_ATTR};
pub use family::AddressFamily;
pub use reference::ObjectRef;
