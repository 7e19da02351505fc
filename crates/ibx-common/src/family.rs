//! Address family selection.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The address family a network container belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AddressFamily {
    /// IPv4 address space.
    #[default]
    Ipv4,
    /// IPv6 address space.
    Ipv6,
}

impl AddressFamily {
    /// Flag passed to the management API (`true` for IPv6).
    #[must_use]
    pub const fn is_ipv6(self) -> bool {
        matches!(self, Self::Ipv6)
    }

    /// Lowercase name (`ipv4` or `ipv6`).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ipv4 => "ipv4",
            Self::Ipv6 => "ipv6",
        }
    }
}

impl fmt::Display for AddressFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ipv6_flag() {
        assert!(!AddressFamily::Ipv4.is_ipv6());
        assert!(AddressFamily::Ipv6.is_ipv6());
        assert_eq!(AddressFamily::default(), AddressFamily::Ipv4);
    }

    #[test]
    fn serde_names() {
        let family: AddressFamily = serde_json::from_str("\"ipv6\"").unwrap();
        assert_eq!(family, AddressFamily::Ipv6);
        assert_eq!(family.to_string(), "ipv6");
    }
}
