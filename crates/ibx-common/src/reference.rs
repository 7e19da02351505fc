//! Remote object references.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{IpamError, IpamResult};

/// A reference to an object held by the management API.
///
/// References are opaque to the provider. They look like
/// `networkcontainer/ZG5zLm5ldHdvcmtfY29udGFpbmVy:10.0.0.0/24/default`,
/// where the text before the first `/` names the object type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectRef(String);

impl ObjectRef {
    /// Create a new reference, rejecting empty or whitespace-only text.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the reference is blank.
    pub fn new(reference: impl Into<String>) -> IpamResult<Self> {
        let reference = reference.into();
        if reference.trim().is_empty() {
            return Err(IpamError::validation("object reference must not be empty"));
        }
        Ok(Self(reference))
    }

    /// Create a reference without validation.
    ///
    /// The caller must ensure the reference is not blank.
    #[must_use]
    pub fn new_unchecked(reference: impl Into<String>) -> Self {
        Self(reference.into())
    }

    /// Get the reference as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The object type part of the reference (e.g. `networkcontainer`).
    #[must_use]
    pub fn object_type(&self) -> &str {
        self.0.split('/').next().unwrap_or_default()
    }
}

impl fmt::Display for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ObjectRef {
    type Err = IpamError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_references() {
        let r = ObjectRef::new("networkcontainer/ZG5z:10.0.0.0/24/default").unwrap();
        assert_eq!(r.object_type(), "networkcontainer");
        assert_eq!(r.to_string(), "networkcontainer/ZG5z:10.0.0.0/24/default");
    }

    #[test]
    fn blank_references_rejected() {
        assert!(ObjectRef::new("").is_err());
        assert!(ObjectRef::new("   ").is_err());
        assert!("".parse::<ObjectRef>().is_err());
    }

    #[test]
    fn reference_without_slash() {
        let r: ObjectRef = "opaque".parse().unwrap();
        assert_eq!(r.object_type(), "opaque");
    }

    #[test]
    fn serializes_transparently() {
        let r = ObjectRef::new("networkcontainer/abc").unwrap();
        assert_eq!(serde_json::to_string(&r).unwrap(), "\"networkcontainer/abc\"");
    }
}
