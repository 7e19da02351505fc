//! Common error types for the ibx provider.

use miette::Diagnostic;
use thiserror::Error;

/// Result type alias using [`IpamError`].
pub type IpamResult<T> = Result<T, IpamError>;

/// Coarse classification of an [`IpamError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed configuration input.
    Config,
    /// Local precondition violation.
    Validation,
    /// Failure reported by the connector.
    Remote,
    /// Local I/O or serialization failure.
    Local,
}

/// Errors surfaced by the provider engine.
#[derive(Error, Diagnostic, Debug)]
pub enum IpamError {
    /// Configuration could not be processed.
    #[error("{message}")]
    #[diagnostic(
        code(ibx::config),
        help("'ext_attrs' must be a JSON object, e.g. {{\"Tenant ID\": \"acme\"}}")
    )]
    Config {
        /// The error message.
        message: String,
    },

    /// A precondition was violated before any remote call.
    #[error("{message}")]
    #[diagnostic(code(ibx::validation))]
    Validation {
        /// The error message.
        message: String,
    },

    /// The connector reported a failure.
    #[error("{message}: {source}")]
    #[diagnostic(code(ibx::remote))]
    Remote {
        /// Operation context (resources involved).
        message: String,
        /// The underlying connector failure.
        #[source]
        source: ConnectorError,
    },

    /// I/O error.
    #[error("I/O error: {0}")]
    #[diagnostic(code(ibx::io))]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    #[diagnostic(code(ibx::serialization))]
    Serialization(String),
}

impl IpamError {
    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Wrap a connector failure with operation context.
    pub fn remote(message: impl Into<String>, source: ConnectorError) -> Self {
        Self::Remote {
            message: message.into(),
            source,
        }
    }

    /// Classify this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Config { .. } => ErrorKind::Config,
            Self::Validation { .. } => ErrorKind::Validation,
            Self::Remote { .. } => ErrorKind::Remote,
            Self::Io(_) | Self::Serialization(_) => ErrorKind::Local,
        }
    }
}

impl From<serde_json::Error> for IpamError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// Failures reported by a connector implementation.
#[derive(Error, Diagnostic, Debug, Clone, PartialEq, Eq)]
pub enum ConnectorError {
    /// The requested object does not exist.
    #[error("object not found: {what}")]
    #[diagnostic(code(ibx::connector::not_found))]
    NotFound {
        /// Description of the missing object.
        what: String,
    },

    /// The request did not reach the management API.
    #[error("transport error: {message}")]
    #[diagnostic(code(ibx::connector::transport))]
    Transport {
        /// The error message.
        message: String,
    },

    /// The management API rejected the request.
    #[error("API error ({status}): {message}")]
    #[diagnostic(code(ibx::connector::api))]
    Api {
        /// HTTP status returned by the API.
        status: u16,
        /// The error message.
        message: String,
    },
}

impl ConnectorError {
    /// Create a not-found error.
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound { what: what.into() }
    }

    /// Returns `true` if the object was not found.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = IpamError::validation("prefixLen is less than 2");
        assert_eq!(err.to_string(), "prefixLen is less than 2");
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn remote_error_includes_source() {
        let err = IpamError::remote(
            "failed to retrieve network container",
            ConnectorError::not_found("networkcontainer/abc"),
        );
        insta::assert_snapshot!(
            err.to_string(),
            @"failed to retrieve network container: object not found: networkcontainer/abc"
        );
        assert_eq!(err.kind(), ErrorKind::Remote);
    }

    #[test]
    fn error_from_json() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: IpamError = json_err.into();
        assert!(matches!(err, IpamError::Serialization(_)));
        assert_eq!(err.kind(), ErrorKind::Local);
    }

    #[test]
    fn api_error_display() {
        let err = ConnectorError::Api {
            status: 400,
            message: "invalid network".to_string(),
        };
        assert_eq!(err.to_string(), "API error (400): invalid network");
        assert!(!err.is_not_found());
    }
}
