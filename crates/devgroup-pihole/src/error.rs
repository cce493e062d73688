//! Error types for directory access and reconciliation.

use thiserror::Error;

/// Errors raised while talking to the directory service or classifying its data.
#[derive(Debug, Error)]
pub enum DirectoryError {
    /// The HTTP call could not be completed (DNS, connect, timeout, body read).
    #[error("transport failure calling {endpoint}: {source}")]
    Transport {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    /// The directory answered with a non-success status on a read.
    #[error("{endpoint} returned {status} {status_text}")]
    UpstreamStatus {
        endpoint: String,
        status: u16,
        status_text: String,
    },

    /// Success status, but the body did not carry what we need.
    #[error("malformed response from {endpoint}: {detail}")]
    MalformedResponse { endpoint: String, detail: String },

    /// Group creation was rejected.
    #[error("group creation failed ({status}): {body}")]
    Creation { status: u16, body: String },

    /// Replacing a client's group set was rejected.
    #[error("group assignment for {hardware_address} failed ({status}): {body}")]
    Assignment {
        hardware_address: String,
        status: u16,
        body: String,
    },

    /// No device lists the caller's address.
    #[error("no device found for address {0}")]
    IdentityUnresolved(String),

    /// No client record matches the hardware address.
    #[error("no client record for hardware address {0}")]
    ClientUnresolved(String),

    /// Group set is neither `[0]` nor `[0, g]`.
    #[error("group set {0:?} is not in a recognized shape")]
    InvariantMismatch(Vec<u32>),

    /// Client could not be constructed.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result alias for directory operations.
pub type DirectoryResult<T> = Result<T, DirectoryError>;

impl DirectoryError {
    /// Returns a machine-readable error code.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Transport { .. } => "transport_failure",
            Self::UpstreamStatus { .. } => "upstream_status",
            Self::MalformedResponse { .. } => "malformed_response",
            Self::Creation { .. } => "creation_failed",
            Self::Assignment { .. } => "assignment_failed",
            Self::IdentityUnresolved(_) => "identity_unresolved",
            Self::ClientUnresolved(_) => "client_unresolved",
            Self::InvariantMismatch(_) => "invariant_mismatch",
            Self::InvalidConfig(_) => "invalid_config",
        }
    }

    /// HTTP status reported by the directory, if the failure carried one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::UpstreamStatus { status, .. }
            | Self::Creation { status, .. }
            | Self::Assignment { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub(crate) fn transport(endpoint: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Transport {
            endpoint: endpoint.into(),
            source,
        }
    }

    pub(crate) fn malformed(endpoint: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::MalformedResponse {
            endpoint: endpoint.into(),
            detail: detail.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        let err = DirectoryError::UpstreamStatus {
            endpoint: "/api/clients".into(),
            status: 503,
            status_text: "Service Unavailable".into(),
        };
        assert_eq!(err.error_code(), "upstream_status");
        assert_eq!(err.status(), Some(503));

        assert_eq!(
            DirectoryError::IdentityUnresolved("10.0.0.1".into()).error_code(),
            "identity_unresolved"
        );
        assert_eq!(
            DirectoryError::ClientUnresolved("AA:BB".into()).error_code(),
            "client_unresolved"
        );
        assert_eq!(
            DirectoryError::InvariantMismatch(vec![0, 3, 9]).error_code(),
            "invariant_mismatch"
        );
        assert_eq!(DirectoryError::InvariantMismatch(vec![]).status(), None);
    }

    #[test]
    fn test_error_display() {
        let err = DirectoryError::UpstreamStatus {
            endpoint: "/api/network/devices".into(),
            status: 500,
            status_text: "Internal Server Error".into(),
        };
        assert_eq!(
            err.to_string(),
            "/api/network/devices returned 500 Internal Server Error"
        );

        let err = DirectoryError::Assignment {
            hardware_address: "AA:BB:CC:DD:EE:FF".into(),
            status: 400,
            body: "bad request".into(),
        };
        assert_eq!(
            err.to_string(),
            "group assignment for AA:BB:CC:DD:EE:FF failed (400): bad request"
        );

        let err = DirectoryError::InvariantMismatch(vec![0, 3, 9]);
        assert_eq!(
            err.to_string(),
            "group set [0, 3, 9] is not in a recognized shape"
        );
    }
}
