use thiserror::Error;
use whisper_types::FailureKind;

/// Errors a forward can fail with at this hop.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RelayError {
    /// The registry has no entry for the recipient.
    #[error("no route to peer {alias}")]
    NoRoute { alias: String },

    /// The recipient's next hop is known but could not be dialed.
    #[error("can't dial {alias} at {addr}: {reason}")]
    Unreachable {
        alias: String,
        addr: String,
        reason: String,
    },

    /// A failure reported by a downstream hop, passed back unchanged.
    #[error("{message}")]
    Downstream { kind: FailureKind, message: String },
}

impl RelayError {
    /// The failure kind reported to callers.
    pub fn kind(&self) -> FailureKind {
        match self {
            RelayError::NoRoute { .. } => FailureKind::NotFound,
            RelayError::Unreachable { .. } => FailureKind::Unavailable,
            RelayError::Downstream { kind, .. } => *kind,
        }
    }

    /// Convert into the form an upstream hop sees after the error crossed
    /// the wire: only the kind and the rendered message survive.
    pub fn into_downstream(self) -> RelayError {
        match self {
            RelayError::Downstream { .. } => self,
            other => RelayError::Downstream {
                kind: other.kind(),
                message: other.to_string(),
            },
        }
    }
}

/// Failure to establish an outbound connection.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("failed to connect to {addr}: {reason}")]
pub struct DialError {
    pub addr: String,
    pub reason: String,
}

/// Errors seeding the registry from bootnodes.
#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("bootnode unreachable: {0}")]
    Dial(#[from] DialError),

    #[error("handshake with bootnode {addr} failed: {source}")]
    Handshake {
        addr: String,
        #[source]
        source: RelayError,
    },
}
