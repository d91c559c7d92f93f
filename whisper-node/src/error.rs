use thiserror::Error;

use whisper_relay::error::{BootstrapError, RelayError};

/// Errors that can occur in the node.
#[derive(Debug, Error)]
#[allow(clippy::enum_variant_names)]
pub enum NodeError {
    #[error("config error: {reason}")]
    ConfigError { reason: String },

    #[error("bootstrap error: {0}")]
    BootstrapError(#[from] BootstrapError),

    #[error("forward failed ({kind}): {0}", kind = .0.kind())]
    ForwardError(#[from] RelayError),

    #[error("rpc error: {reason}")]
    RpcError { reason: String },

    #[error("io error: {0}")]
    IoError(#[from] std::io::Error),
}
