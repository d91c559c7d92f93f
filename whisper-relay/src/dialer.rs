//! Seam between the relay core and the RPC transport.

use async_trait::async_trait;
use whisper_types::{Identity, Secret};

use crate::error::{DialError, RelayError};

/// An established connection to a remote relay.
#[async_trait]
pub trait PeerClient: Send + Sync {
    /// Send our identity and receive the remote's.
    async fn handshake(&self, identity: Identity) -> Result<Identity, RelayError>;

    /// Hand a secret to the remote relay and wait for its outcome.
    async fn forward(&self, secret: Secret) -> Result<(), RelayError>;
}

/// Opens outbound connections. `dial` resolves only once the connection is
/// established or has failed.
#[async_trait]
pub trait PeerDialer: Send + Sync {
    async fn dial(&self, addr: &str) -> Result<Box<dyn PeerClient>, DialError>;
}
