use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::broadcast;
use whisper_types::{Identity, Secret};

use crate::dialer::PeerDialer;
use crate::error::RelayError;
use crate::registry::PeerRegistry;

/// Capacity of the local delivery channel.
const DELIVERY_CHANNEL_CAPACITY: usize = 64;

/// What a successful forward did at this hop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ForwardOutcome {
    /// This node is the recipient.
    Delivered,
    /// The secret was handed to the next hop at `addr`, which accepted it.
    Relayed { addr: String },
}

/// A relay node: its own identity plus the registry of peers it was told about.
///
/// Handshake and forward take `&self` and may run concurrently from any
/// number of tasks; the registry is the only shared mutable state.
pub struct RelayNode {
    identity: Identity,
    registry: PeerRegistry,
    dialer: Arc<dyn PeerDialer>,
    delivered_tx: broadcast::Sender<Secret>,
}

impl RelayNode {
    /// Create a relay node seeded with an initial alias to address set.
    pub fn new(
        identity: Identity,
        peers: HashMap<String, String>,
        dialer: Arc<dyn PeerDialer>,
    ) -> Self {
        let (delivered_tx, _) = broadcast::channel(DELIVERY_CHANNEL_CAPACITY);
        Self {
            identity,
            registry: PeerRegistry::with_peers(peers),
            dialer,
            delivered_tx,
        }
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    pub fn registry(&self) -> &PeerRegistry {
        &self.registry
    }

    /// Subscribe to secrets delivered to this node.
    pub fn subscribe(&self) -> broadcast::Receiver<Secret> {
        self.delivered_tx.subscribe()
    }

    /// Record the remote's identity and return our own.
    pub async fn handshake(&self, remote: Identity) -> Identity {
        tracing::info!(alias = %remote.alias, addr = %remote.address, "handshake received");

        if let Some(previous) = self
            .registry
            .upsert(remote.alias.clone(), remote.address.clone())
            .await
        {
            if previous != remote.address {
                tracing::debug!(
                    alias = %remote.alias,
                    old = %previous,
                    new = %remote.address,
                    "peer address replaced"
                );
            }
        }

        self.identity.clone()
    }

    /// Deliver `secret` locally or pass it one hop closer to its recipient.
    ///
    /// Waits for the downstream hop to finish before returning. A failure
    /// reported downstream is returned as is; a failed dial is reported as
    /// [`RelayError::Unreachable`]. The registry is never modified here.
    pub async fn forward(&self, secret: Secret) -> Result<ForwardOutcome, RelayError> {
        if secret.is_for(&self.identity.alias) {
            tracing::info!(
                recipient = %secret.recipient_alias,
                message = %secret.message,
                "secret delivered"
            );
            // No subscribers is fine: delivery is the log line above.
            let _ = self.delivered_tx.send(secret);
            return Ok(ForwardOutcome::Delivered);
        }

        // The read guard is released here, before any network I/O.
        let addr = match self.registry.lookup(&secret.recipient_alias).await {
            Some(addr) => addr,
            None => {
                tracing::warn!(recipient = %secret.recipient_alias, "no route to recipient");
                return Err(RelayError::NoRoute {
                    alias: secret.recipient_alias,
                });
            }
        };

        tracing::debug!(recipient = %secret.recipient_alias, addr = %addr, "relaying secret");

        let client = self.dialer.dial(&addr).await.map_err(|e| {
            tracing::warn!(recipient = %secret.recipient_alias, addr = %addr, "dial failed: {}", e.reason);
            RelayError::Unreachable {
                alias: secret.recipient_alias.clone(),
                addr: addr.clone(),
                reason: e.reason,
            }
        })?;

        client.forward(secret).await?;
        Ok(ForwardOutcome::Relayed { addr })
    }
}
