//! In-process network of relay nodes, for tests and embedding.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError, RwLock, Weak};

use async_trait::async_trait;
use whisper_types::{Identity, Secret};

use crate::dialer::{PeerClient, PeerDialer};
use crate::error::{DialError, RelayError};
use crate::relay::RelayNode;

/// Routes dials to [`RelayNode`]s attached under their own address.
///
/// The maps stay usable after a panicking holder poisons a lock; every
/// critical section is one map operation.
///
/// Errors returned by a dialed node are flattened to
/// [`RelayError::Downstream`], the same shape a caller sees over RPC.
#[derive(Clone, Default)]
pub struct MemoryNetwork {
    inner: Arc<Inner>,
}

#[derive(Default)]
struct Inner {
    nodes: RwLock<HashMap<String, Weak<RelayNode>>>,
    dials: Mutex<Vec<String>>,
}

impl MemoryNetwork {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `node` reachable at its identity's address.
    pub fn attach(&self, node: &Arc<RelayNode>) {
        self.attach_at(&node.identity().address, node);
    }

    /// Make `node` reachable at `addr`, whatever address it reports.
    pub fn attach_at(&self, addr: &str, node: &Arc<RelayNode>) {
        self.inner
            .nodes
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(addr.to_string(), Arc::downgrade(node));
    }

    /// Make `addr` unreachable.
    pub fn detach(&self, addr: &str) {
        self.inner
            .nodes
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(addr);
    }

    /// Every address dialed so far, in order, including failed dials.
    pub fn dial_log(&self) -> Vec<String> {
        self.inner
            .dials
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn resolve(&self, addr: &str) -> Option<Arc<RelayNode>> {
        self.inner
            .nodes
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(addr)
            .and_then(Weak::upgrade)
    }
}

#[async_trait]
impl PeerDialer for MemoryNetwork {
    async fn dial(&self, addr: &str) -> Result<Box<dyn PeerClient>, DialError> {
        self.inner
            .dials
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(addr.to_string());
        match self.resolve(addr) {
            Some(node) => Ok(Box::new(MemoryClient { node })),
            None => Err(DialError {
                addr: addr.to_string(),
                reason: "connection refused".to_string(),
            }),
        }
    }
}

struct MemoryClient {
    node: Arc<RelayNode>,
}

#[async_trait]
impl PeerClient for MemoryClient {
    async fn handshake(&self, identity: Identity) -> Result<Identity, RelayError> {
        Ok(self.node.handshake(identity).await)
    }

    async fn forward(&self, secret: Secret) -> Result<(), RelayError> {
        self.node
            .forward(secret)
            .await
            .map(|_| ())
            .map_err(RelayError::into_downstream)
    }
}
