use std::collections::HashMap;

use tokio::sync::RwLock;
use whisper_types::Identity;

/// Alias to address table of the peers this node has been introduced to.
///
/// One reader/writer lock guards the whole map: lookups run concurrently,
/// an upsert waits for in-flight lookups and excludes new ones. Entries are
/// never removed.
#[derive(Debug, Default)]
pub struct PeerRegistry {
    peers: RwLock<HashMap<String, String>>,
}

impl PeerRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry seeded with an initial peer set.
    pub fn with_peers(peers: HashMap<String, String>) -> Self {
        Self {
            peers: RwLock::new(peers),
        }
    }

    /// Record `address` for `alias`, overwriting any previous address.
    /// Returns the address that was replaced, if any.
    pub async fn upsert(
        &self,
        alias: impl Into<String>,
        address: impl Into<String>,
    ) -> Option<String> {
        self.peers.write().await.insert(alias.into(), address.into())
    }

    /// Address known for `alias`. `None` means no route; an empty address
    /// that was explicitly stored is returned as `Some("")`.
    pub async fn lookup(&self, alias: &str) -> Option<String> {
        self.peers.read().await.get(alias).cloned()
    }

    pub async fn len(&self) -> usize {
        self.peers.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.peers.read().await.is_empty()
    }

    /// All known peers, sorted by alias.
    pub async fn snapshot(&self) -> Vec<Identity> {
        let peers = self.peers.read().await;
        let mut list: Vec<Identity> = peers
            .iter()
            .map(|(alias, address)| Identity::new(alias.clone(), address.clone()))
            .collect();
        list.sort_by(|a, b| a.alias.cmp(&b.alias));
        list
    }
}
