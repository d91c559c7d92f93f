use std::collections::HashMap;

use whisper_types::Identity;

use crate::dialer::PeerDialer;
use crate::error::BootstrapError;

/// Introduce `local` to every bootnode and collect the initial peer set.
///
/// Each bootnode is recorded under the alias it reports, mapped to the
/// address we dialed (not the address it reports). Blank entries are
/// skipped. The first bootnode that cannot be dialed or handshaken aborts
/// seeding.
pub async fn seed_peers(
    dialer: &dyn PeerDialer,
    local: &Identity,
    boot_nodes: &[String],
) -> Result<HashMap<String, String>, BootstrapError> {
    let mut peers = HashMap::new();

    for addr in boot_nodes.iter().map(|s| s.trim()).filter(|s| !s.is_empty()) {
        tracing::info!(addr = %addr, "dialing bootnode");
        let client = dialer.dial(addr).await?;
        let remote = client
            .handshake(local.clone())
            .await
            .map_err(|source| BootstrapError::Handshake {
                addr: addr.to_string(),
                source,
            })?;

        tracing::info!(alias = %remote.alias, addr = %addr, "bootnode registered");
        peers.insert(remote.alias, addr.to_string());
    }

    Ok(peers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryNetwork;
    use crate::relay::RelayNode;
    use std::sync::Arc;

    fn attach(network: &MemoryNetwork, alias: &str, addr: &str) -> Arc<RelayNode> {
        let node = Arc::new(RelayNode::new(
            Identity::new(alias, addr),
            HashMap::new(),
            Arc::new(network.clone()),
        ));
        network.attach(&node);
        node
    }

    #[tokio::test]
    async fn test_seed_records_dialed_address() {
        let network = MemoryNetwork::new();
        // b reports an address different from the one we dial.
        let b = Arc::new(RelayNode::new(
            Identity::new("b", "0.0.0.0:9000"),
            HashMap::new(),
            Arc::new(network.clone()),
        ));
        network.attach_at("10.1.1.2:9000", &b);
        let local = Identity::new("a", "a:9000");

        let peers = seed_peers(&network, &local, &["10.1.1.2:9000".to_string()])
            .await
            .unwrap();
        assert_eq!(peers.get("b"), Some(&"10.1.1.2:9000".to_string()));
        assert_eq!(b.registry().lookup("a").await, Some("a:9000".to_string()));
    }

    #[tokio::test]
    async fn test_seed_multiple_bootnodes_skips_blank() {
        let network = MemoryNetwork::new();
        let _b = attach(&network, "b", "b:9000");
        let _c = attach(&network, "c", "c:9000");
        let local = Identity::new("a", "a:9000");
        let boot_nodes = vec![
            "b:9000".to_string(),
            String::new(),
            " ".to_string(),
            "c:9000".to_string(),
        ];

        let peers = seed_peers(&network, &local, &boot_nodes).await.unwrap();
        assert_eq!(peers.len(), 2);
        assert_eq!(peers.get("c"), Some(&"c:9000".to_string()));
        assert_eq!(network.dial_log().len(), 2);
    }

    #[tokio::test]
    async fn test_unreachable_bootnode_aborts() {
        let network = MemoryNetwork::new();
        let local = Identity::new("a", "a:9000");

        let err = seed_peers(&network, &local, &["dead:1".to_string()])
            .await
            .unwrap_err();
        assert!(matches!(err, BootstrapError::Dial(_)));
    }

    #[tokio::test]
    async fn test_no_bootnodes_is_empty() {
        let network = MemoryNetwork::new();
        let local = Identity::new("a", "a:9000");
        let peers = seed_peers(&network, &local, &[]).await.unwrap();
        assert!(peers.is_empty());
    }
}
