use std::sync::Arc;

use jsonrpsee::core::async_trait;
use jsonrpsee::proc_macros::rpc;
use jsonrpsee::types::ErrorObjectOwned;

use whisper_relay::error::RelayError;
use whisper_relay::relay::{ForwardOutcome, RelayNode};
use whisper_types::constants::UNAVAILABLE_CODE;
use whisper_types::{Identity, Secret};

use super::inflight::InFlight;
use crate::metrics::NodeMetrics;

/// JSON-RPC trait for a Whisper relay.
#[rpc(server, client)]
pub trait WhisperRpc {
    /// Exchange identities: the caller is recorded, our identity is returned.
    #[method(name = "whisper_handshake")]
    async fn handshake(&self, identity: Identity) -> Result<Identity, ErrorObjectOwned>;

    /// Deliver or relay a secret.
    #[method(name = "whisper_forward")]
    async fn forward(&self, secret: Secret) -> Result<(), ErrorObjectOwned>;

    /// List the peers this relay knows, sorted by alias.
    #[method(name = "whisper_peers")]
    async fn peers(&self) -> Result<Vec<Identity>, ErrorObjectOwned>;

    /// Get node metrics in Prometheus text exposition format.
    #[method(name = "whisper_getMetrics")]
    async fn get_metrics(&self) -> Result<String, ErrorObjectOwned>;
}

/// Implementation of the WhisperRpc trait.
pub struct WhisperRpcImpl {
    pub relay: Arc<RelayNode>,
    pub metrics: Arc<NodeMetrics>,
    pub calls: InFlight,
}

/// Wire form of a relay failure: the kind's code and the error text.
pub fn relay_error_object(err: &RelayError) -> ErrorObjectOwned {
    ErrorObjectOwned::owned(err.kind().code(), err.to_string(), None::<()>)
}

fn shutting_down() -> ErrorObjectOwned {
    ErrorObjectOwned::owned(UNAVAILABLE_CODE, "relay is shutting down", None::<()>)
}

#[async_trait]
impl WhisperRpcServer for WhisperRpcImpl {
    async fn handshake(&self, identity: Identity) -> Result<Identity, ErrorObjectOwned> {
        let _call = self.calls.enter().ok_or_else(shutting_down)?;
        let reply = self.relay.handshake(identity).await;
        self.metrics.handshakes.inc();
        self.metrics
            .peer_count
            .set(self.relay.registry().len().await as i64);
        Ok(reply)
    }

    async fn forward(&self, secret: Secret) -> Result<(), ErrorObjectOwned> {
        let _call = self.calls.enter().ok_or_else(shutting_down)?;
        match self.relay.forward(secret).await {
            Ok(ForwardOutcome::Delivered) => {
                self.metrics.secrets_delivered.inc();
                Ok(())
            }
            Ok(ForwardOutcome::Relayed { .. }) => {
                self.metrics.secrets_relayed.inc();
                Ok(())
            }
            Err(e) => {
                self.metrics.forward_failures.inc();
                Err(relay_error_object(&e))
            }
        }
    }

    async fn peers(&self) -> Result<Vec<Identity>, ErrorObjectOwned> {
        Ok(self.relay.registry().snapshot().await)
    }

    async fn get_metrics(&self) -> Result<String, ErrorObjectOwned> {
        self.metrics.encode().map_err(|e| {
            ErrorObjectOwned::owned(
                -32603,
                format!("failed to encode metrics: {}", e),
                None::<()>,
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use whisper_relay::memory::MemoryNetwork;
    use whisper_types::constants::NOT_FOUND_CODE;

    fn rpc_impl(alias: &str, network: &MemoryNetwork) -> WhisperRpcImpl {
        let relay = Arc::new(RelayNode::new(
            Identity::new(alias, format!("{alias}:9000")),
            HashMap::new(),
            Arc::new(network.clone()),
        ));
        network.attach(&relay);
        WhisperRpcImpl {
            relay,
            metrics: Arc::new(NodeMetrics::new()),
            calls: InFlight::new(),
        }
    }

    #[test]
    fn test_relay_error_object_codes() {
        let not_found = relay_error_object(&RelayError::NoRoute {
            alias: "z".to_string(),
        });
        assert_eq!(not_found.code(), NOT_FOUND_CODE);
        assert_eq!(not_found.message(), "no route to peer z");

        let unavailable = relay_error_object(&RelayError::Unreachable {
            alias: "b".to_string(),
            addr: "b:9000".to_string(),
            reason: "refused".to_string(),
        });
        assert_eq!(unavailable.code(), UNAVAILABLE_CODE);
    }

    #[tokio::test]
    async fn test_handshake_updates_peer_gauge() {
        let network = MemoryNetwork::new();
        let api = rpc_impl("a", &network);

        let reply = WhisperRpcServer::handshake(&api, Identity::new("b", "b:9000"))
            .await
            .unwrap();
        assert_eq!(reply.alias, "a");
        assert_eq!(api.metrics.peer_count.get(), 1);
        assert_eq!(api.metrics.handshakes.get(), 1);
    }

    #[tokio::test]
    async fn test_forward_counts_outcomes() {
        let network = MemoryNetwork::new();
        let api = rpc_impl("a", &network);

        WhisperRpcServer::forward(&api, Secret::new("a", "hi"))
            .await
            .unwrap();
        let err = WhisperRpcServer::forward(&api, Secret::new("z", "hi"))
            .await
            .unwrap_err();

        assert_eq!(err.code(), NOT_FOUND_CODE);
        assert_eq!(api.metrics.secrets_delivered.get(), 1);
        assert_eq!(api.metrics.forward_failures.get(), 1);
    }

    #[tokio::test]
    async fn test_peers_lists_snapshot() {
        let network = MemoryNetwork::new();
        let api = rpc_impl("a", &network);
        WhisperRpcServer::handshake(&api, Identity::new("c", "c:9000"))
            .await
            .unwrap();
        WhisperRpcServer::handshake(&api, Identity::new("b", "b:9000"))
            .await
            .unwrap();

        let peers = WhisperRpcServer::peers(&api).await.unwrap();
        assert_eq!(
            peers,
            vec![Identity::new("b", "b:9000"), Identity::new("c", "c:9000")]
        );
    }

    #[tokio::test]
    async fn test_calls_refused_after_drain() {
        let network = MemoryNetwork::new();
        let api = rpc_impl("a", &network);
        api.calls.drain().await;

        let err = WhisperRpcServer::forward(&api, Secret::new("a", "hi"))
            .await
            .unwrap_err();
        assert_eq!(err.code(), UNAVAILABLE_CODE);
        let err = WhisperRpcServer::handshake(&api, Identity::new("b", "b:9000"))
            .await
            .unwrap_err();
        assert_eq!(err.code(), UNAVAILABLE_CODE);
        assert!(api.relay.registry().is_empty().await);
        assert_eq!(api.metrics.secrets_delivered.get(), 0);
    }
}
