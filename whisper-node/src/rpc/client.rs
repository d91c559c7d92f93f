use std::time::Duration;

use async_trait::async_trait;
use jsonrpsee::core::ClientError;
use jsonrpsee::ws_client::{WsClient, WsClientBuilder};

use whisper_relay::dialer::{PeerClient, PeerDialer};
use whisper_relay::error::{DialError, RelayError};
use whisper_types::constants::DEFAULT_DIAL_TIMEOUT_MS;
use whisper_types::{FailureKind, Identity, Secret};

use super::handlers::WhisperRpcClient;
use crate::error::NodeError;

/// WebSocket URL for a relay address; `host:port` gets a `ws://` scheme.
pub fn relay_url(addr: &str) -> String {
    if addr.starts_with("ws://") || addr.starts_with("wss://") {
        addr.to_string()
    } else {
        format!("ws://{}", addr)
    }
}

/// Map a failed call to the relay failure the caller sees.
///
/// Application errors keep their kind and message. Anything else (connection
/// drop, timeout, unknown error code) is reported as unavailable.
pub fn relay_error_from_client(err: ClientError) -> RelayError {
    match err {
        ClientError::Call(obj) => RelayError::Downstream {
            kind: FailureKind::try_from(obj.code()).unwrap_or(FailureKind::Unavailable),
            message: obj.message().to_string(),
        },
        other => RelayError::Downstream {
            kind: FailureKind::Unavailable,
            message: other.to_string(),
        },
    }
}

/// A live WebSocket connection to a relay.
pub struct RpcPeerClient {
    client: WsClient,
}

impl RpcPeerClient {
    /// Connect to the relay at `addr`. Resolves once connected or failed.
    pub async fn connect(addr: &str) -> Result<Self, DialError> {
        Self::connect_with_timeout(addr, Duration::from_millis(DEFAULT_DIAL_TIMEOUT_MS)).await
    }

    /// Connect, failing once `timeout` has elapsed. The bound covers both
    /// the TCP connect and the WebSocket upgrade, so a peer that accepts
    /// but never answers the upgrade still fails the dial.
    pub async fn connect_with_timeout(addr: &str, timeout: Duration) -> Result<Self, DialError> {
        let connecting = WsClientBuilder::default()
            .connection_timeout(timeout)
            .build(relay_url(addr));
        let client = match tokio::time::timeout(timeout, connecting).await {
            Ok(result) => result.map_err(|e| DialError {
                addr: addr.to_string(),
                reason: e.to_string(),
            })?,
            Err(_) => {
                return Err(DialError {
                    addr: addr.to_string(),
                    reason: format!("timed out after {}ms", timeout.as_millis()),
                });
            }
        };
        Ok(Self { client })
    }

    /// Registry snapshot of the connected relay.
    pub async fn peers(&self) -> Result<Vec<Identity>, NodeError> {
        self.client
            .peers()
            .await
            .map_err(|e| NodeError::RpcError {
                reason: e.to_string(),
            })
    }

    /// Prometheus metrics of the connected relay.
    pub async fn metrics(&self) -> Result<String, NodeError> {
        self.client
            .get_metrics()
            .await
            .map_err(|e| NodeError::RpcError {
                reason: e.to_string(),
            })
    }
}

#[async_trait]
impl PeerClient for RpcPeerClient {
    async fn handshake(&self, identity: Identity) -> Result<Identity, RelayError> {
        WhisperRpcClient::handshake(&self.client, identity)
            .await
            .map_err(relay_error_from_client)
    }

    async fn forward(&self, secret: Secret) -> Result<(), RelayError> {
        WhisperRpcClient::forward(&self.client, secret)
            .await
            .map_err(relay_error_from_client)
    }
}

/// Dials relays over JSON-RPC WebSocket connections, one per call.
#[derive(Debug, Clone, Copy)]
pub struct RpcDialer {
    connect_timeout: Duration,
}

impl RpcDialer {
    pub fn new(connect_timeout: Duration) -> Self {
        Self { connect_timeout }
    }
}

impl Default for RpcDialer {
    fn default() -> Self {
        Self::new(Duration::from_millis(DEFAULT_DIAL_TIMEOUT_MS))
    }
}

#[async_trait]
impl PeerDialer for RpcDialer {
    async fn dial(&self, addr: &str) -> Result<Box<dyn PeerClient>, DialError> {
        let client = RpcPeerClient::connect_with_timeout(addr, self.connect_timeout).await?;
        Ok(Box::new(client))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonrpsee::types::ErrorObjectOwned;
    use whisper_types::constants::{NOT_FOUND_CODE, UNAVAILABLE_CODE};

    #[test]
    fn test_relay_url() {
        assert_eq!(relay_url("127.0.0.1:9900"), "ws://127.0.0.1:9900");
        assert_eq!(relay_url("ws://b:9000"), "ws://b:9000");
        assert_eq!(relay_url("wss://b.example:443"), "wss://b.example:443");
    }

    #[test]
    fn test_call_error_keeps_kind_and_message() {
        let err = ClientError::Call(ErrorObjectOwned::owned(
            NOT_FOUND_CODE,
            "no route to peer z",
            None::<()>,
        ));
        assert_eq!(
            relay_error_from_client(err),
            RelayError::Downstream {
                kind: FailureKind::NotFound,
                message: "no route to peer z".to_string(),
            }
        );

        let err = ClientError::Call(ErrorObjectOwned::owned(
            UNAVAILABLE_CODE,
            "can't dial c at c:9000: refused",
            None::<()>,
        ));
        assert_eq!(relay_error_from_client(err).kind(), FailureKind::Unavailable);
    }

    #[test]
    fn test_unknown_code_is_unavailable() {
        let err = ClientError::Call(ErrorObjectOwned::owned(-32603, "boom", None::<()>));
        assert_eq!(relay_error_from_client(err).kind(), FailureKind::Unavailable);
    }

    #[test]
    fn test_transport_error_is_unavailable() {
        assert_eq!(
            relay_error_from_client(ClientError::RequestTimeout).kind(),
            FailureKind::Unavailable
        );
    }

    #[tokio::test]
    async fn test_connect_refused() {
        // Port 1 is privileged and unused in test environments.
        let err = RpcPeerClient::connect("127.0.0.1:1").await.err().unwrap();
        assert_eq!(err.addr, "127.0.0.1:1");
    }

    #[tokio::test]
    async fn test_dial_times_out_on_silent_peer() {
        // Accepts TCP connections but never answers the WebSocket upgrade.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap().to_string();
        let _silent = tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((stream, _)) = listener.accept().await {
                held.push(stream);
            }
        });

        let dialer = RpcDialer::new(Duration::from_millis(200));
        let started = std::time::Instant::now();
        let err = dialer.dial(&addr).await.err().unwrap();
        assert_eq!(err.addr, addr);
        assert!(started.elapsed() < Duration::from_secs(5));
    }
}
