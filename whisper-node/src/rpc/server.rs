use std::net::SocketAddr;
use std::sync::Arc;

use jsonrpsee::server::{Server, ServerBuilder, ServerHandle};

use whisper_relay::relay::RelayNode;

use super::handlers::{WhisperRpcImpl, WhisperRpcServer};
use super::inflight::InFlight;
use crate::error::NodeError;
use crate::metrics::NodeMetrics;

/// Bind the JSON-RPC HTTP+WS listener without serving yet.
pub async fn bind_rpc_server(addr: &str) -> Result<(Server, SocketAddr), NodeError> {
    let server = ServerBuilder::default()
        .build(addr)
        .await
        .map_err(|e| NodeError::RpcError {
            reason: format!("failed to bind RPC server on {}: {}", addr, e),
        })?;
    let local_addr = server.local_addr().map_err(|e| NodeError::RpcError {
        reason: format!("failed to read bound address: {}", e),
    })?;
    Ok((server, local_addr))
}

/// Start serving handshake and forward calls for `relay`.
///
/// Every connection and call runs on its own task; a stalled downstream
/// hop only holds the call that is waiting on it. Handshake and forward
/// calls are admitted through `calls`.
pub fn start_rpc_server(
    server: Server,
    relay: Arc<RelayNode>,
    metrics: Arc<NodeMetrics>,
    calls: InFlight,
) -> ServerHandle {
    let local_addr = server.local_addr().ok();
    let rpc_impl = WhisperRpcImpl {
        relay,
        metrics,
        calls,
    };
    let handle = server.start(rpc_impl.into_rpc());

    if let Some(addr) = local_addr {
        tracing::info!(addr = %addr, "RPC server started");
    }

    handle
}
