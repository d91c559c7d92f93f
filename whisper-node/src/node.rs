use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use whisper_relay::bootstrap::seed_peers;
use whisper_relay::relay::RelayNode;
use whisper_types::Identity;

use crate::config::NodeConfig;
use crate::error::NodeError;
use crate::metrics::NodeMetrics;
use crate::rpc::client::RpcDialer;
use crate::rpc::inflight::InFlight;

/// A running relay: RPC listener, relay core and metrics.
pub struct Node {
    relay: Arc<RelayNode>,
    metrics: Arc<NodeMetrics>,
    calls: InFlight,
    rpc_handle: Option<jsonrpsee::server::ServerHandle>,
    local_addr: SocketAddr,
}

impl Node {
    /// Bind the listener, seed the registry from the bootnodes, then serve.
    ///
    /// Bootnodes are told our advertised address, which is the bound address
    /// unless `node.advertise_addr` overrides it.
    pub async fn new(config: NodeConfig) -> Result<Self, NodeError> {
        config.validate()?;

        let (server, local_addr) =
            crate::rpc::server::bind_rpc_server(&config.node.listen_addr).await?;

        let advertised = config
            .node
            .advertise_addr
            .clone()
            .unwrap_or_else(|| local_addr.to_string());
        let identity = Identity::new(config.node.alias.clone(), advertised);

        let dialer = Arc::new(RpcDialer::new(config.network.dial_timeout()));
        let peers = seed_peers(dialer.as_ref(), &identity, &config.network.boot_nodes).await?;

        let metrics = Arc::new(NodeMetrics::new());
        metrics.peer_count.set(peers.len() as i64);

        let relay = Arc::new(RelayNode::new(identity, peers, dialer));
        let calls = InFlight::new();
        let rpc_handle = crate::rpc::server::start_rpc_server(
            server,
            relay.clone(),
            metrics.clone(),
            calls.clone(),
        );

        tracing::info!(
            alias = %relay.identity().alias,
            advertise = %relay.identity().address,
            listen = %local_addr,
            boot_nodes = config.network.boot_nodes.len(),
            "node initialized"
        );

        Ok(Self {
            relay,
            metrics,
            calls,
            rpc_handle: Some(rpc_handle),
            local_addr,
        })
    }

    /// Serve until Ctrl+C, then shut down gracefully.
    pub async fn run(&mut self) -> Result<(), NodeError> {
        tracing::info!("Node is running. Press Ctrl+C to stop.");
        self.run_until(async {
            match tokio::signal::ctrl_c().await {
                Ok(()) => tracing::info!("Received shutdown signal"),
                Err(e) => tracing::warn!("failed to listen for shutdown signal: {}", e),
            }
        })
        .await
    }

    /// Serve until `shutdown` resolves, then shut down gracefully.
    pub async fn run_until<F>(&mut self, shutdown: F) -> Result<(), NodeError>
    where
        F: Future<Output = ()>,
    {
        let stopped = match self.rpc_handle.clone() {
            Some(handle) => handle,
            None => return Ok(()),
        };

        tokio::select! {
            _ = shutdown => self.shutdown().await,
            _ = stopped.stopped() => {
                tracing::warn!("RPC server stopped unexpectedly");
                self.rpc_handle = None;
                Ok(())
            }
        }
    }

    /// Stop accepting calls and wait for in-flight calls to finish.
    ///
    /// Running handshakes and forwards are drained while the listener is
    /// still up, so their replies reach the caller. New ones are refused
    /// as unavailable from the moment draining starts.
    pub async fn shutdown(&mut self) -> Result<(), NodeError> {
        tracing::info!("Shutting down node...");

        if let Some(handle) = self.rpc_handle.take() {
            let active = self.calls.active();
            if active > 0 {
                tracing::info!(calls = active, "waiting for in-flight calls");
            }
            self.calls.drain().await;

            handle.stop().map_err(|e| NodeError::RpcError {
                reason: format!("failed to stop RPC server: {}", e),
            })?;
            handle.stopped().await;
        }

        tracing::info!("Node shutdown complete");
        Ok(())
    }

    pub fn relay(&self) -> &Arc<RelayNode> {
        &self.relay
    }

    pub fn metrics(&self) -> &Arc<NodeMetrics> {
        &self.metrics
    }

    /// Handshake and forward calls currently running.
    pub fn active_calls(&self) -> usize {
        self.calls.active()
    }

    /// Address the RPC listener is bound to.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }
}
