use prometheus_client::metrics::counter::Counter;
use prometheus_client::metrics::gauge::Gauge;
use prometheus_client::registry::Registry;

/// Node-wide Prometheus metrics.
pub struct NodeMetrics {
    pub peer_count: Gauge,
    pub handshakes: Counter,
    pub secrets_delivered: Counter,
    pub secrets_relayed: Counter,
    pub forward_failures: Counter,
    pub registry: Registry,
}

impl NodeMetrics {
    /// Create a new metrics registry with all node metrics registered.
    pub fn new() -> Self {
        let mut registry = Registry::default();

        let peer_count = Gauge::default();
        let handshakes = Counter::default();
        let secrets_delivered = Counter::default();
        let secrets_relayed = Counter::default();
        let forward_failures = Counter::default();

        registry.register(
            "whisper_peer_count",
            "Number of peers in the registry",
            peer_count.clone(),
        );
        registry.register(
            "whisper_handshakes",
            "Total inbound handshakes",
            handshakes.clone(),
        );
        registry.register(
            "whisper_secrets_delivered",
            "Total secrets delivered to this node",
            secrets_delivered.clone(),
        );
        registry.register(
            "whisper_secrets_relayed",
            "Total secrets accepted by a next hop",
            secrets_relayed.clone(),
        );
        registry.register(
            "whisper_forward_failures",
            "Total forwards that failed at or beyond this hop",
            forward_failures.clone(),
        );

        Self {
            peer_count,
            handshakes,
            secrets_delivered,
            secrets_relayed,
            forward_failures,
            registry,
        }
    }

    /// Encode all metrics in Prometheus text exposition format.
    pub fn encode(&self) -> Result<String, std::fmt::Error> {
        let mut buf = String::new();
        prometheus_client::encoding::text::encode(&mut buf, &self.registry)?;
        Ok(buf)
    }
}

impl Default for NodeMetrics {
    fn default() -> Self {
        Self::new()
    }
}
