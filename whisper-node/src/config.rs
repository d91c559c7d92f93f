use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use whisper_types::constants::{DEFAULT_DIAL_TIMEOUT_MS, DEFAULT_LISTEN_ADDR};

use crate::error::NodeError;

/// File name written by `whisper init`.
pub const CONFIG_FILE_NAME: &str = "whisper.toml";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeConfig {
    pub node: IdentityConfig,
    #[serde(default)]
    pub network: NetworkConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityConfig {
    /// Alias other nodes route to.
    pub alias: String,
    pub listen_addr: String,
    /// Address announced in handshakes. Defaults to the bound listen address.
    #[serde(default)]
    pub advertise_addr: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// Relays to handshake with at startup (`host:port`).
    #[serde(default)]
    pub boot_nodes: Vec<String>,
    /// Upper bound on one outbound dial, in milliseconds.
    #[serde(default = "default_dial_timeout_ms")]
    pub dial_timeout_ms: u64,
}

fn default_dial_timeout_ms() -> u64 {
    DEFAULT_DIAL_TIMEOUT_MS
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            boot_nodes: Vec::new(),
            dial_timeout_ms: DEFAULT_DIAL_TIMEOUT_MS,
        }
    }
}

impl NetworkConfig {
    pub fn dial_timeout(&self) -> Duration {
        Duration::from_millis(self.dial_timeout_ms)
    }
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            node: IdentityConfig {
                alias: String::new(),
                listen_addr: DEFAULT_LISTEN_ADDR.to_string(),
                advertise_addr: None,
            },
            network: NetworkConfig::default(),
        }
    }
}

impl NodeConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &str) -> Result<Self, NodeError> {
        let contents = std::fs::read_to_string(path).map_err(|e| NodeError::ConfigError {
            reason: format!("failed to read config file '{}': {}", path, e),
        })?;
        let config: NodeConfig = toml::from_str(&contents).map_err(|e| NodeError::ConfigError {
            reason: format!("failed to parse config file '{}': {}", path, e),
        })?;
        Ok(config)
    }

    /// Initialize a default configuration file in the given directory.
    pub fn init(dir: &str) -> Result<(), NodeError> {
        let dir_path = Path::new(dir);
        if !dir_path.exists() {
            std::fs::create_dir_all(dir_path)?;
        }

        let config = NodeConfig::default();
        let toml_str = toml::to_string_pretty(&config).map_err(|e| NodeError::ConfigError {
            reason: format!("failed to serialize default config: {}", e),
        })?;

        let config_path = dir_path.join(CONFIG_FILE_NAME);
        std::fs::write(&config_path, toml_str)?;

        Ok(())
    }

    /// Check the fields a serving node cannot start without.
    pub fn validate(&self) -> Result<(), NodeError> {
        if self.node.alias.is_empty() {
            return Err(NodeError::ConfigError {
                reason: "node.alias must be set (or pass --alias)".to_string(),
            });
        }
        if self.node.listen_addr.is_empty() {
            return Err(NodeError::ConfigError {
                reason: "node.listen_addr must be set (or pass --bind)".to_string(),
            });
        }
        if self.network.dial_timeout_ms == 0 {
            return Err(NodeError::ConfigError {
                reason: "network.dial_timeout_ms must be greater than zero".to_string(),
            });
        }
        Ok(())
    }
}
