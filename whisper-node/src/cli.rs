use clap::{Parser, Subcommand};

use whisper_relay::dialer::PeerClient;
use whisper_types::Secret;

use crate::config::NodeConfig;
use crate::error::NodeError;
use crate::rpc::client::RpcPeerClient;

#[derive(Parser)]
#[command(
    name = "whisper",
    about = "Whisper relay: forwards secrets hop by hop to a named recipient",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run a relay node
    Run {
        /// Path to config file
        #[arg(short, long, default_value = "whisper.toml")]
        config: String,
        /// Ignore the config file and start from defaults plus flags
        #[arg(long)]
        no_config: bool,
        /// Alias this node answers to
        #[arg(long)]
        alias: Option<String>,
        /// Address to bind the RPC listener (IP:PORT)
        #[arg(long)]
        bind: Option<String>,
        /// Address announced to peers, if different from the bind address
        #[arg(long)]
        advertise: Option<String>,
        /// Bootnode address to handshake with (repeatable or comma-separated)
        #[arg(long = "boot-node", value_delimiter = ',')]
        boot_nodes: Vec<String>,
        /// Drop bootnodes listed in the config file
        #[arg(long)]
        no_bootstrap: bool,
    },
    /// Hand a secret to a relay for delivery
    Send {
        /// Address of the relay to hand the secret to
        #[arg(long)]
        relay: String,
        /// Alias of the recipient
        #[arg(long)]
        alias: String,
        /// Message to deliver
        #[arg(short, long, default_value = "")]
        message: String,
    },
    /// List the peers a relay knows
    Peers {
        /// Address of the relay to query
        #[arg(long)]
        relay: String,
    },
    /// Print a relay's Prometheus metrics
    Metrics {
        /// Address of the relay to query
        #[arg(long)]
        relay: String,
    },
    /// Initialize a new node configuration
    Init {
        /// Output directory
        #[arg(short, long, default_value = ".")]
        dir: String,
    },
}

pub async fn run(cli: Cli) -> Result<(), NodeError> {
    match cli.command {
        Command::Run {
            config,
            no_config,
            alias,
            bind,
            advertise,
            boot_nodes,
            no_bootstrap,
        } => {
            let mut config = if no_config {
                NodeConfig::default()
            } else {
                NodeConfig::load(&config)?
            };

            // Apply CLI overrides.
            if let Some(alias) = alias {
                config.node.alias = alias;
            }
            if let Some(addr) = bind {
                config.node.listen_addr = addr;
            }
            if let Some(addr) = advertise {
                config.node.advertise_addr = Some(addr);
            }
            if no_bootstrap {
                config.network.boot_nodes.clear();
            }
            if !boot_nodes.is_empty() {
                config.network.boot_nodes.extend(boot_nodes);
            }

            tracing::info!(alias = %config.node.alias, bind = %config.node.listen_addr, "starting whisper relay");

            let mut node = crate::node::Node::new(config).await?;
            node.run().await
        }
        Command::Send {
            relay,
            alias,
            message,
        } => {
            if relay.is_empty() {
                return Err(NodeError::ConfigError {
                    reason: "missing relay address".to_string(),
                });
            }
            if alias.is_empty() {
                return Err(NodeError::ConfigError {
                    reason: "missing alias".to_string(),
                });
            }

            let client = RpcPeerClient::connect(&relay)
                .await
                .map_err(|e| NodeError::RpcError {
                    reason: e.to_string(),
                })?;
            client.forward(Secret::new(alias.clone(), message)).await?;
            println!("Secret for {} accepted by {}", alias, relay);
            Ok(())
        }
        Command::Peers { relay } => {
            let client = RpcPeerClient::connect(&relay)
                .await
                .map_err(|e| NodeError::RpcError {
                    reason: e.to_string(),
                })?;
            let peers = client.peers().await?;
            if peers.is_empty() {
                println!("No known peers");
            }
            for peer in peers {
                println!("{:<20} {}", peer.alias, peer.address);
            }
            Ok(())
        }
        Command::Metrics { relay } => {
            let client = RpcPeerClient::connect(&relay)
                .await
                .map_err(|e| NodeError::RpcError {
                    reason: e.to_string(),
                })?;
            print!("{}", client.metrics().await?);
            Ok(())
        }
        Command::Init { dir } => {
            NodeConfig::init(&dir)?;
            tracing::info!("Node configuration initialized in {}", dir);
            Ok(())
        }
    }
}
