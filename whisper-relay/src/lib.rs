//! Relay core for Whisper.
//!
//! A [`relay::RelayNode`] owns a [`registry::PeerRegistry`] of alias to
//! address mappings learned through handshakes, and forwards secrets one hop
//! at a time toward the node whose alias matches the recipient. Outbound
//! connections go through the [`dialer::PeerDialer`] seam so the RPC
//! transport stays outside the core.

pub mod bootstrap;
pub mod dialer;
pub mod error;
pub mod memory;
pub mod registry;
pub mod relay;
