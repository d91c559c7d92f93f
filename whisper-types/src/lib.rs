//! Shared type definitions for the Whisper relay.

pub mod constants;
pub mod error;
pub mod identity;
pub mod secret;

pub use error::FailureKind;
pub use identity::Identity;
pub use secret::Secret;
