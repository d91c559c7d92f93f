use serde::{Deserialize, Serialize};

/// A message in flight, addressed to a recipient alias.
///
/// Carries no id, timestamp or hop count. Every hop forwards it unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Secret {
    pub recipient_alias: String,
    pub message: String,
}

impl Secret {
    pub fn new(recipient_alias: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            recipient_alias: recipient_alias.into(),
            message: message.into(),
        }
    }

    /// Whether this secret terminates at a node with the given alias.
    pub fn is_for(&self, alias: &str) -> bool {
        self.recipient_alias == alias
    }
}
