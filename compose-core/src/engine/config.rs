use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::types::{Key, VirtualKey};

/// What happens to the key that breaks a sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InvalidKeyPolicy {
    /// Swallow the breaking key
    #[default]
    Discard,
    /// Send the breaking key on as if no sequence had been in progress
    #[serde(rename = "replay")]
    ReplayBreakingKey,
    /// Send on every unresolved typed key, then the breaking key
    ReplayAll,
}

/// Engine configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Keys that start a sequence, and abort one when pressed mid-sequence
    pub compose_keys: Vec<Key>,
    /// Keys that abort a sequence
    pub cancel_keys: Vec<Key>,
    /// Retry unmatched keys in lower case against case-insensitive sequences
    pub case_insensitive: bool,
    pub invalid_key: InvalidKeyPolicy,
    /// Idle time after which a session expires
    pub timeout: Option<Duration>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            compose_keys: vec![Key::Virtual(VirtualKey::RMENU)],
            cancel_keys: vec![Key::Virtual(VirtualKey::ESCAPE)],
            case_insensitive: true,
            invalid_key: InvalidKeyPolicy::Discard,
            timeout: None,
        }
    }
}

impl EngineConfig {
    pub fn is_compose_key(&self, key: &Key) -> bool {
        self.compose_keys.contains(key)
    }

    pub fn is_cancel_key(&self, key: &Key) -> bool {
        self.cancel_keys.contains(key)
    }
}
