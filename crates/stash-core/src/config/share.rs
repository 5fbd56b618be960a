//! Public share link configuration.

use serde::{Deserialize, Serialize};

/// Share link settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShareConfig {
    /// Public base URL that share links are built on.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Number of random bytes in a share token.
    #[serde(default = "default_token_bytes")]
    pub token_bytes: usize,
}

impl Default for ShareConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            token_bytes: default_token_bytes(),
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:3001".to_string()
}

fn default_token_bytes() -> usize {
    32
}
