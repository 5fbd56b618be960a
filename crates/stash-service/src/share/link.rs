//! Share token generation and URL building.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::RngCore;

use stash_core::config::ShareConfig;
use stash_entity::share::{Share, ShareLink};

/// Fewest random bytes a token may carry.
pub const MIN_TOKEN_BYTES: usize = 16;

/// Generates share tokens and turns them into public URLs.
#[derive(Debug, Clone)]
pub struct LinkService {
    base_url: String,
    token_bytes: usize,
}

impl LinkService {
    /// Creates a link service for `base_url`.
    pub fn new(base_url: impl Into<String>, token_bytes: usize) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            token_bytes: token_bytes.max(MIN_TOKEN_BYTES),
        }
    }

    /// Build from the `[share]` config section.
    pub fn from_config(config: &ShareConfig) -> Self {
        Self::new(config.base_url.clone(), config.token_bytes)
    }

    /// A fresh URL-safe token from the thread-local CSPRNG.
    pub fn generate_token(&self) -> String {
        let mut bytes = vec![0u8; self.token_bytes];
        rand::rng().fill_bytes(&mut bytes);
        URL_SAFE_NO_PAD.encode(bytes)
    }

    /// The public URL for a token.
    pub fn build_share_url(&self, token: &str) -> String {
        format!("{}/share/{token}", self.base_url)
    }

    /// Everything a share's creator needs to hand the link out.
    pub fn build_link(&self, share: &Share) -> ShareLink {
        ShareLink {
            share_id: share.id,
            file_id: share.file_id,
            url: self.build_share_url(&share.token),
            token: share.token.clone(),
            expires_at: share.expires_at,
        }
    }
}

impl Default for LinkService {
    fn default() -> Self {
        Self::from_config(&ShareConfig::default())
    }
}
