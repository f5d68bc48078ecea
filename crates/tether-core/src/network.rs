//! Network replication hints and the per-chain replication plan.
//!
//! Nothing here talks to a transport. A profile states how much of a chain
//! should be replicated and [`ReplicationPlan`] turns that into concrete link
//! indices for whatever transport layer the host runs.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

const fn default_true() -> bool {
    true
}
const fn default_key_links() -> u32 {
    2
}

/// Key links used when `replicated_key_links_count` is 0.
pub const AUTO_KEY_LINKS: u32 = 2;

/// Upper bound accepted for `replicated_key_links_count`.
pub const MAX_KEY_LINKS: u32 = 8;

// ---------------------------------------------------------------------------
// ReplicationMode
// ---------------------------------------------------------------------------

/// How much of a chain's physical state is replicated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplicationMode {
    /// Every link transform is replicated.
    Full,
    /// Only the root and a few key links; observers reconstruct the rest.
    #[default]
    KeyLinksOnly,
    /// Cosmetic or local-only chain.
    None,
}

// ---------------------------------------------------------------------------
// NetworkSettings
// ---------------------------------------------------------------------------

/// Network hints carried by a profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkSettings {
    #[serde(default)]
    pub mode: ReplicationMode,
    /// If true, the root link uses regular transform replication.
    #[serde(default = "default_true")]
    pub replicate_root_transform: bool,
    /// Key links besides the root for [`ReplicationMode::KeyLinksOnly`].
    /// `0` = auto.
    #[serde(default = "default_key_links")]
    pub replicated_key_links_count: u32,
}

impl Default for NetworkSettings {
    fn default() -> Self {
        Self {
            mode: ReplicationMode::default(),
            replicate_root_transform: true,
            replicated_key_links_count: default_key_links(),
        }
    }
}

impl NetworkSettings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.replicated_key_links_count > MAX_KEY_LINKS {
            return Err(ConfigError::InvalidValue {
                field: "network.replicated_key_links_count".into(),
                message: format!("must be <= {MAX_KEY_LINKS}"),
            });
        }
        Ok(())
    }

    /// Key link count with `0` resolved to [`AUTO_KEY_LINKS`].
    pub fn effective_key_links(&self) -> usize {
        let n = if self.replicated_key_links_count == 0 {
            AUTO_KEY_LINKS
        } else {
            self.replicated_key_links_count.min(MAX_KEY_LINKS)
        };
        n as usize
    }
}

// ---------------------------------------------------------------------------
// ReplicationPlan
// ---------------------------------------------------------------------------

/// Link indices the authoritative side must replicate for one chain.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplicationPlan {
    pub mode: ReplicationMode,
    /// Ascending, deduplicated link indices.
    pub link_indices: Vec<usize>,
}

impl ReplicationPlan {
    /// Plan replication for a chain of `link_count` links.
    ///
    /// Key links are spread evenly over the links after the root and always
    /// include the last link, so two key links on an 8-link chain select the
    /// middle and the tail.
    pub fn for_chain(settings: &NetworkSettings, link_count: usize) -> Self {
        let link_indices = match settings.mode {
            _ if link_count == 0 => Vec::new(),
            ReplicationMode::Full => (0..link_count).collect(),
            ReplicationMode::None => Vec::new(),
            ReplicationMode::KeyLinksOnly => {
                let mut indices = Vec::new();
                if settings.replicate_root_transform {
                    indices.push(0);
                }
                let tail = link_count - 1;
                let keys = settings.effective_key_links().min(tail);
                for k in 1..=keys {
                    // Round to nearest: k * tail / keys.
                    indices.push((k * tail + keys / 2) / keys);
                }
                indices.sort_unstable();
                indices.dedup();
                indices
            }
        };

        Self {
            mode: settings.mode,
            link_indices,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.link_indices.is_empty()
    }

    pub fn contains(&self, link_index: usize) -> bool {
        self.link_indices.binary_search(&link_index).is_ok()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
