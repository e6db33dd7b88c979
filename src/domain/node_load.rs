//! Startup situation progress tracking.
//!
//! The realtime situation channel first announces how many nodes it is
//! about to send, then streams one record per node. [`NodeLoad`] counts
//! both sides and latches once every announced node has arrived.

use std::collections::HashSet;

use crate::proto::wnt::Message;

/// Expected versus loaded node counts for the startup situation.
#[derive(Debug, Default)]
pub struct NodeLoad {
    total: u64,
    nodes: HashSet<(u32, u32)>,
    metadata_seen: bool,
    complete: bool,
}

impl NodeLoad {
    /// Creates an empty counter.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Accounts for one telemetry record.
    ///
    /// Metadata adds to the expected total; a record carrying both a
    /// network id and a source address counts its node once. Returns `true`
    /// exactly once: on the record that makes the loaded count reach the
    /// expected total after metadata has been seen.
    pub fn observe(&mut self, message: &Message) -> bool {
        if let Some(metadata) = &message.rtsituation_metadata {
            self.metadata_seen = true;
            self.total += u64::from(metadata.node_count.unwrap_or(0));
        }

        if let Some(key) = message.node_key() {
            self.nodes.insert(key);
        }

        if self.complete || !self.metadata_seen {
            return false;
        }

        if self.loaded() >= self.total {
            self.complete = true;
            return true;
        }
        false
    }

    /// Sum of all announced node counts.
    #[must_use]
    pub const fn total(&self) -> u64 {
        self.total
    }

    /// Number of distinct nodes seen so far.
    #[must_use]
    pub fn loaded(&self) -> u64 {
        self.nodes.len() as u64
    }

    /// Returns `true` once the startup situation has fully loaded.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.complete
    }
}
