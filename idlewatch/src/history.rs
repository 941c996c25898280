//! Rolling sync history
//!
//! One snapshot per successful sync, kept in a FIFO window so the trend view
//! only ever shows the most recent syncs.

use std::collections::VecDeque;

use chrono::{DateTime, Local};
use serde::Serialize;

use crate::agents::{on_queue, Agent, RoutingStatus};

/// Number of snapshots retained
pub const HISTORY_CAPACITY: usize = 15;

/// Point-in-time occupancy of the on-queue subset
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncSnapshot {
    /// Local wall-clock time, `HH:MM:SS`
    pub time: String,
    pub idle_count: usize,
    pub active_count: usize,
}

impl SyncSnapshot {
    /// Derive a snapshot from a freshly synced agent set
    pub fn from_agents(agents: &[Agent], at: DateTime<Local>) -> Self {
        let subset = on_queue(agents);
        Self {
            time: at.format("%H:%M:%S").to_string(),
            idle_count: subset
                .iter()
                .filter(|a| a.routing_status == RoutingStatus::Idle)
                .count(),
            active_count: subset
                .iter()
                .filter(|a| a.routing_status.is_active())
                .count(),
        }
    }
}

/// Bounded FIFO of sync snapshots
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncHistory {
    entries: VecDeque<SyncSnapshot>,
}

impl SyncHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Push to the back, then drop from the front down to capacity.
    ///
    /// No deduplication: two syncs in the same second are two entries.
    pub fn append(&mut self, snapshot: SyncSnapshot) {
        self.entries.push_back(snapshot);
        while self.entries.len() > HISTORY_CAPACITY {
            self.entries.pop_front();
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn latest(&self) -> Option<&SyncSnapshot> {
        self.entries.back()
    }

    /// Oldest first
    pub fn iter(&self) -> impl Iterator<Item = &SyncSnapshot> {
        self.entries.iter()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
