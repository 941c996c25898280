//! Derived occupancy metrics
//!
//! Pure functions over an agent set. Everything here is restricted to the
//! on-queue subset first and recomputed on demand; nothing is cached.

use serde::Serialize;

use crate::agents::{on_queue, Agent, RoutingStatus};

/// Aggregate statistics over on-queue agents
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DashboardStats {
    pub count: usize,
    pub idle_count: usize,
    pub avg_idle_minutes: u64,
    pub max_idle_minutes: u64,
}

/// Buckets of the status distribution chart
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusBucket {
    Idle,
    Communicating,
    Other,
}

impl StatusBucket {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Idle => "Idle",
            Self::Communicating => "Comm",
            Self::Other => "Busy/Other",
        }
    }

    fn of(status: RoutingStatus) -> Self {
        match status {
            RoutingStatus::Idle => Self::Idle,
            RoutingStatus::Communicating => Self::Communicating,
            _ => Self::Other,
        }
    }
}

/// One bar of the status distribution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BucketCount {
    pub bucket: StatusBucket,
    pub count: usize,
}

/// Compute the headline statistics for the on-queue subset
pub fn dashboard_stats(agents: &[Agent]) -> DashboardStats {
    let subset = on_queue(agents);
    if subset.is_empty() {
        return DashboardStats::default();
    }

    let idle_count = subset
        .iter()
        .filter(|a| a.routing_status == RoutingStatus::Idle)
        .count();
    let total_idle: u64 = subset.iter().map(|a| a.idle_minutes).sum();
    let max_idle_minutes = subset.iter().map(|a| a.idle_minutes).max().unwrap_or(0);
    let avg_idle_minutes = (total_idle as f64 / subset.len() as f64).round() as u64;

    DashboardStats {
        count: subset.len(),
        idle_count,
        avg_idle_minutes,
        max_idle_minutes,
    }
}

/// Three-bucket status distribution over the on-queue subset.
///
/// Always returns Idle, Communicating, Other in that order, zeros included.
pub fn status_distribution(agents: &[Agent]) -> [BucketCount; 3] {
    let mut counts = [
        BucketCount {
            bucket: StatusBucket::Idle,
            count: 0,
        },
        BucketCount {
            bucket: StatusBucket::Communicating,
            count: 0,
        },
        BucketCount {
            bucket: StatusBucket::Other,
            count: 0,
        },
    ];

    for agent in on_queue(agents) {
        let bucket = StatusBucket::of(agent.routing_status);
        if let Some(entry) = counts.iter_mut().find(|c| c.bucket == bucket) {
            entry.count += 1;
        }
    }

    counts
}
