//! Agent snapshot types
//!
//! An [`Agent`] is a point-in-time view of one user's presence and routing
//! state. The whole set is replaced on every successful sync.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Normalized form of the "On Queue" presence.
const ON_QUEUE: &str = "onqueue";

/// Momentary interaction state of an agent, independent of presence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RoutingStatus {
    Idle,
    Communicating,
    Interacting,
    OffLine,
    NotResponding,
}

impl RoutingStatus {
    pub const ALL: [RoutingStatus; 5] = [
        RoutingStatus::Idle,
        RoutingStatus::Communicating,
        RoutingStatus::Interacting,
        RoutingStatus::OffLine,
        RoutingStatus::NotResponding,
    ];

    /// Wire name as reported by the routing API
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "IDLE",
            Self::Communicating => "COMMUNICATING",
            Self::Interacting => "INTERACTING",
            Self::OffLine => "OFF_LINE",
            Self::NotResponding => "NOT_RESPONDING",
        }
    }

    /// Whether the agent is working an interaction (trend "active" count)
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Communicating | Self::Interacting)
    }
}

impl fmt::Display for RoutingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a routing status string is not recognized
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown routing status: {0}")]
pub struct UnknownRoutingStatus(pub String);

impl FromStr for RoutingStatus {
    type Err = UnknownRoutingStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| UnknownRoutingStatus(s.to_string()))
    }
}

/// Point-in-time snapshot of one agent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Agent {
    pub id: String,
    pub name: String,
    /// System presence label, e.g. "On Queue", "Available", "Offline"
    pub presence: String,
    pub routing_status: RoutingStatus,
    /// Minutes spent in IDLE; always 0 for any other routing status
    pub idle_minutes: u64,
    pub last_status_change: DateTime<Utc>,
    pub queue: String,
    /// Heuristic score in 0..=100
    pub efficiency_score: u8,
}

impl Agent {
    pub fn is_on_queue(&self) -> bool {
        normalize_presence(&self.presence) == ON_QUEUE
    }
}

/// Lowercase and strip all whitespace from a presence label.
///
/// Every presence comparison (metrics, filters, dashboard roster) goes
/// through this so "On Queue", "on queue" and "ONQUEUE" compare equal.
pub fn normalize_presence(presence: &str) -> String {
    presence
        .chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Restrict an agent set to on-queue agents, preserving order
pub fn on_queue(agents: &[Agent]) -> Vec<&Agent> {
    agents.iter().filter(|a| a.is_on_queue()).collect()
}

// ============================================================================
// Efficiency Heuristic
// ============================================================================

/// Fixed efficiency score lookup keyed by routing status.
///
/// INTERACTING and OFF_LINE keep the base value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EfficiencyTable {
    #[serde(default = "default_base")]
    pub base: u8,
    #[serde(default = "default_idle")]
    pub idle: u8,
    #[serde(default = "default_not_responding")]
    pub not_responding: u8,
    #[serde(default = "default_communicating")]
    pub communicating: u8,
}

fn default_base() -> u8 {
    100
}

fn default_idle() -> u8 {
    40
}

fn default_not_responding() -> u8 {
    10
}

fn default_communicating() -> u8 {
    95
}

impl Default for EfficiencyTable {
    fn default() -> Self {
        Self {
            base: default_base(),
            idle: default_idle(),
            not_responding: default_not_responding(),
            communicating: default_communicating(),
        }
    }
}

impl EfficiencyTable {
    pub fn score(&self, status: RoutingStatus) -> u8 {
        let score = match status {
            RoutingStatus::Idle => self.idle,
            RoutingStatus::NotResponding => self.not_responding,
            RoutingStatus::Communicating => self.communicating,
            RoutingStatus::Interacting | RoutingStatus::OffLine => self.base,
        };
        score.min(100)
    }
}
