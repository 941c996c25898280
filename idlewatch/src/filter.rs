//! Agent list filtering
//!
//! Composes the search, routing-status and presence predicates used by the
//! agents view. Works over the full agent set, not just on-queue agents.

use std::collections::BTreeSet;

use crate::agents::{normalize_presence, Agent, RoutingStatus};

/// Routing status filter; `All` disables the predicate
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StatusFilter {
    #[default]
    All,
    Only(RoutingStatus),
}

impl std::str::FromStr for StatusFilter {
    type Err = crate::agents::UnknownRoutingStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("all") {
            return Ok(Self::All);
        }
        s.parse().map(Self::Only)
    }
}

/// Presence filter; `All` disables the predicate
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum PresenceFilter {
    #[default]
    All,
    Only(String),
}

impl From<&str> for PresenceFilter {
    fn from(s: &str) -> Self {
        if s.eq_ignore_ascii_case("all") {
            Self::All
        } else {
            Self::Only(s.to_string())
        }
    }
}

/// The three filter fields of the agents view
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AgentFilter {
    pub search: String,
    pub status: StatusFilter,
    pub presence: PresenceFilter,
}

impl AgentFilter {
    /// Check a single agent against all three predicates
    pub fn matches(&self, agent: &Agent) -> bool {
        let matches_search = agent
            .name
            .to_lowercase()
            .contains(&self.search.to_lowercase());

        let matches_status = match self.status {
            StatusFilter::All => true,
            StatusFilter::Only(status) => agent.routing_status == status,
        };

        let matches_presence = match &self.presence {
            PresenceFilter::All => true,
            PresenceFilter::Only(wanted) => {
                normalize_presence(&agent.presence) == normalize_presence(wanted)
            }
        };

        matches_search && matches_status && matches_presence
    }

    /// Apply the filter, preserving source order
    pub fn apply<'a>(&self, agents: &'a [Agent]) -> Vec<&'a Agent> {
        agents.iter().filter(|a| self.matches(a)).collect()
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Distinct presence labels in sorted order, for the presence drop-down
pub fn unique_presences(agents: &[Agent]) -> Vec<String> {
    agents
        .iter()
        .map(|a| a.presence.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
