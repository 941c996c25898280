//! Normalization of raw user entities into [`Agent`] snapshots

use chrono::{DateTime, Utc};

use super::types::UserEntity;
use crate::agents::{Agent, EfficiencyTable, RoutingStatus};

const DEFAULT_NAME: &str = "Unknown Agent";
const DEFAULT_PRESENCE: &str = "Offline";
const DEFAULT_QUEUE: &str = "General Floor";

/// Convert one user record. `now` is the sync instant.
pub fn normalize_user(user: UserEntity, now: DateTime<Utc>, scoring: &EfficiencyTable) -> Agent {
    let routing = user.routing_status.unwrap_or_default();

    let routing_status = match routing.status.as_deref() {
        None => RoutingStatus::OffLine,
        Some(raw) => raw.parse().unwrap_or_else(|e| {
            tracing::debug!(user = %user.id, "{}, treating as OFF_LINE", e);
            RoutingStatus::OffLine
        }),
    };

    let start_time = routing
        .start_time
        .as_deref()
        .and_then(|s| match DateTime::parse_from_rfc3339(s) {
            Ok(t) => Some(t.with_timezone(&Utc)),
            Err(e) => {
                tracing::debug!(user = %user.id, start_time = s, "Unparsable startTime: {}", e);
                None
            }
        })
        .unwrap_or(now);

    let idle_minutes = if routing_status == RoutingStatus::Idle {
        (now - start_time).num_minutes().max(0) as u64
    } else {
        0
    };

    let presence = user
        .presence
        .and_then(|p| p.presence_definition)
        .and_then(|d| d.system_presence)
        .unwrap_or_else(|| DEFAULT_PRESENCE.to_string());

    Agent {
        id: user.id,
        name: user.name.unwrap_or_else(|| DEFAULT_NAME.to_string()),
        presence,
        routing_status,
        idle_minutes,
        last_status_change: start_time,
        queue: user.department.unwrap_or_else(|| DEFAULT_QUEUE.to_string()),
        efficiency_score: scoring.score(routing_status),
    }
}

/// Convert a whole roster, preserving arrival order
pub fn normalize_users(
    users: Vec<UserEntity>,
    now: DateTime<Utc>,
    scoring: &EfficiencyTable,
) -> Vec<Agent> {
    users
        .into_iter()
        .map(|u| normalize_user(u, now, scoring))
        .collect()
}
