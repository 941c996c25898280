//! Plain text rendering
//!
//! No colors or special formatting - each view is rendered to a `String`
//! so handlers can print it and tests can inspect it.

use chrono::{DateTime, Local, Utc};

use crate::agents::Agent;
use crate::dashboard::{DashboardState, Tab};
use crate::insight::AIAnalysis;
use crate::profiles::Profile;

/// Render whatever view the state currently points at
pub fn render_view(state: &DashboardState, profiles: &[Profile], active_id: &str) -> String {
    match state.tab() {
        Tab::Dashboard => render_dashboard(state),
        Tab::Agents => render_agent_table(&state.filtered_agents()),
        Tab::Reports => match state.analysis() {
            Some(analysis) => render_report(analysis),
            None => "No analysis yet. Run `idlewatch analyze`.\n".to_string(),
        },
        Tab::Admin => render_profiles(profiles, active_id),
    }
}

/// Headline stats, status distribution and occupancy trend
pub fn render_dashboard(state: &DashboardState) -> String {
    let mut out = String::new();

    if let Some(error) = state.sync_error() {
        out.push_str(&format!("Error: {}\n", error));
        out.push('\n');
    }

    let stats = state.stats();
    out.push_str(&format!("On queue:      {}\n", stats.count));
    out.push_str(&format!("Idle:          {}\n", stats.idle_count));
    out.push_str(&format!("Avg idle:      {} min\n", stats.avg_idle_minutes));
    out.push_str(&format!("Max idle:      {} min\n", stats.max_idle_minutes));
    out.push('\n');

    out.push_str("Status distribution\n");
    for bucket in state.status_distribution() {
        out.push_str(&format!(
            "  {:<11} {:>4}  {}\n",
            bucket.bucket.label(),
            bucket.count,
            bar(bucket.count, stats.count)
        ));
    }

    if !state.history().is_empty() {
        out.push('\n');
        out.push_str("Trend          idle  active\n");
        for snapshot in state.history().iter() {
            out.push_str(&format!(
                "  {}     {:>4}  {:>6}\n",
                snapshot.time, snapshot.idle_count, snapshot.active_count
            ));
        }
    }

    let idle = top_idle(&state.on_queue_agents(), 5);
    if !idle.is_empty() {
        out.push('\n');
        out.push_str("Longest idle\n");
        for agent in idle {
            out.push_str(&format!("  {:<24} {:>4} min\n", truncate(&agent.name, 24), agent.idle_minutes));
        }
    }

    out
}

/// One row per agent, in roster order
pub fn render_agent_table(agents: &[&Agent]) -> String {
    if agents.is_empty() {
        return "No agents match.\n".to_string();
    }

    let mut out = String::new();
    out.push_str(&format!(
        "{:<24} {:<12} {:<15} {:>5} {:>5}  {}\n",
        "NAME", "PRESENCE", "STATUS", "IDLE", "SCORE", "QUEUE"
    ));
    for agent in agents {
        out.push_str(&format!(
            "{:<24} {:<12} {:<15} {:>5} {:>5}  {}\n",
            truncate(&agent.name, 24),
            truncate(&agent.presence, 12),
            agent.routing_status,
            agent.idle_minutes,
            agent.efficiency_score,
            agent.queue
        ));
    }
    out.push_str(&format!("{} agent(s)\n", agents.len()));
    out
}

pub fn render_report(analysis: &AIAnalysis) -> String {
    let mut out = String::new();
    out.push_str("Summary\n");
    out.push_str(&format!("  {}\n", analysis.summary));

    out.push('\n');
    out.push_str("Recommendations\n");
    for item in &analysis.recommendations {
        out.push_str(&format!("  - {}\n", item));
    }

    out.push('\n');
    out.push_str("Bottlenecks\n");
    for item in &analysis.bottlenecks {
        out.push_str(&format!("  - {}\n", item));
    }
    out
}

/// Profile list with the active one marked. Secrets are never printed.
pub fn render_profiles(profiles: &[Profile], active_id: &str) -> String {
    let mut out = String::new();
    for profile in profiles {
        let marker = if profile.id == active_id { "*" } else { " " };
        let credentials = if profile.has_credentials() { "yes" } else { "no" };
        out.push_str(&format!(
            "{} {:<20} {:<20} {:<16} creds: {:<3}  synced: {}\n",
            marker,
            profile.id,
            truncate(&profile.name, 20),
            profile.region,
            credentials,
            synced_label(profile.last_synced_at)
        ));
        out.push_str(&format!("    api: {}  login: {}\n", profile.api_host, profile.login_host));
        if let Some(proxy) = profile.cors_proxy.as_deref().filter(|p| !p.is_empty()) {
            out.push_str(&format!("    proxy: {}\n", proxy));
        }
    }
    out
}

fn synced_label(at: Option<DateTime<Utc>>) -> String {
    match at {
        Some(at) => at
            .with_timezone(&Local)
            .format("%Y-%m-%d %H:%M:%S")
            .to_string(),
        None => "never".to_string(),
    }
}

fn top_idle<'a>(agents: &[&'a Agent], n: usize) -> Vec<&'a Agent> {
    let mut idle: Vec<&Agent> = agents
        .iter()
        .copied()
        .filter(|a| a.idle_minutes > 0)
        .collect();
    // Stable sort keeps roster order among equal idle times
    idle.sort_by(|a, b| b.idle_minutes.cmp(&a.idle_minutes));
    idle.truncate(n);
    idle
}

fn bar(count: usize, total: usize) -> String {
    const WIDTH: usize = 30;
    if total == 0 {
        return String::new();
    }
    "#".repeat(count * WIDTH / total)
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let head: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", head)
    }
}
