//! Dashboard view state
//!
//! Everything the front-end shows lives in one [`DashboardState`] owned by
//! the session and changed only through the transitions below.
//!
//! Syncs and analyses are issued with a [`Ticket`]. Switching profile bumps
//! the state generation, so a response that arrives for the previous tenant
//! is discarded instead of overwriting the new one.

use chrono::{DateTime, Local};

use crate::agents::Agent;
use crate::filter::{unique_presences, AgentFilter, PresenceFilter, StatusFilter};
use crate::genesys::SyncError;
use crate::history::{SyncHistory, SyncSnapshot};
use crate::insight::AIAnalysis;
use crate::metrics::{self, BucketCount, DashboardStats};

/// Views of the dashboard
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Tab {
    #[default]
    Dashboard,
    Agents,
    Reports,
    Admin,
}

/// Stamp carried by an in-flight sync or analysis
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket {
    generation: u64,
    profile_id: String,
}

impl Ticket {
    pub fn profile_id(&self) -> &str {
        &self.profile_id
    }
}

/// What happened to a completed sync
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    /// Roster replaced and a snapshot appended
    Applied { agents: usize },
    /// Sync failed; previous data kept, error banner set
    Failed,
    /// The active profile changed while the request was in flight
    Stale,
    /// Another sync was already outstanding; nothing was started
    Busy,
}

/// All view state of one session
#[derive(Debug, Clone)]
pub struct DashboardState {
    active_profile_id: String,
    generation: u64,
    agents: Vec<Agent>,
    history: SyncHistory,
    analysis: Option<AIAnalysis>,
    filter: AgentFilter,
    tab: Tab,
    is_syncing: bool,
    is_analyzing: bool,
    sync_error: Option<String>,
}

impl DashboardState {
    pub fn new(active_profile_id: impl Into<String>) -> Self {
        Self {
            active_profile_id: active_profile_id.into(),
            generation: 0,
            agents: Vec::new(),
            history: SyncHistory::new(),
            analysis: None,
            filter: AgentFilter::default(),
            tab: Tab::default(),
            is_syncing: false,
            is_analyzing: false,
            sync_error: None,
        }
    }

    // ------------------------------------------------------------------------
    // Profile scope
    // ------------------------------------------------------------------------

    /// Move to another tenant. Drops every piece of tenant-scoped data,
    /// whether or not the new profile has ever synced.
    pub fn switch_profile(&mut self, profile_id: impl Into<String>) {
        self.active_profile_id = profile_id.into();
        self.generation += 1;
        self.agents.clear();
        self.history.clear();
        self.analysis = None;
        self.sync_error = None;
        self.filter = AgentFilter::default();
        self.is_syncing = false;
        self.is_analyzing = false;
        tracing::debug!(
            profile = %self.active_profile_id,
            generation = self.generation,
            "Switched profile, dashboard cleared"
        );
    }

    pub fn active_profile_id(&self) -> &str {
        &self.active_profile_id
    }

    fn ticket(&self) -> Ticket {
        Ticket {
            generation: self.generation,
            profile_id: self.active_profile_id.clone(),
        }
    }

    fn is_current(&self, ticket: &Ticket) -> bool {
        ticket.generation == self.generation && ticket.profile_id == self.active_profile_id
    }

    // ------------------------------------------------------------------------
    // Sync
    // ------------------------------------------------------------------------

    /// Start a sync. `None` while another sync is outstanding.
    pub fn begin_sync(&mut self) -> Option<Ticket> {
        if self.is_syncing {
            tracing::debug!("Sync already in flight, ignoring request");
            return None;
        }
        self.is_syncing = true;
        self.sync_error = None;
        Some(self.ticket())
    }

    /// Apply a finished sync.
    ///
    /// Success replaces the roster wholesale and appends one snapshot;
    /// failure only sets the error banner.
    pub fn complete_sync(
        &mut self,
        ticket: &Ticket,
        result: Result<Vec<Agent>, SyncError>,
        at: DateTime<Local>,
    ) -> SyncOutcome {
        if !self.is_current(ticket) {
            tracing::info!(
                profile = %ticket.profile_id,
                "Discarding sync result for a profile that is no longer active"
            );
            return SyncOutcome::Stale;
        }
        self.is_syncing = false;

        match result {
            Ok(agents) => {
                self.history.append(SyncSnapshot::from_agents(&agents, at));
                let count = agents.len();
                self.agents = agents;
                SyncOutcome::Applied { agents: count }
            }
            Err(e) => {
                tracing::warn!(profile = %ticket.profile_id, "Sync failed: {}", e);
                self.sync_error = Some(e.to_string());
                SyncOutcome::Failed
            }
        }
    }

    pub fn is_syncing(&self) -> bool {
        self.is_syncing
    }

    pub fn sync_error(&self) -> Option<&str> {
        self.sync_error.as_deref()
    }

    // ------------------------------------------------------------------------
    // Analysis
    // ------------------------------------------------------------------------

    /// Start an analysis. `None` while one is outstanding or when there are
    /// no on-queue agents to analyze.
    pub fn begin_analysis(&mut self) -> Option<Ticket> {
        if self.is_analyzing || self.on_queue_agents().is_empty() {
            return None;
        }
        self.is_analyzing = true;
        Some(self.ticket())
    }

    /// Store a finished analysis and switch to the reports view.
    /// Returns false when the result was stale and dropped.
    pub fn complete_analysis(&mut self, ticket: &Ticket, analysis: AIAnalysis) -> bool {
        if !self.is_current(ticket) {
            return false;
        }
        self.is_analyzing = false;
        self.analysis = Some(analysis);
        self.tab = Tab::Reports;
        true
    }

    pub fn clear_analysis(&mut self) {
        self.analysis = None;
    }

    pub fn analysis(&self) -> Option<&AIAnalysis> {
        self.analysis.as_ref()
    }

    pub fn is_analyzing(&self) -> bool {
        self.is_analyzing
    }

    // ------------------------------------------------------------------------
    // Views
    // ------------------------------------------------------------------------

    pub fn set_tab(&mut self, tab: Tab) {
        self.tab = tab;
    }

    pub fn tab(&self) -> Tab {
        self.tab
    }

    pub fn set_search(&mut self, search: impl Into<String>) {
        self.filter.search = search.into();
    }

    pub fn set_status_filter(&mut self, status: StatusFilter) {
        self.filter.status = status;
    }

    pub fn set_presence_filter(&mut self, presence: PresenceFilter) {
        self.filter.presence = presence;
    }

    pub fn filter(&self) -> &AgentFilter {
        &self.filter
    }

    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    pub fn history(&self) -> &SyncHistory {
        &self.history
    }

    /// Roster shown on the dashboard tab
    pub fn on_queue_agents(&self) -> Vec<&Agent> {
        crate::agents::on_queue(&self.agents)
    }

    /// Roster shown on the agents tab
    pub fn filtered_agents(&self) -> Vec<&Agent> {
        self.filter.apply(&self.agents)
    }

    pub fn stats(&self) -> DashboardStats {
        metrics::dashboard_stats(&self.agents)
    }

    pub fn status_distribution(&self) -> [BucketCount; 3] {
        metrics::status_distribution(&self.agents)
    }

    pub fn presences(&self) -> Vec<String> {
        unique_presences(&self.agents)
    }
}
