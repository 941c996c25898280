//! Dashboard session
//!
//! Ties the profile store, the agent source and the insight backend to one
//! [`DashboardState`]. All mutation goes through `&mut self`, so a session
//! never runs two syncs against the same state at once.

use chrono::{Local, Utc};

use crate::dashboard::{DashboardState, SyncOutcome};
use crate::genesys::AgentSource;
use crate::insight::{analyze_or_fallback, InsightBackend};
use crate::profiles::{KeyValueStore, Profile, ProfileError, ProfileStore, Upserted};

pub struct Session<S: KeyValueStore> {
    profiles: ProfileStore<S>,
    source: Box<dyn AgentSource>,
    insight: Box<dyn InsightBackend>,
    state: DashboardState,
}

impl<S: KeyValueStore> Session<S> {
    pub fn new(
        profiles: ProfileStore<S>,
        source: Box<dyn AgentSource>,
        insight: Box<dyn InsightBackend>,
    ) -> Self {
        let state = DashboardState::new(profiles.active_id());
        Self {
            profiles,
            source,
            insight,
            state,
        }
    }

    pub fn state(&self) -> &DashboardState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut DashboardState {
        &mut self.state
    }

    pub fn profiles(&self) -> &ProfileStore<S> {
        &self.profiles
    }

    pub fn active_profile(&self) -> &Profile {
        self.profiles.active()
    }

    // ------------------------------------------------------------------------
    // Profile administration
    // ------------------------------------------------------------------------

    /// Make another profile active and clear all tenant-scoped view state
    pub fn switch_profile(&mut self, id: &str) -> Result<(), ProfileError> {
        self.profiles.set_active(id)?;
        self.state.switch_profile(id);
        Ok(())
    }

    pub fn upsert_profile(&mut self, profile: Profile) -> Result<Upserted, ProfileError> {
        self.profiles.upsert(profile)
    }

    /// Delete a profile; if it was active, the dashboard moves to the new
    /// active profile and is cleared.
    pub fn delete_profile(&mut self, id: &str) -> Result<(), ProfileError> {
        self.profiles.delete(id)?;
        if self.profiles.active_id() != self.state.active_profile_id() {
            let active = self.profiles.active_id().to_string();
            self.state.switch_profile(active);
        }
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Sync & analysis
    // ------------------------------------------------------------------------

    /// Fetch a fresh roster for the active profile
    pub async fn sync(&mut self) -> SyncOutcome {
        let Some(ticket) = self.state.begin_sync() else {
            return SyncOutcome::Busy;
        };

        let profile = self
            .profiles
            .get(ticket.profile_id())
            .cloned()
            .unwrap_or_else(|| self.profiles.active().clone());

        tracing::info!(profile = %profile.id, name = %profile.name, "Syncing");
        let result = self.source.fetch_agents(&profile).await;

        let outcome = self.state.complete_sync(&ticket, result, Local::now());
        if matches!(outcome, SyncOutcome::Applied { .. }) {
            if let Err(e) = self.profiles.mark_synced(&profile.id, Utc::now()) {
                tracing::warn!(profile = %profile.id, "Could not record sync time: {}", e);
            }
        }
        outcome
    }

    /// Analyze the on-queue roster. Returns false when nothing ran, either
    /// because there are no on-queue agents or an analysis is outstanding.
    pub async fn analyze(&mut self) -> bool {
        let Some(ticket) = self.state.begin_analysis() else {
            return false;
        };

        let agents: Vec<_> = self.state.on_queue_agents().into_iter().cloned().collect();
        let analysis = analyze_or_fallback(self.insight.as_ref(), &agents).await;
        self.state.complete_analysis(&ticket, analysis)
    }
}
