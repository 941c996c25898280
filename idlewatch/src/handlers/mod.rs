//! Command handlers module
//!
//! One handler per CLI command. CommandContext resolves settings from the
//! CLI and the config file and builds the resources handlers share.

use std::time::Duration;

use anyhow::{Context, Result};

use idlewatch::config::{FileConfig, InsightProvider};
use idlewatch::genesys::GenesysClient;
use idlewatch::insight::{GeminiBackend, InsightBackend, OllamaBackend};
use idlewatch::profiles::{FileStore, ProfileStore};
use idlewatch::session::Session;

pub mod dashboard;
pub mod profiles;
pub mod watch;

pub use dashboard::{run_agents, run_analyze, run_sync};
pub use profiles::run_profiles_command;
pub use watch::run_watch;

// =============================================================================
// CommandContext - shared state
// =============================================================================

/// Shared context for command handlers
pub struct CommandContext {
    pub verbose: u8,
    pub file_config: FileConfig,
}

impl CommandContext {
    /// Create a new CommandContext from CLI args and file config.
    ///
    /// CLI/env values override the `[insight]` section of the file.
    pub fn new(
        backend: Option<InsightProvider>,
        model: Option<String>,
        verbose: u8,
        mut file_config: FileConfig,
    ) -> Self {
        if let Some(backend) = backend {
            if backend != file_config.insight.backend {
                // A url/model configured for the other backend does not apply
                file_config.insight.url = None;
                file_config.insight.model = None;
            }
            file_config.insight.backend = backend;
        }
        if model.is_some() {
            file_config.insight.model = model;
        }

        Self {
            verbose,
            file_config,
        }
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.file_config.http.timeout)
    }

    /// Open the profile store in the configured data directory
    pub fn profile_store(&self) -> Result<ProfileStore<FileStore>> {
        let dir = self.file_config.storage_dir();
        let store = FileStore::open(&dir)
            .with_context(|| format!("Failed to open profile store at {}", dir.display()))?;
        ProfileStore::load(store)
            .with_context(|| format!("Failed to load profiles from {}", dir.display()))
    }

    /// Build the configured insight backend
    pub fn insight_backend(&self) -> Result<Box<dyn InsightBackend>> {
        let insight = &self.file_config.insight;
        let client = reqwest::Client::builder()
            .timeout(self.http_timeout())
            .build()
            .context("Failed to build HTTP client")?;

        let backend: Box<dyn InsightBackend> = match insight.backend {
            InsightProvider::Gemini => Box::new(GeminiBackend::new(
                client,
                &insight.resolved_url(),
                &insight.resolved_model(),
                &insight.resolved_api_key(),
            )),
            InsightProvider::Ollama => Box::new(OllamaBackend::new(
                client,
                &insight.resolved_url(),
                &insight.resolved_model(),
            )),
        };
        tracing::debug!(
            backend = backend.name(),
            model = %insight.resolved_model(),
            "Insight backend ready"
        );
        Ok(backend)
    }

    /// Build a session over the saved profiles and the live Genesys client
    pub fn session(&self) -> Result<Session<FileStore>> {
        let profiles = self.profile_store()?;
        let source = GenesysClient::new(self.http_timeout(), self.file_config.scoring)?;
        Ok(Session::new(profiles, Box::new(source), self.insight_backend()?))
    }

    /// Check if verbose mode is enabled (any -v flag)
    pub fn is_verbose(&self) -> bool {
        self.verbose >= 1
    }
}
