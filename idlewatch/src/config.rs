//! Configuration loading
//!
//! Settings come from `.idlewatch.toml`. Profiles (hosts and credentials) are
//! not part of this file; they live in the profile store.

use anyhow::Result;
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::agents::EfficiencyTable;
use crate::insight::{DEFAULT_GEMINI_MODEL, DEFAULT_GEMINI_URL, DEFAULT_OLLAMA_MODEL, DEFAULT_OLLAMA_URL};

const CONFIG_FILE: &str = ".idlewatch.toml";

/// Find a config file by walking up the directory tree, then checking global config.
///
/// Search order:
/// 1. Current directory and parent directories (walking up to root)
/// 2. Global config at ~/.config/idlewatch/
fn find_config_file(filename: &str) -> Option<PathBuf> {
    let mut current = std::env::current_dir().ok()?;

    loop {
        let candidate = current.join(filename);
        if candidate.exists() {
            return Some(candidate);
        }

        match current.parent() {
            Some(parent) => current = parent.to_path_buf(),
            None => break,
        }
    }

    if let Some(config_dir) = dirs::config_dir() {
        let global_path = config_dir.join("idlewatch").join(filename);
        if global_path.exists() {
            return Some(global_path);
        }
    }

    None
}

// ============================================================================
// Sections
// ============================================================================

/// Top-level configuration (from .idlewatch.toml)
#[derive(Debug, Default, Deserialize)]
pub struct FileConfig {
    #[serde(default)]
    pub insight: InsightConfig,
    #[serde(default)]
    pub watch: WatchConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub scoring: EfficiencyTable,
}

/// Which generative backend produces floor analyses
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum InsightProvider {
    #[default]
    Gemini,
    Ollama,
}

/// Insight configuration section
#[derive(Debug, Default, Deserialize)]
pub struct InsightConfig {
    #[serde(default)]
    pub backend: InsightProvider,
    /// Model name; the backend's default when absent
    pub model: Option<String>,
    /// Base URL; the backend's default when absent
    pub url: Option<String>,
    /// Gemini API key (GEMINI_API_KEY takes precedence)
    pub api_key: Option<String>,
}

impl InsightConfig {
    pub fn resolved_model(&self) -> String {
        self.model.clone().unwrap_or_else(|| {
            match self.backend {
                InsightProvider::Gemini => DEFAULT_GEMINI_MODEL,
                InsightProvider::Ollama => DEFAULT_OLLAMA_MODEL,
            }
            .to_string()
        })
    }

    pub fn resolved_url(&self) -> String {
        self.url.clone().unwrap_or_else(|| {
            match self.backend {
                InsightProvider::Gemini => DEFAULT_GEMINI_URL,
                InsightProvider::Ollama => DEFAULT_OLLAMA_URL,
            }
            .to_string()
        })
    }

    /// Key from the environment, then the file
    pub fn resolved_api_key(&self) -> String {
        std::env::var("GEMINI_API_KEY")
            .ok()
            .filter(|k| !k.is_empty())
            .or_else(|| self.api_key.clone())
            .unwrap_or_default()
    }
}

/// Watch loop configuration section
#[derive(Debug, Deserialize)]
pub struct WatchConfig {
    /// Seconds between syncs
    #[serde(default = "default_interval")]
    pub interval: u64,
}

/// Storage configuration section
#[derive(Debug, Default, Deserialize)]
pub struct StorageConfig {
    /// Directory holding the profile store
    pub dir: Option<PathBuf>,
}

/// HTTP configuration section
#[derive(Debug, Deserialize)]
pub struct HttpConfig {
    /// Per-request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

// Default value functions
fn default_interval() -> u64 {
    30
}

fn default_timeout() -> u64 {
    30
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            interval: default_interval(),
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout: default_timeout(),
        }
    }
}

impl FileConfig {
    /// Load config from .idlewatch.toml
    ///
    /// Search order:
    /// 1. Walk up directory tree from cwd looking for .idlewatch.toml
    /// 2. Check ~/.config/idlewatch/.idlewatch.toml (global fallback)
    /// 3. Fall back to defaults
    pub fn load() -> Result<Self> {
        if let Some(config_path) = find_config_file(CONFIG_FILE) {
            tracing::debug!("Loading config from: {}", config_path.display());
            return Self::load_from_path(&config_path);
        }

        tracing::debug!("No {} found, using defaults", CONFIG_FILE);
        Ok(Self::default())
    }

    /// Load from a specific path
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: FileConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Profile store directory: IDLEWATCH_HOME, then [storage] dir, then the
    /// platform config dir
    pub fn storage_dir(&self) -> PathBuf {
        std::env::var_os("IDLEWATCH_HOME")
            .map(PathBuf::from)
            .or_else(|| self.storage.dir.clone())
            .unwrap_or_else(crate::profiles::FileStore::default_dir)
    }
}
