//! Connection profiles
//!
//! A profile is one tenant's connection configuration: hosts, OAuth client
//! credentials and an optional proxy prefix. The [`ProfileStore`] owns the
//! ordered profile list plus the active pointer and persists both through a
//! [`KeyValueStore`] after every mutation.
//!
//! Invariants enforced at the mutation boundary:
//! - at least one profile always exists
//! - the active id always references an existing profile

mod store;

pub use store::{FileStore, KeyValueStore, MemoryStore};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Key holding the JSON-encoded profile list
pub const PROFILES_KEY: &str = "profiles";
/// Key holding the active profile id as a plain string
pub const ACTIVE_PROFILE_KEY: &str = "active_profile_id";

// ============================================================================
// Errors
// ============================================================================

/// Errors from profile mutations and persistence
#[derive(Error, Debug)]
pub enum ProfileError {
    /// Refused: the store must keep at least one profile
    #[error("must keep at least one profile")]
    LastProfile,

    #[error("no profile with id '{0}'")]
    UnknownProfile(String),

    #[error("invalid profile: {0}")]
    Invalid(String),

    #[error("profile storage error: {0}")]
    Storage(#[from] std::io::Error),

    #[error("stored profile list is not valid JSON: {0}")]
    Corrupt(#[from] serde_json::Error),
}

// ============================================================================
// Profile
// ============================================================================

/// Named connection configuration for one tenant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub id: String,
    pub name: String,
    pub region: String,
    pub api_host: String,
    pub login_host: String,
    pub client_id: String,
    pub client_secret: String,
    /// URL prefix prepended verbatim to every outbound request
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cors_proxy: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_synced_at: Option<DateTime<Utc>>,
}

impl Profile {
    /// Generate a fresh profile id
    pub fn new_id() -> String {
        format!("cust-{}", Utc::now().timestamp_millis())
    }

    /// Whether both OAuth credentials are present after trimming
    pub fn has_credentials(&self) -> bool {
        !self.client_id.trim().is_empty() && !self.client_secret.trim().is_empty()
    }

    /// Check the fields a sync cannot work without
    pub fn validate(&self) -> Result<(), ProfileError> {
        if self.id.trim().is_empty() {
            return Err(ProfileError::Invalid("id must not be empty".into()));
        }
        if self.name.trim().is_empty() {
            return Err(ProfileError::Invalid("name must not be empty".into()));
        }
        for (field, host) in [("apiHost", &self.api_host), ("loginHost", &self.login_host)] {
            url::Url::parse(host)
                .map_err(|e| ProfileError::Invalid(format!("{} '{}': {}", field, host, e)))?;
        }
        Ok(())
    }
}

/// Built-in profile set used when nothing has been saved yet.
///
/// Credentials are left empty so the first sync asks for configuration.
pub fn default_profiles() -> Vec<Profile> {
    vec![Profile {
        id: "examp-001".to_string(),
        name: "Example".to_string(),
        region: "ap_southeast_2".to_string(),
        api_host: "https://api.mypurecloud.com.au".to_string(),
        login_host: "https://login.mypurecloud.com.au".to_string(),
        client_id: String::new(),
        client_secret: String::new(),
        cors_proxy: Some("https://corsproxy.io/?".to_string()),
        last_synced_at: None,
    }]
}

/// Result of an upsert
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upserted {
    Inserted,
    Replaced,
}

// ============================================================================
// Profile Store
// ============================================================================

/// Owns the profile list and the active-profile pointer
pub struct ProfileStore<S: KeyValueStore> {
    store: S,
    profiles: Vec<Profile>,
    active_id: String,
}

impl<S: KeyValueStore> ProfileStore<S> {
    /// Load profiles and the active pointer, falling back to the built-in
    /// defaults when nothing was saved.
    pub fn load(store: S) -> Result<Self, ProfileError> {
        let profiles = match store.get(PROFILES_KEY)? {
            Some(json) => {
                let saved: Vec<Profile> = serde_json::from_str(&json)?;
                if saved.is_empty() {
                    tracing::warn!("Saved profile list is empty, using defaults");
                    default_profiles()
                } else {
                    saved
                }
            }
            None => {
                tracing::debug!("No saved profiles, using defaults");
                default_profiles()
            }
        };

        let stored_active = store.get(ACTIVE_PROFILE_KEY)?;
        let active_id = resolve_active(&profiles, stored_active.as_deref());

        tracing::debug!(
            profiles = profiles.len(),
            active = %active_id,
            "Loaded profiles"
        );

        Ok(Self {
            store,
            profiles,
            active_id,
        })
    }

    pub fn profiles(&self) -> &[Profile] {
        &self.profiles
    }

    pub fn active_id(&self) -> &str {
        &self.active_id
    }

    /// The active profile; always exists
    pub fn active(&self) -> &Profile {
        self.get(&self.active_id).unwrap_or(&self.profiles[0])
    }

    pub fn get(&self, id: &str) -> Option<&Profile> {
        self.profiles.iter().find(|p| p.id == id)
    }

    /// Replace the profile with the same id, or append a new one
    pub fn upsert(&mut self, profile: Profile) -> Result<Upserted, ProfileError> {
        profile.validate()?;

        let outcome = match self.profiles.iter_mut().find(|p| p.id == profile.id) {
            Some(existing) => {
                *existing = profile;
                Upserted::Replaced
            }
            None => {
                self.profiles.push(profile);
                Upserted::Inserted
            }
        };

        self.persist()?;
        Ok(outcome)
    }

    /// Delete a profile. Refuses to delete the last one.
    ///
    /// Deleting the active profile moves the pointer to the first remaining.
    pub fn delete(&mut self, id: &str) -> Result<(), ProfileError> {
        if self.get(id).is_none() {
            return Err(ProfileError::UnknownProfile(id.to_string()));
        }
        if self.profiles.len() <= 1 {
            return Err(ProfileError::LastProfile);
        }

        self.profiles.retain(|p| p.id != id);
        if self.active_id == id {
            self.active_id = self.profiles[0].id.clone();
        }

        self.persist()
    }

    /// Point at another profile. Returns whether the active id changed.
    pub fn set_active(&mut self, id: &str) -> Result<bool, ProfileError> {
        if self.get(id).is_none() {
            return Err(ProfileError::UnknownProfile(id.to_string()));
        }
        let changed = self.active_id != id;
        self.active_id = id.to_string();
        self.persist()?;
        Ok(changed)
    }

    /// Stamp the last successful sync time on a profile
    pub fn mark_synced(&mut self, id: &str, at: DateTime<Utc>) -> Result<(), ProfileError> {
        let profile = self
            .profiles
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| ProfileError::UnknownProfile(id.to_string()))?;
        profile.last_synced_at = Some(at);
        self.persist()
    }

    fn persist(&mut self) -> Result<(), ProfileError> {
        let json = serde_json::to_string(&self.profiles)?;
        self.store.set(PROFILES_KEY, &json)?;
        self.store.set(ACTIVE_PROFILE_KEY, &self.active_id)?;
        Ok(())
    }
}

fn resolve_active(profiles: &[Profile], stored: Option<&str>) -> String {
    match stored.map(str::trim) {
        Some(id) if profiles.iter().any(|p| p.id == id) => id.to_string(),
        _ => profiles[0].id.clone(),
    }
}
