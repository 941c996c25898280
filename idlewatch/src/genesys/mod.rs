//! Genesys Cloud agent client
//!
//! Acquires an OAuth token with the client-credentials grant, pages through
//! `/api/v2/users` with presence and routing status expanded, and normalizes
//! the records into [`Agent`] snapshots. The roster is returned whole or not
//! at all: any failed page fails the sync.

mod normalize;
pub mod types;

pub use normalize::{normalize_user, normalize_users};

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::{header, Client, Response, StatusCode};
use thiserror::Error;

use crate::agents::{Agent, EfficiencyTable};
use crate::profiles::Profile;
use types::{OAuthErrorBody, TokenResponse, UserEntity, UsersPage};

/// Users requested per page
pub const PAGE_SIZE: u32 = 100;
/// Hard ceiling on pages per sync, for servers that never settle on a count
pub const MAX_PAGES: u32 = 100;

// ============================================================================
// Errors
// ============================================================================

/// Sync failures. Display strings are shown to the user as-is.
#[derive(Error, Debug)]
pub enum SyncError {
    /// Client id or secret blank; no request was made
    #[error("Missing credentials: set the OAuth client id and secret on the active profile")]
    MissingCredentials,

    /// The request never reached the server (proxy down, blocked, DNS)
    #[error("Connection failed: the request was blocked or the proxy is unreachable. Check the profile's CORS proxy setting ({0})")]
    ConnectionBlocked(String),

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// A users page request got no HTTP response (timeout, reset)
    #[error("Data fetch failed (page {page}): {reason}")]
    PageUnreachable { page: u32, reason: String },

    #[error("Failed to fetch user data (page {page}): {status} - {body}")]
    FetchFailed {
        page: u32,
        status: u16,
        body: String,
    },

    #[error("Unexpected response from server: {0}")]
    InvalidResponse(String),
}

impl SyncError {
    /// Transport failure on the token request
    fn transport(e: reqwest::Error) -> Self {
        Self::ConnectionBlocked(e.to_string())
    }

    fn page_transport(page: u32, e: reqwest::Error) -> Self {
        let reason = if e.is_timeout() {
            "request timed out".to_string()
        } else {
            e.to_string()
        };
        Self::PageUnreachable { page, reason }
    }
}

// ============================================================================
// Agent Source
// ============================================================================

/// Anything that can produce a fresh roster for a profile
#[async_trait]
pub trait AgentSource: Send + Sync {
    async fn fetch_agents(&self, profile: &Profile) -> Result<Vec<Agent>, SyncError>;
}

/// HTTP client for Genesys Cloud
#[derive(Clone)]
pub struct GenesysClient {
    http: Client,
    scoring: EfficiencyTable,
}

impl GenesysClient {
    pub fn new(timeout: Duration, scoring: EfficiencyTable) -> Result<Self, SyncError> {
        let http = Client::builder()
            .user_agent(concat!("idlewatch/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .map_err(|e| SyncError::InvalidResponse(format!("HTTP client setup: {}", e)))?;
        Ok(Self { http, scoring })
    }

    /// Request an access token for the profile's client credentials
    async fn acquire_token(&self, endpoints: &Endpoints, profile: &Profile) -> Result<String, SyncError> {
        let url = endpoints.token_url();
        tracing::debug!(url = %url, "Requesting access token");

        let response = self
            .http
            .post(&url)
            .basic_auth(profile.client_id.trim(), Some(profile.client_secret.trim()))
            .header(header::ACCEPT, "application/json")
            .header(header::CACHE_CONTROL, "no-store")
            .header(header::PRAGMA, "no-cache")
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await
            .map_err(SyncError::transport)?;

        let status = response.status();
        if !status.is_success() {
            let detail = error_detail(status, response).await;
            tracing::warn!(status = status.as_u16(), "Token request rejected: {}", detail);
            return Err(SyncError::AuthenticationFailed(detail));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| SyncError::InvalidResponse(format!("token response: {}", e)))?;

        token
            .access_token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| SyncError::AuthenticationFailed("no token".to_string()))
    }

    /// Fetch one page of users
    async fn fetch_page(
        &self,
        endpoints: &Endpoints,
        token: &str,
        page: u32,
    ) -> Result<UsersPage, SyncError> {
        let url = endpoints.users_url(page, Utc::now().timestamp_millis());
        tracing::debug!(page, "Fetching users page");

        let response = self
            .http
            .get(&url)
            .bearer_auth(token)
            .header(header::ACCEPT, "application/json")
            .header(header::CACHE_CONTROL, "no-store")
            .header(header::PRAGMA, "no-cache")
            .send()
            .await
            .map_err(|e| SyncError::page_transport(page, e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SyncError::FetchFailed {
                page,
                status: status.as_u16(),
                body,
            });
        }

        response
            .json()
            .await
            .map_err(|e| SyncError::InvalidResponse(format!("users page {}: {}", page, e)))
    }

    /// Page through the whole roster, in arrival order
    async fn fetch_all_users(
        &self,
        endpoints: &Endpoints,
        token: &str,
    ) -> Result<Vec<UserEntity>, SyncError> {
        let mut users = Vec::new();
        let mut page_number = 1;

        loop {
            let page = self.fetch_page(endpoints, token, page_number).await?;
            let page_count = page.page_count.unwrap_or(1);
            users.extend(page.into_entities());

            page_number += 1;
            if page_number > MAX_PAGES {
                if page_count > MAX_PAGES {
                    tracing::warn!(page_count, "Page ceiling reached, roster truncated");
                }
                break;
            }
            if page_number > page_count {
                break;
            }
        }

        Ok(users)
    }
}

#[async_trait]
impl AgentSource for GenesysClient {
    async fn fetch_agents(&self, profile: &Profile) -> Result<Vec<Agent>, SyncError> {
        if !profile.has_credentials() {
            return Err(SyncError::MissingCredentials);
        }

        let endpoints = Endpoints::for_profile(profile);
        let token = self.acquire_token(&endpoints, profile).await?;
        let users = self.fetch_all_users(&endpoints, &token).await?;

        let agents = normalize_users(users, Utc::now(), &self.scoring);
        tracing::info!(
            profile = %profile.id,
            agents = agents.len(),
            "Roster fetched"
        );
        Ok(agents)
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// Absolute URLs for one profile, proxy prefix applied
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    proxy: String,
    login_host: String,
    api_host: String,
}

impl Endpoints {
    pub fn for_profile(profile: &Profile) -> Self {
        Self {
            proxy: profile.cors_proxy.clone().unwrap_or_default(),
            login_host: profile.login_host.trim_end_matches('/').to_string(),
            api_host: profile.api_host.trim_end_matches('/').to_string(),
        }
    }

    pub fn token_url(&self) -> String {
        format!("{}{}/oauth/token", self.proxy, self.login_host)
    }

    /// `cache_buster` goes out as `_t` so intermediaries never serve a stale page
    pub fn users_url(&self, page: u32, cache_buster: i64) -> String {
        format!(
            "{}{}/api/v2/users?pageSize={}&pageNumber={}&expand=presence,routingStatus&_t={}",
            self.proxy, self.api_host, PAGE_SIZE, page, cache_buster
        )
    }
}

/// Pull a readable reason out of a failed token response
async fn error_detail(status: StatusCode, response: Response) -> String {
    let text = response.text().await.unwrap_or_default();
    if let Ok(body) = serde_json::from_str::<OAuthErrorBody>(&text) {
        if let Some(detail) = body.detail() {
            return detail.to_string();
        }
    }
    if text.trim().is_empty() {
        format!("HTTP {}", status.as_u16())
    } else {
        text
    }
}
