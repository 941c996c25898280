//! Wire types for the Genesys Cloud REST API
//!
//! Only the fields the sync pipeline reads are modelled; everything else in
//! the user entity is ignored.

use serde::Deserialize;

/// `POST /oauth/token` success body
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    #[serde(default)]
    pub access_token: Option<String>,
}

/// Error body shapes seen from the login service
#[derive(Debug, Default, Deserialize)]
pub struct OAuthErrorBody {
    pub error_description: Option<String>,
    pub message: Option<String>,
    pub error: Option<String>,
}

impl OAuthErrorBody {
    /// First non-empty human-readable field
    pub fn detail(&self) -> Option<&str> {
        [&self.error_description, &self.message, &self.error]
            .into_iter()
            .flatten()
            .map(String::as_str)
            .find(|s| !s.is_empty())
    }
}

/// `GET /api/v2/users` page
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsersPage {
    /// Absent and `null` both mean an empty page
    #[serde(default)]
    pub entities: Option<Vec<UserEntity>>,
    pub page_count: Option<u32>,
}

impl UsersPage {
    pub fn into_entities(self) -> Vec<UserEntity> {
        self.entities.unwrap_or_default()
    }
}

/// One user record with `expand=presence,routingStatus`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserEntity {
    pub id: String,
    pub name: Option<String>,
    pub department: Option<String>,
    pub presence: Option<UserPresence>,
    pub routing_status: Option<UserRoutingStatus>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPresence {
    pub presence_definition: Option<PresenceDefinition>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresenceDefinition {
    pub system_presence: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRoutingStatus {
    pub status: Option<String>,
    /// ISO-8601 time the current status began
    pub start_time: Option<String>,
}
