//! Portainer payload shapes
//!
//! Field casing follows Portainer exactly; it is not consistent across
//! endpoints and must not be normalised.

use serde::{Deserialize, Serialize};

/// `type` query value for repository-backed standalone Compose stacks
pub const STANDALONE_STACK_TYPE: u8 = 2;

/// Stack `Type` tag marking Kubernetes applications in stack listings
pub const KUBERNETES_APP_STACK_TYPE: u64 = 2;

/// Default role for new users and team memberships
pub const DEFAULT_ROLE: u32 = 2;

pub const DEFAULT_VOLUME_DRIVER: &str = "local";
pub const DEFAULT_NETWORK_DRIVER: &str = "bridge";

/// Body of `POST /api/stacks?type=2&method=repository`
///
/// Credentials that are `None` are left out of the JSON entirely.
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RepositoryStack {
    pub name: String,
    pub repository_url: String,
    pub repository_reference_name: String,
    pub compose_file: String,
    pub repository_authentication: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repository_username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repository_password: Option<String>,
}

impl RepositoryStack {
    pub fn new(name: impl Into<String>, repository_url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            repository_url: repository_url.into(),
            repository_reference_name: "refs/heads/main".to_string(),
            compose_file: "docker-compose.yml".to_string(),
            repository_authentication: false,
            repository_username: None,
            repository_password: None,
        }
    }

    pub fn reference(mut self, reference: impl Into<String>) -> Self {
        self.repository_reference_name = reference.into();
        self
    }

    pub fn compose_file(mut self, path: impl Into<String>) -> Self {
        self.compose_file = path.into();
        self
    }

    /// Set the authentication flag and credentials as given; they are not cross-checked
    pub fn authentication(
        mut self,
        enabled: bool,
        username: Option<String>,
        password: Option<String>,
    ) -> Self {
        self.repository_authentication = enabled;
        self.repository_username = username;
        self.repository_password = password;
        self
    }
}

/// One entry of `GET /api/teams/{id}/memberships`
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct TeamMembership {
    #[serde(rename = "Id")]
    pub id: u64,
    #[serde(rename = "UserID")]
    pub user_id: u64,
    #[serde(rename = "Role", default)]
    pub role: u32,
}
