//! Query and body shapes accepted by the HTTP facade

use serde::Deserialize;

use crate::portainer::{
    RepositoryStack, DEFAULT_NETWORK_DRIVER, DEFAULT_ROLE, DEFAULT_VOLUME_DRIVER,
};

/// Default endpoint for every route except the stack listing
pub const DEFAULT_ENDPOINT_ID: u64 = 1;

/// Default endpoint for `GET /api/v1/stacks`
pub const DEFAULT_STACK_LIST_ENDPOINT_ID: u64 = 3;

fn default_endpoint_id() -> u64 {
    DEFAULT_ENDPOINT_ID
}

fn default_stack_list_endpoint_id() -> u64 {
    DEFAULT_STACK_LIST_ENDPOINT_ID
}

fn default_role() -> u32 {
    DEFAULT_ROLE
}

fn default_tag() -> String {
    "latest".to_string()
}

fn default_reference() -> String {
    "refs/heads/main".to_string()
}

fn default_compose_file() -> String {
    "docker-compose.yml".to_string()
}

fn default_volume_driver() -> String {
    DEFAULT_VOLUME_DRIVER.to_string()
}

fn default_network_driver() -> String {
    DEFAULT_NETWORK_DRIVER.to_string()
}

#[derive(Debug, Deserialize)]
pub struct EndpointQuery {
    #[serde(default = "default_endpoint_id")]
    pub endpoint_id: u64,
}

#[derive(Debug, Deserialize)]
pub struct StackListQuery {
    #[serde(default = "default_stack_list_endpoint_id")]
    pub endpoint_id: u64,
}

#[derive(Debug, Deserialize)]
pub struct StackCreateQuery {
    pub name: String,
    #[serde(default = "default_endpoint_id")]
    pub endpoint_id: u64,
}

/// `{"stack_file_content": "..."}`
#[derive(Debug, Deserialize)]
pub struct StackFileBody {
    pub stack_file_content: String,
}

#[derive(Debug, Deserialize)]
pub struct RepositoryStackRequest {
    pub name: String,
    pub repository_url: String,
    #[serde(default = "default_reference")]
    pub repository_reference_name: String,
    #[serde(default = "default_compose_file")]
    pub compose_file: String,
    #[serde(default = "default_endpoint_id")]
    pub endpoint_id: u64,
    #[serde(default)]
    pub repository_authentication: bool,
    #[serde(default)]
    pub repository_username: Option<String>,
    #[serde(default)]
    pub repository_password: Option<String>,
}

impl RepositoryStackRequest {
    /// Split into the stack body and the target endpoint
    pub fn into_parts(self) -> (RepositoryStack, u64) {
        let stack = RepositoryStack::new(self.name, self.repository_url)
            .reference(self.repository_reference_name)
            .compose_file(self.compose_file)
            .authentication(
                self.repository_authentication,
                self.repository_username,
                self.repository_password,
            );
        (stack, self.endpoint_id)
    }
}

#[derive(Debug, Deserialize)]
pub struct PullImageQuery {
    pub from_image: String,
    #[serde(default = "default_tag")]
    pub tag: String,
    #[serde(default = "default_endpoint_id")]
    pub endpoint_id: u64,
}

#[derive(Debug, Deserialize)]
pub struct VolumeCreateQuery {
    pub name: String,
    #[serde(default = "default_volume_driver")]
    pub driver: String,
    #[serde(default = "default_endpoint_id")]
    pub endpoint_id: u64,
}

#[derive(Debug, Deserialize)]
pub struct NetworkCreateQuery {
    pub name: String,
    #[serde(default = "default_network_driver")]
    pub driver: String,
    #[serde(default = "default_endpoint_id")]
    pub endpoint_id: u64,
}

#[derive(Debug, Deserialize)]
pub struct UserCreate {
    pub username: String,
    pub password: String,
    #[serde(default = "default_role")]
    pub role: u32,
}

#[derive(Debug, Deserialize)]
pub struct TeamCreate {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct MembershipCreate {
    pub user_id: u64,
    #[serde(default = "default_role")]
    pub role: u32,
}

#[derive(Debug, Deserialize)]
pub struct NamespaceQuery {
    pub namespace: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct KubernetesAppCreate {
    pub name: String,
    /// YAML manifest
    pub manifest: String,
}

#[derive(Debug, Deserialize)]
pub struct KubernetesAppUpdate {
    pub manifest: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_repository_request_defaults() {
        let request: RepositoryStackRequest = serde_json::from_value(json!({
            "name": "x",
            "repository_url": "u"
        }))
        .unwrap();

        let (stack, endpoint_id) = request.into_parts();
        assert_eq!(endpoint_id, DEFAULT_ENDPOINT_ID);
        assert_eq!(stack.repository_reference_name, "refs/heads/main");
        assert_eq!(stack.compose_file, "docker-compose.yml");
        assert!(!stack.repository_authentication);
        assert!(stack.repository_username.is_none());
    }

    #[test]
    fn test_role_defaults() {
        let user: UserCreate =
            serde_json::from_value(json!({ "username": "bob", "password": "pw" })).unwrap();
        assert_eq!(user.role, 2);

        let member: MembershipCreate = serde_json::from_value(json!({ "user_id": 42 })).unwrap();
        assert_eq!(member.role, 2);
    }
}
