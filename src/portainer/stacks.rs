//! Stack and endpoint operations

use serde_json::{json, Value};
use tracing::info;

use super::client::PortainerClient;
use super::error::{PortainerError, Result};
use super::models::{RepositoryStack, STANDALONE_STACK_TYPE};
use super::request::ApiRequest;

impl PortainerClient {
    /// List stacks deployed on an endpoint
    pub async fn get_stacks(&self, endpoint_id: u64) -> Result<Value> {
        self.send_json(ApiRequest::get("/api/stacks").endpoint(endpoint_id))
            .await
    }

    pub async fn get_stack(&self, stack_id: u64) -> Result<Value> {
        self.send_json(ApiRequest::get(format!("/api/stacks/{stack_id}")))
            .await
    }

    /// Fetch the Compose file or manifest a stack was deployed from
    pub async fn get_stack_file(&self, stack_id: u64) -> Result<Value> {
        self.send_json(ApiRequest::get(format!("/api/stacks/{stack_id}/file")))
            .await
    }

    /// Deploy a standalone Compose stack from inline file content
    pub async fn create_stack_from_string(
        &self,
        name: &str,
        stack_file_content: &str,
        endpoint_id: u64,
    ) -> Result<Value> {
        info!("Creating stack {} on endpoint {}", name, endpoint_id);
        let request = ApiRequest::post("/api/stacks/create/standalone/string")
            .endpoint(endpoint_id)
            .json(json!({
                "Name": name,
                "StackFileContent": stack_file_content,
            }));
        self.send_json(request).await
    }

    /// Deploy a standalone Compose stack from uploaded file bytes
    ///
    /// The bytes must be UTF-8; nothing is sent otherwise.
    pub async fn create_stack_from_file(
        &self,
        name: &str,
        file_content: &[u8],
        endpoint_id: u64,
    ) -> Result<Value> {
        let content = std::str::from_utf8(file_content).map_err(|e| {
            PortainerError::InvalidInput(format!("stack file is not valid UTF-8: {e}"))
        })?;
        self.create_stack_from_string(name, content, endpoint_id)
            .await
    }

    /// Deploy a standalone Compose stack straight from a git repository
    pub async fn create_stack_from_repository(
        &self,
        stack: &RepositoryStack,
        endpoint_id: u64,
    ) -> Result<Value> {
        info!(
            "Creating stack {} from {} ({}) on endpoint {}",
            stack.name, stack.repository_url, stack.repository_reference_name, endpoint_id
        );
        let body = serde_json::to_value(stack)
            .map_err(|e| PortainerError::InvalidInput(e.to_string()))?;
        let request = ApiRequest::post("/api/stacks")
            .query("type", STANDALONE_STACK_TYPE)
            .query("method", "repository")
            .endpoint(endpoint_id)
            .json(body);
        self.send_json(request).await
    }

    /// Redeploy a stack with new file content
    pub async fn update_stack(
        &self,
        stack_id: u64,
        stack_file_content: &str,
        endpoint_id: u64,
    ) -> Result<Value> {
        info!("Updating stack {} on endpoint {}", stack_id, endpoint_id);
        // lower-camel here, unlike the create endpoint
        let request = ApiRequest::put(format!("/api/stacks/{stack_id}"))
            .endpoint(endpoint_id)
            .json(json!({ "stackFileContent": stack_file_content }));
        self.send_json(request).await
    }

    pub async fn delete_stack(&self, stack_id: u64, endpoint_id: u64) -> Result<Value> {
        info!("Deleting stack {} on endpoint {}", stack_id, endpoint_id);
        let request = ApiRequest::delete(format!("/api/stacks/{stack_id}")).endpoint(endpoint_id);
        self.send_or_status(request, "deleted").await
    }

    /// List the environments Portainer manages
    pub async fn get_endpoints(&self) -> Result<Value> {
        self.send_json(ApiRequest::get("/api/endpoints")).await
    }
}
