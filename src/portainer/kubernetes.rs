//! Kubernetes resources through Portainer's Kubernetes proxy, and
//! Kubernetes applications, which Portainer stores as stacks.

use serde_json::{json, Value};
use tracing::info;

use super::client::PortainerClient;
use super::error::Result;
use super::models::KUBERNETES_APP_STACK_TYPE;
use super::request::{path_segment, ApiRequest};

const CORE_API: &str = "api/v1";
const APPS_API: &str = "apis/apps/v1";

/// Path of a Kubernetes API resource below the endpoint's proxy root
fn kubernetes_path(endpoint_id: u64, resource_path: &str) -> String {
    format!("/api/endpoints/{endpoint_id}/kubernetes/{resource_path}")
}

/// Cluster-wide path, or the namespaced one when a namespace is given
fn namespaced_path(api: &str, namespace: Option<&str>, resource: &str) -> Result<String> {
    Ok(match namespace.filter(|ns| !ns.is_empty()) {
        Some(ns) => format!("{api}/namespaces/{}/{resource}", path_segment(ns)?),
        None => format!("{api}/{resource}"),
    })
}

impl PortainerClient {
    async fn get_kubernetes_resource(&self, endpoint_id: u64, resource_path: &str) -> Result<Value> {
        self.send_json(ApiRequest::get(kubernetes_path(endpoint_id, resource_path)))
            .await
    }

    pub async fn get_kubernetes_nodes(&self, endpoint_id: u64) -> Result<Value> {
        self.get_kubernetes_resource(endpoint_id, &format!("{CORE_API}/nodes"))
            .await
    }

    pub async fn get_kubernetes_namespaces(&self, endpoint_id: u64) -> Result<Value> {
        self.get_kubernetes_resource(endpoint_id, &format!("{CORE_API}/namespaces"))
            .await
    }

    pub async fn get_kubernetes_pods(
        &self,
        endpoint_id: u64,
        namespace: Option<&str>,
    ) -> Result<Value> {
        self.get_kubernetes_resource(endpoint_id, &namespaced_path(CORE_API, namespace, "pods")?)
            .await
    }

    pub async fn get_kubernetes_deployments(
        &self,
        endpoint_id: u64,
        namespace: Option<&str>,
    ) -> Result<Value> {
        self.get_kubernetes_resource(
            endpoint_id,
            &namespaced_path(APPS_API, namespace, "deployments")?,
        )
        .await
    }

    pub async fn get_kubernetes_services(
        &self,
        endpoint_id: u64,
        namespace: Option<&str>,
    ) -> Result<Value> {
        self.get_kubernetes_resource(
            endpoint_id,
            &namespaced_path(CORE_API, namespace, "services")?,
        )
        .await
    }

    /// Stacks on the endpoint whose `Type` is the Kubernetes tag, in upstream order
    pub async fn get_kubernetes_applications(&self, endpoint_id: u64) -> Result<Value> {
        let stacks = self.get_stacks(endpoint_id).await?;
        let apps: Vec<Value> = match stacks {
            Value::Array(items) => items
                .into_iter()
                .filter(|stack| {
                    stack.get("Type").and_then(Value::as_u64) == Some(KUBERNETES_APP_STACK_TYPE)
                })
                .collect(),
            _ => Vec::new(),
        };
        Ok(Value::Array(apps))
    }

    /// Deploy a Kubernetes manifest as a Portainer stack
    pub async fn create_kubernetes_application(
        &self,
        name: &str,
        manifest: &str,
        endpoint_id: u64,
    ) -> Result<Value> {
        info!("Creating Kubernetes application {} on endpoint {}", name, endpoint_id);
        let request = ApiRequest::post("/api/stacks")
            .query("type", KUBERNETES_APP_STACK_TYPE)
            .query("method", "string")
            .endpoint(endpoint_id)
            .json(json!({
                "name": name,
                "stackFileContent": manifest,
            }));
        self.send_json(request).await
    }

    pub async fn update_kubernetes_application(
        &self,
        app_id: u64,
        manifest: &str,
        endpoint_id: u64,
    ) -> Result<Value> {
        self.update_stack(app_id, manifest, endpoint_id).await
    }

    pub async fn delete_kubernetes_application(&self, app_id: u64, endpoint_id: u64) -> Result<Value> {
        self.delete_stack(app_id, endpoint_id).await
    }
}
