//! Docker engine operations proxied through `/api/endpoints/{id}/docker`

use std::time::Duration;

use serde_json::{json, Value};
use tracing::info;

use super::client::PortainerClient;
use super::error::Result;
use super::request::{path_segment, path_segments, ApiRequest};

/// Upper bound for draining an image pull's progress stream
const PULL_TIMEOUT: Duration = Duration::from_secs(30 * 60);

fn docker_path(endpoint_id: u64, path: &str) -> String {
    format!("/api/endpoints/{endpoint_id}/docker/{path}")
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ContainerAction {
    Start,
    Stop,
    Restart,
}

impl ContainerAction {
    fn path(self) -> &'static str {
        match self {
            ContainerAction::Start => "start",
            ContainerAction::Stop => "stop",
            ContainerAction::Restart => "restart",
        }
    }

    fn verb(self) -> &'static str {
        match self {
            ContainerAction::Start => "Starting",
            ContainerAction::Stop => "Stopping",
            ContainerAction::Restart => "Restarting",
        }
    }

    /// Status reported when Docker sends no body
    fn done(self) -> &'static str {
        match self {
            ContainerAction::Start => "started",
            ContainerAction::Stop => "stopped",
            ContainerAction::Restart => "restarted",
        }
    }
}

impl PortainerClient {
    // Containers

    pub async fn get_containers(&self, endpoint_id: u64) -> Result<Value> {
        self.send_json(ApiRequest::get(docker_path(endpoint_id, "containers/json")))
            .await
    }

    pub async fn start_container(&self, container_id: &str, endpoint_id: u64) -> Result<Value> {
        self.container_action(container_id, ContainerAction::Start, endpoint_id)
            .await
    }

    pub async fn stop_container(&self, container_id: &str, endpoint_id: u64) -> Result<Value> {
        self.container_action(container_id, ContainerAction::Stop, endpoint_id)
            .await
    }

    pub async fn restart_container(&self, container_id: &str, endpoint_id: u64) -> Result<Value> {
        self.container_action(container_id, ContainerAction::Restart, endpoint_id)
            .await
    }

    async fn container_action(
        &self,
        container_id: &str,
        action: ContainerAction,
        endpoint_id: u64,
    ) -> Result<Value> {
        info!(
            "{} container {} on endpoint {}",
            action.verb(),
            container_id,
            endpoint_id
        );
        let path = docker_path(
            endpoint_id,
            &format!("containers/{}/{}", path_segment(container_id)?, action.path()),
        );
        // Docker answers 204, or 304 when already in that state, with no body
        self.send_or_status(ApiRequest::post(path), action.done())
            .await
    }

    // Images

    pub async fn get_images(&self, endpoint_id: u64) -> Result<Value> {
        self.send_json(ApiRequest::get(docker_path(endpoint_id, "images/json")))
            .await
    }

    /// Ask the engine to pull `from_image:tag`
    ///
    /// Docker streams progress as concatenated JSON objects until the pull
    /// finishes; the stream is drained under [`PULL_TIMEOUT`] and discarded.
    pub async fn pull_image(&self, from_image: &str, tag: &str, endpoint_id: u64) -> Result<Value> {
        info!("Pulling image {}:{} on endpoint {}", from_image, tag, endpoint_id);
        let request = ApiRequest::post(docker_path(endpoint_id, "images/create"))
            .query("fromImage", from_image)
            .query("tag", tag)
            .timeout(PULL_TIMEOUT);
        self.send_for_status(request, "pull request sent").await
    }

    /// Remove an image; `image_id` may be a name with registry path segments
    pub async fn remove_image(&self, image_id: &str, endpoint_id: u64) -> Result<Value> {
        info!("Removing image {} on endpoint {}", image_id, endpoint_id);
        let path = docker_path(endpoint_id, &format!("images/{}", path_segments(image_id)?));
        self.send_or_status(ApiRequest::delete(path), "deleted").await
    }

    // Volumes

    /// List volumes, unwrapped from Docker's `{"Volumes": [...]}` envelope
    pub async fn get_volumes(&self, endpoint_id: u64) -> Result<Value> {
        let response = self
            .send_json(ApiRequest::get(docker_path(endpoint_id, "volumes")))
            .await?;
        Ok(match response {
            Value::Object(mut map) => match map.remove("Volumes") {
                Some(Value::Null) | None => json!([]),
                Some(volumes) => volumes,
            },
            _ => json!([]),
        })
    }

    pub async fn create_volume(&self, name: &str, driver: &str, endpoint_id: u64) -> Result<Value> {
        info!("Creating volume {} ({}) on endpoint {}", name, driver, endpoint_id);
        let request = ApiRequest::post(docker_path(endpoint_id, "volumes/create"))
            .json(json!({ "Name": name, "Driver": driver }));
        self.send_json(request).await
    }

    pub async fn remove_volume(&self, volume_id: &str, endpoint_id: u64) -> Result<Value> {
        info!("Removing volume {} on endpoint {}", volume_id, endpoint_id);
        let path = docker_path(endpoint_id, &format!("volumes/{}", path_segment(volume_id)?));
        self.send_for_status(ApiRequest::delete(path), "deleted").await
    }

    // Networks

    pub async fn get_networks(&self, endpoint_id: u64) -> Result<Value> {
        self.send_json(ApiRequest::get(docker_path(endpoint_id, "networks")))
            .await
    }

    pub async fn create_network(&self, name: &str, driver: &str, endpoint_id: u64) -> Result<Value> {
        info!("Creating network {} ({}) on endpoint {}", name, driver, endpoint_id);
        let request = ApiRequest::post(docker_path(endpoint_id, "networks/create"))
            .json(json!({ "Name": name, "Driver": driver }));
        self.send_json(request).await
    }

    pub async fn remove_network(&self, network_id: &str, endpoint_id: u64) -> Result<Value> {
        info!("Removing network {} on endpoint {}", network_id, endpoint_id);
        let path = docker_path(endpoint_id, &format!("networks/{}", path_segment(network_id)?));
        self.send_for_status(ApiRequest::delete(path), "deleted").await
    }
}
