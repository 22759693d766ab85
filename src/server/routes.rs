//! Route handlers
//!
//! Each handler unpacks its request and calls exactly one client operation.

use axum::{
    extract::{Multipart, Path, Query, State},
    Json,
};
use serde_json::Value;

use super::error::ApiError;
use super::types::*;
use super::AppState;
use crate::portainer::status_object;

type ApiResult = Result<Json<Value>, ApiError>;

pub async fn health() -> Json<Value> {
    Json(status_object("ok"))
}

// Stacks

pub async fn get_stacks(State(state): State<AppState>, Query(q): Query<StackListQuery>) -> ApiResult {
    Ok(Json(state.client.get_stacks(q.endpoint_id).await?))
}

pub async fn get_stack(State(state): State<AppState>, Path(stack_id): Path<u64>) -> ApiResult {
    Ok(Json(state.client.get_stack(stack_id).await?))
}

pub async fn get_stack_file(State(state): State<AppState>, Path(stack_id): Path<u64>) -> ApiResult {
    Ok(Json(state.client.get_stack_file(stack_id).await?))
}

pub async fn create_stack_from_string(
    State(state): State<AppState>,
    Query(q): Query<StackCreateQuery>,
    Json(body): Json<StackFileBody>,
) -> ApiResult {
    let created = state
        .client
        .create_stack_from_string(&q.name, &body.stack_file_content, q.endpoint_id)
        .await?;
    Ok(Json(created))
}

/// Multipart form with `name`, optional `endpoint_id` and the `file` itself
pub async fn create_stack_from_file(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ApiResult {
    let mut name = None;
    let mut endpoint_id = DEFAULT_ENDPOINT_ID;
    let mut file = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::unprocessable(e.to_string()))?
    {
        match field.name() {
            Some("name") => {
                name = Some(
                    field
                        .text()
                        .await
                        .map_err(|e| ApiError::unprocessable(e.to_string()))?,
                );
            }
            Some("endpoint_id") => {
                let raw = field
                    .text()
                    .await
                    .map_err(|e| ApiError::unprocessable(e.to_string()))?;
                endpoint_id = raw.trim().parse().map_err(|_| {
                    ApiError::unprocessable(format!("endpoint_id must be an integer, got '{raw}'"))
                })?;
            }
            Some("file") => {
                file = Some(
                    field
                        .bytes()
                        .await
                        .map_err(|e| ApiError::unprocessable(e.to_string()))?,
                );
            }
            _ => {}
        }
    }

    let name = name.ok_or_else(|| ApiError::unprocessable("missing form field 'name'"))?;
    let file = file.ok_or_else(|| ApiError::unprocessable("missing form field 'file'"))?;

    let created = state
        .client
        .create_stack_from_file(&name, &file, endpoint_id)
        .await?;
    Ok(Json(created))
}

pub async fn create_stack_from_repository(
    State(state): State<AppState>,
    Json(request): Json<RepositoryStackRequest>,
) -> ApiResult {
    let (stack, endpoint_id) = request.into_parts();
    Ok(Json(
        state
            .client
            .create_stack_from_repository(&stack, endpoint_id)
            .await?,
    ))
}

pub async fn update_stack(
    State(state): State<AppState>,
    Path(stack_id): Path<u64>,
    Query(q): Query<EndpointQuery>,
    Json(body): Json<StackFileBody>,
) -> ApiResult {
    let updated = state
        .client
        .update_stack(stack_id, &body.stack_file_content, q.endpoint_id)
        .await?;
    Ok(Json(updated))
}

pub async fn delete_stack(
    State(state): State<AppState>,
    Path(stack_id): Path<u64>,
    Query(q): Query<EndpointQuery>,
) -> ApiResult {
    Ok(Json(state.client.delete_stack(stack_id, q.endpoint_id).await?))
}

pub async fn get_endpoints(State(state): State<AppState>) -> ApiResult {
    Ok(Json(state.client.get_endpoints().await?))
}

// Containers

pub async fn get_containers(State(state): State<AppState>, Query(q): Query<EndpointQuery>) -> ApiResult {
    Ok(Json(state.client.get_containers(q.endpoint_id).await?))
}

pub async fn start_container(
    State(state): State<AppState>,
    Path(container_id): Path<String>,
    Query(q): Query<EndpointQuery>,
) -> ApiResult {
    Ok(Json(
        state.client.start_container(&container_id, q.endpoint_id).await?,
    ))
}

pub async fn stop_container(
    State(state): State<AppState>,
    Path(container_id): Path<String>,
    Query(q): Query<EndpointQuery>,
) -> ApiResult {
    Ok(Json(
        state.client.stop_container(&container_id, q.endpoint_id).await?,
    ))
}

pub async fn restart_container(
    State(state): State<AppState>,
    Path(container_id): Path<String>,
    Query(q): Query<EndpointQuery>,
) -> ApiResult {
    Ok(Json(
        state.client.restart_container(&container_id, q.endpoint_id).await?,
    ))
}

// Images

pub async fn get_images(State(state): State<AppState>, Query(q): Query<EndpointQuery>) -> ApiResult {
    Ok(Json(state.client.get_images(q.endpoint_id).await?))
}

/// `POST /api/v1/images/pull`; shares the wildcard route with image removal
pub async fn pull_image(
    State(state): State<AppState>,
    Path(action): Path<String>,
    Query(q): Query<PullImageQuery>,
) -> ApiResult {
    if action != "pull" {
        return Err(ApiError::not_found(format!("No image action '{action}'")));
    }
    Ok(Json(
        state
            .client
            .pull_image(&q.from_image, &q.tag, q.endpoint_id)
            .await?,
    ))
}

/// `DELETE /api/v1/images/{image_id}`; the id may contain `/`
pub async fn remove_image(
    State(state): State<AppState>,
    Path(image_id): Path<String>,
    Query(q): Query<EndpointQuery>,
) -> ApiResult {
    Ok(Json(state.client.remove_image(&image_id, q.endpoint_id).await?))
}

// Volumes

pub async fn get_volumes(State(state): State<AppState>, Query(q): Query<EndpointQuery>) -> ApiResult {
    Ok(Json(state.client.get_volumes(q.endpoint_id).await?))
}

pub async fn create_volume(
    State(state): State<AppState>,
    Query(q): Query<VolumeCreateQuery>,
) -> ApiResult {
    Ok(Json(
        state
            .client
            .create_volume(&q.name, &q.driver, q.endpoint_id)
            .await?,
    ))
}

pub async fn remove_volume(
    State(state): State<AppState>,
    Path(volume_id): Path<String>,
    Query(q): Query<EndpointQuery>,
) -> ApiResult {
    Ok(Json(state.client.remove_volume(&volume_id, q.endpoint_id).await?))
}

// Networks

pub async fn get_networks(State(state): State<AppState>, Query(q): Query<EndpointQuery>) -> ApiResult {
    Ok(Json(state.client.get_networks(q.endpoint_id).await?))
}

pub async fn create_network(
    State(state): State<AppState>,
    Query(q): Query<NetworkCreateQuery>,
) -> ApiResult {
    Ok(Json(
        state
            .client
            .create_network(&q.name, &q.driver, q.endpoint_id)
            .await?,
    ))
}

pub async fn remove_network(
    State(state): State<AppState>,
    Path(network_id): Path<String>,
    Query(q): Query<EndpointQuery>,
) -> ApiResult {
    Ok(Json(
        state.client.remove_network(&network_id, q.endpoint_id).await?,
    ))
}

// Users & teams

pub async fn get_users(State(state): State<AppState>) -> ApiResult {
    Ok(Json(state.client.get_users().await?))
}

pub async fn create_user(State(state): State<AppState>, Json(user): Json<UserCreate>) -> ApiResult {
    Ok(Json(
        state
            .client
            .create_user(&user.username, &user.password, user.role)
            .await?,
    ))
}

pub async fn delete_user(State(state): State<AppState>, Path(user_id): Path<u64>) -> ApiResult {
    Ok(Json(state.client.delete_user(user_id).await?))
}

pub async fn get_teams(State(state): State<AppState>) -> ApiResult {
    Ok(Json(state.client.get_teams().await?))
}

pub async fn create_team(State(state): State<AppState>, Json(team): Json<TeamCreate>) -> ApiResult {
    Ok(Json(state.client.create_team(&team.name).await?))
}

pub async fn delete_team(State(state): State<AppState>, Path(team_id): Path<u64>) -> ApiResult {
    Ok(Json(state.client.delete_team(team_id).await?))
}

pub async fn get_team_members(State(state): State<AppState>, Path(team_id): Path<u64>) -> ApiResult {
    Ok(Json(state.client.get_team_memberships(team_id).await?))
}

pub async fn add_user_to_team(
    State(state): State<AppState>,
    Path(team_id): Path<u64>,
    Json(membership): Json<MembershipCreate>,
) -> ApiResult {
    Ok(Json(
        state
            .client
            .add_user_to_team(team_id, membership.user_id, membership.role)
            .await?,
    ))
}

pub async fn remove_user_from_team(
    State(state): State<AppState>,
    Path((team_id, user_id)): Path<(u64, u64)>,
) -> ApiResult {
    Ok(Json(
        state.client.remove_user_from_team(team_id, user_id).await?,
    ))
}

// Kubernetes

pub async fn get_kubernetes_nodes(
    State(state): State<AppState>,
    Path(endpoint_id): Path<u64>,
) -> ApiResult {
    Ok(Json(state.client.get_kubernetes_nodes(endpoint_id).await?))
}

pub async fn get_kubernetes_namespaces(
    State(state): State<AppState>,
    Path(endpoint_id): Path<u64>,
) -> ApiResult {
    Ok(Json(state.client.get_kubernetes_namespaces(endpoint_id).await?))
}

pub async fn get_kubernetes_pods(
    State(state): State<AppState>,
    Path(endpoint_id): Path<u64>,
    Query(q): Query<NamespaceQuery>,
) -> ApiResult {
    Ok(Json(
        state
            .client
            .get_kubernetes_pods(endpoint_id, q.namespace.as_deref())
            .await?,
    ))
}

pub async fn get_kubernetes_deployments(
    State(state): State<AppState>,
    Path(endpoint_id): Path<u64>,
    Query(q): Query<NamespaceQuery>,
) -> ApiResult {
    Ok(Json(
        state
            .client
            .get_kubernetes_deployments(endpoint_id, q.namespace.as_deref())
            .await?,
    ))
}

pub async fn get_kubernetes_services(
    State(state): State<AppState>,
    Path(endpoint_id): Path<u64>,
    Query(q): Query<NamespaceQuery>,
) -> ApiResult {
    Ok(Json(
        state
            .client
            .get_kubernetes_services(endpoint_id, q.namespace.as_deref())
            .await?,
    ))
}

pub async fn get_kubernetes_applications(
    State(state): State<AppState>,
    Path(endpoint_id): Path<u64>,
) -> ApiResult {
    Ok(Json(
        state.client.get_kubernetes_applications(endpoint_id).await?,
    ))
}

pub async fn create_kubernetes_application(
    State(state): State<AppState>,
    Path(endpoint_id): Path<u64>,
    Json(app): Json<KubernetesAppCreate>,
) -> ApiResult {
    Ok(Json(
        state
            .client
            .create_kubernetes_application(&app.name, &app.manifest, endpoint_id)
            .await?,
    ))
}

pub async fn update_kubernetes_application(
    State(state): State<AppState>,
    Path((endpoint_id, app_id)): Path<(u64, u64)>,
    Json(app): Json<KubernetesAppUpdate>,
) -> ApiResult {
    Ok(Json(
        state
            .client
            .update_kubernetes_application(app_id, &app.manifest, endpoint_id)
            .await?,
    ))
}

pub async fn delete_kubernetes_application(
    State(state): State<AppState>,
    Path((endpoint_id, app_id)): Path<(u64, u64)>,
) -> ApiResult {
    Ok(Json(
        state
            .client
            .delete_kubernetes_application(app_id, endpoint_id)
            .await?,
    ))
}
