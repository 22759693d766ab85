//! HTTP facade
//!
//! Re-exposes the Portainer client under simplified `/api/v1` routes.

mod error;
mod routes;
mod types;

use anyhow::{Context, Result};
use axum::{
    routing::{delete, get, post, put},
    Router,
};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::AppConfig;
use crate::portainer::PortainerClient;

/// Shared handler state; the client is immutable and cheap to clone
#[derive(Clone)]
pub struct AppState {
    pub(crate) client: PortainerClient,
}

impl AppState {
    pub fn new(client: PortainerClient) -> Self {
        Self { client }
    }
}

/// Build the facade router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/v1/health", get(routes::health))
        // Stacks
        .route("/api/v1/stacks", get(routes::get_stacks))
        .route("/api/v1/stacks/string", post(routes::create_stack_from_string))
        .route("/api/v1/stacks/file", post(routes::create_stack_from_file))
        .route(
            "/api/v1/stacks/repository",
            post(routes::create_stack_from_repository),
        )
        .route(
            "/api/v1/stacks/:stack_id",
            get(routes::get_stack)
                .put(routes::update_stack)
                .delete(routes::delete_stack),
        )
        .route("/api/v1/stacks/:stack_id/file", get(routes::get_stack_file))
        .route("/api/v1/endpoints", get(routes::get_endpoints))
        // Containers
        .route("/api/v1/containers", get(routes::get_containers))
        .route(
            "/api/v1/containers/:container_id/start",
            post(routes::start_container),
        )
        .route(
            "/api/v1/containers/:container_id/stop",
            post(routes::stop_container),
        )
        .route(
            "/api/v1/containers/:container_id/restart",
            post(routes::restart_container),
        )
        // Images
        .route("/api/v1/images", get(routes::get_images))
        .route(
            "/api/v1/images/*image_id",
            post(routes::pull_image).delete(routes::remove_image),
        )
        // Volumes
        .route(
            "/api/v1/volumes",
            get(routes::get_volumes).post(routes::create_volume),
        )
        .route(
            "/api/v1/volumes/:volume_id",
            delete(routes::remove_volume),
        )
        // Networks
        .route(
            "/api/v1/networks",
            get(routes::get_networks).post(routes::create_network),
        )
        .route(
            "/api/v1/networks/:network_id",
            delete(routes::remove_network),
        )
        // Users & teams
        .route(
            "/api/v1/users",
            get(routes::get_users).post(routes::create_user),
        )
        .route(
            "/api/v1/users/:user_id",
            delete(routes::delete_user),
        )
        .route(
            "/api/v1/teams",
            get(routes::get_teams).post(routes::create_team),
        )
        .route(
            "/api/v1/teams/:team_id",
            delete(routes::delete_team),
        )
        .route(
            "/api/v1/teams/:team_id/members",
            get(routes::get_team_members).post(routes::add_user_to_team),
        )
        .route(
            "/api/v1/teams/:team_id/members/:user_id",
            delete(routes::remove_user_from_team),
        )
        // Kubernetes
        .route(
            "/api/v1/kubernetes/:endpoint_id/nodes",
            get(routes::get_kubernetes_nodes),
        )
        .route(
            "/api/v1/kubernetes/:endpoint_id/namespaces",
            get(routes::get_kubernetes_namespaces),
        )
        .route(
            "/api/v1/kubernetes/:endpoint_id/pods",
            get(routes::get_kubernetes_pods),
        )
        .route(
            "/api/v1/kubernetes/:endpoint_id/deployments",
            get(routes::get_kubernetes_deployments),
        )
        .route(
            "/api/v1/kubernetes/:endpoint_id/services",
            get(routes::get_kubernetes_services),
        )
        .route(
            "/api/v1/kubernetes/:endpoint_id/apps",
            get(routes::get_kubernetes_applications).post(routes::create_kubernetes_application),
        )
        .route(
            "/api/v1/kubernetes/:endpoint_id/apps/:app_id",
            put(routes::update_kubernetes_application)
                .delete(routes::delete_kubernetes_application),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind the listen address and serve until Ctrl-C
pub async fn serve(config: &AppConfig) -> Result<()> {
    let client = PortainerClient::new(config.client_settings())
        .context("Failed to create Portainer client")?;
    let app = router(AppState::new(client));

    let listener = tokio::net::TcpListener::bind(&config.listen)
        .await
        .with_context(|| format!("Unable to bind {}", config.listen))?;
    info!(
        "Listening on http://{} (upstream {})",
        listener.local_addr()?,
        config.portainer_url
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;

    info!("Shutdown");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Unable to listen for shutdown signal: {}", e);
        // Without a signal handler, keep serving
        std::future::pending::<()>().await;
    }
}
