use std::collections::BTreeMap;
use std::sync::Arc;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use shared::protocol::{
    CACHE_STATS_PATH, CHANGES_PATH, DEFAULT_NAMESPACE, DISCOVER_PATH, HEALTH_PATH, METRICS_PATH,
    SERVERS_PATH,
};
use shared::types::{DiscoverQuery, ServiceNode};
use crate::registry::{CacheStats, ChangeLog, FixtureRegistry, NodeHealth, RegistryMetrics};

#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<FixtureRegistry>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthQuery {
    pub service_name: String,
    pub namespace: Option<String>,
}

#[derive(Deserialize)]
pub struct ChangesQuery {
    #[serde(default)]
    pub since: i64,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route(DISCOVER_PATH, get(discover))
        .route(SERVERS_PATH, get(servers))
        .route(HEALTH_PATH, get(health))
        .route(METRICS_PATH, get(metrics))
        .route(CACHE_STATS_PATH, get(cache_stats))
        .route(CHANGES_PATH, get(changes))
        .with_state(state)
}

async fn discover(
    State(state): State<AppState>,
    Query(query): Query<DiscoverQuery>,
) -> Result<Json<ServiceNode>, StatusCode> {
    state.registry.lookup(&query).map(Json).ok_or_else(|| {
        tracing::debug!("No node for {}", query.service_name);
        StatusCode::NOT_FOUND
    })
}

async fn servers(State(state): State<AppState>) -> Json<BTreeMap<String, Vec<ServiceNode>>> {
    Json(state.registry.services())
}

async fn health(
    State(state): State<AppState>,
    Query(params): Query<HealthQuery>,
) -> Result<Json<BTreeMap<String, NodeHealth>>, StatusCode> {
    let namespace = params.namespace.as_deref().unwrap_or(DEFAULT_NAMESPACE);
    state
        .registry
        .health(&params.service_name, namespace)
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}

async fn metrics(State(state): State<AppState>) -> Json<RegistryMetrics> {
    Json(state.registry.metrics())
}

async fn cache_stats(State(state): State<AppState>) -> Json<CacheStats> {
    Json(state.registry.cache_stats())
}

async fn changes(
    State(state): State<AppState>,
    Query(params): Query<ChangesQuery>,
) -> Json<ChangeLog> {
    Json(state.registry.changes_since(params.since))
}
