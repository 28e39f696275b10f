//! Registry devtool endpoints.
//!
//! Serves the registry snapshot, its graph projection and a text outline
//! to the visualizer. Mounted only in development mode.

pub mod auth;
pub mod handlers;

use std::sync::Arc;

use axum::{middleware, routing::get, Router};

use crate::graph::Graph;
use crate::registry::RegistrySnapshot;
use self::auth::devtool_auth_middleware;
use self::handlers::*;

/// Shared devtool state. Registration is finished before it is built.
#[derive(Clone)]
pub struct DevtoolState {
    pub snapshot: Arc<RegistrySnapshot>,
    pub graph: Arc<Graph>,
    pub api_key: Option<String>,
}

impl DevtoolState {
    pub fn new(snapshot: RegistrySnapshot, graph: Graph, api_key: Option<String>) -> Self {
        Self {
            snapshot: Arc::new(snapshot),
            graph: Arc::new(graph),
            api_key,
        }
    }
}

/// Devtool routes under `prefix`.
pub fn setup_devtool_router(state: DevtoolState, prefix: &str) -> Router {
    let prefix = prefix.trim_end_matches('/');
    Router::new()
        .route(&format!("{prefix}/status"), get(get_status))
        .route(&format!("{prefix}/registry"), get(get_registry))
        .route(&format!("{prefix}/graph"), get(get_graph))
        .route(&format!("{prefix}/outline"), get(get_outline))
        .layer(middleware::from_fn_with_state(state.clone(), devtool_auth_middleware))
        .with_state(state)
}
