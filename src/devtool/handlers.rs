use axum::{extract::State, Json};
use serde::Serialize;

use crate::devtool::DevtoolState;
use crate::graph::Graph;
use crate::registry::RegistrySnapshot;

#[derive(Serialize)]
pub struct DevtoolStatus {
    pub version: &'static str,
    pub status: &'static str,
    pub groups: usize,
    pub routes: usize,
    pub controllers: usize,
    pub middlewares: usize,
    pub validations: usize,
}

pub async fn get_status(State(state): State<DevtoolState>) -> Json<DevtoolStatus> {
    let snapshot = &state.snapshot;
    Json(DevtoolStatus {
        version: env!("CARGO_PKG_VERSION"),
        status: "operational",
        groups: snapshot.roots.len(),
        routes: snapshot.route_count(),
        controllers: snapshot.controllers.len(),
        middlewares: snapshot.middlewares.len(),
        validations: snapshot.validations.len(),
    })
}

pub async fn get_registry(State(state): State<DevtoolState>) -> Json<RegistrySnapshot> {
    Json(state.snapshot.as_ref().clone())
}

pub async fn get_graph(State(state): State<DevtoolState>) -> Json<Graph> {
    Json(state.graph.as_ref().clone())
}

pub async fn get_outline(State(state): State<DevtoolState>) -> String {
    state.snapshot.outline()
}
