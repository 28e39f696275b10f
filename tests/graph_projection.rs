//! Graph projection over registered trees.

use routegraph::graph::layout::{lane_x, ROW_SPACING};
use routegraph::graph::{EdgeLabel, NodeKind};
use routegraph::registry::{EntryMeta, GroupOptions, RegistrationContext};
use routegraph::routing::RecordingDispatcher;

mod common;

use common::{ok, seeded_context};

fn ping_only() -> RegistrationContext<RecordingDispatcher> {
    let mut ctx = RegistrationContext::new(RecordingDispatcher::new());
    ctx.define_controller("ping", vec![ok("pong")], EntryMeta::new()).unwrap();
    let ping = ctx.controller("ping").unwrap();
    ctx.group("/api", GroupOptions::new(), |api| api.get("/ping", ping))
        .unwrap();
    ctx
}

#[test]
fn test_single_route_graph_is_exact() {
    let graph = ping_only().graph();

    let ids: Vec<&str> = graph.nodes.iter().map(|n| n.id.as_str()).collect();
    assert_eq!(ids, vec!["group:/api", "route:/api/ping", "controller:ping"]);
    assert_eq!(graph.node("group:/api").unwrap().kind, NodeKind::Group);
    assert_eq!(graph.node("route:/api/ping").unwrap().kind, NodeKind::Route);

    let edges: Vec<(&str, &str, EdgeLabel)> = graph
        .edges
        .iter()
        .map(|e| (e.source.as_str(), e.target.as_str(), e.label))
        .collect();
    assert_eq!(
        edges,
        vec![
            ("group:/api", "route:/api/ping", EdgeLabel::Contains),
            ("route:/api/ping", "controller:ping", EdgeLabel::Calls),
        ]
    );
}

#[test]
fn test_projection_is_deterministic() {
    let ctx = ping_only();
    assert_eq!(ctx.graph(), ctx.graph());
    assert_eq!(
        serde_json::to_string(&ctx.graph()).unwrap(),
        serde_json::to_string(&ctx.graph()).unwrap()
    );
}

#[test]
fn test_unattached_controller_is_single_orphan() {
    let mut ctx = ping_only();
    ctx.define_controller("unused", vec![ok("x")], EntryMeta::new()).unwrap();

    let graph = ctx.graph();
    let orphans: Vec<_> = graph.nodes.iter().filter(|n| n.id == "controller:unused").collect();
    assert_eq!(orphans.len(), 1);
    assert_eq!(graph.incoming("controller:unused").count(), 0);
    assert_eq!(orphans[0].data["name"], "unused");
}

#[test]
fn test_shared_middleware_is_one_node_many_edges() {
    let mut ctx = seeded_context(RecordingDispatcher::new());
    let auth = ctx.middleware("auth").unwrap();
    let lang = ctx.validation("requireLang").unwrap();

    ctx.group("/api", GroupOptions::new(), |api| {
        api.group(
            "/user",
            GroupOptions::new().middlewares(auth.clone()).validations(lang),
            |_| Ok(()),
        )?;
        api.group("/admin", GroupOptions::new().middlewares(auth), |_| Ok(()))
    })
    .unwrap();

    let graph = ctx.graph();
    let auth_nodes = graph
        .nodes_of(NodeKind::Middleware)
        .filter(|n| n.id == "middleware:auth")
        .count();
    assert_eq!(auth_nodes, 1);
    let uses: Vec<&str> = graph
        .incoming("middleware:auth")
        .map(|e| e.source.as_str())
        .collect();
    assert_eq!(uses, vec!["group:/api/user", "group:/api/admin"]);

    let child_edges: Vec<_> = graph
        .edges
        .iter()
        .filter(|e| e.label == EdgeLabel::ChildGroup)
        .map(|e| e.target.as_str())
        .collect();
    assert_eq!(child_edges, vec!["group:/api/user", "group:/api/admin"]);
    assert_eq!(graph.node("group:/api/user").unwrap().kind, NodeKind::Subgroup);
    assert!(graph.edges.iter().any(|e| {
        e.source == "group:/api/user"
            && e.target == "validation:requireLang"
            && e.label == EdgeLabel::Validates
    }));
}

#[test]
fn test_methods_sharing_a_path_link_once() {
    let mut ctx = RegistrationContext::new(RecordingDispatcher::new());
    ctx.define_controller("item", vec![ok("item")], EntryMeta::new()).unwrap();
    let item = ctx.controller("item").unwrap();
    ctx.group("/api", GroupOptions::new(), |api| {
        api.get("/x", item.clone())?;
        api.post("/x", item)
    })
    .unwrap();

    let graph = ctx.graph();
    let ids: Vec<&str> = graph.edges.iter().map(|e| e.id.as_str()).collect();
    assert_eq!(ids, vec!["group:/api->route:/api/x", "route:/api/x->controller:item"]);
    assert_eq!(graph.nodes_of(NodeKind::Route).count(), 1);
}

#[test]
fn test_layout_uses_lanes_and_rows() {
    let mut ctx = ping_only();
    let ping = ctx.controller("ping").unwrap();
    ctx.group("/status", GroupOptions::new(), |s| s.get("/ping", ping))
        .unwrap();

    let graph = ctx.graph();
    let api = graph.node("group:/api").unwrap();
    let status = graph.node("group:/status").unwrap();
    assert_eq!(api.position.x, lane_x(NodeKind::Group));
    assert_eq!(status.position.y - api.position.y, ROW_SPACING);

    // The second route reuses `controller:ping`, so the controller lane holds one row.
    let controller = graph.node("controller:ping").unwrap();
    assert_eq!(controller.position.x, lane_x(NodeKind::Controller));
    assert_eq!(graph.nodes_of(NodeKind::Controller).count(), 1);
    assert_eq!(graph.incoming("controller:ping").count(), 2);
}

#[test]
fn test_edge_serialization_shape() {
    let graph = ping_only().graph();
    let doc = serde_json::to_value(&graph).unwrap();
    assert_eq!(doc["nodes"][0]["type"], "group");
    assert_eq!(doc["edges"][0]["id"], "group:/api->route:/api/ping");
    assert_eq!(doc["edges"][0]["label"], "contains");
    assert_eq!(doc["edges"][1]["label"], "calls");
}
