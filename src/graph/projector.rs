//! Tree → graph projection.

use std::collections::HashSet;

use serde_json::json;

use crate::graph::layout::Layout;
use crate::graph::model::{Edge, EdgeLabel, Graph, Node, NodeKind};
use crate::registry::store::NamedStore;
use crate::registry::tree::{Group, GroupTree};

/// The three named stores a projection reads.
#[derive(Clone, Copy)]
pub struct Stores<'a> {
    pub controllers: &'a NamedStore,
    pub middlewares: &'a NamedStore,
    pub validations: &'a NamedStore,
}

impl<'a> Stores<'a> {
    fn for_kind(&self, kind: NodeKind) -> Option<&'a NamedStore> {
        match kind {
            NodeKind::Controller => Some(self.controllers),
            NodeKind::Middleware => Some(self.middlewares),
            NodeKind::Validation => Some(self.validations),
            _ => None,
        }
    }
}

/// Project `tree` and `stores` into a graph.
///
/// Pure: allocates fresh output each call and never mutates its inputs.
/// Entries never reached from a group or route still get a node.
pub fn project(tree: &GroupTree, stores: &Stores<'_>) -> Graph {
    let mut builder = GraphBuilder::new(*stores);
    builder.walk(tree.roots(), None);

    for kind in [NodeKind::Controller, NodeKind::Middleware, NodeKind::Validation] {
        if let Some(store) = stores.for_kind(kind) {
            for name in store.names() {
                builder.entry_node(kind, name);
            }
        }
    }

    builder.graph
}

struct GraphBuilder<'a> {
    stores: Stores<'a>,
    graph: Graph,
    placed: HashSet<String>,
    linked: HashSet<String>,
    layout: Layout,
}

impl<'a> GraphBuilder<'a> {
    fn new(stores: Stores<'a>) -> Self {
        Self {
            stores,
            graph: Graph::default(),
            placed: HashSet::new(),
            linked: HashSet::new(),
            layout: Layout::new(),
        }
    }

    /// Place a node unless one with `id` already exists.
    fn add_node(&mut self, id: &str, kind: NodeKind, data: serde_json::Value) {
        if !self.placed.insert(id.to_string()) {
            return;
        }
        let position = self.layout.place(kind);
        self.graph.nodes.push(Node {
            id: id.to_string(),
            kind,
            data,
            position,
        });
    }

    /// Link `source` to `target` unless that edge id already exists.
    fn add_edge(&mut self, source: &str, target: &str, label: EdgeLabel) {
        let edge = Edge::new(source, target, label);
        if self.linked.insert(edge.id.clone()) {
            self.graph.edges.push(edge);
        }
    }

    /// Node for a named entry; returns its id.
    fn entry_node(&mut self, kind: NodeKind, name: &str) -> String {
        let id = kind.node_id(name);
        if self.placed.contains(&id) {
            return id;
        }

        let data = match self.stores.for_kind(kind).and_then(|store| store.get(name)) {
            Some(entry) => json!({
                "name": entry.name,
                "description": entry.meta.description,
                "isGlobal": entry.is_global,
                "expectedQuery": entry.meta.expected_query,
                "expectedParams": entry.meta.expected_params,
                "usedIn": entry.used_in,
            }),
            None => json!({ "name": name }),
        };
        self.add_node(&id, kind, data);
        id
    }

    fn walk(&mut self, groups: &[Group], parent: Option<&str>) {
        for group in groups {
            let kind = if parent.is_some() {
                NodeKind::Subgroup
            } else {
                NodeKind::Group
            };
            let group_id = kind.node_id(&group.base_path);
            self.add_node(
                &group_id,
                kind,
                json!({
                    "basePath": group.base_path,
                    "description": group.description,
                    "params": group.params,
                    "expectedQuery": group.expected_query,
                }),
            );
            if let Some(parent) = parent {
                self.add_edge(parent, &group_id, EdgeLabel::ChildGroup);
            }

            for name in &group.middlewares {
                let id = self.entry_node(NodeKind::Middleware, name);
                self.add_edge(&group_id, &id, EdgeLabel::Uses);
            }
            for name in &group.validations {
                let id = self.entry_node(NodeKind::Validation, name);
                self.add_edge(&group_id, &id, EdgeLabel::Validates);
            }

            for route in &group.routes {
                let route_id = NodeKind::Route.node_id(&route.full_path);
                self.add_node(
                    &route_id,
                    NodeKind::Route,
                    json!({
                        "method": route.method,
                        "path": route.path,
                        "fullPath": route.full_path,
                    }),
                );
                self.add_edge(&group_id, &route_id, EdgeLabel::Contains);

                for controller in &route.controllers {
                    let id = self.entry_node(NodeKind::Controller, &controller.name);
                    self.add_edge(&route_id, &id, EdgeLabel::Calls);
                }
                for name in &route.middlewares {
                    let id = self.entry_node(NodeKind::Middleware, name);
                    self.add_edge(&route_id, &id, EdgeLabel::Uses);
                }
                for name in &route.validations {
                    let id = self.entry_node(NodeKind::Validation, name);
                    self.add_edge(&route_id, &id, EdgeLabel::Validates);
                }
            }

            self.walk(&group.children, Some(&group_id));
        }
    }
}
