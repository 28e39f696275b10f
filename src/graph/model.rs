//! Graph snapshot types.

use std::fmt;

use serde::Serialize;

/// Node categories understood by the visualizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Group,
    Subgroup,
    Route,
    Controller,
    Middleware,
    Validation,
}

impl NodeKind {
    /// Prefix of the node id. Nested groups share the `group` namespace.
    pub fn key_prefix(&self) -> &'static str {
        match self {
            NodeKind::Group | NodeKind::Subgroup => "group",
            NodeKind::Route => "route",
            NodeKind::Controller => "controller",
            NodeKind::Middleware => "middleware",
            NodeKind::Validation => "validation",
        }
    }

    /// Deterministic node id for `natural_key`.
    pub fn node_id(&self, natural_key: &str) -> String {
        format!("{}:{}", self.key_prefix(), natural_key)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Position {
    pub x: i64,
    pub y: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Node {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: NodeKind,
    pub data: serde_json::Value,
    pub position: Position,
}

/// Relationship carried by an edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EdgeLabel {
    ChildGroup,
    Uses,
    Validates,
    Contains,
    Calls,
}

impl EdgeLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            EdgeLabel::ChildGroup => "child group",
            EdgeLabel::Uses => "uses",
            EdgeLabel::Validates => "validates",
            EdgeLabel::Contains => "contains",
            EdgeLabel::Calls => "calls",
        }
    }

    /// Stroke color suggested to the renderer.
    pub fn style_hint(&self) -> &'static str {
        match self {
            EdgeLabel::ChildGroup => "#6c757d",
            EdgeLabel::Uses => "#fd7e14",
            EdgeLabel::Validates => "#198754",
            EdgeLabel::Contains => "#007bff",
            EdgeLabel::Calls => "#d63384",
        }
    }
}

impl fmt::Display for EdgeLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for EdgeLabel {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Edge {
    pub id: String,
    pub source: String,
    pub target: String,
    pub label: EdgeLabel,
    pub style_hint: &'static str,
}

impl Edge {
    pub fn new(source: &str, target: &str, label: EdgeLabel) -> Self {
        Self {
            id: format!("{source}->{target}"),
            source: source.to_string(),
            target: target.to_string(),
            label,
            style_hint: label.style_hint(),
        }
    }
}

/// Node/edge projection of a registry.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Graph {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
}

impl Graph {
    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|node| node.id == id)
    }

    pub fn nodes_of(&self, kind: NodeKind) -> impl Iterator<Item = &Node> {
        self.nodes.iter().filter(move |node| node.kind == kind)
    }

    /// Edges pointing at `id`.
    pub fn incoming<'a>(&'a self, id: &'a str) -> impl Iterator<Item = &'a Edge> {
        self.edges.iter().filter(move |edge| edge.target == id)
    }
}
