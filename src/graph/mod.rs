//! Graph projection for the route visualizer.
//!
//! # Data Flow
//! ```text
//! GroupTree + NamedStores
//!     → projector.rs (depth-first walk, children before next sibling)
//!     → layout.rs (fixed column per kind, row counter per column)
//!     → model.rs (Graph { nodes, edges }, serde-serializable)
//! ```
//!
//! # Design Decisions
//! - Node ids are `"<kind>:<natural key>"`, so an entity reached along
//!   several paths is one node with several incoming edges
//! - Rows advance only when a node is actually placed
//! - Edge ids are `"<source>-><target>"` and unique; routes sharing a full
//!   path across methods link once
//! - Orphan entries are appended after the walk, per store in
//!   registration order

pub mod layout;
pub mod model;
pub mod projector;

pub use model::{Edge, EdgeLabel, Graph, Node, NodeKind, Position};
pub use projector::{project, Stores};
