//! Route registration with a navigable metadata registry.
//!
//! Controllers, middlewares and validations are registered by name, routes
//! are declared inside nested groups, and every registration is mirrored
//! into a registry that can be snapshotted or projected into a graph.

// Registration core
pub mod registry;
pub mod routing;

// Views over the registry
pub mod devtool;
pub mod graph;

// Serving
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;

pub mod demo;

pub use config::schema::AppConfig;
pub use graph::Graph;
pub use http::{AxumDispatcher, HttpServer};
pub use lifecycle::Shutdown;
pub use registry::{GroupOptions, Manifest, RegistrationContext, RegistryError, RegistrySnapshot};
pub use routing::{Handler, Next, RouteMethod};
