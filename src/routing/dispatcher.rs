//! The seam between registration and the HTTP dispatcher.
//!
//! Registration only ever needs two operations from the host router:
//! "register this chain for method + path" and "register this chain in
//! front of everything under a path". Anything that can do both can back a
//! [`RegistrationContext`](crate::registry::RegistrationContext).

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::routing::handler::Handler;

/// HTTP methods a route can be registered under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RouteMethod {
    Get,
    Post,
    Put,
    Delete,
    Patch,
    /// Every method.
    All,
}

impl RouteMethod {
    /// Concrete methods, in the order routers are built.
    pub const CONCRETE: [RouteMethod; 5] = [
        RouteMethod::Get,
        RouteMethod::Post,
        RouteMethod::Put,
        RouteMethod::Delete,
        RouteMethod::Patch,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RouteMethod::Get => "GET",
            RouteMethod::Post => "POST",
            RouteMethod::Put => "PUT",
            RouteMethod::Delete => "DELETE",
            RouteMethod::Patch => "PATCH",
            RouteMethod::All => "ALL",
        }
    }

    /// Whether a registration under `self` applies to `method`.
    pub fn covers(&self, method: RouteMethod) -> bool {
        *self == RouteMethod::All || *self == method
    }
}

impl fmt::Display for RouteMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Host router contract.
pub trait Dispatcher {
    /// Register an ordered chain for `method` at `full_path`.
    fn register_handlers(&mut self, method: RouteMethod, full_path: &str, chain: Vec<Handler>);

    /// Register an ordered chain that runs ahead of every route under `full_path`.
    fn register_group_middleware(&mut self, full_path: &str, chain: Vec<Handler>);
}

/// One call made against a [`RecordingDispatcher`].
#[derive(Debug, Clone)]
pub enum DispatchCall {
    Route {
        method: RouteMethod,
        path: String,
        chain: Vec<Handler>,
    },
    GroupMiddleware {
        path: String,
        chain: Vec<Handler>,
    },
}

/// Dispatcher that only records what it was asked to register.
#[derive(Debug, Default)]
pub struct RecordingDispatcher {
    calls: Vec<DispatchCall>,
}

impl RecordingDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> &[DispatchCall] {
        &self.calls
    }

    /// `(method, path, chain length)` for every route call, in order.
    pub fn routes(&self) -> Vec<(RouteMethod, &str, usize)> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                DispatchCall::Route { method, path, chain } => {
                    Some((*method, path.as_str(), chain.len()))
                }
                DispatchCall::GroupMiddleware { .. } => None,
            })
            .collect()
    }
}

impl Dispatcher for RecordingDispatcher {
    fn register_handlers(&mut self, method: RouteMethod, full_path: &str, chain: Vec<Handler>) {
        self.calls.push(DispatchCall::Route {
            method,
            path: full_path.to_string(),
            chain,
        });
    }

    fn register_group_middleware(&mut self, full_path: &str, chain: Vec<Handler>) {
        self.calls.push(DispatchCall::GroupMiddleware {
            path: full_path.to_string(),
            chain,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_coverage() {
        assert!(RouteMethod::All.covers(RouteMethod::Patch));
        assert!(RouteMethod::Get.covers(RouteMethod::Get));
        assert!(!RouteMethod::Get.covers(RouteMethod::Post));
        assert_eq!(
            serde_json::to_string(&RouteMethod::Delete).unwrap(),
            "\"DELETE\""
        );
    }
}
