//! Axum-backed dispatcher.
//!
//! # Responsibilities
//! - Record route chains and group middleware chains during registration
//! - Build an `axum::Router` with one composed chain per method + path
//!
//! # Design Decisions
//! - A route's effective chain is: global chain, then every group chain
//!   registered before it whose prefix covers its path, then its own chain
//! - Repeated registrations of one method + path run back to back
//! - `ALL` joins every concrete method and doubles as the method fallback
//! - Parameter names that clash at one position are an error, not a panic

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    body::Body,
    http::Request,
    routing::{on, MethodFilter, MethodRouter},
    Router,
};

use crate::registry::RegistryError;
use crate::routing::path::has_prefix;
use crate::routing::{Dispatcher, Handler, Next, RouteMethod};

#[derive(Debug)]
struct RouteEntry {
    method: RouteMethod,
    path: String,
    /// Group chains that applied when the route was registered, then the route chain.
    chain: Vec<Handler>,
}

/// Dispatcher that accumulates registrations for an axum router.
#[derive(Debug, Default)]
pub struct AxumDispatcher {
    routes: Vec<RouteEntry>,
    group_chains: Vec<(String, Vec<Handler>)>,
}

impl AxumDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn route_count(&self) -> usize {
        self.routes.len()
    }

    /// Registered route templates, in registration order.
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.routes.iter().map(|entry| entry.path.as_str())
    }

    /// Build the router, running `global_chain` ahead of every route.
    ///
    /// Fails when two templates name a parameter differently at the same
    /// position, such as `/user/:id` and `/user/:name/posts`; axum cannot
    /// hold both.
    pub fn into_router(self, global_chain: Vec<Handler>) -> Result<Router, RegistryError> {
        let mut paths: Vec<(String, Vec<RouteEntry>)> = Vec::new();
        // Erased prefix -> (parameter name, first template using it).
        let mut captures: HashMap<String, (String, String)> = HashMap::new();
        for entry in self.routes {
            if let Some((_, entries)) = paths.iter_mut().find(|(path, _)| *path == entry.path) {
                entries.push(entry);
                continue;
            }
            for (prefix, name) in capture_slots(&entry.path) {
                match captures.get(&prefix) {
                    Some((known, first)) if *known != name => {
                        return Err(RegistryError::InvalidArgument(format!(
                            "routes {first} and {} use different parameter names at {prefix}:",
                            entry.path
                        )));
                    }
                    Some(_) => {}
                    None => {
                        captures.insert(prefix, (name.to_string(), entry.path.clone()));
                    }
                }
            }
            paths.push((entry.path.clone(), vec![entry]));
        }

        let mut router = Router::new();
        for (path, entries) in paths {
            let axum_path = to_axum_path(&path);
            tracing::debug!(path = %path, axum_path = %axum_path, "Mounting route");
            router = router.route(&axum_path, method_router(&global_chain, &entries));
        }
        Ok(router)
    }
}

impl Dispatcher for AxumDispatcher {
    fn register_handlers(&mut self, method: RouteMethod, full_path: &str, chain: Vec<Handler>) {
        let mut composed: Vec<Handler> = self
            .group_chains
            .iter()
            .filter(|(prefix, _)| has_prefix(full_path, prefix))
            .flat_map(|(_, handlers)| handlers.iter().cloned())
            .collect();
        composed.extend(chain);
        self.routes.push(RouteEntry {
            method,
            path: full_path.to_string(),
            chain: composed,
        });
    }

    fn register_group_middleware(&mut self, full_path: &str, chain: Vec<Handler>) {
        self.group_chains.push((full_path.to_string(), chain));
    }
}

fn method_router(global_chain: &[Handler], entries: &[RouteEntry]) -> MethodRouter {
    let chain_for = |keep: &dyn Fn(RouteMethod) -> bool| -> Vec<Handler> {
        let mut chain = global_chain.to_vec();
        for entry in entries.iter().filter(|e| keep(e.method)) {
            chain.extend(entry.chain.iter().cloned());
        }
        chain
    };

    let mut router = MethodRouter::new();
    for method in RouteMethod::CONCRETE {
        if !entries.iter().any(|e| e.method.covers(method)) {
            continue;
        }
        let chain = chain_for(&|m| m.covers(method));
        router = router.merge(on(method_filter(method), chain_handler(chain)));
    }

    if entries.iter().any(|e| e.method == RouteMethod::All) {
        let chain = chain_for(&|m| m == RouteMethod::All);
        router = router.fallback(chain_handler(chain));
    }

    router
}

fn chain_handler(
    chain: Vec<Handler>,
) -> impl Fn(Request<Body>) -> crate::routing::HandlerFuture + Clone + Send + Sync + 'static {
    let chain: Arc<[Handler]> = chain.into();
    move |request: Request<Body>| Next::new(Arc::clone(&chain)).run(request)
}

fn method_filter(method: RouteMethod) -> MethodFilter {
    match method {
        RouteMethod::Get => MethodFilter::GET,
        RouteMethod::Post => MethodFilter::POST,
        RouteMethod::Put => MethodFilter::PUT,
        RouteMethod::Delete => MethodFilter::DELETE,
        RouteMethod::Patch => MethodFilter::PATCH,
        RouteMethod::All => MethodFilter::GET
            .or(MethodFilter::POST)
            .or(MethodFilter::PUT)
            .or(MethodFilter::DELETE)
            .or(MethodFilter::PATCH),
    }
}

/// Each `:name` segment paired with the template before it, parameter
/// names erased: `/user/:id/post/:postId` yields `("/user/", "id")` and
/// `("/user/:/post/", "postId")`.
fn capture_slots(path: &str) -> Vec<(String, &str)> {
    let mut slots = Vec::new();
    let mut prefix = String::from("/");
    for segment in path.split('/').filter(|s| !s.is_empty()) {
        match segment.strip_prefix(':') {
            Some(name) => {
                slots.push((prefix.clone(), name));
                prefix.push(':');
            }
            None => prefix.push_str(segment),
        }
        prefix.push('/');
    }
    slots
}

/// Convert `:name` segments to `{name}` and a trailing `*` to `{*rest}`.
pub fn to_axum_path(path: &str) -> String {
    let segments: Vec<String> = path
        .split('/')
        .filter(|s| !s.is_empty())
        .map(|segment| {
            if let Some(name) = segment.strip_prefix(':') {
                format!("{{{name}}}")
            } else if segment == "*" {
                "{*rest}".to_string()
            } else {
                segment.to_string()
            }
        })
        .collect();
    format!("/{}", segments.join("/"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_axum_path() {
        assert_eq!(to_axum_path("/user/:id/post/:postId"), "/user/{id}/post/{postId}");
        assert_eq!(to_axum_path("/"), "/");
        assert_eq!(to_axum_path("api/files/*"), "/api/files/{*rest}");
    }

    #[test]
    fn test_capture_slots_erase_earlier_names() {
        assert_eq!(
            capture_slots("/user/:id/post/:postId"),
            vec![("/user/".to_string(), "id"), ("/user/:/post/".to_string(), "postId")]
        );
        assert_eq!(capture_slots("/:id")[0].0, capture_slots("/:name/x")[0].0);
        assert!(capture_slots("/status/ping").is_empty());
    }

    #[test]
    fn test_conflicting_parameter_names_are_rejected() {
        let ok = || Handler::classic(|_req, _next| async { "ok" });
        let mut dispatcher = AxumDispatcher::new();
        dispatcher.register_handlers(RouteMethod::Get, "/user/:id", vec![ok()]);
        dispatcher.register_handlers(RouteMethod::Delete, "/user/:name/posts", vec![ok()]);

        match dispatcher.into_router(Vec::new()) {
            Err(RegistryError::InvalidArgument(message)) => {
                assert!(message.contains("/user/:id"));
                assert!(message.contains("/user/:name/posts"));
            }
            other => panic!("expected a conflict, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_group_chains_apply_by_prefix_and_order() {
        let ok = || Handler::classic(|_req, _next| async { "ok" });
        let mut dispatcher = AxumDispatcher::new();
        dispatcher.register_group_middleware("/api", vec![ok()]);
        dispatcher.register_handlers(RouteMethod::Get, "/api/users", vec![ok()]);
        dispatcher.register_handlers(RouteMethod::Get, "/status", vec![ok()]);
        // Registered after the route: does not apply to it.
        dispatcher.register_group_middleware("/api", vec![ok()]);

        assert_eq!(dispatcher.routes[0].chain.len(), 2);
        assert_eq!(dispatcher.routes[1].chain.len(), 1);
    }
}
