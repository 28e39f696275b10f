//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Turn a finished registration into an Axum router
//! - Mount the devtool endpoints in development mode
//! - Wire up middleware (timeout, request ID, tracing, request metrics)
//! - Serve until the shutdown channel fires

use std::time::Duration;

use axum::{middleware, Router};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::AppConfig;
use crate::devtool::{setup_devtool_router, DevtoolState};
use crate::http::dispatch::AxumDispatcher;
use crate::observability::metrics;
use crate::registry::{RegistrationContext, RegistryError};
use crate::routing::path::has_prefix;

/// HTTP server for a registered route tree.
pub struct HttpServer {
    router: Router,
    config: AppConfig,
}

impl HttpServer {
    /// Build the server from a completed registration.
    ///
    /// Fails when the registered templates cannot share one router.
    pub fn new(
        config: AppConfig,
        ctx: RegistrationContext<AxumDispatcher>,
    ) -> Result<Self, RegistryError> {
        let snapshot = ctx.snapshot();
        let graph = ctx.graph();
        metrics::record_registry(&snapshot);

        tracing::info!(
            groups = snapshot.roots.len(),
            routes = snapshot.route_count(),
            controllers = snapshot.controllers.len(),
            middlewares = snapshot.middlewares.len(),
            validations = snapshot.validations.len(),
            "Registry complete"
        );

        let global_chain = ctx.global_chain();
        let dispatcher = ctx.into_dispatcher();
        if config.devtool_active() {
            let prefix = config.devtool.path_prefix.as_str();
            if let Some(path) = dispatcher.paths().find(|path| has_prefix(path, prefix)) {
                return Err(RegistryError::InvalidArgument(format!(
                    "route {path} is shadowed by the devtool mounted at {prefix}"
                )));
            }
        }

        let mut has_routes = dispatcher.route_count() > 0;
        let mut router = dispatcher.into_router(global_chain)?;

        if config.devtool_active() {
            let state = DevtoolState::new(snapshot, graph, config.devtool.api_key.clone());
            router = router.merge(setup_devtool_router(state, &config.devtool.path_prefix));
            has_routes = true;
            tracing::info!(prefix = %config.devtool.path_prefix, "Devtool endpoints mounted");
        }

        if has_routes {
            router = router.route_layer(middleware::from_fn(metrics::track_requests));
        }

        let router = Self::apply_layers(&config, router);
        Ok(Self { router, config })
    }

    /// Outer middleware stack, innermost first.
    #[allow(deprecated)]
    fn apply_layers(config: &AppConfig, router: Router) -> Router {
        router
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(TraceLayer::new_for_http())
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
    }

    /// Run the server until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// The assembled router, for in-process serving.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }
}
