//! Shared utilities for integration tests.

#![allow(dead_code)]

use axum::{
    body::Body,
    http::{HeaderValue, Method, Request, StatusCode},
    Router,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tower::ServiceExt;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer};

use routegraph::config::{AppConfig, Mode};
use routegraph::registry::{EntryMeta, RegistrationContext};
use routegraph::routing::{Dispatcher, Handler};

pub const TRAIL_HEADER: &str = "x-trail";

/// Handler that answers `200` with a fixed body.
pub fn ok(body: &'static str) -> Handler {
    Handler::classic(move |_req, _next| async move { body })
}

/// Middleware that appends `label` to the `x-trail` request header, then continues.
pub fn step(label: &'static str) -> Handler {
    Handler::classic(move |mut request: Request<Body>, next| async move {
        let trail = match request.headers().get(TRAIL_HEADER).and_then(|v| v.to_str().ok()) {
            Some(existing) => format!("{existing},{label}"),
            None => label.to_string(),
        };
        request
            .headers_mut()
            .insert(TRAIL_HEADER, HeaderValue::from_str(&trail).unwrap());
        next.run(request).await
    })
}

/// Controller that answers with the trail accumulated so far plus `label`.
pub fn finish(label: &'static str) -> Handler {
    Handler::classic(move |request: Request<Body>, _next| async move {
        match request.headers().get(TRAIL_HEADER).and_then(|v| v.to_str().ok()) {
            Some(existing) => format!("{existing},{label}"),
            None => label.to_string(),
        }
    })
}

/// Context with `logger` (global), `auth`, `requireLang` and `ping` defined.
pub fn seeded_context<D: Dispatcher>(dispatcher: D) -> RegistrationContext<D> {
    let mut ctx = RegistrationContext::new(dispatcher);
    ctx.define_middleware("logger", step("logger"), true, EntryMeta::new()).unwrap();
    ctx.define_middleware("auth", step("auth"), false, EntryMeta::new()).unwrap();
    ctx.define_validation(
        "requireLang",
        step("requireLang"),
        false,
        EntryMeta::new().expected_query(["lang"]),
    )
    .unwrap();
    ctx.define_controller("ping", vec![ok("pong")], EntryMeta::new()).unwrap();
    ctx
}

/// Development config with the devtool enabled.
pub fn dev_config(api_key: Option<&str>) -> AppConfig {
    let mut config = AppConfig::default();
    config.mode = Mode::Development;
    config.devtool.enabled = true;
    config.devtool.api_key = api_key.map(str::to_string);
    config
}

/// Send one request through `router`, returning status and body text.
pub async fn send(
    router: &Router,
    method: Method,
    uri: &str,
    headers: &[(&str, &str)],
) -> (StatusCode, String) {
    let mut builder = Request::builder().method(method).uri(uri);
    for (name, value) in headers {
        builder = builder.header(*name, *value);
    }
    let response = router
        .clone()
        .oneshot(builder.body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}

pub async fn get(router: &Router, uri: &str) -> (StatusCode, String) {
    send(router, Method::GET, uri, &[]).await
}

/// Layer that counts `WARN` events.
#[derive(Clone, Default)]
pub struct WarnCounter(Arc<AtomicUsize>);

impl WarnCounter {
    pub fn count(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}

impl<S: Subscriber> Layer<S> for WarnCounter {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        if *event.metadata().level() == Level::WARN {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }
}

/// Run `f` with `counter` as the thread's subscriber.
pub fn with_warn_counter<T>(counter: &WarnCounter, f: impl FnOnce() -> T) -> T {
    use tracing_subscriber::layer::SubscriberExt;

    let subscriber = tracing_subscriber::registry().with(counter.clone());
    tracing::subscriber::with_default(subscriber, f)
}
