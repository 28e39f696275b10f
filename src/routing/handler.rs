//! Handler chains.
//!
//! # Responsibilities
//! - Wrap author functions in a uniform, clonable [`Handler`]
//! - Accept both call shapes: `(request, next)` and a single [`Context`]
//! - Walk an ordered chain with [`Next`]
//!
//! # Design Decisions
//! - Every handler carries a generated [`HandlerId`]; metadata lives in
//!   side tables keyed by that id, never on the function itself
//! - Running past the end of a chain falls through to `404 Not Found`

use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    response::{IntoResponse, Response},
};
use futures_util::future::BoxFuture;
use serde::Serialize;

/// Future returned by every handler in a chain.
pub type HandlerFuture = BoxFuture<'static, Response>;

type ChainFn = dyn Fn(Request<Body>, Next) -> HandlerFuture + Send + Sync;

static NEXT_HANDLER_ID: AtomicU64 = AtomicU64::new(1);

/// Generated identity of a handler value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct HandlerId(u64);

impl HandlerId {
    fn generate() -> Self {
        Self(NEXT_HANDLER_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for HandlerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "h{}", self.0)
    }
}

/// How the author wrote the function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CallShape {
    /// `|request, next| ..`
    Classic,
    /// `|ctx: Context| ..`
    Context,
}

/// Single-argument form handed to contextual handlers.
pub struct Context {
    pub request: Request<Body>,
    pub next: Next,
}

/// A step in a handler chain.
#[derive(Clone)]
pub struct Handler {
    id: HandlerId,
    shape: CallShape,
    func: Arc<ChainFn>,
}

impl Handler {
    /// Wrap a `(request, next)` function.
    pub fn classic<F, Fut, R>(f: F) -> Self
    where
        F: Fn(Request<Body>, Next) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = R> + Send + 'static,
        R: IntoResponse,
    {
        let func: Arc<ChainFn> = Arc::new(move |request, next| {
            let fut = f(request, next);
            Box::pin(async move { fut.await.into_response() })
        });
        Self {
            id: HandlerId::generate(),
            shape: CallShape::Classic,
            func,
        }
    }

    /// Wrap a function taking a single [`Context`].
    pub fn contextual<F, Fut, R>(f: F) -> Self
    where
        F: Fn(Context) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = R> + Send + 'static,
        R: IntoResponse,
    {
        let func: Arc<ChainFn> = Arc::new(move |request, next| {
            let fut = f(Context { request, next });
            Box::pin(async move { fut.await.into_response() })
        });
        Self {
            id: HandlerId::generate(),
            shape: CallShape::Context,
            func,
        }
    }

    pub fn id(&self) -> HandlerId {
        self.id
    }

    pub fn shape(&self) -> CallShape {
        self.shape
    }

    /// Same function under a fresh id.
    pub(crate) fn reidentified(&self) -> Self {
        Self {
            id: HandlerId::generate(),
            shape: self.shape,
            func: Arc::clone(&self.func),
        }
    }

    /// True when both handlers wrap the very same function allocation.
    pub fn shares_function(&self, other: &Handler) -> bool {
        Arc::ptr_eq(&self.func, &other.func)
    }

    /// Invoke this step.
    pub fn call(&self, request: Request<Body>, next: Next) -> HandlerFuture {
        (self.func)(request, next)
    }
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handler")
            .field("id", &self.id)
            .field("shape", &self.shape)
            .finish()
    }
}

/// Continuation into the remainder of a chain.
#[derive(Clone)]
pub struct Next {
    chain: Arc<[Handler]>,
    index: usize,
}

impl Next {
    /// Start at the head of `chain`.
    pub fn new(chain: Arc<[Handler]>) -> Self {
        Self { chain, index: 0 }
    }

    /// Run the next handler, or fall through to `404` when none is left.
    pub fn run(self, request: Request<Body>) -> HandlerFuture {
        match self.chain.get(self.index).cloned() {
            Some(handler) => {
                let next = Self {
                    chain: self.chain,
                    index: self.index + 1,
                };
                handler.call(request, next)
            }
            None => Box::pin(async { StatusCode::NOT_FOUND.into_response() }),
        }
    }

    /// Handlers left after this point.
    pub fn remaining(&self) -> usize {
        self.chain.len().saturating_sub(self.index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn tagging(tag: &'static str) -> Handler {
        Handler::classic(move |mut req: Request<Body>, next: Next| async move {
            req.headers_mut()
                .append("x-trail", HeaderValue::from_static(tag));
            next.run(req).await
        })
    }

    fn echo_trail() -> Handler {
        Handler::contextual(|ctx: Context| async move {
            let trail: Vec<_> = ctx
                .request
                .headers()
                .get_all("x-trail")
                .iter()
                .filter_map(|v| v.to_str().ok())
                .map(str::to_string)
                .collect();
            trail.join(",")
        })
    }

    async fn body_text(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), 1024).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_chain_runs_in_order_across_shapes() {
        let chain: Arc<[Handler]> = vec![tagging("a"), tagging("b"), echo_trail()].into();
        let response = Next::new(chain)
            .run(Request::new(Body::empty()))
            .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, "a,b");
    }

    #[tokio::test]
    async fn test_exhausted_chain_falls_through() {
        let chain: Arc<[Handler]> = vec![tagging("a")].into();
        let response = Next::new(chain)
            .run(Request::new(Body::empty()))
            .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_reidentified_shares_function() {
        let original = tagging("x");
        let copy = original.reidentified();
        assert_ne!(original.id(), copy.id());
        assert!(original.shares_function(&copy));
        assert!(!original.shares_function(&tagging("x")));
        assert_eq!(echo_trail().shape(), CallShape::Context);
    }
}
