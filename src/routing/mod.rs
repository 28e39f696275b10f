//! Routing primitives.
//!
//! # Data Flow
//! ```text
//! Registration (at startup):
//!     group / route call
//!     → path.rs (compose + normalize full path, extract :params)
//!     → handler.rs (uniform Handler values, chain walking)
//!     → dispatcher.rs (forward chain to the host router)
//!
//! Request time (host router):
//!     matched (method, path)
//!     → Next::run walks the registered chain in order
//! ```
//!
//! # Design Decisions
//! - Paths are composed once at startup, never per request
//! - Chain order is execution order
//! - The host router sits behind the `Dispatcher` trait

pub mod dispatcher;
pub mod handler;
pub mod path;

pub use dispatcher::{DispatchCall, Dispatcher, RecordingDispatcher, RouteMethod};
pub use handler::{CallShape, Context, Handler, HandlerFuture, HandlerId, Next};
