//! HTTP serving subsystem.
//!
//! # Data Flow
//! ```text
//! Registration
//!     → dispatch.rs (AxumDispatcher collects chains per method + path)
//!     → server.rs (router + devtool + layers)
//!     → axum::serve
//!
//! Request
//!     → request ID, trace, timeout layers
//!     → matched route → global chain → group chains → route chain
//! ```

pub mod dispatch;
pub mod server;

pub use dispatch::{to_axum_path, AxumDispatcher};
pub use server::HttpServer;
