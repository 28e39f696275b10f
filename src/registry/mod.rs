//! Registration subsystem.
//!
//! # Data Flow
//! ```text
//! Startup:
//!     Manifest modules (controllers → middlewares → validations → routes)
//!     → store.rs (define named entries, tag their steps)
//!     → context.rs group()/route calls
//!         → routing::path (full path)
//!         → tree.rs (attach group / route to innermost open group)
//!         → store.rs (record usage per full path)
//!         → Dispatcher (forward ordered chains)
//!
//! On demand:
//!     context.snapshot() → snapshot.rs (JSON document for the devtool)
//!     context.graph()    → graph::project (node/edge view)
//! ```
//!
//! # Design Decisions
//! - Registration is synchronous and runs once, before traffic
//! - Names are unique per store; redefinition overwrites with a warning
//! - Usage is a set per entry; recording twice is a no-op

pub mod context;
pub mod entry;
pub mod error;
pub mod manifest;
pub mod scope;
pub mod snapshot;
pub mod store;
pub mod tree;

pub use context::{Attribution, RegistrationContext};
pub use entry::{EntryKind, EntryMeta, NamedEntry, USED_DYNAMICALLY};
pub use error::RegistryError;
pub use manifest::{LoadedModule, Manifest, ModuleSection};
pub use scope::{GroupOptions, GroupScope, OpenedGroup};
pub use snapshot::RegistrySnapshot;
pub use store::NamedStore;
pub use tree::{Group, GroupTree, Route, RouteController};
