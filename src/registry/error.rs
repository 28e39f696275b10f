//! Registration errors.

use thiserror::Error;

use crate::registry::entry::EntryKind;

/// Errors raised while registering entries, groups and routes.
///
/// All of them surface at startup; none is deferred to request time.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// Malformed call shape (empty name, route outside a group, ...).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A name was resolved that no entry was defined under.
    #[error("{kind} \"{name}\" is not defined. Known {kind}s: {known}")]
    NotFound {
        kind: EntryKind,
        name: String,
        known: String,
    },

    /// Nothing callable was supplied where a handler chain is required.
    #[error("handler error: {0}")]
    HandlerType(String),
}

impl RegistryError {
    pub(crate) fn not_found<'a>(
        kind: EntryKind,
        name: &str,
        known: impl Iterator<Item = &'a str>,
    ) -> Self {
        let known: Vec<&str> = known.collect();
        Self::NotFound {
            kind,
            name: name.to_string(),
            known: if known.is_empty() {
                "none".to_string()
            } else {
                known.join(", ")
            },
        }
    }
}
