//! Named entries: controllers, middlewares and validations.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::routing::Handler;

/// Location recorded when an entry is resolved before any route path is known.
pub const USED_DYNAMICALLY: &str = "<used dynamically>";

/// Which store an entry lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Controller,
    Middleware,
    Validation,
}

impl EntryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryKind::Controller => "controller",
            EntryKind::Middleware => "middleware",
            EntryKind::Validation => "validation",
        }
    }
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Descriptive metadata supplied at definition time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryMeta {
    pub description: String,
    pub expected_query: Vec<String>,
    pub expected_params: Vec<String>,
}

impl EntryMeta {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn expected_query<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.expected_query = names.into_iter().map(Into::into).collect();
        self
    }

    pub fn expected_params<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.expected_params = names.into_iter().map(Into::into).collect();
        self
    }
}

/// A registered controller, middleware or validation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NamedEntry {
    pub id: Uuid,
    pub kind: EntryKind,
    pub name: String,
    #[serde(skip)]
    pub steps: Vec<Handler>,
    pub is_global: bool,
    #[serde(flatten)]
    pub meta: EntryMeta,
    /// Full paths this entry is applied at. Set semantics.
    pub used_in: BTreeSet<String>,
}

impl NamedEntry {
    pub(crate) fn new(
        kind: EntryKind,
        name: &str,
        steps: Vec<Handler>,
        is_global: bool,
        meta: EntryMeta,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            name: name.to_string(),
            steps,
            is_global,
            meta,
            used_in: BTreeSet::new(),
        }
    }

    pub fn step_count(&self) -> usize {
        self.steps.len()
    }
}
