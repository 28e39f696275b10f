//! Name → entry stores.
//!
//! # Responsibilities
//! - Define entries under unique names (last write wins, with a warning)
//! - Resolve names back to tagged handler steps
//! - Track where each entry is used (set semantics)
//! - Keep the ordered list of global steps
//!
//! # Design Decisions
//! - `define` re-identifies every step; the store's side table maps those
//!   ids back to the entry name, so classification never inspects functions
//! - Entries keep their first registration position across overwrites

use std::collections::{BTreeMap, HashMap};

use crate::registry::entry::{EntryKind, EntryMeta, NamedEntry, USED_DYNAMICALLY};
use crate::registry::error::RegistryError;
use crate::routing::{Handler, HandlerId};

/// Store for one kind of named entry.
#[derive(Debug)]
pub struct NamedStore {
    kind: EntryKind,
    entries: Vec<NamedEntry>,
    by_name: HashMap<String, usize>,
    /// Side table: step id → owning entry name.
    owners: HashMap<HandlerId, String>,
    globals: Vec<Handler>,
}

impl NamedStore {
    pub fn new(kind: EntryKind) -> Self {
        Self {
            kind,
            entries: Vec::new(),
            by_name: HashMap::new(),
            owners: HashMap::new(),
            globals: Vec::new(),
        }
    }

    pub fn kind(&self) -> EntryKind {
        self.kind
    }

    /// Define (or overwrite) the entry `name`.
    pub fn define(
        &mut self,
        name: &str,
        steps: Vec<Handler>,
        is_global: bool,
        meta: EntryMeta,
    ) -> Result<&NamedEntry, RegistryError> {
        if name.trim().is_empty() {
            return Err(RegistryError::InvalidArgument(format!(
                "{} name must be a non-empty string",
                self.kind
            )));
        }
        if steps.is_empty() {
            return Err(RegistryError::HandlerType(format!(
                "{} \"{}\" must contain at least one handler",
                self.kind, name
            )));
        }

        let steps: Vec<Handler> = steps.iter().map(Handler::reidentified).collect();
        let mut entry = NamedEntry::new(self.kind, name, steps.clone(), is_global, meta);

        let index = match self.by_name.get(name).copied() {
            Some(index) => {
                tracing::warn!(kind = %self.kind, name, "Entry already defined, overwriting");
                let previous = &self.entries[index];
                entry.used_in = previous.used_in.clone();
                let stale: Vec<HandlerId> = previous.steps.iter().map(Handler::id).collect();
                self.globals.retain(|g| !stale.contains(&g.id()));
                self.entries[index] = entry;
                index
            }
            None => {
                self.entries.push(entry);
                let index = self.entries.len() - 1;
                self.by_name.insert(name.to_string(), index);
                index
            }
        };

        for step in &steps {
            self.owners.insert(step.id(), name.to_string());
        }
        if is_global {
            self.globals.extend(steps);
        }

        tracing::debug!(kind = %self.kind, name, is_global, "Entry defined");
        Ok(&self.entries[index])
    }

    /// Resolve `name` to its steps, recording a dynamic usage.
    pub fn resolve(&mut self, name: &str) -> Result<Vec<Handler>, RegistryError> {
        self.resolve_all([name])
    }

    /// Resolve several names into one flat chain, in the given order.
    ///
    /// Fails before recording anything if any name is unknown.
    pub fn resolve_all<I, S>(&mut self, names: I) -> Result<Vec<Handler>, RegistryError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut indices = Vec::new();
        for name in names {
            let name = name.as_ref();
            match self.by_name.get(name) {
                Some(&index) => indices.push(index),
                None => return Err(RegistryError::not_found(self.kind, name, self.names())),
            }
        }

        let mut chain = Vec::new();
        for index in indices {
            let entry = &mut self.entries[index];
            entry.used_in.insert(USED_DYNAMICALLY.to_string());
            chain.extend(entry.steps.iter().cloned());
        }
        Ok(chain)
    }

    /// Record that `name` is applied at `full_path`.
    ///
    /// Returns `false` for unknown names and for pairs already recorded.
    pub fn record_usage(&mut self, name: &str, full_path: &str) -> bool {
        match self.by_name.get(name) {
            Some(&index) => self.entries[index].used_in.insert(full_path.to_string()),
            None => false,
        }
    }

    /// Name of the entry that handed out this handler id.
    pub fn owner_of(&self, id: HandlerId) -> Option<&str> {
        self.owners.get(&id).map(String::as_str)
    }

    /// First entry, in registration order, whose steps share `handler`'s function.
    pub fn step_owner(&self, handler: &Handler) -> Option<&str> {
        self.entries
            .iter()
            .find(|entry| entry.steps.iter().any(|step| step.shares_function(handler)))
            .map(|entry| entry.name.as_str())
    }

    pub fn get(&self, name: &str) -> Option<&NamedEntry> {
        self.by_name.get(name).map(|&index| &self.entries[index])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    /// Entries in registration order.
    pub fn entries(&self) -> impl Iterator<Item = &NamedEntry> {
        self.entries.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|entry| entry.name.as_str())
    }

    /// Copy of every entry keyed by name.
    pub fn snapshot(&self) -> BTreeMap<String, NamedEntry> {
        self.entries
            .iter()
            .map(|entry| (entry.name.clone(), entry.clone()))
            .collect()
    }

    /// Global steps in declaration order.
    pub fn globals(&self) -> &[Handler] {
        &self.globals
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    fn step() -> Handler {
        Handler::classic(|_req, _next| async { StatusCode::OK })
    }

    #[test]
    fn test_define_rejects_bad_input() {
        let mut store = NamedStore::new(EntryKind::Middleware);
        assert!(matches!(
            store.define("  ", vec![step()], false, EntryMeta::new()),
            Err(RegistryError::InvalidArgument(_))
        ));
        assert!(matches!(
            store.define("auth", Vec::new(), false, EntryMeta::new()),
            Err(RegistryError::HandlerType(_))
        ));
        assert!(store.is_empty());
    }

    #[test]
    fn test_redefinition_last_write_wins() {
        let mut store = NamedStore::new(EntryKind::Middleware);
        let first = step();
        let second = step();
        store.define("logger", vec![first.clone()], false, EntryMeta::new()).unwrap();
        store.define("logger", vec![second.clone()], false, EntryMeta::new()).unwrap();

        let resolved = store.resolve("logger").unwrap();
        assert_eq!(resolved.len(), 1);
        assert!(resolved[0].shares_function(&second));
        assert!(!resolved[0].shares_function(&first));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_resolve_unknown_lists_known_names() {
        let mut store = NamedStore::new(EntryKind::Validation);
        store.define("requireLang", vec![step()], false, EntryMeta::new()).unwrap();
        store.define("requireBody", vec![step()], false, EntryMeta::new()).unwrap();

        let err = store.resolve_all(["requireLang", "missing"]).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("missing"));
        assert!(message.contains("requireLang, requireBody"));
        // Nothing recorded on failure.
        assert!(store.get("requireLang").unwrap().used_in.is_empty());
    }

    #[test]
    fn test_resolve_records_dynamic_usage_and_tags() {
        let mut store = NamedStore::new(EntryKind::Controller);
        store.define("ping", vec![step(), step()], false, EntryMeta::new()).unwrap();

        let steps = store.resolve("ping").unwrap();
        assert_eq!(steps.len(), 2);
        for s in &steps {
            assert_eq!(store.owner_of(s.id()), Some("ping"));
        }
        assert!(store.get("ping").unwrap().used_in.contains(USED_DYNAMICALLY));
    }

    #[test]
    fn test_record_usage_is_idempotent() {
        let mut store = NamedStore::new(EntryKind::Controller);
        store.define("ping", vec![step()], false, EntryMeta::new()).unwrap();

        assert!(store.record_usage("ping", "/api/ping"));
        assert!(!store.record_usage("ping", "/api/ping"));
        assert!(!store.record_usage("nope", "/api/ping"));

        let used: Vec<_> = store.get("ping").unwrap().used_in.iter().collect();
        assert_eq!(used, vec!["/api/ping"]);
    }

    #[test]
    fn test_globals_follow_declaration_order_and_overwrite() {
        let mut store = NamedStore::new(EntryKind::Middleware);
        store.define("a", vec![step()], true, EntryMeta::new()).unwrap();
        store.define("b", vec![step()], true, EntryMeta::new()).unwrap();
        store.define("c", vec![step()], false, EntryMeta::new()).unwrap();

        let order: Vec<_> = store
            .globals()
            .iter()
            .map(|g| store.owner_of(g.id()).unwrap())
            .collect();
        assert_eq!(order, vec!["a", "b"]);

        store.define("a", vec![step()], true, EntryMeta::new()).unwrap();
        let order: Vec<_> = store
            .globals()
            .iter()
            .map(|g| store.owner_of(g.id()).unwrap())
            .collect();
        assert_eq!(order, vec!["b", "a"]);
    }

    #[test]
    fn test_step_owner_first_registration_wins() {
        let mut store = NamedStore::new(EntryKind::Controller);
        let shared = step();
        store.define("first", vec![shared.clone()], false, EntryMeta::new()).unwrap();
        store.define("second", vec![shared.clone()], false, EntryMeta::new()).unwrap();

        assert_eq!(store.step_owner(&shared), Some("first"));
        assert_eq!(store.owner_of(shared.id()), None);
    }
}
