//! Registration context.
//!
//! # Responsibilities
//! - Own the three named stores, the group tree and the dispatcher
//! - Open and close groups, forwarding group chains to the dispatcher
//! - Attach routes to the innermost open group and attribute their handlers
//! - Record where every entry is used
//!
//! # Design Decisions
//! - One explicit context per route tree; no process-wide state
//! - Group bodies run synchronously between `enter` and `exit`; `exit`
//!   happens whether the body succeeds or fails
//! - Untagged handlers sharing a function with a controller step are
//!   attributed to the first such controller in registration order

use serde::Serialize;
use uuid::Uuid;

use crate::graph::{self, Graph, Stores};
use crate::registry::entry::{EntryKind, EntryMeta};
use crate::registry::error::RegistryError;
use crate::registry::manifest::LoadedModule;
use crate::registry::scope::{GroupOptions, GroupScope, OpenedGroup};
use crate::registry::snapshot::RegistrySnapshot;
use crate::registry::store::NamedStore;
use crate::registry::tree::{Group, GroupTree, Route, RouteController};
use crate::routing::path::{compose_path, extract_params};
use crate::routing::{Dispatcher, Handler, RouteMethod};

/// Who a handler belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Attribution {
    Controller(String),
    Middleware(String),
    Validation(String),
    Anonymous,
}

impl Attribution {
    pub fn name(&self) -> &str {
        match self {
            Attribution::Controller(name)
            | Attribution::Middleware(name)
            | Attribution::Validation(name) => name,
            Attribution::Anonymous => "anonymous",
        }
    }
}

/// Everything registered for one route tree.
pub struct RegistrationContext<D: Dispatcher> {
    controllers: NamedStore,
    middlewares: NamedStore,
    validations: NamedStore,
    tree: GroupTree,
    dispatcher: D,
    config: Option<serde_json::Value>,
    modules: Vec<LoadedModule>,
}

impl<D: Dispatcher> RegistrationContext<D> {
    pub fn new(dispatcher: D) -> Self {
        Self {
            controllers: NamedStore::new(EntryKind::Controller),
            middlewares: NamedStore::new(EntryKind::Middleware),
            validations: NamedStore::new(EntryKind::Validation),
            tree: GroupTree::new(),
            dispatcher,
            config: None,
            modules: Vec::new(),
        }
    }

    pub fn store(&self, kind: EntryKind) -> &NamedStore {
        match kind {
            EntryKind::Controller => &self.controllers,
            EntryKind::Middleware => &self.middlewares,
            EntryKind::Validation => &self.validations,
        }
    }

    fn store_mut(&mut self, kind: EntryKind) -> &mut NamedStore {
        match kind {
            EntryKind::Controller => &mut self.controllers,
            EntryKind::Middleware => &mut self.middlewares,
            EntryKind::Validation => &mut self.validations,
        }
    }

    /// Define an entry of any kind.
    pub fn define(
        &mut self,
        kind: EntryKind,
        name: &str,
        steps: Vec<Handler>,
        is_global: bool,
        meta: EntryMeta,
    ) -> Result<(), RegistryError> {
        self.store_mut(kind).define(name, steps, is_global, meta)?;
        Ok(())
    }

    pub fn define_controller(
        &mut self,
        name: &str,
        steps: Vec<Handler>,
        meta: EntryMeta,
    ) -> Result<(), RegistryError> {
        self.define(EntryKind::Controller, name, steps, false, meta)
    }

    pub fn define_middleware(
        &mut self,
        name: &str,
        step: Handler,
        is_global: bool,
        meta: EntryMeta,
    ) -> Result<(), RegistryError> {
        self.define(EntryKind::Middleware, name, vec![step], is_global, meta)
    }

    pub fn define_validation(
        &mut self,
        name: &str,
        step: Handler,
        is_global: bool,
        meta: EntryMeta,
    ) -> Result<(), RegistryError> {
        self.define(EntryKind::Validation, name, vec![step], is_global, meta)
    }

    /// Resolve a controller to its steps.
    pub fn controller(&mut self, name: &str) -> Result<Vec<Handler>, RegistryError> {
        self.controllers.resolve(name)
    }

    pub fn middleware(&mut self, name: &str) -> Result<Vec<Handler>, RegistryError> {
        self.middlewares.resolve(name)
    }

    pub fn middlewares<I, S>(&mut self, names: I) -> Result<Vec<Handler>, RegistryError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.middlewares.resolve_all(names)
    }

    pub fn validation(&mut self, name: &str) -> Result<Vec<Handler>, RegistryError> {
        self.validations.resolve(name)
    }

    pub fn validations<I, S>(&mut self, names: I) -> Result<Vec<Handler>, RegistryError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.validations.resolve_all(names)
    }

    /// Work out which entry, if any, a handler came from.
    pub fn attribute(&self, handler: &Handler) -> Attribution {
        let id = handler.id();
        if let Some(name) = self.controllers.owner_of(id) {
            return Attribution::Controller(name.to_string());
        }
        if let Some(name) = self.middlewares.owner_of(id) {
            return Attribution::Middleware(name.to_string());
        }
        if let Some(name) = self.validations.owner_of(id) {
            return Attribution::Validation(name.to_string());
        }
        match self.controllers.step_owner(handler) {
            Some(name) => Attribution::Controller(name.to_string()),
            None => Attribution::Anonymous,
        }
    }

    fn record_usage(&mut self, attribution: &Attribution, full_path: &str) {
        let (kind, name) = match attribution {
            Attribution::Controller(name) => (EntryKind::Controller, name),
            Attribution::Middleware(name) => (EntryKind::Middleware, name),
            Attribution::Validation(name) => (EntryKind::Validation, name),
            Attribution::Anonymous => return,
        };
        self.store_mut(kind).record_usage(name, full_path);
    }

    /// Record that entry `name` of `kind` is applied at `full_path`.
    pub fn record_entry_usage(&mut self, kind: EntryKind, name: &str, full_path: &str) -> bool {
        self.store_mut(kind).record_usage(name, full_path)
    }

    /// Open a group under the currently open groups.
    pub fn enter_group(
        &mut self,
        base_path: &str,
        options: GroupOptions,
    ) -> Result<OpenedGroup, RegistryError> {
        let ancestors: Vec<String> = self
            .tree
            .open_segments()
            .into_iter()
            .map(str::to_string)
            .collect();
        self.open_group(&ancestors, base_path, options)
    }

    /// Close the innermost open group.
    pub fn exit_group(&mut self) -> Result<(), RegistryError> {
        self.tree.exit()
    }

    fn open_group(
        &mut self,
        ancestors: &[String],
        base_path: &str,
        options: GroupOptions,
    ) -> Result<OpenedGroup, RegistryError> {
        options.validate(base_path)?;

        let full_base_path = compose_path(ancestors, base_path);
        let inferred = extract_params(&full_base_path);
        let params = if options.expected_params.is_empty() {
            inferred.clone()
        } else {
            options.expected_params.clone()
        };

        let chain: Vec<Handler> = options
            .validations
            .iter()
            .chain(options.middlewares.iter())
            .cloned()
            .collect();
        self.reject_controllers(&chain, &full_base_path)?;
        if !chain.is_empty() {
            self.dispatcher
                .register_group_middleware(&full_base_path, chain.clone());
            for handler in &chain {
                let attribution = self.attribute(handler);
                self.record_usage(&attribution, &full_base_path);
            }
        }

        let mut group = Group::new(full_base_path.clone());
        group.params = params;
        group.expected_query = options.expected_query.clone();
        group.middlewares = options
            .middlewares
            .iter()
            .map(|h| self.attribute(h).name().to_string())
            .collect();
        group.validations = options
            .validations
            .iter()
            .map(|h| self.attribute(h).name().to_string())
            .collect();
        group.description = options.description;

        tracing::debug!(
            base_path = %full_base_path,
            depth = self.tree.depth(),
            chain_len = chain.len(),
            "Entering group"
        );
        self.tree.enter(group, base_path);

        Ok(OpenedGroup {
            full_base_path,
            params: inferred,
            expected_query: options.expected_query,
        })
    }

    /// Register a group at `base_path` and run `body` inside it.
    ///
    /// Nested groups are opened through [`GroupScope::group`].
    pub fn group<F>(
        &mut self,
        base_path: &str,
        options: GroupOptions,
        body: F,
    ) -> Result<(), RegistryError>
    where
        F: FnOnce(&mut GroupScope<'_, D>) -> Result<(), RegistryError>,
    {
        let ancestors: Vec<String> = self
            .tree
            .open_segments()
            .into_iter()
            .map(str::to_string)
            .collect();
        self.run_group(&ancestors, base_path, options, body)
    }

    pub(crate) fn run_group<F>(
        &mut self,
        ancestors: &[String],
        base_path: &str,
        options: GroupOptions,
        body: F,
    ) -> Result<(), RegistryError>
    where
        F: FnOnce(&mut GroupScope<'_, D>) -> Result<(), RegistryError>,
    {
        let opened = self.open_group(ancestors, base_path, options)?;
        let mut lineage = ancestors.to_vec();
        lineage.push(base_path.to_string());

        let outcome = {
            let mut scope = GroupScope::new(self, lineage, opened);
            body(&mut scope)
        };

        self.exit_group()?;
        if let Err(e) = &outcome {
            tracing::error!(base_path, error = %e, "Group registration failed");
        }
        outcome
    }

    /// Register a route under the innermost open group.
    ///
    /// Fails when no group is open.
    pub fn define_route<I>(
        &mut self,
        method: RouteMethod,
        path: &str,
        handlers: I,
    ) -> Result<(), RegistryError>
    where
        I: IntoIterator<Item = Handler>,
    {
        let full_path = compose_path(&self.tree.open_segments(), path);
        self.attach_route(method, path, full_path, handlers.into_iter().collect())
    }

    pub(crate) fn attach_route(
        &mut self,
        method: RouteMethod,
        path: &str,
        full_path: String,
        handlers: Vec<Handler>,
    ) -> Result<(), RegistryError> {
        if self.tree.current().is_none() {
            return Err(RegistryError::InvalidArgument(format!(
                "{method} {path}: routes must be defined inside a group"
            )));
        }
        if handlers.is_empty() {
            return Err(RegistryError::HandlerType(format!(
                "{method} {full_path} has no handlers"
            )));
        }

        self.dispatcher
            .register_handlers(method, &full_path, handlers.clone());

        let mut route = Route {
            id: Uuid::new_v4(),
            method,
            path: path.to_string(),
            full_path: full_path.clone(),
            controllers: Vec::new(),
            middlewares: Vec::new(),
            validations: Vec::new(),
        };

        for handler in &handlers {
            let attribution = self.attribute(handler);
            match &attribution {
                Attribution::Controller(name) => {
                    if !route.controllers.iter().any(|c| &c.name == name) {
                        let id = self
                            .controllers
                            .get(name)
                            .map(|entry| entry.id.to_string())
                            .unwrap_or_else(|| name.clone());
                        route.controllers.push(RouteController {
                            name: name.clone(),
                            id,
                        });
                    }
                }
                Attribution::Middleware(name) => push_unique(&mut route.middlewares, name),
                Attribution::Validation(name) => push_unique(&mut route.validations, name),
                Attribution::Anonymous => {
                    let anonymous = RouteController::anonymous();
                    if !route.controllers.contains(&anonymous) {
                        route.controllers.push(anonymous);
                    }
                }
            }
            self.record_usage(&attribution, &full_path);
        }

        tracing::debug!(
            method = %method,
            full_path = %full_path,
            handlers = handlers.len(),
            "Route registered"
        );

        if let Some(group) = self.tree.current_mut() {
            group.routes.push(route);
        }
        Ok(())
    }

    /// Group chains only carry middlewares, validations and inline steps.
    fn reject_controllers(
        &self,
        chain: &[Handler],
        full_base_path: &str,
    ) -> Result<(), RegistryError> {
        for handler in chain {
            if let Attribution::Controller(name) = self.attribute(handler) {
                return Err(RegistryError::InvalidArgument(format!(
                    "controller \"{name}\" cannot run as group middleware at {full_base_path}"
                )));
            }
        }
        Ok(())
    }

    /// Group-level `use`: run `handlers` ahead of everything under the open group.
    pub(crate) fn attach_group_handlers(
        &mut self,
        full_base_path: &str,
        handlers: Vec<Handler>,
    ) -> Result<(), RegistryError> {
        if self.tree.current().is_none() {
            return Err(RegistryError::InvalidArgument(
                "use() must be called inside a group".to_string(),
            ));
        }
        if handlers.is_empty() {
            return Err(RegistryError::HandlerType(format!(
                "use() at {full_base_path} has no handlers"
            )));
        }

        self.reject_controllers(&handlers, full_base_path)?;
        self.dispatcher
            .register_group_middleware(full_base_path, handlers.clone());

        let attributions: Vec<Attribution> = handlers.iter().map(|h| self.attribute(h)).collect();
        for attribution in &attributions {
            self.record_usage(attribution, full_base_path);
        }
        if let Some(group) = self.tree.current_mut() {
            for attribution in attributions {
                match attribution {
                    Attribution::Validation(name) => group.validations.push(name),
                    other => group.middlewares.push(other.name().to_string()),
                }
            }
        }
        Ok(())
    }

    /// Global middlewares, then global validations, each in declaration order.
    pub fn global_chain(&self) -> Vec<Handler> {
        self.middlewares
            .globals()
            .iter()
            .chain(self.validations.globals())
            .cloned()
            .collect()
    }

    pub fn tree(&self) -> &GroupTree {
        &self.tree
    }

    pub fn dispatcher(&self) -> &D {
        &self.dispatcher
    }

    pub fn into_dispatcher(self) -> D {
        self.dispatcher
    }

    /// Record the active configuration so it ships with snapshots.
    pub fn set_config<T: Serialize>(&mut self, config: &T) -> Result<(), serde_json::Error> {
        self.config = Some(serde_json::to_value(config)?);
        Ok(())
    }

    pub(crate) fn record_module(&mut self, module: LoadedModule) {
        self.modules.push(module);
    }

    pub fn modules(&self) -> &[LoadedModule] {
        &self.modules
    }

    /// Copy of the whole registry.
    pub fn snapshot(&self) -> RegistrySnapshot {
        RegistrySnapshot {
            roots: self.tree.roots().to_vec(),
            controllers: self.controllers.snapshot(),
            middlewares: self.middlewares.snapshot(),
            validations: self.validations.snapshot(),
            config: self.config.clone(),
            modules: self.modules.clone(),
        }
    }

    /// Project the current tree into a node/edge graph.
    pub fn graph(&self) -> Graph {
        graph::project(
            &self.tree,
            &Stores {
                controllers: &self.controllers,
                middlewares: &self.middlewares,
                validations: &self.validations,
            },
        )
    }
}

fn push_unique(names: &mut Vec<String>, name: &str) {
    if !names.iter().any(|n| n == name) {
        names.push(name.to_string());
    }
}
