//! The group DSL handed to group bodies.

use std::collections::BTreeMap;

use crate::registry::context::RegistrationContext;
use crate::registry::error::RegistryError;
use crate::routing::path::compose_path;
use crate::routing::{Dispatcher, Handler, RouteMethod};

/// Options accepted by `group`.
#[derive(Debug, Clone, Default)]
pub struct GroupOptions {
    pub description: String,
    /// Explicit parameter names; inferred from the path when empty.
    pub expected_params: Vec<String>,
    pub expected_query: Vec<String>,
    pub middlewares: Vec<Handler>,
    pub validations: Vec<Handler>,
}

impl GroupOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
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

    pub fn expected_query<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.expected_query = names.into_iter().map(Into::into).collect();
        self
    }

    /// Append middleware steps; single handlers and resolved chains alike.
    pub fn middlewares<I>(mut self, handlers: I) -> Self
    where
        I: IntoIterator<Item = Handler>,
    {
        self.middlewares.extend(handlers);
        self
    }

    pub fn validations<I>(mut self, handlers: I) -> Self
    where
        I: IntoIterator<Item = Handler>,
    {
        self.validations.extend(handlers);
        self
    }

    pub(crate) fn validate(&self, base_path: &str) -> Result<(), RegistryError> {
        if base_path.contains(['?', '#']) {
            return Err(RegistryError::InvalidArgument(format!(
                "group base path \"{base_path}\" must not carry a query or fragment"
            )));
        }
        let blank = |names: &[String]| names.iter().any(|n| n.trim().is_empty());
        if blank(&self.expected_params) || blank(&self.expected_query) {
            return Err(RegistryError::InvalidArgument(format!(
                "group \"{base_path}\" declares an empty parameter or query name"
            )));
        }
        Ok(())
    }
}

/// What opening a group produced.
#[derive(Debug, Clone)]
pub struct OpenedGroup {
    pub full_base_path: String,
    /// Parameters found in the full base path.
    pub params: Vec<String>,
    pub expected_query: Vec<String>,
}

/// Route-definition surface for the body of one group.
pub struct GroupScope<'a, D: Dispatcher> {
    ctx: &'a mut RegistrationContext<D>,
    lineage: Vec<String>,
    full_base_path: String,
    params: BTreeMap<String, String>,
    query: BTreeMap<String, String>,
}

impl<'a, D: Dispatcher> GroupScope<'a, D> {
    pub(crate) fn new(
        ctx: &'a mut RegistrationContext<D>,
        lineage: Vec<String>,
        opened: OpenedGroup,
    ) -> Self {
        let placeholder = |name: String| {
            let value = format!(":{name}");
            (name, value)
        };
        Self {
            ctx,
            lineage,
            full_base_path: opened.full_base_path,
            params: opened.params.into_iter().map(placeholder).collect(),
            query: opened.expected_query.into_iter().map(placeholder).collect(),
        }
    }

    /// Absolute, normalized path of this group.
    pub fn base_path(&self) -> &str {
        &self.full_base_path
    }

    /// Example path parameters, `name -> ":name"`. Introspection only.
    pub fn params(&self) -> &BTreeMap<String, String> {
        &self.params
    }

    /// Example query values, `name -> ":name"`. Introspection only.
    pub fn query(&self) -> &BTreeMap<String, String> {
        &self.query
    }

    pub fn route<I>(
        &mut self,
        method: RouteMethod,
        path: &str,
        handlers: I,
    ) -> Result<(), RegistryError>
    where
        I: IntoIterator<Item = Handler>,
    {
        let full_path = compose_path(&self.lineage, path);
        self.ctx
            .attach_route(method, path, full_path, handlers.into_iter().collect())
    }

    pub fn get<I>(&mut self, path: &str, handlers: I) -> Result<(), RegistryError>
    where
        I: IntoIterator<Item = Handler>,
    {
        self.route(RouteMethod::Get, path, handlers)
    }

    pub fn post<I>(&mut self, path: &str, handlers: I) -> Result<(), RegistryError>
    where
        I: IntoIterator<Item = Handler>,
    {
        self.route(RouteMethod::Post, path, handlers)
    }

    pub fn put<I>(&mut self, path: &str, handlers: I) -> Result<(), RegistryError>
    where
        I: IntoIterator<Item = Handler>,
    {
        self.route(RouteMethod::Put, path, handlers)
    }

    pub fn delete<I>(&mut self, path: &str, handlers: I) -> Result<(), RegistryError>
    where
        I: IntoIterator<Item = Handler>,
    {
        self.route(RouteMethod::Delete, path, handlers)
    }

    pub fn patch<I>(&mut self, path: &str, handlers: I) -> Result<(), RegistryError>
    where
        I: IntoIterator<Item = Handler>,
    {
        self.route(RouteMethod::Patch, path, handlers)
    }

    pub fn all<I>(&mut self, path: &str, handlers: I) -> Result<(), RegistryError>
    where
        I: IntoIterator<Item = Handler>,
    {
        self.route(RouteMethod::All, path, handlers)
    }

    /// Run `handlers` ahead of every route under this group.
    pub fn use_handlers<I>(&mut self, handlers: I) -> Result<(), RegistryError>
    where
        I: IntoIterator<Item = Handler>,
    {
        let base = self.full_base_path.clone();
        self.ctx
            .attach_group_handlers(&base, handlers.into_iter().collect())
    }

    /// Open a nested group.
    pub fn group<F>(
        &mut self,
        base_path: &str,
        options: GroupOptions,
        body: F,
    ) -> Result<(), RegistryError>
    where
        F: FnOnce(&mut GroupScope<'_, D>) -> Result<(), RegistryError>,
    {
        self.ctx.run_group(&self.lineage, base_path, options, body)
    }

    pub fn controller(&mut self, name: &str) -> Result<Vec<Handler>, RegistryError> {
        self.ctx.controller(name)
    }

    pub fn middleware(&mut self, name: &str) -> Result<Vec<Handler>, RegistryError> {
        self.ctx.middleware(name)
    }

    pub fn validation(&mut self, name: &str) -> Result<Vec<Handler>, RegistryError> {
        self.ctx.validation(name)
    }
}
