//! Explicit registration manifest.
//!
//! Modules are plain factory functions filed under a section. Loading runs
//! controllers, then middlewares, then validations, then routes, so route
//! modules can resolve every name the other sections defined.

use std::fmt;

use serde::Serialize;
use uuid::Uuid;

use crate::registry::context::RegistrationContext;
use crate::registry::error::RegistryError;
use crate::routing::Dispatcher;

/// Manifest section, in load order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ModuleSection {
    Controllers,
    Middlewares,
    Validations,
    Routes,
}

impl ModuleSection {
    pub const LOAD_ORDER: [ModuleSection; 4] = [
        ModuleSection::Controllers,
        ModuleSection::Middlewares,
        ModuleSection::Validations,
        ModuleSection::Routes,
    ];
}

impl fmt::Display for ModuleSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ModuleSection::Controllers => "controllers",
            ModuleSection::Middlewares => "middlewares",
            ModuleSection::Validations => "validations",
            ModuleSection::Routes => "routes",
        };
        f.write_str(s)
    }
}

/// Record of a module that has been loaded.
#[derive(Debug, Clone, Serialize)]
pub struct LoadedModule {
    pub id: Uuid,
    pub section: ModuleSection,
    pub name: String,
}

type ModuleFactory<D> = Box<dyn FnOnce(&mut RegistrationContext<D>) -> Result<(), RegistryError>>;

struct ManifestModule<D: Dispatcher> {
    section: ModuleSection,
    name: String,
    factory: ModuleFactory<D>,
}

/// Ordered list of module factories.
pub struct Manifest<D: Dispatcher> {
    modules: Vec<ManifestModule<D>>,
}

impl<D: Dispatcher> Manifest<D> {
    pub fn new() -> Self {
        Self {
            modules: Vec::new(),
        }
    }

    /// File `factory` under `section`.
    pub fn module<F>(mut self, section: ModuleSection, name: impl Into<String>, factory: F) -> Self
    where
        F: FnOnce(&mut RegistrationContext<D>) -> Result<(), RegistryError> + 'static,
    {
        self.modules.push(ManifestModule {
            section,
            name: name.into(),
            factory: Box::new(factory),
        });
        self
    }

    pub fn controllers<F>(self, name: impl Into<String>, factory: F) -> Self
    where
        F: FnOnce(&mut RegistrationContext<D>) -> Result<(), RegistryError> + 'static,
    {
        self.module(ModuleSection::Controllers, name, factory)
    }

    pub fn middlewares<F>(self, name: impl Into<String>, factory: F) -> Self
    where
        F: FnOnce(&mut RegistrationContext<D>) -> Result<(), RegistryError> + 'static,
    {
        self.module(ModuleSection::Middlewares, name, factory)
    }

    pub fn validations<F>(self, name: impl Into<String>, factory: F) -> Self
    where
        F: FnOnce(&mut RegistrationContext<D>) -> Result<(), RegistryError> + 'static,
    {
        self.module(ModuleSection::Validations, name, factory)
    }

    pub fn routes<F>(self, name: impl Into<String>, factory: F) -> Self
    where
        F: FnOnce(&mut RegistrationContext<D>) -> Result<(), RegistryError> + 'static,
    {
        self.module(ModuleSection::Routes, name, factory)
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// Run every module against `ctx`, stopping at the first failure.
    ///
    /// Returns the number of modules loaded.
    pub fn load(self, ctx: &mut RegistrationContext<D>) -> Result<usize, RegistryError> {
        let mut modules = self.modules;
        // Stable: insertion order is kept within a section.
        modules.sort_by_key(|module| module.section);

        let mut loaded = 0;
        for module in modules {
            tracing::info!(section = %module.section, module = %module.name, "Loading module");
            if let Err(e) = (module.factory)(ctx) {
                tracing::error!(
                    section = %module.section,
                    module = %module.name,
                    error = %e,
                    "Module failed to load"
                );
                return Err(e);
            }
            ctx.record_module(LoadedModule {
                id: Uuid::new_v4(),
                section: module.section,
                name: module.name,
            });
            loaded += 1;
        }
        Ok(loaded)
    }
}

impl<D: Dispatcher> Default for Manifest<D> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::EntryMeta;
    use crate::routing::{Handler, RecordingDispatcher};
    use axum::http::StatusCode;

    fn ok() -> Handler {
        Handler::classic(|_req, _next| async { StatusCode::OK })
    }

    #[test]
    fn test_sections_load_in_fixed_order() {
        let manifest = Manifest::new()
            .routes("status", |ctx: &mut RegistrationContext<RecordingDispatcher>| {
                let ping = ctx.controller("ping")?;
                ctx.group("/status", Default::default(), |g| g.get("/ping", ping))
            })
            .controllers("ping", |ctx| ctx.define_controller("ping", vec![ok()], EntryMeta::new()));

        let mut ctx = RegistrationContext::new(RecordingDispatcher::new());
        assert_eq!(manifest.load(&mut ctx).unwrap(), 2);

        let sections: Vec<_> = ctx.modules().iter().map(|m| m.section).collect();
        assert_eq!(sections, vec![ModuleSection::Controllers, ModuleSection::Routes]);
        let ping = (crate::routing::RouteMethod::Get, "/status/ping", 1);
        assert_eq!(ctx.dispatcher().routes(), vec![ping]);
    }

    #[test]
    fn test_load_stops_at_first_failure() {
        let manifest = Manifest::new()
            .routes("broken", |ctx: &mut RegistrationContext<RecordingDispatcher>| {
                ctx.controller("missing").map(|_| ())
            })
            .routes("never", |_ctx| Ok(()));

        let mut ctx = RegistrationContext::new(RecordingDispatcher::new());
        assert!(matches!(
            manifest.load(&mut ctx),
            Err(RegistryError::NotFound { .. })
        ));
        assert!(ctx.modules().is_empty());
    }
}
