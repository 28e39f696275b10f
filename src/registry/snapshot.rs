//! Registry snapshot shipped to the devtool.

use std::collections::BTreeMap;
use std::fmt::Write;

use serde::Serialize;

use crate::registry::entry::NamedEntry;
use crate::registry::manifest::LoadedModule;
use crate::registry::tree::Group;

/// Point-in-time copy of everything registered.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrySnapshot {
    pub roots: Vec<Group>,
    pub controllers: BTreeMap<String, NamedEntry>,
    pub middlewares: BTreeMap<String, NamedEntry>,
    pub validations: BTreeMap<String, NamedEntry>,
    pub config: Option<serde_json::Value>,
    pub modules: Vec<LoadedModule>,
}

impl RegistrySnapshot {
    pub fn route_count(&self) -> usize {
        self.roots.iter().map(Group::route_count).sum()
    }

    /// Indented plain-text summary of groups, routes and entries.
    pub fn outline(&self) -> String {
        let mut out = String::new();

        out.push_str("Groups:\n");
        for group in &self.roots {
            outline_group(&mut out, group, 1);
        }

        for (title, entries) in [
            ("Controllers", &self.controllers),
            ("Middlewares", &self.middlewares),
            ("Validations", &self.validations),
        ] {
            let _ = writeln!(out, "{title}:");
            for (name, entry) in entries {
                let global = if entry.is_global { " (global)" } else { "" };
                let _ = writeln!(out, "  - {name}{global}");
                if !entry.used_in.is_empty() {
                    let used: Vec<&str> = entry.used_in.iter().map(String::as_str).collect();
                    let _ = writeln!(out, "    used in: [{}]", used.join(", "));
                }
            }
        }
        out
    }
}

fn outline_group(out: &mut String, group: &Group, level: usize) {
    let indent = "  ".repeat(level);
    let _ = writeln!(out, "{indent}- {}", group.base_path);
    if !group.params.is_empty() {
        let _ = writeln!(out, "{indent}  params: [{}]", group.params.join(", "));
    }
    if !group.middlewares.is_empty() {
        let _ = writeln!(out, "{indent}  middlewares: [{}]", group.middlewares.join(", "));
    }
    if !group.validations.is_empty() {
        let _ = writeln!(out, "{indent}  validations: [{}]", group.validations.join(", "));
    }

    for route in &group.routes {
        let controllers: Vec<&str> = route.controllers.iter().map(|c| c.name.as_str()).collect();
        let mut line = format!("{indent}  {} {}", route.method, route.full_path);
        if !controllers.is_empty() {
            let _ = write!(line, " -> [{}]", controllers.join(", "));
        }
        if !route.middlewares.is_empty() {
            let _ = write!(line, " | middlewares: [{}]", route.middlewares.join(", "));
        }
        if !route.validations.is_empty() {
            let _ = write!(line, " | validations: [{}]", route.validations.join(", "));
        }
        out.push_str(&line);
        out.push('\n');
    }

    for child in &group.children {
        outline_group(out, child, level + 1);
    }
}
