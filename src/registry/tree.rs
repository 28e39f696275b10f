//! The group tree and its open-group stack.
//!
//! Groups nest exactly as `group` calls nest. While a group body runs, the
//! group sits on top of the open stack and every route or nested group is
//! attached to it.

use serde::Serialize;
use uuid::Uuid;

use crate::registry::error::RegistryError;
use crate::routing::RouteMethod;

/// Controller reference recorded on a route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteController {
    pub name: String,
    pub id: String,
}

impl RouteController {
    /// Placeholder for inline handlers no store knows about.
    pub fn anonymous() -> Self {
        Self {
            name: "anonymous".to_string(),
            id: "anonymous".to_string(),
        }
    }
}

/// A registered (method, path) pair.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Route {
    pub id: Uuid,
    pub method: RouteMethod,
    /// Path as given, relative to the group.
    pub path: String,
    pub full_path: String,
    pub controllers: Vec<RouteController>,
    pub middlewares: Vec<String>,
    pub validations: Vec<String>,
}

/// A path-prefixed scope of routes and nested groups.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    pub id: Uuid,
    pub base_path: String,
    pub description: String,
    pub params: Vec<String>,
    pub expected_query: Vec<String>,
    pub middlewares: Vec<String>,
    pub validations: Vec<String>,
    pub routes: Vec<Route>,
    pub children: Vec<Group>,
}

impl Group {
    pub(crate) fn new(base_path: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            base_path,
            description: String::new(),
            params: Vec::new(),
            expected_query: Vec::new(),
            middlewares: Vec::new(),
            validations: Vec::new(),
            routes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Number of routes in this group and every descendant.
    pub fn route_count(&self) -> usize {
        self.routes.len() + self.children.iter().map(Group::route_count).sum::<usize>()
    }
}

#[derive(Debug, Clone)]
struct OpenFrame {
    index: usize,
    segment: String,
}

/// Rooted forest of groups plus the stack of currently open groups.
#[derive(Debug, Default)]
pub struct GroupTree {
    roots: Vec<Group>,
    open: Vec<OpenFrame>,
}

impl GroupTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn roots(&self) -> &[Group] {
        &self.roots
    }

    /// Number of currently open groups.
    pub fn depth(&self) -> usize {
        self.open.len()
    }

    /// Raw segments of the open groups, outermost first.
    pub fn open_segments(&self) -> Vec<&str> {
        self.open.iter().map(|frame| frame.segment.as_str()).collect()
    }

    /// Attach `group` under the innermost open group (or as a root) and open it.
    pub fn enter(&mut self, group: Group, segment: &str) {
        let index = match self.current_mut() {
            Some(parent) => {
                parent.children.push(group);
                parent.children.len() - 1
            }
            None => {
                self.roots.push(group);
                self.roots.len() - 1
            }
        };
        self.open.push(OpenFrame {
            index,
            segment: segment.to_string(),
        });
    }

    /// Close the innermost open group.
    pub fn exit(&mut self) -> Result<(), RegistryError> {
        self.open
            .pop()
            .map(|_| ())
            .ok_or_else(|| RegistryError::InvalidArgument("no group is open".to_string()))
    }

    pub fn current(&self) -> Option<&Group> {
        let (first, rest) = self.open.split_first()?;
        let mut group = self.roots.get(first.index)?;
        for frame in rest {
            group = group.children.get(frame.index)?;
        }
        Some(group)
    }

    pub fn current_mut(&mut self) -> Option<&mut Group> {
        let (first, rest) = self.open.split_first()?;
        let mut group = self.roots.get_mut(first.index)?;
        for frame in rest {
            group = group.children.get_mut(frame.index)?;
        }
        Some(group)
    }

    /// Depth-first iterator over every group.
    pub fn walk(&self) -> Vec<&Group> {
        fn visit<'a>(groups: &'a [Group], out: &mut Vec<&'a Group>) {
            for group in groups {
                out.push(group);
                visit(&group.children, out);
            }
        }
        let mut out = Vec::new();
        visit(&self.roots, &mut out);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nesting_follows_stack() {
        let mut tree = GroupTree::new();
        tree.enter(Group::new("/api".into()), "/api");
        tree.enter(Group::new("/api/v1".into()), "/v1");
        assert_eq!(tree.current().unwrap().base_path, "/api/v1");
        assert_eq!(tree.open_segments(), vec!["/api", "/v1"]);
        tree.exit().unwrap();
        tree.enter(Group::new("/api/v2".into()), "/v2");
        tree.exit().unwrap();
        tree.exit().unwrap();
        tree.enter(Group::new("/status".into()), "/status");
        tree.exit().unwrap();

        assert_eq!(tree.depth(), 0);
        assert_eq!(tree.roots().len(), 2);
        let children: Vec<_> = tree.roots()[0]
            .children
            .iter()
            .map(|g| g.base_path.as_str())
            .collect();
        assert_eq!(children, vec!["/api/v1", "/api/v2"]);
        let walked: Vec<_> = tree.walk().iter().map(|g| g.base_path.as_str()).collect();
        assert_eq!(walked, vec!["/api", "/api/v1", "/api/v2", "/status"]);
    }

    #[test]
    fn test_exit_without_open_group_fails() {
        let mut tree = GroupTree::new();
        assert!(matches!(tree.exit(), Err(RegistryError::InvalidArgument(_))));
        assert!(tree.current().is_none());
    }
}
