//! Composite keys addressing remote resources

use std::fmt;

/// Identifies a resource instance: resource group, parent chain, name.
///
/// Top-level resources have an empty parent chain; child resources carry the
/// names of their ancestors in order (e.g. a virtual network keyed under its
/// lab has `parents == ["my-lab"]`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceKey {
    pub resource_group: String,
    pub parents: Vec<String>,
    pub name: String,
}

impl ResourceKey {
    /// Key for a top-level resource in a resource group.
    pub fn new(resource_group: &str, name: &str) -> Self {
        Self {
            resource_group: resource_group.to_string(),
            parents: Vec::new(),
            name: name.to_string(),
        }
    }

    /// Key for a resource nested under a parent chain.
    pub fn nested(resource_group: &str, parents: &[&str], name: &str) -> Self {
        Self {
            resource_group: resource_group.to_string(),
            parents: parents.iter().map(|p| p.to_string()).collect(),
            name: name.to_string(),
        }
    }

    /// Key for a resource one level below this one.
    pub fn child(&self, name: &str) -> Self {
        let mut parents = self.parents.clone();
        parents.push(self.name.clone());
        Self {
            resource_group: self.resource_group.clone(),
            parents,
            name: name.to_string(),
        }
    }

    /// Name of the immediate parent, if any.
    pub fn parent_name(&self) -> Option<&str> {
        self.parents.last().map(|p| p.as_str())
    }
}

impl fmt::Display for ResourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.resource_group)?;
        for parent in &self.parents {
            write!(f, "/{}", parent)?;
        }
        write!(f, "/{}", self.name)
    }
}
