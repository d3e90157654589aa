//! Core types for the reconciliation contract

/// Declared target state for a resource key.
#[derive(Debug, Clone, PartialEq)]
pub enum Desired<T> {
    /// The resource should exist with this configuration.
    Present(T),
    /// The resource should not exist.
    Absent,
}

impl<T> Desired<T> {
    pub fn is_absent(&self) -> bool {
        matches!(self, Desired::Absent)
    }

    pub fn config(&self) -> Option<&T> {
        match self {
            Desired::Present(config) => Some(config),
            Desired::Absent => None,
        }
    }
}

/// Outcome of a single apply.
///
/// `changed` is true iff the resource was (or, under dry-run, would be)
/// created, updated in a managed attribute, or deleted while present.
/// `resource` is the observed state after apply; `None` when the resource is
/// absent or a dry-run create materialized nothing.
#[derive(Debug, Clone)]
pub struct ChangeResult<O> {
    pub changed: bool,
    pub resource: Option<O>,
}
