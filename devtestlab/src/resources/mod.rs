//! Reconciler implementations for DevTest Labs resource kinds

pub mod artifact_source;
pub mod lab;
pub mod virtual_machine;
pub mod virtual_network;

pub use artifact_source::ArtifactSourceResource;
pub use lab::LabResource;
pub use virtual_machine::VirtualMachineResource;
pub use virtual_network::VirtualNetworkResource;

use reconcile::{ReconcileError, ResourceKey};

/// Lab name a child resource key is scoped to.
pub(crate) fn lab_of(key: &ResourceKey) -> Result<&str, ReconcileError> {
    key.parent_name().ok_or_else(|| {
        ReconcileError::InvalidDesiredState(format!("{} is not scoped to a lab", key))
    })
}
