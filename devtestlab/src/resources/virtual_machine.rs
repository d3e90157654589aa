//! Lab virtual machine reconciler

use async_trait::async_trait;
use reconcile::{ReconcileError, Reconciler, ResourceKey, Result};

use super::lab_of;
use crate::api::virtual_machines::{VirtualMachine, VirtualMachineParams};
use crate::api::Client;

/// Reconciles lab virtual machines nested under a lab.
pub struct VirtualMachineResource {
    client: Client,
}

impl VirtualMachineResource {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Reconciler for VirtualMachineResource {
    type Desired = VirtualMachineParams;
    type Observed = VirtualMachine;

    async fn get(&self, key: &ResourceKey) -> Result<Option<VirtualMachine>> {
        let lab = lab_of(key)?;
        self.client
            .virtual_machines()
            .get(&key.resource_group, lab, &key.name)
            .await
            .map_err(ReconcileError::api)
    }

    async fn create_or_update(
        &self,
        key: &ResourceKey,
        desired: &VirtualMachineParams,
    ) -> Result<VirtualMachine> {
        let lab = lab_of(key)?;
        self.client
            .virtual_machines()
            .create_or_update(&key.resource_group, lab, &key.name, desired)
            .await
            .map_err(ReconcileError::api)
    }

    async fn delete(&self, key: &ResourceKey) -> Result<()> {
        let lab = lab_of(key)?;
        self.client
            .virtual_machines()
            .delete(&key.resource_group, lab, &key.name)
            .await
            .map_err(ReconcileError::api)
    }

    /// `password` and `sshKey` are write-only; GET never echoes them back,
    /// so they are stripped before comparison.
    fn matches(&self, desired: &VirtualMachineParams, observed: &VirtualMachine) -> Result<bool> {
        let mut desired = serde_json::to_value(desired)?;
        if let Some(props) = desired
            .get_mut("properties")
            .and_then(|p| p.as_object_mut())
        {
            props.remove("password");
            props.remove("sshKey");
        }
        let observed = serde_json::to_value(observed)?;
        Ok(reconcile::diff::subset_match(&desired, &observed))
    }
}
