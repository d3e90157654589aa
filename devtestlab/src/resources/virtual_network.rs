//! Lab virtual network reconciler

use async_trait::async_trait;
use reconcile::{ReconcileError, Reconciler, ResourceKey, Result};

use super::lab_of;
use crate::api::virtual_networks::{VirtualNetwork, VirtualNetworkParams};
use crate::api::Client;

/// Reconciles virtual networks nested under a lab.
pub struct VirtualNetworkResource {
    client: Client,
}

impl VirtualNetworkResource {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Reconciler for VirtualNetworkResource {
    type Desired = VirtualNetworkParams;
    type Observed = VirtualNetwork;

    async fn get(&self, key: &ResourceKey) -> Result<Option<VirtualNetwork>> {
        let lab = lab_of(key)?;
        self.client
            .virtual_networks()
            .get(&key.resource_group, lab, &key.name)
            .await
            .map_err(ReconcileError::api)
    }

    async fn create_or_update(
        &self,
        key: &ResourceKey,
        desired: &VirtualNetworkParams,
    ) -> Result<VirtualNetwork> {
        let lab = lab_of(key)?;
        self.client
            .virtual_networks()
            .create_or_update(&key.resource_group, lab, &key.name, desired)
            .await
            .map_err(ReconcileError::api)
    }

    async fn delete(&self, key: &ResourceKey) -> Result<()> {
        let lab = lab_of(key)?;
        self.client
            .virtual_networks()
            .delete(&key.resource_group, lab, &key.name)
            .await
            .map_err(ReconcileError::api)
    }
}
