//! Artifact source reconciler

use async_trait::async_trait;
use reconcile::{ReconcileError, Reconciler, ResourceKey, Result};

use super::lab_of;
use crate::api::artifact_sources::{ArtifactSource, ArtifactSourceParams};
use crate::api::Client;

/// Reconciles artifact sources nested under a lab.
pub struct ArtifactSourceResource {
    client: Client,
}

impl ArtifactSourceResource {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Reconciler for ArtifactSourceResource {
    type Desired = ArtifactSourceParams;
    type Observed = ArtifactSource;

    async fn get(&self, key: &ResourceKey) -> Result<Option<ArtifactSource>> {
        let lab = lab_of(key)?;
        self.client
            .artifact_sources()
            .get(&key.resource_group, lab, &key.name)
            .await
            .map_err(ReconcileError::api)
    }

    async fn create_or_update(
        &self,
        key: &ResourceKey,
        desired: &ArtifactSourceParams,
    ) -> Result<ArtifactSource> {
        let lab = lab_of(key)?;
        self.client
            .artifact_sources()
            .create_or_update(&key.resource_group, lab, &key.name, desired)
            .await
            .map_err(ReconcileError::api)
    }

    async fn delete(&self, key: &ResourceKey) -> Result<()> {
        let lab = lab_of(key)?;
        self.client
            .artifact_sources()
            .delete(&key.resource_group, lab, &key.name)
            .await
            .map_err(ReconcileError::api)
    }

    /// GET never returns `securityToken`, so the token is stripped from the
    /// desired state before comparison; reapplying an unchanged configuration
    /// with the token set must stay a no-op.
    fn matches(&self, desired: &ArtifactSourceParams, observed: &ArtifactSource) -> Result<bool> {
        let mut desired = serde_json::to_value(desired)?;
        if let Some(props) = desired
            .get_mut("properties")
            .and_then(|p| p.as_object_mut())
        {
            props.remove("securityToken");
        }
        let observed = serde_json::to_value(observed)?;
        Ok(reconcile::diff::subset_match(&desired, &observed))
    }
}
