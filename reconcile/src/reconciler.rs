//! The reconciler trait and its apply state machine

use async_trait::async_trait;
use serde::Serialize;

use crate::diff;
use crate::error::Result;
use crate::key::ResourceKey;
use crate::types::{ChangeResult, Desired};

/// Converges a remote resource to a declared desired state.
///
/// Implementations supply the raw operations (`get`, `create_or_update`,
/// `delete`); `apply` drives them through the only permitted transitions:
/// absent -> present (create), present -> present (update or no-op),
/// present -> absent (delete), absent -> absent (delete no-op).
#[async_trait]
pub trait Reconciler: Send + Sync {
    /// Desired configuration, shaped like the provider's request body.
    type Desired: Serialize + Send + Sync;
    /// Observed remote state, including provider-assigned fields.
    type Observed: Serialize + Send + Sync;

    /// Fetch the current remote state; `None` when the resource is absent.
    async fn get(&self, key: &ResourceKey) -> Result<Option<Self::Observed>>;

    /// Create the resource, or push the desired configuration onto an
    /// existing one. Attributes omitted from `desired` must be left as-is.
    async fn create_or_update(
        &self,
        key: &ResourceKey,
        desired: &Self::Desired,
    ) -> Result<Self::Observed>;

    /// Delete the resource. Only invoked when it currently exists.
    async fn delete(&self, key: &ResourceKey) -> Result<()>;

    /// Whether the observed state satisfies the desired configuration for the
    /// attributes this reconciler manages.
    ///
    /// The default compares the serialized desired configuration as a partial
    /// structure against the serialized observed state. Implementations
    /// override this to exclude write-only attributes (secrets the API never
    /// reads back) from the comparison.
    fn matches(&self, desired: &Self::Desired, observed: &Self::Observed) -> Result<bool> {
        let desired = serde_json::to_value(desired)?;
        let observed = serde_json::to_value(observed)?;
        Ok(diff::subset_match(&desired, &observed))
    }

    /// Converge the resource at `key` to `desired` and report whether anything
    /// changed.
    ///
    /// With `dry_run` the decision is computed from `get` alone and no
    /// mutating call is issued, but `changed` is reported exactly as a real
    /// apply would report it.
    async fn apply(
        &self,
        key: &ResourceKey,
        desired: &Desired<Self::Desired>,
        dry_run: bool,
    ) -> Result<ChangeResult<Self::Observed>> {
        let current = self.get(key).await?;

        match (desired, current) {
            (Desired::Absent, None) => {
                tracing::debug!("{} already absent, nothing to delete", key);
                Ok(ChangeResult {
                    changed: false,
                    resource: None,
                })
            }
            (Desired::Absent, Some(_)) => {
                if dry_run {
                    tracing::debug!("{} would be deleted (dry run)", key);
                } else {
                    self.delete(key).await?;
                    tracing::debug!("{} deleted", key);
                }
                Ok(ChangeResult {
                    changed: true,
                    resource: None,
                })
            }
            (Desired::Present(config), None) => {
                if dry_run {
                    tracing::debug!("{} would be created (dry run)", key);
                    return Ok(ChangeResult {
                        changed: true,
                        resource: None,
                    });
                }
                let observed = self.create_or_update(key, config).await?;
                tracing::debug!("{} created", key);
                Ok(ChangeResult {
                    changed: true,
                    resource: Some(observed),
                })
            }
            (Desired::Present(config), Some(current)) => {
                if self.matches(config, &current)? {
                    tracing::debug!("{} unchanged", key);
                    return Ok(ChangeResult {
                        changed: false,
                        resource: Some(current),
                    });
                }
                if dry_run {
                    tracing::debug!("{} would be updated (dry run)", key);
                    return Ok(ChangeResult {
                        changed: true,
                        resource: Some(current),
                    });
                }
                let observed = self.create_or_update(key, config).await?;
                tracing::debug!("{} updated", key);
                Ok(ChangeResult {
                    changed: true,
                    resource: Some(observed),
                })
            }
        }
    }
}
