//! Lab reconciler

use async_trait::async_trait;
use reconcile::{ReconcileError, Reconciler, ResourceKey, Result};

use crate::api::labs::{Lab, LabParams};
use crate::api::Client;

/// Reconciles DevTest Labs lab instances.
pub struct LabResource {
    client: Client,
}

impl LabResource {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Reconciler for LabResource {
    type Desired = LabParams;
    type Observed = Lab;

    async fn get(&self, key: &ResourceKey) -> Result<Option<Lab>> {
        self.client
            .labs()
            .get(&key.resource_group, &key.name)
            .await
            .map_err(ReconcileError::api)
    }

    async fn create_or_update(&self, key: &ResourceKey, desired: &LabParams) -> Result<Lab> {
        self.client
            .labs()
            .create_or_update(&key.resource_group, &key.name, desired)
            .await
            .map_err(ReconcileError::api)
    }

    async fn delete(&self, key: &ResourceKey) -> Result<()> {
        self.client
            .labs()
            .delete(&key.resource_group, &key.name)
            .await
            .map_err(ReconcileError::api)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::client::RetryConfig;
    use crate::api::common::PollConfig;
    use crate::api::labs::{LabPropertiesParams, StorageType};
    use crate::api::EnabledStatus;
    use mockito::{Matcher, Server, ServerGuard};
    use reconcile::Desired;

    const LAB_PATH: &str =
        "/subscriptions/sub-1/resourceGroups/rg/providers/Microsoft.DevTestLab/labs/contract-lab";

    fn test_client(server: &ServerGuard) -> Client {
        Client::with_config(
            &server.url(),
            "sub-1",
            "token",
            RetryConfig {
                max_retries: 0,
                initial_backoff_ms: 1,
                max_backoff_ms: 1,
                timeout_seconds: 5,
            },
            PollConfig {
                interval: std::time::Duration::from_millis(1),
                max_attempts: 3,
            },
        )
        .unwrap()
    }

    fn key() -> ResourceKey {
        ResourceKey::new("rg", "contract-lab")
    }

    fn desired(premium: EnabledStatus) -> LabParams {
        LabParams {
            location: Some("eastus".to_string()),
            tags: None,
            properties: Some(LabPropertiesParams {
                lab_storage_type: Some(StorageType::Standard),
                premium_data_disks: Some(premium),
            }),
        }
    }

    fn lab_body(premium: &str) -> String {
        format!(
            r#"{{
                "id": "{LAB_PATH}",
                "name": "contract-lab",
                "location": "eastus",
                "properties": {{
                    "labStorageType": "Standard",
                    "premiumDataDisks": "{premium}",
                    "provisioningState": "Succeeded"
                }}
            }}"#
        )
    }

    #[tokio::test]
    async fn creates_when_absent_and_reports_changed() {
        let mut server = Server::new_async().await;
        let absent = server
            .mock("GET", LAB_PATH)
            .match_query(Matcher::Any)
            .with_status(404)
            .with_body(r#"{"error":{"code":"ResourceNotFound","message":"not found"}}"#)
            .expect(1)
            .create_async()
            .await;
        let put = server
            .mock("PUT", LAB_PATH)
            .match_query(Matcher::Any)
            .with_status(201)
            .with_body(lab_body("Disabled"))
            .expect(1)
            .create_async()
            .await;

        let resource = LabResource::new(test_client(&server));
        let result = resource
            .apply(&key(), &Desired::Present(desired(EnabledStatus::Disabled)), false)
            .await
            .unwrap();

        assert!(result.changed);
        assert_eq!(result.resource.unwrap().name, "contract-lab");
        absent.assert_async().await;
        put.assert_async().await;
    }

    #[tokio::test]
    async fn dry_run_create_reports_changed_without_putting() {
        let mut server = Server::new_async().await;
        let _absent = server
            .mock("GET", LAB_PATH)
            .match_query(Matcher::Any)
            .with_status(404)
            .with_body(r#"{"error":{"code":"ResourceNotFound","message":"not found"}}"#)
            .create_async()
            .await;
        let put = server
            .mock("PUT", LAB_PATH)
            .match_query(Matcher::Any)
            .expect(0)
            .create_async()
            .await;

        let resource = LabResource::new(test_client(&server));
        let dry = resource
            .apply(&key(), &Desired::Present(desired(EnabledStatus::Disabled)), true)
            .await
            .unwrap();

        assert!(dry.changed);
        assert!(dry.resource.is_none());
        put.assert_async().await;
    }

    #[tokio::test]
    async fn reapply_of_matching_state_is_a_no_op() {
        let mut server = Server::new_async().await;
        let _get = server
            .mock("GET", LAB_PATH)
            .match_query(Matcher::Any)
            .with_body(lab_body("Disabled"))
            .create_async()
            .await;
        let put = server
            .mock("PUT", LAB_PATH)
            .match_query(Matcher::Any)
            .with_body(lab_body("Disabled"))
            .expect(0)
            .create_async()
            .await;

        let resource = LabResource::new(test_client(&server));
        let result = resource
            .apply(&key(), &Desired::Present(desired(EnabledStatus::Disabled)), false)
            .await
            .unwrap();

        assert!(!result.changed);
        put.assert_async().await;
    }

    #[tokio::test]
    async fn toggling_premium_data_disks_updates() {
        let mut server = Server::new_async().await;
        let _get = server
            .mock("GET", LAB_PATH)
            .match_query(Matcher::Any)
            .with_body(lab_body("Disabled"))
            .create_async()
            .await;
        let put = server
            .mock("PUT", LAB_PATH)
            .match_query(Matcher::Any)
            .match_body(Matcher::PartialJson(serde_json::json!({
                "properties": {"premiumDataDisks": "Enabled"}
            })))
            .with_body(lab_body("Enabled"))
            .expect(1)
            .create_async()
            .await;

        let resource = LabResource::new(test_client(&server));
        let result = resource
            .apply(&key(), &Desired::Present(desired(EnabledStatus::Enabled)), false)
            .await
            .unwrap();

        assert!(result.changed);
        put.assert_async().await;
    }

    #[tokio::test]
    async fn delete_of_missing_lab_is_a_no_op() {
        let mut server = Server::new_async().await;
        let _get = server
            .mock("GET", LAB_PATH)
            .match_query(Matcher::Any)
            .with_status(404)
            .with_body(r#"{"error":{"code":"ResourceNotFound","message":"not found"}}"#)
            .create_async()
            .await;
        let delete = server
            .mock("DELETE", LAB_PATH)
            .match_query(Matcher::Any)
            .expect(0)
            .create_async()
            .await;

        let resource = LabResource::new(test_client(&server));
        let result = resource.apply(&key(), &Desired::Absent, false).await.unwrap();

        assert!(!result.changed);
        assert!(result.resource.is_none());
        delete.assert_async().await;
    }

    #[tokio::test]
    async fn dry_run_delete_reports_changed_without_deleting() {
        let mut server = Server::new_async().await;
        let _get = server
            .mock("GET", LAB_PATH)
            .match_query(Matcher::Any)
            .with_body(lab_body("Disabled"))
            .create_async()
            .await;
        let delete = server
            .mock("DELETE", LAB_PATH)
            .match_query(Matcher::Any)
            .expect(0)
            .create_async()
            .await;

        let resource = LabResource::new(test_client(&server));
        let result = resource.apply(&key(), &Desired::Absent, true).await.unwrap();

        assert!(result.changed);
        delete.assert_async().await;
    }
}
