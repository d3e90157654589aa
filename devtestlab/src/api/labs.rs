//! Lab API implementation

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::client::Client;
use super::common::{wait_for_deletion, wait_for_provisioning, EnabledStatus, Provisioned};
use super::error::ApiError;

/// Lab storage tier; also used for virtual machine disks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StorageType {
    Standard,
    Premium,
    StandardSSD,
}

/// Desired lab configuration; doubles as the PUT request body.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LabParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<BTreeMap<String, String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<LabPropertiesParams>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LabPropertiesParams {
    #[serde(rename = "labStorageType", skip_serializing_if = "Option::is_none")]
    pub lab_storage_type: Option<StorageType>,
    #[serde(rename = "premiumDataDisks", skip_serializing_if = "Option::is_none")]
    pub premium_data_disks: Option<EnabledStatus>,
}

/// Lab as returned by GET, including provider-assigned fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lab {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<BTreeMap<String, String>>,
    pub properties: LabProperties,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabProperties {
    #[serde(rename = "labStorageType", skip_serializing_if = "Option::is_none")]
    pub lab_storage_type: Option<StorageType>,
    #[serde(rename = "premiumDataDisks", skip_serializing_if = "Option::is_none")]
    pub premium_data_disks: Option<EnabledStatus>,
    #[serde(rename = "provisioningState", skip_serializing_if = "Option::is_none")]
    pub provisioning_state: Option<String>,
    #[serde(rename = "uniqueIdentifier", skip_serializing_if = "Option::is_none")]
    pub unique_identifier: Option<String>,
    #[serde(rename = "createdDate", skip_serializing_if = "Option::is_none")]
    pub created_date: Option<String>,
    #[serde(
        rename = "artifactsStorageAccount",
        skip_serializing_if = "Option::is_none"
    )]
    pub artifacts_storage_account: Option<String>,
    #[serde(rename = "vaultName", skip_serializing_if = "Option::is_none")]
    pub vault_name: Option<String>,
}

impl Provisioned for Lab {
    fn provisioning_state(&self) -> Option<&str> {
        self.properties.provisioning_state.as_deref()
    }
}

/// Labs API for lab operations
pub struct LabsApi<'a> {
    client: &'a Client,
}

impl<'a> LabsApi<'a> {
    pub fn new(client: &'a Client) -> Self {
        Self { client }
    }

    fn path(&self, resource_group: &str, name: &str) -> String {
        format!("{}/labs/{}", self.client.provider_path(resource_group), name)
    }

    /// GET .../labs/{name}
    pub async fn get(&self, resource_group: &str, name: &str) -> Result<Option<Lab>, ApiError> {
        self.client
            .get_optional(&self.path(resource_group, name))
            .await
    }

    /// PUT .../labs/{name}, then poll until provisioning settles.
    pub async fn create_or_update(
        &self,
        resource_group: &str,
        name: &str,
        params: &LabParams,
    ) -> Result<Lab, ApiError> {
        let path = self.path(resource_group, name);
        let created: Lab = self.client.put(&path, params).await?;
        if matches!(created.provisioning_state(), None | Some("Succeeded")) {
            return Ok(created);
        }
        wait_for_provisioning(self.client.poll_config(), &path, || {
            self.client.get_optional::<Lab>(&path)
        })
        .await
    }

    /// DELETE .../labs/{name}, then poll until the resource stops resolving.
    pub async fn delete(&self, resource_group: &str, name: &str) -> Result<(), ApiError> {
        let path = self.path(resource_group, name);
        self.client.delete(&path).await?;
        wait_for_deletion(self.client.poll_config(), &path, || async {
            Ok::<_, ApiError>(self.client.get_optional::<Lab>(&path).await?.is_some())
        })
        .await
    }
}
