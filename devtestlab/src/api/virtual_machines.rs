//! Lab virtual machine API implementation

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::client::Client;
use super::common::{
    wait_for_deletion, wait_for_provisioning, ApiQueryParams, Provisioned,
};
use super::error::ApiError;
use super::labs::StorageType;

/// Operating system family of a gallery image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OsType {
    Linux,
    Windows,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GalleryImageReference {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub publisher: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,
    #[serde(rename = "osType", skip_serializing_if = "Option::is_none")]
    pub os_type: Option<OsType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactParameter {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactInstall {
    #[serde(rename = "artifactId", skip_serializing_if = "Option::is_none")]
    pub artifact_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Vec<ArtifactParameter>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

/// Desired virtual machine configuration; doubles as the PUT request body.
///
/// `password` and `sshKey` are write-only credentials.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VirtualMachineParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<BTreeMap<String, String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<VirtualMachinePropertiesParams>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VirtualMachinePropertiesParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    #[serde(rename = "userName", skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(rename = "sshKey", skip_serializing_if = "Option::is_none")]
    pub ssh_key: Option<String>,
    #[serde(rename = "labSubnetName", skip_serializing_if = "Option::is_none")]
    pub lab_subnet_name: Option<String>,
    #[serde(
        rename = "labVirtualNetworkId",
        skip_serializing_if = "Option::is_none"
    )]
    pub lab_virtual_network_id: Option<String>,
    #[serde(
        rename = "disallowPublicIpAddress",
        skip_serializing_if = "Option::is_none"
    )]
    pub disallow_public_ip_address: Option<bool>,
    #[serde(rename = "allowClaim", skip_serializing_if = "Option::is_none")]
    pub allow_claim: Option<bool>,
    #[serde(rename = "storageType", skip_serializing_if = "Option::is_none")]
    pub storage_type: Option<StorageType>,
    #[serde(rename = "expirationDate", skip_serializing_if = "Option::is_none")]
    pub expiration_date: Option<String>,
    #[serde(
        rename = "galleryImageReference",
        skip_serializing_if = "Option::is_none"
    )]
    pub gallery_image_reference: Option<GalleryImageReference>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artifacts: Option<Vec<ArtifactInstall>>,
}

/// Virtual machine as returned by GET.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VirtualMachine {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<BTreeMap<String, String>>,
    pub properties: VirtualMachineProperties,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VirtualMachineProperties {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    #[serde(rename = "userName", skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
    #[serde(rename = "labSubnetName", skip_serializing_if = "Option::is_none")]
    pub lab_subnet_name: Option<String>,
    #[serde(
        rename = "labVirtualNetworkId",
        skip_serializing_if = "Option::is_none"
    )]
    pub lab_virtual_network_id: Option<String>,
    #[serde(
        rename = "disallowPublicIpAddress",
        skip_serializing_if = "Option::is_none"
    )]
    pub disallow_public_ip_address: Option<bool>,
    #[serde(rename = "allowClaim", skip_serializing_if = "Option::is_none")]
    pub allow_claim: Option<bool>,
    #[serde(rename = "storageType", skip_serializing_if = "Option::is_none")]
    pub storage_type: Option<StorageType>,
    #[serde(rename = "expirationDate", skip_serializing_if = "Option::is_none")]
    pub expiration_date: Option<String>,
    #[serde(
        rename = "galleryImageReference",
        skip_serializing_if = "Option::is_none"
    )]
    pub gallery_image_reference: Option<GalleryImageReference>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artifacts: Option<Vec<ArtifactInstall>>,
    #[serde(rename = "computeId", skip_serializing_if = "Option::is_none")]
    pub compute_id: Option<String>,
    #[serde(rename = "createdByUser", skip_serializing_if = "Option::is_none")]
    pub created_by_user: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fqdn: Option<String>,
    #[serde(rename = "osType", skip_serializing_if = "Option::is_none")]
    pub os_type: Option<OsType>,
    #[serde(rename = "provisioningState", skip_serializing_if = "Option::is_none")]
    pub provisioning_state: Option<String>,
    #[serde(rename = "uniqueIdentifier", skip_serializing_if = "Option::is_none")]
    pub unique_identifier: Option<String>,
    #[serde(rename = "createdDate", skip_serializing_if = "Option::is_none")]
    pub created_date: Option<String>,
}

impl Provisioned for VirtualMachine {
    fn provisioning_state(&self) -> Option<&str> {
        self.properties.provisioning_state.as_deref()
    }
}

/// Virtual machines API for lab virtual machine operations
pub struct VirtualMachinesApi<'a> {
    client: &'a Client,
}

impl<'a> VirtualMachinesApi<'a> {
    pub fn new(client: &'a Client) -> Self {
        Self { client }
    }

    fn path(&self, resource_group: &str, lab: &str, name: &str) -> String {
        format!(
            "{}/labs/{}/virtualmachines/{}",
            self.client.provider_path(resource_group),
            lab,
            name
        )
    }

    fn expand_params() -> ApiQueryParams {
        ApiQueryParams::new().add("$expand", "properties($expand=artifacts)")
    }

    /// GET .../labs/{lab}/virtualmachines/{name}, expanding installed artifacts.
    pub async fn get(
        &self,
        resource_group: &str,
        lab: &str,
        name: &str,
    ) -> Result<Option<VirtualMachine>, ApiError> {
        self.client
            .get_optional_with_params(&self.path(resource_group, lab, name), &Self::expand_params())
            .await
    }

    /// PUT .../labs/{lab}/virtualmachines/{name}, then poll until settled.
    ///
    /// VM creation is the slowest DevTest Labs operation by far; the poll
    /// interval and attempt cap come from the client's `PollConfig`.
    pub async fn create_or_update(
        &self,
        resource_group: &str,
        lab: &str,
        name: &str,
        params: &VirtualMachineParams,
    ) -> Result<VirtualMachine, ApiError> {
        let path = self.path(resource_group, lab, name);
        let created: VirtualMachine = self.client.put(&path, params).await?;
        if matches!(created.provisioning_state(), None | Some("Succeeded")) {
            return Ok(created);
        }
        let expand = Self::expand_params();
        wait_for_provisioning(self.client.poll_config(), &path, || {
            self.client
                .get_optional_with_params::<VirtualMachine>(&path, &expand)
        })
        .await
    }

    /// DELETE .../labs/{lab}/virtualmachines/{name}, then poll until gone.
    pub async fn delete(
        &self,
        resource_group: &str,
        lab: &str,
        name: &str,
    ) -> Result<(), ApiError> {
        let path = self.path(resource_group, lab, name);
        self.client.delete(&path).await?;
        wait_for_deletion(self.client.poll_config(), &path, || async {
            Ok::<_, ApiError>(
                self.client
                    .get_optional::<VirtualMachine>(&path)
                    .await?
                    .is_some(),
            )
        })
        .await
    }
}
