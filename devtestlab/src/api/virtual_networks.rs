//! Lab virtual network API implementation

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::client::Client;
use super::common::{wait_for_deletion, wait_for_provisioning, Provisioned};
use super::error::ApiError;

/// Whether lab virtual machines in a subnet may get public IPs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UsagePermission {
    Default,
    Deny,
    Allow,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AllowedSubnet {
    #[serde(rename = "resourceId", skip_serializing_if = "Option::is_none")]
    pub resource_id: Option<String>,
    #[serde(rename = "labSubnetName", skip_serializing_if = "Option::is_none")]
    pub lab_subnet_name: Option<String>,
    #[serde(rename = "allowPublicIp", skip_serializing_if = "Option::is_none")]
    pub allow_public_ip: Option<UsagePermission>,
}

/// Desired virtual network configuration; doubles as the PUT request body.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VirtualNetworkParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<BTreeMap<String, String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<VirtualNetworkPropertiesParams>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VirtualNetworkPropertiesParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "allowedSubnets", skip_serializing_if = "Option::is_none")]
    pub allowed_subnets: Option<Vec<AllowedSubnet>>,
}

/// Virtual network as returned by GET.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VirtualNetwork {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<BTreeMap<String, String>>,
    pub properties: VirtualNetworkProperties,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VirtualNetworkProperties {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "allowedSubnets", skip_serializing_if = "Option::is_none")]
    pub allowed_subnets: Option<Vec<AllowedSubnet>>,
    #[serde(
        rename = "externalProviderResourceId",
        skip_serializing_if = "Option::is_none"
    )]
    pub external_provider_resource_id: Option<String>,
    #[serde(rename = "provisioningState", skip_serializing_if = "Option::is_none")]
    pub provisioning_state: Option<String>,
    #[serde(rename = "uniqueIdentifier", skip_serializing_if = "Option::is_none")]
    pub unique_identifier: Option<String>,
    #[serde(rename = "createdDate", skip_serializing_if = "Option::is_none")]
    pub created_date: Option<String>,
}

impl Provisioned for VirtualNetwork {
    fn provisioning_state(&self) -> Option<&str> {
        self.properties.provisioning_state.as_deref()
    }
}

/// Virtual networks API for lab virtual network operations
pub struct VirtualNetworksApi<'a> {
    client: &'a Client,
}

impl<'a> VirtualNetworksApi<'a> {
    pub fn new(client: &'a Client) -> Self {
        Self { client }
    }

    fn path(&self, resource_group: &str, lab: &str, name: &str) -> String {
        format!(
            "{}/labs/{}/virtualnetworks/{}",
            self.client.provider_path(resource_group),
            lab,
            name
        )
    }

    /// GET .../labs/{lab}/virtualnetworks/{name}
    pub async fn get(
        &self,
        resource_group: &str,
        lab: &str,
        name: &str,
    ) -> Result<Option<VirtualNetwork>, ApiError> {
        self.client
            .get_optional(&self.path(resource_group, lab, name))
            .await
    }

    /// PUT .../labs/{lab}/virtualnetworks/{name}, then poll until settled.
    pub async fn create_or_update(
        &self,
        resource_group: &str,
        lab: &str,
        name: &str,
        params: &VirtualNetworkParams,
    ) -> Result<VirtualNetwork, ApiError> {
        let path = self.path(resource_group, lab, name);
        let created: VirtualNetwork = self.client.put(&path, params).await?;
        if matches!(created.provisioning_state(), None | Some("Succeeded")) {
            return Ok(created);
        }
        wait_for_provisioning(self.client.poll_config(), &path, || {
            self.client.get_optional::<VirtualNetwork>(&path)
        })
        .await
    }

    /// DELETE .../labs/{lab}/virtualnetworks/{name}, then poll until gone.
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
                    .get_optional::<VirtualNetwork>(&path)
                    .await?
                    .is_some(),
            )
        })
        .await
    }
}
