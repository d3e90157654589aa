//! Artifact source API implementation

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::client::Client;
use super::common::{wait_for_deletion, wait_for_provisioning, EnabledStatus, Provisioned};
use super::error::ApiError;

/// Backing source control of an artifact source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SourceControlType {
    GitHub,
    VsoGit,
    StorageAccount,
}

/// Desired artifact source configuration; doubles as the PUT request body.
///
/// `securityToken` is write-only: GET never returns it, so it must not be
/// part of any drift comparison.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ArtifactSourceParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<BTreeMap<String, String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<ArtifactSourcePropertiesParams>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ArtifactSourcePropertiesParams {
    #[serde(rename = "displayName", skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
    #[serde(rename = "sourceType", skip_serializing_if = "Option::is_none")]
    pub source_type: Option<SourceControlType>,
    #[serde(rename = "folderPath", skip_serializing_if = "Option::is_none")]
    pub folder_path: Option<String>,
    #[serde(
        rename = "armTemplateFolderPath",
        skip_serializing_if = "Option::is_none"
    )]
    pub arm_template_folder_path: Option<String>,
    #[serde(rename = "branchRef", skip_serializing_if = "Option::is_none")]
    pub branch_ref: Option<String>,
    #[serde(rename = "securityToken", skip_serializing_if = "Option::is_none")]
    pub security_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<EnabledStatus>,
}

/// Artifact source as returned by GET.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactSource {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<BTreeMap<String, String>>,
    pub properties: ArtifactSourceProperties,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactSourceProperties {
    #[serde(rename = "displayName", skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
    #[serde(rename = "sourceType", skip_serializing_if = "Option::is_none")]
    pub source_type: Option<SourceControlType>,
    #[serde(rename = "folderPath", skip_serializing_if = "Option::is_none")]
    pub folder_path: Option<String>,
    #[serde(
        rename = "armTemplateFolderPath",
        skip_serializing_if = "Option::is_none"
    )]
    pub arm_template_folder_path: Option<String>,
    #[serde(rename = "branchRef", skip_serializing_if = "Option::is_none")]
    pub branch_ref: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<EnabledStatus>,
    #[serde(rename = "provisioningState", skip_serializing_if = "Option::is_none")]
    pub provisioning_state: Option<String>,
    #[serde(rename = "uniqueIdentifier", skip_serializing_if = "Option::is_none")]
    pub unique_identifier: Option<String>,
    #[serde(rename = "createdDate", skip_serializing_if = "Option::is_none")]
    pub created_date: Option<String>,
}

impl Provisioned for ArtifactSource {
    fn provisioning_state(&self) -> Option<&str> {
        self.properties.provisioning_state.as_deref()
    }
}

/// Artifact sources API for artifact source operations
pub struct ArtifactSourcesApi<'a> {
    client: &'a Client,
}

impl<'a> ArtifactSourcesApi<'a> {
    pub fn new(client: &'a Client) -> Self {
        Self { client }
    }

    fn path(&self, resource_group: &str, lab: &str, name: &str) -> String {
        format!(
            "{}/labs/{}/artifactsources/{}",
            self.client.provider_path(resource_group),
            lab,
            name
        )
    }

    /// GET .../labs/{lab}/artifactsources/{name}
    pub async fn get(
        &self,
        resource_group: &str,
        lab: &str,
        name: &str,
    ) -> Result<Option<ArtifactSource>, ApiError> {
        self.client
            .get_optional(&self.path(resource_group, lab, name))
            .await
    }

    /// PUT .../labs/{lab}/artifactsources/{name}, then poll until settled.
    pub async fn create_or_update(
        &self,
        resource_group: &str,
        lab: &str,
        name: &str,
        params: &ArtifactSourceParams,
    ) -> Result<ArtifactSource, ApiError> {
        let path = self.path(resource_group, lab, name);
        let created: ArtifactSource = self.client.put(&path, params).await?;
        if matches!(created.provisioning_state(), None | Some("Succeeded")) {
            return Ok(created);
        }
        wait_for_provisioning(self.client.poll_config(), &path, || {
            self.client.get_optional::<ArtifactSource>(&path)
        })
        .await
    }

    /// DELETE .../labs/{lab}/artifactsources/{name}, then poll until gone.
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
                    .get_optional::<ArtifactSource>(&path)
                    .await?
                    .is_some(),
            )
        })
        .await
    }
}
