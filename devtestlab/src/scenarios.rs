//! Contract scenario suite for the DevTest Labs resource kinds
//!
//! One scenario per resource kind, each exercising the full lifecycle with
//! exact expectations on the reported change flag: create, idempotent
//! reapply, a dry-run edit that must not mutate, the same edit applied for
//! real, a dry-run delete the resource must survive, the real delete, and a
//! second delete that must be a no-op.

use reconcile::{
    Desired, ReconcileError, Reconciler, Report, ResourceKey, Scenario, ScenarioError, Step,
};
use thiserror::Error;

use crate::api::artifact_sources::{
    ArtifactSourceParams, ArtifactSourcePropertiesParams, SourceControlType,
};
use crate::api::labs::{LabParams, LabPropertiesParams, StorageType};
use crate::api::virtual_machines::{
    GalleryImageReference, OsType, VirtualMachineParams, VirtualMachinePropertiesParams,
};
use crate::api::virtual_networks::{VirtualNetworkParams, VirtualNetworkPropertiesParams};
use crate::api::{Client, EnabledStatus};
use crate::config::Config;
use crate::resources::{
    ArtifactSourceResource, LabResource, VirtualMachineResource, VirtualNetworkResource,
};

#[derive(Debug, Error)]
pub enum SuiteError {
    #[error(transparent)]
    Scenario(#[from] ScenarioError),
    #[error(transparent)]
    Reconcile(#[from] ReconcileError),
    #[error("fixture {0} was not returned by the API after apply")]
    MissingFixture(String),
}

/// Lab lifecycle, ending with the `premiumDataDisks` toggle.
pub fn lab_scenario(location: &str) -> Scenario<LabParams> {
    let base = lab_params(location, EnabledStatus::Disabled);
    let premium = lab_params(location, EnabledStatus::Enabled);
    Scenario::new("lab lifecycle")
        .step(Step::present("create", base.clone(), true))
        .step(Step::present("reapply", base, false))
        .step(Step::present("dry-run premium toggle", premium.clone(), true).dry_run())
        .step(Step::present("premium toggle", premium.clone(), true))
        .step(Step::present("reapply premium", premium, false))
        .step(Step::absent("dry-run delete", true).dry_run())
        .step(Step::absent("delete", true))
        .step(Step::absent("delete again", false))
}

/// Virtual network lifecycle with a description edit, inside a fixture lab.
pub fn virtual_network_scenario(location: &str) -> Scenario<VirtualNetworkParams> {
    let base = vnet_params(location, "contract validation network");
    let edited = vnet_params(location, "contract validation network (edited)");
    Scenario::new("virtual network lifecycle")
        .step(Step::present("create", base.clone(), true))
        .step(Step::present("reapply", base, false))
        .step(Step::present("dry-run description edit", edited.clone(), true).dry_run())
        .step(Step::present("description edit", edited.clone(), true))
        .step(Step::present("reapply edited", edited, false))
        .step(Step::absent("dry-run delete", true).dry_run())
        .step(Step::absent("delete", true))
        .step(Step::absent("delete again", false))
}

/// Artifact source lifecycle with a branch edit. The security token is
/// write-only on the API side, so the reapply steps carry it unchanged and
/// must still report `changed=false`.
pub fn artifact_source_scenario(
    location: &str,
    security_token: Option<&str>,
) -> Scenario<ArtifactSourceParams> {
    let base = artifact_source_params(location, "main", security_token);
    let edited = artifact_source_params(location, "release", security_token);
    Scenario::new("artifact source lifecycle")
        .step(Step::present("create", base.clone(), true))
        .step(Step::present("reapply with token", base, false))
        .step(Step::present("dry-run branch edit", edited.clone(), true).dry_run())
        .step(Step::present("branch edit", edited.clone(), true))
        .step(Step::present("reapply edited", edited, false))
        .step(Step::absent("delete", true))
        .step(Step::absent("delete again", false))
}

/// Virtual machine lifecycle with an `allowClaim` toggle. The machine joins
/// the fixture virtual network identified by `vnet_id`.
pub fn virtual_machine_scenario(
    location: &str,
    vnet_id: &str,
    subnet_name: &str,
) -> Scenario<VirtualMachineParams> {
    let base = vm_params(location, vnet_id, subnet_name, false);
    let claimable = vm_params(location, vnet_id, subnet_name, true);
    Scenario::new("virtual machine lifecycle")
        .step(Step::present("create", base.clone(), true))
        .step(Step::present("reapply", base, false))
        .step(Step::present("dry-run allowClaim toggle", claimable.clone(), true).dry_run())
        .step(Step::present("allowClaim toggle", claimable.clone(), true))
        .step(Step::present("reapply claimable", claimable, false))
        .step(Step::absent("dry-run delete", true).dry_run())
        .step(Step::absent("delete", true))
        .step(Step::absent("delete again", false))
}

fn lab_params(location: &str, premium: EnabledStatus) -> LabParams {
    LabParams {
        location: Some(location.to_string()),
        tags: None,
        properties: Some(LabPropertiesParams {
            lab_storage_type: Some(StorageType::Standard),
            premium_data_disks: Some(premium),
        }),
    }
}

fn vnet_params(location: &str, description: &str) -> VirtualNetworkParams {
    VirtualNetworkParams {
        location: Some(location.to_string()),
        tags: None,
        properties: Some(VirtualNetworkPropertiesParams {
            description: Some(description.to_string()),
            allowed_subnets: None,
        }),
    }
}

fn artifact_source_params(
    location: &str,
    branch: &str,
    security_token: Option<&str>,
) -> ArtifactSourceParams {
    ArtifactSourceParams {
        location: Some(location.to_string()),
        tags: None,
        properties: Some(ArtifactSourcePropertiesParams {
            display_name: Some("Contract validation artifacts".to_string()),
            uri: Some("https://github.com/Azure/azure-devtestlab.git".to_string()),
            source_type: Some(SourceControlType::GitHub),
            folder_path: Some("/Artifacts".to_string()),
            arm_template_folder_path: None,
            branch_ref: Some(branch.to_string()),
            security_token: security_token.map(str::to_string),
            status: Some(EnabledStatus::Enabled),
        }),
    }
}

fn vm_params(
    location: &str,
    vnet_id: &str,
    subnet_name: &str,
    allow_claim: bool,
) -> VirtualMachineParams {
    VirtualMachineParams {
        location: Some(location.to_string()),
        tags: None,
        properties: Some(VirtualMachinePropertiesParams {
            notes: Some("contract validation machine".to_string()),
            size: Some("Standard_B2s".to_string()),
            user_name: Some("dtladmin".to_string()),
            password: None,
            ssh_key: Some("ssh-rsa AAAAB3NzaC1yc2E contract-validator".to_string()),
            lab_subnet_name: Some(subnet_name.to_string()),
            lab_virtual_network_id: Some(vnet_id.to_string()),
            disallow_public_ip_address: Some(true),
            allow_claim: Some(allow_claim),
            storage_type: None,
            expiration_date: None,
            gallery_image_reference: Some(GalleryImageReference {
                offer: Some("0001-com-ubuntu-server-jammy".to_string()),
                publisher: Some("Canonical".to_string()),
                sku: Some("22_04-lts".to_string()),
                os_type: Some(OsType::Linux),
                version: Some("latest".to_string()),
            }),
            artifacts: None,
        }),
    }
}

/// Runs all four scenarios sequentially against one resource group.
///
/// The nested scenarios need a lab to live in, so a fixture lab (and, for
/// the virtual machine, a fixture virtual network) is converged first and
/// torn down last, outside the asserted scenarios.
pub struct Suite {
    client: Client,
    resource_group: String,
    location: String,
    security_token: Option<String>,
    lab_name: String,
    fixture_lab_name: String,
}

impl Suite {
    pub fn new(client: Client, config: &Config) -> Self {
        Self {
            client,
            resource_group: config.resource_group.clone(),
            location: config.location.clone(),
            security_token: config.security_token.clone(),
            lab_name: config.fixture_name("contract-lab"),
            fixture_lab_name: config.fixture_name("contract-fixture-lab"),
        }
    }

    pub async fn run(&self) -> Result<Vec<Report>, SuiteError> {
        let mut reports = Vec::new();

        let labs = LabResource::new(self.client.clone());
        let lab_key = ResourceKey::new(&self.resource_group, &self.lab_name);
        reports.push(lab_scenario(&self.location).run(&labs, &lab_key).await?);

        // Fixture lab for the nested resource scenarios.
        let fixture_key = ResourceKey::new(&self.resource_group, &self.fixture_lab_name);
        tracing::info!("converging fixture lab {}", fixture_key);
        labs.apply(
            &fixture_key,
            &Desired::Present(lab_params(&self.location, EnabledStatus::Disabled)),
            false,
        )
        .await?;

        // The machine scenario joins a fixture network that outlives it;
        // both fixtures are in place before any nested scenario runs.
        let vnets = VirtualNetworkResource::new(self.client.clone());
        let fixture_vnet_key = fixture_key.child("contract-vm-vnet");
        tracing::info!("converging fixture virtual network {}", fixture_vnet_key);
        let fixture_vnet = vnets
            .apply(
                &fixture_vnet_key,
                &Desired::Present(vnet_params(&self.location, "fixture network for vm scenario")),
                false,
            )
            .await?
            .resource
            .ok_or_else(|| SuiteError::MissingFixture(fixture_vnet_key.to_string()))?;

        let vnet_key = fixture_key.child("contract-vnet");
        reports.push(
            virtual_network_scenario(&self.location)
                .run(&vnets, &vnet_key)
                .await?,
        );

        let sources = ArtifactSourceResource::new(self.client.clone());
        let source_key = fixture_key.child("contract-artifacts");
        reports.push(
            artifact_source_scenario(&self.location, self.security_token.as_deref())
                .run(&sources, &source_key)
                .await?,
        );

        let machines = VirtualMachineResource::new(self.client.clone());
        let vm_key = fixture_key.child("contract-vm");
        let subnet_name = format!("{}Subnet", fixture_vnet.name);
        reports.push(
            virtual_machine_scenario(&self.location, &fixture_vnet.id, &subnet_name)
                .run(&machines, &vm_key)
                .await?,
        );

        // Tear the fixtures down last.
        tracing::info!("removing fixture virtual network {}", fixture_vnet_key);
        vnets
            .apply(&fixture_vnet_key, &Desired::Absent, false)
            .await?;
        tracing::info!("removing fixture lab {}", fixture_key);
        labs.apply(&fixture_key, &Desired::Absent, false).await?;

        Ok(reports)
    }
}
