//! Environment-sourced validator configuration

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} is required (set the environment variable)")]
    Missing(&'static str),
}

/// Settings for a validator run, read from the environment.
#[derive(Debug, Clone)]
pub struct Config {
    pub subscription_id: String,
    pub access_token: String,
    pub resource_group: String,
    /// Azure Resource Manager endpoint; defaults to the public cloud.
    pub endpoint: Option<String>,
    /// Region fixture resources are created in.
    pub location: String,
    /// Personal access token forwarded to artifact source steps.
    pub security_token: Option<String>,
    /// Suffix appended to fixture resource names so concurrent runs
    /// against the same resource group do not collide.
    pub run_id: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            subscription_id: required("AZURE_SUBSCRIPTION_ID")?,
            access_token: required("AZURE_ACCESS_TOKEN")?,
            resource_group: required("AZURE_RESOURCE_GROUP")?,
            endpoint: std::env::var("DTL_ENDPOINT").ok(),
            location: std::env::var("DTL_LOCATION").unwrap_or_else(|_| "eastus".to_string()),
            security_token: std::env::var("DTL_SECURITY_TOKEN").ok(),
            run_id: std::env::var("DTL_RUN_ID").ok(),
        })
    }

    /// Fixture name with the run suffix applied, e.g. `contract-lab-ci42`.
    pub fn fixture_name(&self, base: &str) -> String {
        match &self.run_id {
            Some(run_id) => format!("{}-{}", base, run_id),
            None => base.to_string(),
        }
    }
}

fn required(name: &'static str) -> Result<String, ConfigError> {
    match std::env::var(name) {
        Ok(value) if !value.is_empty() => Ok(value),
        _ => Err(ConfigError::Missing(name)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn clear_env() {
        for name in [
            "AZURE_SUBSCRIPTION_ID",
            "AZURE_ACCESS_TOKEN",
            "AZURE_RESOURCE_GROUP",
            "DTL_ENDPOINT",
            "DTL_LOCATION",
            "DTL_SECURITY_TOKEN",
            "DTL_RUN_ID",
        ] {
            std::env::remove_var(name);
        }
    }

    #[test]
    #[serial]
    fn reads_complete_environment() {
        clear_env();
        std::env::set_var("AZURE_SUBSCRIPTION_ID", "sub-1");
        std::env::set_var("AZURE_ACCESS_TOKEN", "token");
        std::env::set_var("AZURE_RESOURCE_GROUP", "rg");
        std::env::set_var("DTL_RUN_ID", "ci42");

        let config = Config::from_env().unwrap();
        assert_eq!(config.subscription_id, "sub-1");
        assert_eq!(config.resource_group, "rg");
        assert!(config.endpoint.is_none());
        assert_eq!(config.location, "eastus");
        assert_eq!(config.fixture_name("contract-lab"), "contract-lab-ci42");

        clear_env();
    }

    #[test]
    #[serial]
    fn missing_subscription_is_an_error() {
        clear_env();
        std::env::set_var("AZURE_ACCESS_TOKEN", "token");
        std::env::set_var("AZURE_RESOURCE_GROUP", "rg");

        let err = Config::from_env().unwrap_err();
        assert!(err.to_string().contains("AZURE_SUBSCRIPTION_ID"));

        clear_env();
    }

    #[test]
    #[serial]
    fn empty_values_count_as_missing() {
        clear_env();
        std::env::set_var("AZURE_SUBSCRIPTION_ID", "");
        std::env::set_var("AZURE_ACCESS_TOKEN", "token");
        std::env::set_var("AZURE_RESOURCE_GROUP", "rg");

        assert!(Config::from_env().is_err());

        clear_env();
    }

    #[test]
    #[serial]
    fn fixture_name_without_run_id_is_the_base() {
        clear_env();
        std::env::set_var("AZURE_SUBSCRIPTION_ID", "sub-1");
        std::env::set_var("AZURE_ACCESS_TOKEN", "token");
        std::env::set_var("AZURE_RESOURCE_GROUP", "rg");

        let config = Config::from_env().unwrap();
        assert_eq!(config.fixture_name("contract-lab"), "contract-lab");

        clear_env();
    }
}
