//! Azure DevTest Labs reconciliation contract validator
//!
//! Drives the `reconcile` apply contract against real (or mocked) Azure
//! DevTest Labs resources: labs, lab virtual networks, artifact sources,
//! and lab virtual machines.

pub mod api;
pub mod config;
pub mod resources;
pub mod scenarios;

pub use config::{Config, ConfigError};
