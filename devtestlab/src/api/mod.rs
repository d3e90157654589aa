//! Azure Resource Manager API client for the DevTest Labs provider

pub mod artifact_sources;
pub mod client;
pub mod common;
pub mod error;
pub mod labs;
pub mod virtual_machines;
pub mod virtual_networks;

pub use client::{Client, RetryConfig, DEFAULT_ENDPOINT};
pub use common::{ApiQueryParams, EnabledStatus, PollConfig};
pub use error::ApiError;
