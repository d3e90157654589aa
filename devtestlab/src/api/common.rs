//! Common types and utilities for the Azure Resource Manager API

use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;

use super::error::ApiError;

/// API version sent with every DevTest Labs call.
pub const API_VERSION: &str = "2018-09-15";

/// ARM error envelope: `{"error": {"code": ..., "message": ...}}`
#[derive(Debug, Deserialize)]
pub struct CloudErrorResponse {
    pub error: Option<CloudErrorBody>,
}

#[derive(Debug, Deserialize)]
pub struct CloudErrorBody {
    pub code: Option<String>,
    pub message: Option<String>,
}

/// Enabled/Disabled toggle used by several DevTest Labs properties.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EnabledStatus {
    Enabled,
    Disabled,
}

/// Resources that report an ARM provisioning state.
pub trait Provisioned {
    fn provisioning_state(&self) -> Option<&str>;
}

/// Polling behavior for long-running operations.
#[derive(Clone)]
pub struct PollConfig {
    pub interval: Duration,
    pub max_attempts: u32,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(10),
            max_attempts: 60,
        }
    }
}

/// Poll `fetch` until the resource reports a terminal provisioning state.
///
/// ARM PUTs on DevTest Labs resources return before provisioning completes;
/// `Succeeded` resolves to the fetched resource, `Failed`/`Canceled` to an
/// error. A resource without a provisioning state is taken as settled.
pub async fn wait_for_provisioning<T, F, Fut>(
    poll: &PollConfig,
    resource: &str,
    fetch: F,
) -> Result<T, ApiError>
where
    T: Provisioned,
    F: Fn() -> Fut,
    Fut: Future<Output = Result<Option<T>, ApiError>>,
{
    for attempt in 0..poll.max_attempts {
        if attempt > 0 {
            tokio::time::sleep(poll.interval).await;
        }

        if let Some(current) = fetch().await? {
            match current.provisioning_state() {
                None | Some("Succeeded") => return Ok(current),
                Some(state @ ("Failed" | "Canceled")) => {
                    return Err(ApiError::ProvisioningFailed {
                        resource: resource.to_string(),
                        state: state.to_string(),
                    });
                }
                Some(state) => {
                    tracing::debug!("{} provisioning state: {}", resource, state);
                }
            }
        }
    }

    Err(ApiError::PollTimeout {
        resource: resource.to_string(),
    })
}

/// Poll `present` until it reports false.
///
/// Deleted DevTest Labs resources keep resolving for a while after the
/// DELETE call returns, so deletion is only complete once GET stops finding
/// the resource.
pub async fn wait_for_deletion<F, Fut>(
    poll: &PollConfig,
    resource: &str,
    present: F,
) -> Result<(), ApiError>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<bool, ApiError>>,
{
    for attempt in 0..poll.max_attempts {
        if attempt > 0 {
            tokio::time::sleep(poll.interval).await;
        }

        if !present().await? {
            return Ok(());
        }
        tracing::debug!("{} still resolves after delete", resource);
    }

    Err(ApiError::PollTimeout {
        resource: resource.to_string(),
    })
}

/// Query parameter list rendered into a request URL.
#[derive(Debug, Clone, Default)]
pub struct ApiQueryParams {
    params: Vec<(String, String)>,
}

impl ApiQueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add<K: Into<String>, V: ToString>(mut self, key: K, value: V) -> Self {
        self.params.push((key.into(), value.to_string()));
        self
    }

    pub fn entries(&self) -> &[(String, String)] {
        &self.params
    }

    pub fn to_query_string(&self) -> String {
        if self.params.is_empty() {
            String::new()
        } else {
            format!(
                "?{}",
                self.params
                    .iter()
                    .map(|(k, v)| format!("{}={}", k, urlencoding::encode(v)))
                    .collect::<Vec<_>>()
                    .join("&")
            )
        }
    }
}
