//! Error types for the reconciliation contract

/// Error produced by a reconciler operation.
#[derive(Debug, thiserror::Error)]
pub enum ReconcileError {
    #[error("API call failed: {0}")]
    Api(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("Failed to serialize state for comparison: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Invalid desired state: {0}")]
    InvalidDesiredState(String),
}

impl ReconcileError {
    /// Wrap an underlying API client error.
    pub fn api<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        ReconcileError::Api(Box::new(err))
    }
}

/// Result type alias for reconciler operations.
pub type Result<T> = std::result::Result<T, ReconcileError>;

/// Error produced by the scenario runner.
#[derive(Debug, thiserror::Error)]
pub enum ScenarioError {
    #[error("scenario '{scenario}' step '{step}': expected changed={expected}, got changed={actual}")]
    ChangedMismatch {
        scenario: String,
        step: String,
        expected: bool,
        actual: bool,
    },

    #[error("scenario '{scenario}' step '{step}': dry run mutated the resource (present before={before}, after={after})")]
    DryRunMutated {
        scenario: String,
        step: String,
        before: bool,
        after: bool,
    },

    #[error(transparent)]
    Reconcile(#[from] ReconcileError),
}
