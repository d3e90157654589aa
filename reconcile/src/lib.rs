//! reconcile - desired-state reconciliation contract
//!
//! A small framework for converging remote resources to a declared desired
//! state and reporting whether anything changed. The `Reconciler` trait
//! carries the apply state machine (create / update / no-op / delete, with
//! side-effect-free dry-run), and the scenario runner executes sequences of
//! applies with exact expectations on the reported change flag.

pub mod diff;
pub mod error;
pub mod key;
pub mod reconciler;
pub mod scenario;
pub mod types;

// Re-exports for convenience
pub use error::{ReconcileError, Result, ScenarioError};
pub use key::ResourceKey;
pub use reconciler::Reconciler;
pub use scenario::{Report, Scenario, Step, StepOutcome};
pub use types::{ChangeResult, Desired};
